//! Emotion analysis of a single post body.
//!
//! truncate → classify → validate → select primary → derive sub-emotions → summarize

mod analyzer;
mod hierarchy;

use allia_common::util::{capitalize, round_to};
use serde::Serialize;

use crate::classifier::{ClassifierError, EmotionScore};

pub use analyzer::EmotionAnalyzer;
pub use hierarchy::EmotionHierarchy;

/// Characters of post text passed to the classifier.
pub const MAX_TEXT_CHARS: usize = 512;

/// Structured emotion summary for one post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    /// Truncated post body
    pub text: String,
    /// Capitalized winning label
    pub primary_emotion: String,
    /// Capitalized sub-emotions in taxonomy order
    pub sub_emotions: Vec<String>,
    /// Winning score as a percentage, two decimals
    pub confidence: f64,
    pub summary: String,
}

/// Winning label of a score set.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryEmotion {
    /// Lower-case label
    pub label: String,
    /// Score in [0, 1]
    pub score: f64,
}

impl PrimaryEmotion {
    /// Score as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        round_to(self.score * 100.0, 2)
    }
}

/// Reject score sets that cannot be trusted.
///
/// Every score must be a finite number in [0, 1] and every vocabulary label
/// must be scored. Labels outside the vocabulary are allowed.
pub fn validate_scores<'a>(
    scores: &[EmotionScore],
    vocabulary: impl IntoIterator<Item = &'a str>,
) -> Result<(), ClassifierError> {
    if scores.is_empty() {
        return Err(ClassifierError::Malformed("no scores returned".into()));
    }

    if let Some(bad) = scores
        .iter()
        .find(|s| !s.score.is_finite() || !(0.0..=1.0).contains(&s.score))
    {
        return Err(ClassifierError::Malformed(format!(
            "score for '{}' out of range: {}",
            bad.label, bad.score
        )));
    }

    let missing: Vec<&str> = vocabulary
        .into_iter()
        .filter(|label| !scores.iter().any(|s| s.label.eq_ignore_ascii_case(label)))
        .collect();
    if !missing.is_empty() {
        return Err(ClassifierError::Malformed(format!(
            "missing scores for: {}",
            missing.join(", ")
        )));
    }

    Ok(())
}

/// Pick the highest-scoring label.
///
/// Ties go to the lexicographically smallest label so the result does not
/// depend on the order the classifier returned its scores in.
pub fn select_primary(scores: &[EmotionScore]) -> Option<PrimaryEmotion> {
    scores
        .iter()
        .map(|s| (s.label.to_lowercase(), s.score))
        .reduce(|best, candidate| {
            if candidate.1 > best.1 || (candidate.1 == best.1 && candidate.0 < best.0) {
                candidate
            } else {
                best
            }
        })
        .map(|(label, score)| PrimaryEmotion { label, score })
}

/// Render the one-sentence summary for a primary emotion and its sub-emotions.
///
/// An empty sub-emotion list still renders, leaving nothing after "elements of ".
pub fn compose_summary<S: AsRef<str>>(primary_emotion: &str, sub_emotions: &[S]) -> String {
    let elements = sub_emotions
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
        .to_lowercase();

    format!(
        "The user appears to be experiencing {} with elements of {}, possibly indicating underlying mental health challenges.",
        primary_emotion.to_lowercase(),
        elements
    )
}

/// Assemble the output record for one text.
pub fn build_record(text: String, primary: &PrimaryEmotion, hierarchy: &EmotionHierarchy) -> AnalysisRecord {
    let sub_emotions = hierarchy.sub_emotions(&primary.label);

    AnalysisRecord {
        text,
        primary_emotion: capitalize(&primary.label),
        sub_emotions: sub_emotions.iter().map(|s| capitalize(s)).collect(),
        confidence: primary.confidence_percent(),
        summary: compose_summary(&primary.label, sub_emotions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn standard_scores(top: (&str, f64)) -> Vec<EmotionScore> {
        let mut scores: Vec<EmotionScore> = EmotionHierarchy::standard()
            .vocabulary()
            .map(|label| EmotionScore::new(label, 0.01))
            .collect();
        scores.push(EmotionScore::new(top.0, top.1));
        scores
    }

    #[test]
    fn test_select_primary_max() {
        let scores = vec![
            EmotionScore::new("joy", 0.2),
            EmotionScore::new("sadness", 0.91),
            EmotionScore::new("fear", 0.05),
        ];
        let primary = select_primary(&scores).unwrap();
        assert_eq!(primary.label, "sadness");
        assert_eq!(primary.confidence_percent(), 91.0);
    }

    #[test]
    fn test_select_primary_tie_is_lexicographic() {
        let forward = vec![EmotionScore::new("sadness", 0.5), EmotionScore::new("fear", 0.5)];
        let reverse = vec![EmotionScore::new("fear", 0.5), EmotionScore::new("sadness", 0.5)];
        assert_eq!(select_primary(&forward).unwrap().label, "fear");
        assert_eq!(select_primary(&reverse).unwrap().label, "fear");
    }

    #[test]
    fn test_select_primary_empty() {
        assert!(select_primary(&[]).is_none());
    }

    #[test]
    fn test_select_primary_lowercases() {
        let scores = vec![EmotionScore::new("JOY", 0.9)];
        assert_eq!(select_primary(&scores).unwrap().label, "joy");
    }

    #[test]
    fn test_validate_scores_ok() {
        let hierarchy = EmotionHierarchy::standard();
        let scores = standard_scores(("love", 0.8));
        assert!(validate_scores(&scores, hierarchy.vocabulary()).is_ok());
    }

    #[test]
    fn test_validate_scores_empty() {
        let hierarchy = EmotionHierarchy::standard();
        assert!(matches!(
            validate_scores(&[], hierarchy.vocabulary()),
            Err(ClassifierError::Malformed(_))
        ));
    }

    #[test]
    fn test_validate_scores_missing_label() {
        let hierarchy = EmotionHierarchy::standard();
        let scores = vec![EmotionScore::new("sadness", 0.9)];
        let err = validate_scores(&scores, hierarchy.vocabulary()).unwrap_err();
        assert!(err.to_string().contains("anger"));
    }

    #[test]
    fn test_validate_scores_out_of_range() {
        let hierarchy = EmotionHierarchy::standard();
        let mut scores = standard_scores(("joy", 0.5));
        scores.push(EmotionScore::new("fear", f64::NAN));
        assert!(validate_scores(&scores, hierarchy.vocabulary()).is_err());

        let scores = standard_scores(("joy", 1.5));
        assert!(validate_scores(&scores, hierarchy.vocabulary()).is_err());
    }

    #[test]
    fn test_compose_summary() {
        assert_eq!(
            compose_summary("Sadness", &["Hopelessness", "Guilt", "Shame"]),
            "The user appears to be experiencing sadness with elements of hopelessness, guilt, shame, possibly indicating underlying mental health challenges."
        );
    }

    #[test]
    fn test_compose_summary_empty_subs() {
        let none: [&str; 0] = [];
        assert_eq!(
            compose_summary("love", &none),
            "The user appears to be experiencing love with elements of , possibly indicating underlying mental health challenges."
        );
    }

    #[test]
    fn test_build_record() {
        let hierarchy = EmotionHierarchy::standard();
        let primary = PrimaryEmotion {
            label: "fear".into(),
            score: 0.456789,
        };
        let record = build_record("so scared".into(), &primary, &hierarchy);
        assert_eq!(record.primary_emotion, "Fear");
        assert_eq!(record.sub_emotions, vec!["Anxiety", "Panic", "Worry"]);
        assert_eq!(record.confidence, 45.68);
    }

    #[test]
    fn test_record_serialization_fields() {
        let hierarchy = EmotionHierarchy::standard();
        let primary = PrimaryEmotion {
            label: "joy".into(),
            score: 0.5,
        };
        let value = serde_json::to_value(build_record("yay".into(), &primary, &hierarchy)).unwrap();
        assert_eq!(value["primary_emotion"], "Joy");
        assert_eq!(value["sub_emotions"], serde_json::json!(["Happiness", "Relief"]));
        assert_eq!(value["confidence"], 50.0);
        assert!(value["summary"].as_str().unwrap().contains("happiness, relief"));
    }

    proptest! {
        #[test]
        fn confidence_matches_max_score(raw in proptest::collection::vec(0.0f64..=1.0, 1..10)) {
            let scores: Vec<EmotionScore> = raw
                .iter()
                .enumerate()
                .map(|(i, s)| EmotionScore::new(format!("label{i}"), *s))
                .collect();
            let max = raw.iter().cloned().fold(f64::MIN, f64::max);
            let primary = select_primary(&scores).unwrap();
            prop_assert_eq!(primary.score, max);
            prop_assert_eq!(primary.confidence_percent(), round_to(max * 100.0, 2));
        }

        #[test]
        fn summary_follows_template(
            primary in "[a-zA-Z]{1,12}",
            subs in proptest::collection::vec("[a-zA-Z]{1,12}", 0..5),
        ) {
            let summary = compose_summary(&primary, &subs);
            let expected = format!(
                "The user appears to be experiencing {} with elements of {}, possibly indicating underlying mental health challenges.",
                primary.to_lowercase(),
                subs.join(", ").to_lowercase()
            );
            prop_assert_eq!(summary, expected);
        }
    }
}
