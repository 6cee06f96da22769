//! Primary emotion → sub-emotion taxonomy.

use std::collections::BTreeMap;

/// Fixed sub-emotion table keyed on the classifier's label vocabulary.
const STANDARD_TAXONOMY: &[(&str, &[&str])] = &[
    ("sadness", &["hopelessness", "guilt", "shame"]),
    ("fear", &["anxiety", "panic", "worry"]),
    ("anger", &["frustration", "irritation"]),
    ("disgust", &["revulsion"]),
    ("joy", &["happiness", "relief"]),
    ("surprise", &["shock", "amazement"]),
    ("neutral", &["fatigue", "dissociation"]),
];

/// Immutable mapping from primary emotion to its ordered sub-emotions.
///
/// Built once at startup and shared read-only between request handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionHierarchy {
    entries: BTreeMap<String, Vec<String>>,
}

impl EmotionHierarchy {
    /// Build a hierarchy from `(primary, [sub...])` pairs. Keys are stored lower-case.
    pub fn new<I, K, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<S>)>,
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(primary, subs)| {
                    (
                        primary.into().to_lowercase(),
                        subs.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    /// The standard seven-emotion taxonomy.
    pub fn standard() -> Self {
        Self::new(
            STANDARD_TAXONOMY
                .iter()
                .map(|(primary, subs)| (*primary, subs.to_vec())),
        )
    }

    /// Sub-emotions for `primary` in table order; empty for unmapped labels.
    pub fn sub_emotions(&self, primary: &str) -> &[String] {
        self.entries
            .get(primary)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Primary labels the table is keyed on, in lexicographic order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for EmotionHierarchy {
    fn default() -> Self {
        Self::standard()
    }
}
