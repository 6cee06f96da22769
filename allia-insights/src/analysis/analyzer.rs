//! Classifier-backed analyzer.

use allia_common::util::truncate_chars;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{
    build_record, select_primary, validate_scores, AnalysisRecord, EmotionHierarchy, MAX_TEXT_CHARS,
};
use crate::classifier::{Classifier, ClassifierError};

/// Turns one post body into an [`AnalysisRecord`].
///
/// Holds no per-request state; one instance serves all requests.
#[derive(Clone)]
pub struct EmotionAnalyzer {
    classifier: Arc<dyn Classifier>,
    hierarchy: Arc<EmotionHierarchy>,
    timeout: Duration,
    max_text_chars: usize,
}

impl EmotionAnalyzer {
    pub fn new(classifier: Arc<dyn Classifier>, hierarchy: Arc<EmotionHierarchy>) -> Self {
        Self {
            classifier,
            hierarchy,
            timeout: Duration::from_secs(30),
            max_text_chars: MAX_TEXT_CHARS,
        }
    }

    /// Bound on a single classification call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    /// Analyze one non-empty post body.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisRecord, ClassifierError> {
        let text = truncate_chars(text, self.max_text_chars);

        let scores = tokio::time::timeout(self.timeout, self.classifier.classify(text))
            .await
            .map_err(|_| ClassifierError::Timeout(self.timeout))??;

        validate_scores(&scores, self.hierarchy.vocabulary())?;

        let primary = select_primary(&scores)
            .ok_or_else(|| ClassifierError::Malformed("no scores returned".into()))?;

        debug!(
            classifier = self.classifier.name(),
            primary = %primary.label,
            score = primary.score,
            "Text classified"
        );

        Ok(build_record(text.to_string(), &primary, &self.hierarchy))
    }
}
