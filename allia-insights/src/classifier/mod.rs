//! Text emotion classification.

pub mod huggingface;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use huggingface::HuggingFaceClassifier;

/// Confidence for one label of the classifier vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    /// Confidence in [0, 1]
    pub score: f64,
}

impl EmotionScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Classification failures. Any of these fails the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Classifier overloaded")]
    Overloaded,

    #[error("Malformed classifier output: {0}")]
    Malformed(String),

    #[error("Classification timed out after {0:?}")]
    Timeout(Duration),

    #[error("Classifier request failed: {0}")]
    Network(String),
}

/// Scores a text against a fixed emotion vocabulary.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classifier name for logs
    fn name(&self) -> &str;

    /// Score `text` against every label the model knows.
    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>, ClassifierError>;
}
