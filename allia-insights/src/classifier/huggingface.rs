//! Hugging Face inference adapter.
//!
//! Posts text to `{endpoint}/{model}` and asks for every label
//! (`top_k: null`), waiting for cold models instead of failing fast.

use allia_common::config::ClassifierConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{Classifier, ClassifierError, EmotionScore};

/// Inference responses come nested per input or already flattened.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batched(Vec<Vec<EmotionScore>>),
    Flat(Vec<EmotionScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Result<Vec<EmotionScore>, ClassifierError> {
        match self {
            Self::Flat(scores) => Ok(scores),
            Self::Batched(mut batches) => {
                if batches.len() != 1 {
                    return Err(ClassifierError::Malformed(format!(
                        "expected scores for one input, got {}",
                        batches.len()
                    )));
                }
                Ok(batches.remove(0))
            }
        }
    }
}

/// Emotion classifier backed by a hosted text-classification model.
pub struct HuggingFaceClassifier {
    client: reqwest::Client,
    url: String,
    model: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HuggingFaceClassifier {
    pub fn from_config(config: &ClassifierConfig) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: format!("{}/{}", config.endpoint.trim_end_matches('/'), config.model),
            model: config.model.clone(),
            api_token: config.api_token.clone().filter(|t| !t.is_empty()),
            timeout,
        })
    }
}

#[async_trait]
impl Classifier for HuggingFaceClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>, ClassifierError> {
        let payload = serde_json::json!({
            "inputs": text,
            "parameters": { "top_k": null },
            "options": { "wait_for_model": true }
        });

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        debug!(model = %self.model, chars = text.chars().count(), "Classifying text");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout(self.timeout)
            } else if e.is_connect() {
                ClassifierError::Network("Connection failed".into())
            } else {
                ClassifierError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClassifierError::Overloaded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Unavailable(format!("HTTP {}: {}", status, body)));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(format!("Failed to parse scores: {}", e)))?;

        parsed.into_scores()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";

    fn classifier_for(server: &MockServer) -> HuggingFaceClassifier {
        let config = ClassifierConfig {
            endpoint: format!("{}/models", server.uri()),
            api_token: Some("hf_test".into()),
            ..ClassifierConfig::default()
        };
        HuggingFaceClassifier::from_config(&config).unwrap()
    }

    fn model_path() -> String {
        format!("/models/{MODEL}")
    }

    #[tokio::test]
    async fn test_classify_nested_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path()))
            .and(header("authorization", "Bearer hf_test"))
            .and(body_partial_json(serde_json::json!({"inputs": "I feel hopeless today"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
                {"label": "sadness", "score": 0.91},
                {"label": "fear", "score": 0.05},
                {"label": "neutral", "score": 0.04}
            ]])))
            .mount(&server)
            .await;

        let scores = classifier_for(&server)
            .classify("I feel hopeless today")
            .await
            .unwrap();

        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0], EmotionScore::new("sadness", 0.91));
    }

    #[tokio::test]
    async fn test_classify_flat_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"label": "joy", "score": 0.7},
                {"label": "surprise", "score": 0.3}
            ])))
            .mount(&server)
            .await;

        let scores = classifier_for(&server).classify("yay").await.unwrap();
        assert_eq!(scores[1], EmotionScore::new("surprise", 0.3));
    }

    #[tokio::test]
    async fn test_model_loading_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path()))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": "Model is currently loading",
                "estimated_time": 20.0
            })))
            .mount(&server)
            .await;

        let err = classifier_for(&server).classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_rate_limited_is_overloaded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path()))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = classifier_for(&server).classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Overloaded));
    }

    #[tokio::test]
    async fn test_non_numeric_score_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
                {"label": "sadness", "score": "high"}
            ]])))
            .mount(&server)
            .await;

        let err = classifier_for(&server).classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_slow_model_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(model_path()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([[{"label": "joy", "score": 0.9}]]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let config = ClassifierConfig {
            endpoint: format!("{}/models", server.uri()),
            timeout_secs: 1,
            ..ClassifierConfig::default()
        };
        let classifier = HuggingFaceClassifier::from_config(&config).unwrap();

        let err = classifier.classify("text").await.unwrap_err();
        assert!(matches!(err, ClassifierError::Timeout(d) if d == Duration::from_secs(1)));
    }

    #[test]
    fn test_multiple_batches_rejected() {
        let response = InferenceResponse::Batched(vec![vec![], vec![]]);
        assert!(matches!(
            response.into_scores(),
            Err(ClassifierError::Malformed(_))
        ));
    }
}
