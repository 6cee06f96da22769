//! Error types for allia-insights.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::classifier::ClassifierError;
use crate::feed::FeedError;

/// Request-level failures of the analysis service.
#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    #[error("Invalid community identifier: {0}")]
    InvalidCommunity(String),

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Classification(#[from] ClassifierError),
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl InsightsError {
    /// HTTP status and stable error code for this failure.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::InvalidCommunity(_) => (StatusCode::BAD_REQUEST, "INVALID_COMMUNITY"),
            Self::Feed(FeedError::CommunityNotFound(_)) => {
                (StatusCode::NOT_FOUND, "COMMUNITY_NOT_FOUND")
            }
            Self::Feed(FeedError::CommunityInaccessible(_)) => {
                (StatusCode::FORBIDDEN, "COMMUNITY_INACCESSIBLE")
            }
            Self::Feed(_) => (StatusCode::BAD_GATEWAY, "FEED_UNAVAILABLE"),
            Self::Classification(ClassifierError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "CLASSIFICATION_TIMEOUT")
            }
            Self::Classification(_) => (StatusCode::BAD_GATEWAY, "CLASSIFICATION_FAILED"),
        }
    }
}

impl IntoResponse for InsightsError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = serde_json::json!({
            "success": false,
            "error": ApiError {
                code: code.to_string(),
                message: self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
