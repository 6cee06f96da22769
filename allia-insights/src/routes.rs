//! HTTP API routes.

use crate::analysis::EmotionAnalyzer;
use crate::error::InsightsError;
use crate::feed::FeedReader;
use crate::pipeline::{analyze_community, DEFAULT_FETCH_LIMIT};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Longest community name Reddit allows.
const MAX_COMMUNITY_LEN: usize = 21;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<dyn FeedReader>,
    pub analyzer: EmotionAnalyzer,
    pub fetch_limit: usize,
}

impl AppState {
    pub fn new(feed: Arc<dyn FeedReader>, analyzer: EmotionAnalyzer) -> Self {
        Self {
            feed,
            analyzer,
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn with_fetch_limit(mut self, fetch_limit: usize) -> Self {
        self.fetch_limit = fetch_limit;
        self
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze/:community", get(analyze))
        .with_state(state)
}

// ============ Health Check ============

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "allia-insights",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ============ Analysis ============

/// Community names are 1-21 ASCII letters, digits, or underscores.
pub fn validate_community(community: &str) -> Result<(), InsightsError> {
    let valid = !community.is_empty()
        && community.len() <= MAX_COMMUNITY_LEN
        && community
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(InsightsError::InvalidCommunity(community.to_string()))
    }
}

async fn analyze(
    State(state): State<AppState>,
    Path(community): Path<String>,
) -> Result<impl IntoResponse, InsightsError> {
    validate_community(&community)?;

    let records = analyze_community(
        state.feed.as_ref(),
        &state.analyzer,
        &community,
        state.fetch_limit,
    )
    .await?;

    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EmotionHierarchy;
    use crate::classifier::{Classifier, ClassifierError, EmotionScore};
    use crate::feed::{FeedError, FeedSession};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct NoFeed;

    #[async_trait]
    impl FeedReader for NoFeed {
        fn name(&self) -> &'static str {
            "none"
        }

        async fn open(
            &self,
            community: &str,
            _limit: usize,
        ) -> Result<Box<dyn FeedSession>, FeedError> {
            Err(FeedError::CommunityNotFound(community.to_string()))
        }
    }

    struct NoClassifier;

    #[async_trait]
    impl Classifier for NoClassifier {
        fn name(&self) -> &str {
            "none"
        }

        async fn classify(&self, _text: &str) -> Result<Vec<EmotionScore>, ClassifierError> {
            Err(ClassifierError::Unavailable("not wired".into()))
        }
    }

    fn test_app() -> Router {
        let analyzer =
            EmotionAnalyzer::new(Arc::new(NoClassifier), Arc::new(EmotionHierarchy::standard()));
        build_router(AppState::new(Arc::new(NoFeed), analyzer))
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_community() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/analyze/not%20valid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_community() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/analyze/nosuchplace")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validate_community() {
        assert!(validate_community("test").is_ok());
        assert!(validate_community("mental_health").is_ok());
        assert!(validate_community("").is_err());
        assert!(validate_community("a".repeat(22).as_str()).is_err());
        assert!(validate_community("../etc").is_err());
    }
}
