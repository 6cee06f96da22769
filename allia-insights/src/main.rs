//! allia-insights service entry point.

use allia_common::config::Config;
use allia_common::logging::init_logging;
use allia_insights::{
    build_router, AppState, EmotionAnalyzer, EmotionHierarchy, HuggingFaceClassifier, RedditFeed,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let config = Config::load_with_env()?;
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("Allia Insights v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;

    let feed = RedditFeed::from_config(&config.reddit).context("Failed to build Reddit client")?;
    if !feed.has_credentials() {
        tracing::warn!("Reddit credentials not configured; analysis requests will fail");
    }

    let classifier = HuggingFaceClassifier::from_config(&config.classifier)
        .context("Failed to build classifier client")?;

    let analyzer = EmotionAnalyzer::new(Arc::new(classifier), Arc::new(EmotionHierarchy::standard()))
        .with_timeout(Duration::from_secs(config.classifier.timeout_secs))
        .with_max_text_chars(config.classifier.max_text_chars);

    let state = AppState::new(Arc::new(feed), analyzer).with_fetch_limit(config.reddit.fetch_limit);

    // Public read-only dashboard API: any origin may call it.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.socket_addr()?;

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
