//! Batch analysis of one community.
//!
//! Posts are pulled and classified one at a time, in feed order. The first
//! failure aborts the batch and discards records already produced.

use allia_common::logging::generate_trace_id;
use std::time::Instant;
use tracing::{info, warn, Instrument};

use crate::analysis::{AnalysisRecord, EmotionAnalyzer};
use crate::error::InsightsError;
use crate::feed::{FeedReader, FeedSession};

/// Default number of recent posts analyzed per request.
pub const DEFAULT_FETCH_LIMIT: usize = 20;

/// Analyze up to `limit` recent posts of `community`.
///
/// The feed session is closed on every exit path. Posts without body text are
/// skipped; zero qualifying posts is a successful empty batch.
pub async fn analyze_community(
    feed: &dyn FeedReader,
    analyzer: &EmotionAnalyzer,
    community: &str,
    limit: usize,
) -> Result<Vec<AnalysisRecord>, InsightsError> {
    let trace_id = generate_trace_id();
    let span = tracing::info_span!(
        "analyze_community",
        trace_id = %trace_id,
        community = community,
        feed = feed.name()
    );

    async move {
        let started = Instant::now();

        let mut session = feed.open(community, limit).await?;
        let result = drain_session(&mut *session, analyzer, limit).await;
        session.close().await;

        match &result {
            Ok(records) => info!(
                analyzed = records.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "Community analyzed"
            ),
            Err(e) => warn!(error = %e, "Community analysis failed"),
        }

        result
    }
    .instrument(span)
    .await
}

async fn drain_session(
    session: &mut dyn FeedSession,
    analyzer: &EmotionAnalyzer,
    limit: usize,
) -> Result<Vec<AnalysisRecord>, InsightsError> {
    let mut records = Vec::new();
    let mut pulled = 0usize;
    let mut skipped = 0usize;

    while pulled < limit {
        let Some(post) = session.next_post().await? else {
            break;
        };
        pulled += 1;

        if !post.has_text() {
            skipped += 1;
            continue;
        }

        records.push(analyzer.analyze_text(&post.text).await?);
    }

    info!(pulled, skipped, "Feed drained");
    Ok(records)
}
