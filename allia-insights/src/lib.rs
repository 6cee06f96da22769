//! allia-insights - Emotion insights over recent community posts.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod classifier;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod routes;

pub use analysis::{AnalysisRecord, EmotionAnalyzer, EmotionHierarchy};
pub use classifier::{Classifier, ClassifierError, EmotionScore, HuggingFaceClassifier};
pub use error::InsightsError;
pub use feed::{FeedError, FeedReader, FeedSession, Post, RedditFeed};
pub use pipeline::analyze_community;
pub use routes::{build_router, AppState};
