//! Post feeds for named communities.
//!
//! A `FeedReader` opens one `FeedSession` per request. The session yields
//! posts newest-first and must be released when the request finishes,
//! whether it succeeded, failed, or was cancelled.

pub mod reddit;

use async_trait::async_trait;

pub use reddit::RedditFeed;

/// A single user-submitted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Opaque identifier assigned by the feed
    pub id: String,
    /// Body text; empty when the post has no body
    pub text: String,
}

impl Post {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Whether the post carries any body text.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Errors raised while reaching a community feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Community not found: {0}")]
    CommunityNotFound(String),

    #[error("Community is private or restricted: {0}")]
    CommunityInaccessible(String),

    #[error("Feed authentication failed: {0}")]
    Auth(String),

    #[error("Feed request failed: {0}")]
    Network(String),

    #[error("Malformed feed response: {0}")]
    Malformed(String),
}

/// Source of community feeds.
#[async_trait]
pub trait FeedReader: Send + Sync {
    /// Feed name for logs (e.g., "reddit")
    fn name(&self) -> &'static str;

    /// Open a session that yields at most `limit` recent posts of `community`.
    async fn open(&self, community: &str, limit: usize)
        -> Result<Box<dyn FeedSession>, FeedError>;
}

/// A scoped connection to one community feed.
///
/// Implementations release their resources in `close`, and also from `Drop`
/// when a session is abandoned without being closed.
#[async_trait]
pub trait FeedSession: Send {
    /// Pull the next post, or `None` at end of feed.
    async fn next_post(&mut self) -> Result<Option<Post>, FeedError>;

    /// Release the session.
    async fn close(self: Box<Self>);
}
