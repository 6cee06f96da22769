//! Reddit feed adapter.
//!
//! Uses application-only OAuth: every session obtains its own bearer token
//! and revokes it when the session ends.
//!
//! # Endpoints
//! - `POST {auth_url}/api/v1/access_token` - issue token (client credentials)
//! - `GET {api_url}/r/{community}/new` - newest posts, paged by `after`
//! - `POST {auth_url}/api/v1/revoke_token` - release token
//!
//! # Status Mapping
//! - 404 and redirects (unknown or banned community) → `CommunityNotFound`
//! - 403 (private or quarantined) → `CommunityInaccessible`
//! - 401 → `Auth`

use allia_common::config::RedditConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{FeedError, FeedReader, FeedSession, Post};

/// Largest page Reddit serves for a listing request.
const MAX_PAGE_SIZE: usize = 100;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: LinkData,
}

#[derive(Debug, Deserialize)]
struct LinkData {
    id: String,
    #[serde(default)]
    selftext: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Shared HTTP plumbing for the feed and its sessions.
struct RedditApi {
    client: reqwest::Client,
    credentials: Option<(String, String)>,
    auth_url: String,
    api_url: String,
}

impl RedditApi {
    async fn access_token(&self) -> Result<String, FeedError> {
        let (client_id, client_secret) = self
            .credentials
            .as_ref()
            .ok_or_else(|| FeedError::Auth("Reddit client credentials are not configured".into()))?;

        let url = format!("{}/api/v1/access_token", self.auth_url);
        let response = self
            .client
            .post(&url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FeedError::Auth("Reddit rejected client credentials".into()));
        }
        if !status.is_success() {
            return Err(FeedError::Network(format!("Token request failed: HTTP {}", status)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(format!("Failed to parse token response: {}", e)))?;

        match (token.access_token, token.error) {
            (Some(access_token), None) => Ok(access_token),
            (_, Some(error)) => Err(FeedError::Auth(error)),
            (None, None) => Err(FeedError::Malformed("Token response has no access_token".into())),
        }
    }

    async fn fetch_listing(
        &self,
        token: &str,
        community: &str,
        limit: usize,
        after: Option<&str>,
    ) -> Result<ListingData, FeedError> {
        let url = format!("{}/r/{}/new", self.api_url, community);
        let limit = limit.to_string();
        let mut query = vec![("limit", limit.as_str()), ("raw_json", "1")];
        if let Some(after) = after {
            query.push(("after", after));
        }

        debug!(url = %url, community = community, after = ?after, "Fetching listing from Reddit");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status.is_redirection() || status == StatusCode::NOT_FOUND {
            return Err(FeedError::CommunityNotFound(community.to_string()));
        }
        if status == StatusCode::FORBIDDEN {
            return Err(FeedError::CommunityInaccessible(community.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(FeedError::Auth("Reddit rejected access token".into()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Network(format!("HTTP {}: {}", status, body)));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(format!("Failed to parse listing: {}", e)))?;

        Ok(listing.data)
    }

    async fn revoke(&self, token: &str) {
        let Some((client_id, client_secret)) = self.credentials.as_ref() else {
            return;
        };

        let url = format!("{}/api/v1/revoke_token", self.auth_url);
        let result = self
            .client
            .post(&url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("token", token), ("token_type_hint", "access_token")])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Reddit session token revoked");
            }
            Ok(response) => {
                warn!(status = %response.status(), "Reddit token revocation rejected");
            }
            Err(e) => {
                warn!(error = %e, "Reddit token revocation failed");
            }
        }
    }
}

fn network_error(e: reqwest::Error) -> FeedError {
    if e.is_timeout() {
        FeedError::Network("Request timeout".into())
    } else if e.is_connect() {
        FeedError::Network("Connection failed".into())
    } else {
        FeedError::Network(e.to_string())
    }
}

// ============================================================================
// Feed Reader
// ============================================================================

/// Reddit implementation of [`FeedReader`].
pub struct RedditFeed {
    api: Arc<RedditApi>,
}

impl RedditFeed {
    /// Build the feed from configuration.
    ///
    /// Redirects are disabled so that Reddit's redirect-to-search for unknown
    /// communities surfaces as `CommunityNotFound`.
    pub fn from_config(config: &RedditConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let credentials = config
            .credentials()
            .map(|(id, secret)| (id.to_string(), secret.to_string()));

        Ok(Self {
            api: Arc::new(RedditApi {
                client,
                credentials,
                auth_url: config.auth_url.trim_end_matches('/').to_string(),
                api_url: config.api_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Whether client credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.api.credentials.is_some()
    }
}

#[async_trait]
impl FeedReader for RedditFeed {
    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn open(
        &self,
        community: &str,
        limit: usize,
    ) -> Result<Box<dyn FeedSession>, FeedError> {
        let token = self.api.access_token().await?;
        debug!(community = community, limit = limit, "Reddit session opened");

        Ok(Box::new(RedditSession {
            api: Arc::clone(&self.api),
            token: Some(token),
            community: community.to_string(),
            remaining: limit,
            buffer: VecDeque::new(),
            after: None,
            exhausted: false,
        }))
    }
}

// ============================================================================
// Session
// ============================================================================

struct RedditSession {
    api: Arc<RedditApi>,
    token: Option<String>,
    community: String,
    /// Posts still allowed to be pulled from the listing
    remaining: usize,
    buffer: VecDeque<Post>,
    after: Option<String>,
    exhausted: bool,
}

impl RedditSession {
    async fn fill_buffer(&mut self) -> Result<(), FeedError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| FeedError::Auth("Session already closed".into()))?;

        let page_size = self.remaining.min(MAX_PAGE_SIZE);
        let page = self
            .api
            .fetch_listing(token, &self.community, page_size, self.after.as_deref())
            .await?;

        let page_was_empty = page.children.is_empty();
        let posts: Vec<Post> = page
            .children
            .into_iter()
            .filter(|thing| thing.kind == "t3")
            .take(self.remaining)
            .map(|thing| Post::new(thing.data.id, thing.data.selftext.unwrap_or_default()))
            .collect();

        // Pages holding only non-post things still carry a cursor.
        if page_was_empty || page.after.is_none() {
            self.exhausted = true;
        }
        self.remaining -= posts.len();
        self.after = page.after;
        self.buffer.extend(posts);

        Ok(())
    }
}

#[async_trait]
impl FeedSession for RedditSession {
    async fn next_post(&mut self) -> Result<Option<Post>, FeedError> {
        while self.buffer.is_empty() && !self.exhausted && self.remaining > 0 {
            self.fill_buffer().await?;
        }
        Ok(self.buffer.pop_front())
    }

    async fn close(self: Box<Self>) {
        let mut session = self;
        if let Some(token) = session.token.take() {
            session.api.revoke(&token).await;
        }
    }
}

impl Drop for RedditSession {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let api = Arc::clone(&self.api);
                handle.spawn(async move {
                    api.revoke(&token).await;
                });
            }
            Err(_) => {
                debug!("No runtime available, Reddit token left to expire");
            }
        }
    }
}
