//! Configuration management for Allia services.
//!
//! Services share one configuration file at `~/.allia/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `ALLIA_BIND_ADDRESS` → network.bind
//! - `ALLIA_PORT` → network.port
//! - `ALLIA_LOG_LEVEL` → observability.log_level
//! - `ALLIA_LOG_FORMAT` → observability.log_format
//! - `REDDIT_CLIENT_ID` → reddit.client_id
//! - `REDDIT_CLIENT_SECRET` → reddit.client_secret
//! - `REDDIT_USER_AGENT` → reddit.user_agent
//! - `HF_API_TOKEN` → classifier.api_token

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".allia"),
        |dirs| dirs.home_dir().join(".allia"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Network Configuration
// ============================================================================

/// Listener configuration for the HTTP service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Bind address. Default: "0.0.0.0"
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Listen port. Default: 8080
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            port: default_port(),
        }
    }
}

// ============================================================================
// Observability Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,

    /// Additional module targets pinned to `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

// ============================================================================
// Reddit Configuration
// ============================================================================

/// Reddit feed credentials and endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URL for token issue and revocation
    #[serde(default = "default_reddit_auth_url")]
    pub auth_url: String,

    /// Base URL for authenticated listing requests
    #[serde(default = "default_reddit_api_url")]
    pub api_url: String,

    /// Maximum number of recent posts pulled per request
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            user_agent: default_user_agent(),
            auth_url: default_reddit_auth_url(),
            api_url: default_reddit_api_url(),
            fetch_limit: default_fetch_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RedditConfig {
    /// Both halves of the app credentials, if configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }
}

// ============================================================================
// Classifier Configuration
// ============================================================================

/// Emotion classification backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// Inference endpoint; the model id is appended as a path segment
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_token: Option<String>,

    /// Upper bound on a single classification call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Characters of post text passed to the model
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_classifier_endpoint(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

// ============================================================================
// Root Configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub reddit: RedditConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Load configuration from the default path, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("ALLIA_BIND_ADDRESS") {
            self.network.bind = bind;
        }
        if let Some(port) = lookup("ALLIA_PORT") {
            if let Ok(p) = port.parse() {
                self.network.port = p;
            }
        }

        if let Some(level) = lookup("ALLIA_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("ALLIA_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if let Some(id) = lookup("REDDIT_CLIENT_ID") {
            self.reddit.client_id = Some(id);
        }
        if let Some(secret) = lookup("REDDIT_CLIENT_SECRET") {
            self.reddit.client_secret = Some(secret);
        }
        if let Some(agent) = lookup("REDDIT_USER_AGENT") {
            self.reddit.user_agent = agent;
        }

        if let Some(token) = lookup("HF_API_TOKEN") {
            self.classifier.api_token = Some(token);
        }
    }

    /// Socket address the HTTP service listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.network.bind, self.network.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.network.bind, self.network.port
                )
            })
    }
}

// ============================================================================
// Defaults
// ============================================================================

fn default_bind_address() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}
fn default_user_agent() -> String {
    "allia-health-insights/0.1".into()
}
fn default_reddit_auth_url() -> String {
    "https://www.reddit.com".into()
}
fn default_reddit_api_url() -> String {
    "https://oauth.reddit.com".into()
}
fn default_fetch_limit() -> usize {
    20
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_model() -> String {
    "j-hartmann/emotion-english-distilroberta-base".into()
}
fn default_classifier_endpoint() -> String {
    "https://api-inference.huggingface.co/models".into()
}
fn default_max_text_chars() -> usize {
    512
}
