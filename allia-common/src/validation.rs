//! Configuration validation for Allia services.
//!
//! Provides validation logic for configuration fields to ensure
//! all values are present and within valid ranges before startup.

use thiserror::Error;

use crate::config::{ClassifierConfig, Config, NetworkConfig, ObservabilityConfig, RedditConfig};

/// Largest page Reddit serves for a listing request.
pub const MAX_FETCH_LIMIT: usize = 100;

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            self.network.validate(),
            self.observability.validate(),
            self.reddit.validate(),
            self.classifier.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

impl Validate for NetworkConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.port == 0 {
            return Err(ValidationError::InvalidValue {
                field: "network.port".into(),
                reason: "must be between 1 and 65535".into(),
            });
        }
        if self.bind.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "network.bind".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for RedditConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.fetch_limit == 0 || self.fetch_limit > MAX_FETCH_LIMIT {
            return Err(ValidationError::InvalidValue {
                field: "reddit.fetch_limit".into(),
                reason: format!("must be between 1 and {MAX_FETCH_LIMIT}"),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "reddit.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }

        // Credentials come as a pair; half a pair is a typo, not "unconfigured".
        match (&self.client_id, &self.client_secret) {
            (Some(_), None) => Err(ValidationError::MissingField {
                field: "reddit.client_secret".into(),
            }),
            (None, Some(_)) => Err(ValidationError::MissingField {
                field: "reddit.client_id".into(),
            }),
            _ => Ok(()),
        }
    }
}

impl Validate for ClassifierConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "classifier.model".into(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "classifier.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_text_chars == 0 {
            return Err(ValidationError::InvalidValue {
                field: "classifier.max_text_chars".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
