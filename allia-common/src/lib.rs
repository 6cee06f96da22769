//! Allia Common - Shared configuration, logging, and utilities for Allia services.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Logging setup and trace identifiers
//! - Text helpers shared by the analysis pipeline

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{ClassifierConfig, Config, NetworkConfig, ObservabilityConfig, RedditConfig};
pub use validation::{Validate, ValidationError, ValidationResult};
