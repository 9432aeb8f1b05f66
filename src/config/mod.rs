//! Configuration management for pdfharvest
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! Command line flags are applied on top by the binary, followed by
//! [`Config::validate`].
//!
//! # Usage
//!
//! ```no_run
//! use pdfharvest::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Downloading into: {}", config.output.destination.display());
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `PDFHARVEST__<section>__<key>`
//!
//! Examples:
//! - `PDFHARVEST__WORKER__POOL_SIZE=4`
//! - `PDFHARVEST__OUTPUT__DESTINATION=/srv/reports`
//! - `PDFHARVEST__HTTP__REQUEST_TIMEOUT_SECS=60`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/pdfharvest.toml`.
//! This can be overridden using the `PDFHARVEST_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{ColumnConfig, Config, HttpConfig, InputConfig, OutputConfig, WorkerConfig};
pub use validation::{MAX_POOL_SIZE, ValidationError};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`PDFHARVEST__*`)
    /// 2. TOML file (`path`, else `PDFHARVEST_CONFIG`, else `config/pdfharvest.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or validation fails.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::load_layers(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Same layering as [`Config::load`] without validation, for callers that
    /// apply further overrides before calling [`Config::validate`]
    pub fn load_layers(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Ok(sources::load(path)?)
    }

    /// Load configuration from a specific path, skipping `.env`
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}
