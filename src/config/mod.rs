//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SEO_SCRIBE` prefix and nested values use double underscores as separators.
//! Every value has a default, so an empty environment is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use seo_scribe::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Backend at {}", config.backend.host);
//! ```

mod backend;
mod error;
mod fetch;
mod logging;
mod writing;

pub use backend::BackendConfig;
pub use error::{ConfigError, ConfigValidationError};
pub use fetch::FetchConfig;
pub use logging::LoggingConfig;
pub use writing::WritingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Generation backend (Ollama host, model, timeouts)
    #[serde(default)]
    pub backend: BackendConfig,

    /// Page fetching for analysis
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Prompt style
    #[serde(default)]
    pub writing: WritingConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SEO_SCRIBE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SEO_SCRIBE__BACKEND__MODEL=llama3:8b` -> `backend.model = "llama3:8b"`
    /// - `SEO_SCRIBE__FETCH__TIMEOUT_SECS=30` -> `fetch.timeout_secs = 30`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SEO_SCRIBE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigValidationError` found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.backend.validate()?;
        self.fetch.validate()?;
        self.writing.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
