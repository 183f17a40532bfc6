//! Generation backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::adapters::ai::OllamaConfig;

/// Upper bound for any backend timeout.
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Ollama backend configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_host")]
    pub host: String,

    /// Model name to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl BackendConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Adapter settings for this section.
    pub fn to_ollama_config(&self) -> OllamaConfig {
        OllamaConfig::new()
            .with_host(self.host.trim_end_matches('/'))
            .with_model(&self.model)
            .with_timeout(self.timeout())
            .with_connect_timeout(self.connect_timeout())
    }

    /// Validate backend configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidBackendHost(self.host.clone()));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("BACKEND__MODEL"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigValidationError::InvalidTimeout("backend"));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > self.timeout_secs {
            return Err(ConfigValidationError::InvalidTimeout("backend connect"));
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gemma3:1b".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_connect_timeout() -> u64 {
    10
}
