//! Page fetch configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::adapters::fetch::{HttpFetcherConfig, DEFAULT_USER_AGENT};
use crate::domain::page_text::DEFAULT_MAX_CHARS;

/// Page fetch configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent with page requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Characters of extracted page text kept for analysis
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Adapter settings for this section.
    pub fn to_fetcher_config(&self) -> HttpFetcherConfig {
        HttpFetcherConfig::default()
            .with_user_agent(&self.user_agent)
            .with_timeout(self.timeout())
    }

    /// Validate fetch configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ConfigValidationError::InvalidTimeout("fetch"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("FETCH__USER_AGENT"));
        }
        if self.max_chars == 0 {
            return Err(ConfigValidationError::InvalidMaxChars);
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            max_chars: default_max_chars(),
        }
    }
}

fn default_timeout() -> u64 {
    20
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert!(config.user_agent.contains("Chrome"));
        assert_eq!(config.max_chars, 3500);
    }

    #[test]
    fn test_to_fetcher_config() {
        let config = FetchConfig {
            timeout_secs: 5,
            user_agent: "seo-scribe-test".to_string(),
            ..Default::default()
        };

        let fetcher = config.to_fetcher_config();

        assert_eq!(fetcher.user_agent, "seo-scribe-test");
        assert_eq!(fetcher.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validation() {
        assert!(FetchConfig::default().validate().is_ok());

        let zero_chars = FetchConfig {
            max_chars: 0,
            ..Default::default()
        };
        assert_eq!(zero_chars.validate(), Err(ConfigValidationError::InvalidMaxChars));

        let zero_timeout = FetchConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }
}
