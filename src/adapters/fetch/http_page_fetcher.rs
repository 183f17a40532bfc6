//! HTTP page fetcher backed by reqwest.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::domain::page_text::PageUrl;
use crate::ports::{FetchError, PageFetcher};

/// Desktop browser User-Agent; some sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Configuration for page fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFetcherConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl HttpFetcherConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches pages with a plain GET.
pub struct HttpPageFetcher {
    config: HttpFetcherConfig,
    client: Client,
}

impl HttpPageFetcher {
    /// Creates a fetcher.
    ///
    /// # Errors
    ///
    /// Returns `Network` if the HTTP client cannot be built.
    pub fn new(config: HttpFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::network(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else {
            FetchError::network(err.to_string())
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &PageUrl) -> Result<String, FetchError> {
        debug!(url = %url, "Fetching page");
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_browser_agent_and_twenty_seconds() {
        let config = HttpFetcherConfig::default();
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn config_builder_works() {
        let config = HttpFetcherConfig::default()
            .with_user_agent("seo-scribe-test")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.user_agent, "seo-scribe-test");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn refused_connection_is_network_error() {
        let fetcher = HttpPageFetcher::new(HttpFetcherConfig::default()).unwrap();
        let url = PageUrl::new("http://127.0.0.1:1/").unwrap();

        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Network(_)));
        assert!(err.to_string().starts_with("Error while fetching the URL: "));
    }
}
