//! Page Fetcher Port - retrieves raw page markup for analysis.

use async_trait::async_trait;

use crate::domain::page_text::PageUrl;

/// Port for fetching web pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page body as text.
    async fn fetch(&self, url: &PageUrl) -> Result<String, FetchError>;
}

/// Page fetch failures. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Error while fetching the URL: request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Error while fetching the URL: server answered {status}")]
    Status { status: u16 },

    #[error("Error while fetching the URL: {0}")]
    Network(String),
}

impl FetchError {
    pub fn network(cause: impl Into<String>) -> Self {
        Self::Network(cause.into())
    }
}
