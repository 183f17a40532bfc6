//! Mock page fetcher for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::page_text::PageUrl;
use crate::ports::{FetchError, PageFetcher};

/// Serves canned pages keyed by URL. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct MockPageFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `markup` for `url`.
    pub fn with_page(mut self, url: impl Into<String>, markup: impl Into<String>) -> Self {
        self.pages.insert(url.into(), Ok(markup.into()));
        self
    }

    /// Fails requests for `url` with `error`.
    pub fn with_error(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.pages.insert(url.into(), Err(error));
        self
    }

    /// Returns the URLs fetched so far.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &PageUrl) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.as_str().to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .unwrap_or(Err(FetchError::Status { status: 404 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_configured_pages_and_404_otherwise() {
        let fetcher = MockPageFetcher::new().with_page("https://contoh.id", "<p>hai</p>");

        let found = fetcher.fetch(&PageUrl::new("https://contoh.id").unwrap()).await;
        let missing = fetcher.fetch(&PageUrl::new("https://lain.id").unwrap()).await;

        assert_eq!(found.unwrap(), "<p>hai</p>");
        assert_eq!(missing, Err(FetchError::Status { status: 404 }));
        assert_eq!(fetcher.get_calls().len(), 2);
    }
}
