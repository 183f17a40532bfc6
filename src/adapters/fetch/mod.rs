//! Page fetcher adapters.

mod http_page_fetcher;
mod mock_page_fetcher;

pub use http_page_fetcher::{HttpFetcherConfig, HttpPageFetcher, DEFAULT_USER_AGENT};
pub use mock_page_fetcher::MockPageFetcher;
