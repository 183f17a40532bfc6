//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `ai` - Text generation backends (Ollama, mock)
//! - `fetch` - Web page fetching (HTTP, mock)
//! - `export` - Keyword CSV files

pub mod ai;
pub mod export;
pub mod fetch;

pub use ai::{MockTextGenerator, OllamaConfig, OllamaGenerator};
pub use export::{ExportError, KeywordCsvFile};
pub use fetch::{HttpFetcherConfig, HttpPageFetcher, MockPageFetcher};
