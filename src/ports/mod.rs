//! Ports: traits the application depends on, implemented by adapters.

mod page_fetcher;
mod text_generator;

pub use page_fetcher::{FetchError, PageFetcher};
pub use text_generator::{
    BackendInfo, GenerationError, GenerationRequest, StreamResult, TextGenerator, Token,
    TokenStream,
};
