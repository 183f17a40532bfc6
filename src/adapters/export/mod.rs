//! Export adapters.

mod keyword_csv;

pub use keyword_csv::{ExportError, KeywordCsvFile};
