//! Domain layer: pure types and algorithms, no I/O.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (value objects, IDs, state machine trait, errors)
//! - `article` - The article and the workflow lifecycle states
//! - `prompts` - Prompt builders and token budgets per task
//! - `progress` - Progress projection for streamed output
//! - `tidy` - Deterministic text normalizer
//! - `keywords` - Keyword splitting and CSV export
//! - `page_text` - Page address validation and text extraction

pub mod article;
pub mod foundation;
pub mod keywords;
pub mod page_text;
pub mod progress;
pub mod prompts;
pub mod tidy;
