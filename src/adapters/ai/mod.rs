//! Text Generation Adapters.
//!
//! Implementations of the TextGenerator port.
//!
//! ## Available Adapters
//!
//! - `OllamaGenerator` - Local Ollama server over streaming NDJSON
//! - `MockTextGenerator` - Scripted mock for testing

mod mock_generator;
mod ollama_generator;

pub use mock_generator::{MockScript, MockTextGenerator};
pub use ollama_generator::{OllamaConfig, OllamaGenerator};
