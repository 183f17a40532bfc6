//! Text Generator Port - streaming text generation from a language model.
//!
//! Backend and transport failures never surface as `Err` on the stream. They
//! arrive in-band as a final [`Token::Error`] carrying a message fit to show
//! the user, so consumers handle success and failure with the same loop.
//!
//! # Example
//!
//! ```ignore
//! let mut tokens = generator.stream(GenerationRequest::new("Halo", 50));
//! while let Some(token) = tokens.next().await {
//!     match token {
//!         Token::Text(delta) => print!("{delta}"),
//!         Token::Error(message) => eprintln!("{message}"),
//!     }
//! }
//! ```

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::prompts::{RenderedPrompt, TaskKind};

/// Port for text generation backends.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Streams the completion for `request`.
    ///
    /// The stream is lazy: no connection is made until it is first polled.
    /// It ends after the last text token or after a single error token.
    fn stream(&self, request: GenerationRequest) -> TokenStream;

    /// Generates the whole completion in one response.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;

    /// Describes the backend for logs.
    fn backend_info(&self) -> BackendInfo;
}

/// Boxed stream of tokens returned by [`TextGenerator::stream`].
pub type TokenStream = Pin<Box<dyn Stream<Item = Token> + Send>>;

/// One increment of a generation stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Generated text, in emission order.
    Text(String),
    /// Terminal failure message. Nothing follows it.
    Error(String),
}

impl Token {
    pub fn text(delta: impl Into<String>) -> Self {
        Token::Text(delta.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Token::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Token::Error(_))
    }
}

impl From<GenerationError> for Token {
    fn from(err: GenerationError) -> Self {
        Token::Error(err.to_string())
    }
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamResult {
    /// All text tokens, concatenated.
    Completed(String),
    /// The error token's message. Text received before it is discarded.
    Failed(String),
}

impl StreamResult {
    /// Drains a token stream.
    pub async fn collect(mut stream: TokenStream) -> Self {
        let mut text = String::new();
        while let Some(token) = stream.next().await {
            match token {
                Token::Text(delta) => text.push_str(&delta),
                Token::Error(message) => return StreamResult::Failed(message),
            }
        }
        StreamResult::Completed(text)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, StreamResult::Completed(_))
    }
}

/// Request for a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Task the prompt was built for, if known.
    pub task: Option<TaskKind>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            task: None,
        }
    }

    pub fn with_task(mut self, task: TaskKind) -> Self {
        self.task = Some(task);
        self
    }
}

impl From<RenderedPrompt> for GenerationRequest {
    fn from(prompt: RenderedPrompt) -> Self {
        Self {
            prompt: prompt.text,
            max_tokens: prompt.token_budget,
            task: Some(prompt.task),
        }
    }
}

/// Backend identity for logs and status lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend name (e.g., "ollama", "mock").
    pub name: String,
    /// Base address of the backend.
    pub host: String,
    /// Model identifier.
    pub model: String,
}

impl BackendInfo {
    pub fn new(name: impl Into<String>, host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            model: model.into(),
        }
    }
}

/// Generation failures. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Connection refused or host not found.
    #[error("Error: cannot reach the generation backend at {host}. Is it running?")]
    Unreachable { host: String },

    /// Deadline expired before the response finished.
    #[error("Error while talking to the generation backend ({model}): request timed out after {timeout_secs}s")]
    Timeout { model: String, timeout_secs: u64 },

    /// Any other transport or protocol failure.
    #[error("Error while talking to the generation backend ({model}): {cause}")]
    Transport { model: String, cause: String },

    /// The backend answered with an explicit error.
    #[error("Backend reported an error: {message}")]
    Backend { message: String },
}

impl GenerationError {
    pub fn unreachable(host: impl Into<String>) -> Self {
        Self::Unreachable { host: host.into() }
    }

    pub fn transport(model: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Transport {
            model: model.into(),
            cause: cause.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns true if the backend could not be reached at all.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}
