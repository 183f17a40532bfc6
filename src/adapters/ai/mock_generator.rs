//! Mock Text Generator for testing.
//!
//! Provides a scripted implementation of the TextGenerator port, allowing
//! tests to run without a model server.
//!
//! # Features
//!
//! - Pre-configured token sequences, consumed in order
//! - Failures injected before or after some text
//! - Per-token delays for cancellation testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let generator = MockTextGenerator::new()
//!     .with_tokens(["Hello, ", "world!"])
//!     .with_failure_after(["a", "b"], GenerationError::backend("boom"));
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    BackendInfo, GenerationError, GenerationRequest, TextGenerator, Token, TokenStream,
};

/// A scripted reply: text fragments, optionally followed by a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockScript {
    pub fragments: Vec<String>,
    pub failure: Option<GenerationError>,
}

impl MockScript {
    fn tokens(&self) -> Vec<Token> {
        let mut tokens: Vec<Token> = self.fragments.iter().cloned().map(Token::Text).collect();
        if let Some(err) = &self.failure {
            tokens.push(Token::from(err.clone()));
        }
        tokens
    }
}

/// Mock text generator for testing.
#[derive(Debug, Clone)]
pub struct MockTextGenerator {
    scripts: Arc<Mutex<VecDeque<MockScript>>>,
    info: BackendInfo,
    token_delay: Duration,
    calls: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl Default for MockTextGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTextGenerator {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(VecDeque::new())),
            info: BackendInfo::new("mock", "mock://local", "mock-model"),
            token_delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply made of `fragments`.
    pub fn with_tokens<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockScript {
            fragments: fragments.into_iter().map(Into::into).collect(),
            failure: None,
        })
    }

    /// Queues a reply that streams `fragments` and then fails.
    pub fn with_failure_after<I, S>(self, fragments: I, failure: GenerationError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockScript {
            fragments: fragments.into_iter().map(Into::into).collect(),
            failure: Some(failure),
        })
    }

    /// Queues a reply that fails before any text.
    pub fn with_failure(self, failure: GenerationError) -> Self {
        self.with_failure_after(Vec::<String>::new(), failure)
    }

    /// Sleeps before every streamed token.
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = delay;
        self
    }

    pub fn with_backend_info(mut self, info: BackendInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of requests made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded requests.
    pub fn get_calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the number of queued replies not yet used.
    pub fn remaining_scripts(&self) -> usize {
        self.scripts.lock().unwrap().len()
    }

    fn push(self, script: MockScript) -> Self {
        self.scripts.lock().unwrap().push_back(script);
        self
    }

    fn record(&self, request: GenerationRequest) -> MockScript {
        self.calls.lock().unwrap().push(request);
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockScript {
                fragments: vec!["Mock response".to_string()],
                failure: None,
            })
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn stream(&self, request: GenerationRequest) -> TokenStream {
        let script = self.record(request);
        let delay = self.token_delay;
        let tokens = stream::iter(script.tokens()).then(move |token| async move {
            if !delay.is_zero() {
                sleep(delay).await;
            }
            token
        });
        Box::pin(tokens)
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let script = self.record(request);
        match script.failure {
            Some(err) => Err(err),
            None => Ok(script.fragments.concat()),
        }
    }

    fn backend_info(&self) -> BackendInfo {
        self.info.clone()
    }
}
