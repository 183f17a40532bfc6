//! Ollama Generator - Implementation of TextGenerator for a local Ollama server.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OllamaConfig::new()
//!     .with_host("http://localhost:11434")
//!     .with_model("gemma3:1b");
//!
//! let generator = OllamaGenerator::new(config);
//! ```
//!
//! # Streaming
//!
//! `/api/generate` answers with newline-delimited JSON. Each line carries an
//! optional `response` fragment, an optional `error`, and a `done` flag. Lines
//! are decoded as bytes arrive, so a fragment split across network reads is
//! reassembled before parsing.
//!
//! # Connection
//!
//! The HTTP client is created on first use, after a `GET /api/tags` probe
//! succeeds, and reused for the life of the generator. A failed probe is not
//! remembered: the next call probes again.

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::ports::{
    BackendInfo, GenerationError, GenerationRequest, TextGenerator, Token, TokenStream,
};

/// Configuration for the Ollama generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub host: String,
    /// Model to run (e.g., "gemma3:1b").
    pub model: String,
    /// Deadline for a whole request, including the streamed body.
    pub timeout: Duration,
    /// Deadline for establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaConfig {
    /// Creates a configuration for a local server with the default model.
    pub fn new() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            model: "gemma3:1b".to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the server address.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the request deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect deadline.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.host.trim_end_matches('/'), path)
    }
}

/// Ollama-backed text generator.
///
/// Cheap to clone; clones share the same HTTP client.
#[derive(Clone)]
pub struct OllamaGenerator {
    inner: Arc<OllamaInner>,
}

struct OllamaInner {
    config: OllamaConfig,
    client: OnceCell<Client>,
}

impl OllamaGenerator {
    /// Creates a generator. No connection is made until the first request.
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            inner: Arc::new(OllamaInner {
                config,
                client: OnceCell::new(),
            }),
        }
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.inner.config
    }

    /// Returns true once a probe has succeeded and the client is cached.
    pub fn is_connected(&self) -> bool {
        self.inner.client.initialized()
    }
}

impl OllamaInner {
    /// Returns the shared client, probing the server first if there is none yet.
    async fn client(&self) -> Result<Client, GenerationError> {
        self.client
            .get_or_try_init(|| self.connect())
            .await
            .map(Client::clone)
    }

    async fn connect(&self) -> Result<Client, GenerationError> {
        let client = Client::builder()
            .timeout(self.config.timeout)
            .connect_timeout(self.config.connect_timeout)
            .build()
            .map_err(|e| GenerationError::transport(&self.config.model, e.to_string()))?;

        debug!(host = %self.config.host, "Probing generation backend");
        let response = client
            .get(self.config.endpoint("api/tags"))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::transport(
                &self.config.model,
                format!("reachability probe answered {}", status),
            ));
        }

        info!(host = %self.config.host, model = %self.config.model, "Connected to generation backend");
        Ok(client)
    }

    /// Maps a transport error onto the user-facing error kinds.
    fn classify(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout {
                model: self.config.model.clone(),
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if err.is_connect() {
            GenerationError::unreachable(&self.config.host)
        } else {
            GenerationError::transport(&self.config.model, err.to_string())
        }
    }

    fn request_body<'a>(&'a self, request: &'a GenerationRequest, stream: bool) -> OllamaRequest<'a> {
        OllamaRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            stream,
            options: OllamaOptions {
                num_predict: request.max_tokens,
            },
        }
    }

    async fn send(&self, request: &GenerationRequest, stream: bool) -> Result<Response, GenerationError> {
        let client = self.client().await?;
        let response = client
            .post(self.config.endpoint("api/generate"))
            .json(&self.request_body(request, stream))
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        self.check_status(response).await
    }

    /// Turns an error status into an error, preferring the server's own message.
    async fn check_status(&self, response: Response) -> Result<Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<GenerateChunk>(&body) {
            Ok(GenerateChunk {
                error: Some(message),
                ..
            }) => Err(GenerationError::backend(message)),
            _ => Err(GenerationError::transport(
                &self.config.model,
                format!("unexpected status {}", status),
            )),
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn stream(&self, request: GenerationRequest) -> TokenStream {
        let start = StreamPhase::Connect {
            inner: Arc::clone(&self.inner),
            request,
        };
        Box::pin(stream::unfold(start, StreamPhase::next))
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let inner = &self.inner;
        debug!(model = %inner.config.model, max_tokens = request.max_tokens, "Requesting completion");
        let response = inner.send(&request, false).await?;
        let chunk: GenerateChunk = response
            .json()
            .await
            .map_err(|e| inner.classify(e))?;

        match chunk {
            GenerateChunk {
                error: Some(message),
                ..
            } => Err(GenerationError::backend(message)),
            chunk => Ok(chunk.response.unwrap_or_default()),
        }
    }

    fn backend_info(&self) -> BackendInfo {
        BackendInfo::new("ollama", &self.inner.config.host, &self.inner.config.model)
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, reqwest::Error>> + Send>>;

/// Where a token stream is in its life.
enum StreamPhase {
    Connect {
        inner: Arc<OllamaInner>,
        request: GenerationRequest,
    },
    Read(NdjsonReader),
    Done,
}

impl StreamPhase {
    async fn next(self) -> Option<(Token, StreamPhase)> {
        match self {
            StreamPhase::Connect { inner, request } => {
                debug!(
                    model = %inner.config.model,
                    max_tokens = request.max_tokens,
                    task = ?request.task,
                    "Starting generation stream"
                );
                match inner.send(&request, true).await {
                    Ok(response) => NdjsonReader::new(inner, response).next_token().await,
                    Err(err) => {
                        warn!(error = %err, "Generation stream failed to start");
                        Some((Token::from(err), StreamPhase::Done))
                    }
                }
            }
            StreamPhase::Read(reader) => reader.next_token().await,
            StreamPhase::Done => None,
        }
    }
}

/// Pulls bytes off a streaming response and hands out tokens one at a time.
struct NdjsonReader {
    inner: Arc<OllamaInner>,
    body: ByteStream,
    decoder: ChunkDecoder,
    ready: VecDeque<Token>,
}

impl NdjsonReader {
    fn new(inner: Arc<OllamaInner>, response: Response) -> Self {
        let model = inner.config.model.clone();
        Self {
            inner,
            body: Box::pin(response.bytes_stream().map(|chunk| chunk.map(|bytes| bytes.to_vec()))),
            decoder: ChunkDecoder::new(model),
            ready: VecDeque::new(),
        }
    }

    async fn next_token(mut self) -> Option<(Token, StreamPhase)> {
        loop {
            if let Some(token) = self.ready.pop_front() {
                if let Token::Error(message) = &token {
                    warn!(error = %message, "Generation stream ended with an error");
                    return Some((token, StreamPhase::Done));
                }
                return Some((token, StreamPhase::Read(self)));
            }
            if self.decoder.is_finished() {
                return None;
            }
            match self.body.next().await {
                Some(Ok(bytes)) => self.ready.extend(self.decoder.feed(&bytes)),
                Some(Err(err)) => self.ready.push_back(self.inner.classify(err).into()),
                None => {
                    self.ready.extend(self.decoder.finish());
                    if self.ready.is_empty() {
                        return None;
                    }
                }
            }
        }
    }
}

/// Splits NDJSON bytes into lines and lines into tokens.
///
/// Stops producing once a line reports `done` or an error.
#[derive(Debug)]
struct ChunkDecoder {
    model: String,
    buffer: Vec<u8>,
    finished: bool,
}

impl ChunkDecoder {
    fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            buffer: Vec::new(),
            finished: false,
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decodes every complete line in `bytes` plus whatever was buffered.
    fn feed(&mut self, bytes: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::new();
        if self.finished {
            return tokens;
        }
        self.buffer.extend_from_slice(bytes);
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.decode_line(&line, &mut tokens);
            if self.finished {
                self.buffer.clear();
                break;
            }
        }
        tokens
    }

    /// Decodes a trailing line that had no newline.
    fn finish(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        if !self.finished {
            let line = std::mem::take(&mut self.buffer);
            self.decode_line(&line, &mut tokens);
            self.finished = true;
        }
        tokens
    }

    fn decode_line(&mut self, line: &[u8], tokens: &mut Vec<Token>) {
        let line = String::from_utf8_lossy(line);
        match parse_ndjson_line(&line) {
            Ok(None) => {}
            Ok(Some(chunk)) => {
                if let Some(message) = chunk.error {
                    tokens.push(GenerationError::backend(message).into());
                    self.finished = true;
                    return;
                }
                if let Some(text) = chunk.response.filter(|t| !t.is_empty()) {
                    tokens.push(Token::Text(text));
                }
                if chunk.done {
                    self.finished = true;
                }
            }
            Err(e) => {
                tokens.push(
                    GenerationError::transport(&self.model, format!("malformed response chunk: {}", e))
                        .into(),
                );
                self.finished = true;
            }
        }
    }
}

/// Parses one NDJSON line. Blank lines yield `None`.
fn parse_ndjson_line(line: &str) -> Result<Option<GenerateChunk>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

// ----- Ollama API Types -----

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
struct GenerateChunk {
    response: Option<String>,
    error: Option<String>,
    #[serde(default)]
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_works() {
        let config = OllamaConfig::new()
            .with_host("http://gpu-box:11434/")
            .with_model("llama3")
            .with_timeout(Duration::from_secs(30))
            .with_connect_timeout(Duration::from_secs(2));

        assert_eq!(config.model, "llama3");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.endpoint("api/generate"), "http://gpu-box:11434/api/generate");
    }

    #[test]
    fn config_defaults_target_local_server() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost:11434");
        assert_eq!(config.model, "gemma3:1b");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn backend_info_reports_host_and_model() {
        let generator = OllamaGenerator::new(OllamaConfig::new());
        let info = generator.backend_info();
        assert_eq!(info.name, "ollama");
        assert_eq!(info.host, "http://localhost:11434");
        assert_eq!(info.model, "gemma3:1b");
    }

    #[test]
    fn new_generator_is_not_connected() {
        let generator = OllamaGenerator::new(OllamaConfig::new());
        assert!(!generator.is_connected());
    }

    #[test]
    fn request_body_matches_api() {
        let generator = OllamaGenerator::new(OllamaConfig::new());
        let request = GenerationRequest::new("Halo", 42);
        let body = serde_json::to_value(generator.inner.request_body(&request, true)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "gemma3:1b",
                "prompt": "Halo",
                "stream": true,
                "options": { "num_predict": 42 }
            })
        );
    }

    mod parsing {
        use super::*;

        #[test]
        fn parses_response_fragment() {
            let chunk = parse_ndjson_line(r#"{"model":"gemma3:1b","response":"Halo","done":false}"#)
                .unwrap()
                .unwrap();
            assert_eq!(chunk.response.as_deref(), Some("Halo"));
            assert!(!chunk.done);
        }

        #[test]
        fn parses_error_line() {
            let chunk = parse_ndjson_line(r#"{"error":"model 'x' not found"}"#).unwrap().unwrap();
            assert_eq!(chunk.error.as_deref(), Some("model 'x' not found"));
        }

        #[test]
        fn blank_line_is_skipped() {
            assert_eq!(parse_ndjson_line("  \r").unwrap(), None);
        }

        #[test]
        fn garbage_is_an_error() {
            assert!(parse_ndjson_line("not json").is_err());
        }
    }

    mod decoding {
        use super::*;

        fn decoder() -> ChunkDecoder {
            ChunkDecoder::new("gemma3:1b")
        }

        #[test]
        fn yields_one_token_per_line_in_order() {
            let mut decoder = decoder();
            let tokens = decoder.feed(
                b"{\"response\":\"Hello, \"}\n{\"response\":\"world!\"}\n{\"response\":\"\",\"done\":true}\n",
            );
            assert_eq!(tokens, vec![Token::text("Hello, "), Token::text("world!")]);
            assert!(decoder.is_finished());
        }

        #[test]
        fn reassembles_lines_split_across_reads() {
            let mut decoder = decoder();
            assert!(decoder.feed(b"{\"respo").is_empty());
            assert_eq!(decoder.feed(b"nse\":\"ab\"}\n"), vec![Token::text("ab")]);
        }

        #[test]
        fn reassembles_multibyte_characters_split_across_reads() {
            let mut decoder = decoder();
            let line = "{\"response\":\"é\"}\n".as_bytes();
            let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
            assert!(decoder.feed(&line[..split]).is_empty());
            assert_eq!(decoder.feed(&line[split..]), vec![Token::text("é")]);
        }

        #[test]
        fn error_line_ends_stream_and_drops_rest() {
            let mut decoder = decoder();
            let tokens = decoder.feed(
                b"{\"response\":\"a\"}\n{\"error\":\"out of memory\"}\n{\"response\":\"b\"}\n",
            );
            assert_eq!(
                tokens,
                vec![
                    Token::text("a"),
                    Token::error("Backend reported an error: out of memory")
                ]
            );
            assert!(decoder.is_finished());
            assert!(decoder.feed(b"{\"response\":\"c\"}\n").is_empty());
        }

        #[test]
        fn malformed_line_becomes_transport_error() {
            let mut decoder = decoder();
            let tokens = decoder.feed(b"<html>\n");
            assert_eq!(tokens.len(), 1);
            match &tokens[0] {
                Token::Error(message) => assert!(message.starts_with(
                    "Error while talking to the generation backend (gemma3:1b): malformed response chunk"
                )),
                other => panic!("expected error token, got {:?}", other),
            }
        }

        #[test]
        fn finish_decodes_trailing_line_without_newline() {
            let mut decoder = decoder();
            assert!(decoder.feed(b"{\"response\":\"tail\"}").is_empty());
            assert_eq!(decoder.finish(), vec![Token::text("tail")]);
            assert!(decoder.finish().is_empty());
        }

        #[test]
        fn empty_fragments_are_not_tokens() {
            let mut decoder = decoder();
            assert!(decoder.feed(b"{\"response\":\"\"}\n\n").is_empty());
            assert!(!decoder.is_finished());
        }
    }

    #[tokio::test]
    async fn unreachable_backend_yields_single_error_token() {
        let generator = OllamaGenerator::new(
            OllamaConfig::new()
                .with_host("http://127.0.0.1:1")
                .with_connect_timeout(Duration::from_secs(2)),
        );

        let tokens: Vec<Token> = generator.stream(GenerationRequest::new("Halo", 5)).collect().await;

        assert_eq!(
            tokens,
            vec![Token::error(
                "Error: cannot reach the generation backend at http://127.0.0.1:1. Is it running?"
            )]
        );
        assert!(!generator.is_connected());
    }

    #[tokio::test]
    async fn unreachable_backend_fails_generate() {
        let generator = OllamaGenerator::new(OllamaConfig::new().with_host("http://127.0.0.1:1"));

        let err = generator.generate(GenerationRequest::new("Halo", 5)).await.unwrap_err();

        assert!(err.is_connection_failure());
    }
}
