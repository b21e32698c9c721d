//! Mock AI Provider for testing.
//!
//! Replies are queued up front and consumed in order, one per call. Streaming
//! calls split the queued text into word-sized increments (whitespace kept,
//! so the increments concatenate back to the exact reply) or use explicit
//! chunk lists when a test needs control over where the boundaries fall.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("What platform are you targeting?")
//!     .with_chunks(["Great. ", "@FINAL", "_QUERY: Build an iOS app"]);
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, StreamChunk, TokenUsage,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Whole reply; streamed word by word.
    Success { content: String },
    /// Reply streamed with exactly these increments.
    Chunks(Vec<String>),
    /// Streams these increments, then fails mid-stream.
    BrokenStream { chunks: Vec<String>, error: MockError },
    /// Fails before producing anything.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
    ContentFiltered { reason: String },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a whole reply.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
        })
    }

    /// Queues a reply with explicit stream increments.
    pub fn with_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::Chunks(
            chunks.into_iter().map(Into::into).collect(),
        ))
    }

    /// Queues a stream that fails after the given increments.
    pub fn with_broken_stream<I, S>(self, chunks: I, error: MockError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::BrokenStream {
            chunks: chunks.into_iter().map(Into::into).collect(),
            error,
        })
    }

    /// Queues an error.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    fn push(self, response: MockResponse) -> Self {
        lock(&self.responses).push_back(response);
        self
    }

    /// Records the call and returns the next queued response.
    async fn next_response(&self, request: CompletionRequest) -> MockResponse {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
            })
    }
}

/// Locks a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Splits text into word-sized increments that concatenate back to it.
fn word_chunks(content: &str) -> Vec<String> {
    content.split_inclusive(' ').map(str::to_string).collect()
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let content = match self.next_response(request).await {
            MockResponse::Success { content } => content,
            MockResponse::Chunks(chunks) => chunks.concat(),
            MockResponse::BrokenStream { error, .. } | MockResponse::Error(error) => {
                return Err(error.into())
            }
        };

        Ok(CompletionResponse {
            content,
            usage: TokenUsage::new(10, 20),
            model: self.info.model.clone(),
            finish_reason: FinishReason::Stop,
        })
    }

    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        let (chunks, error) = match self.next_response(request).await {
            MockResponse::Success { content } => (word_chunks(&content), None),
            MockResponse::Chunks(chunks) => (chunks, None),
            MockResponse::BrokenStream { chunks, error } => (chunks, Some(error)),
            MockResponse::Error(error) => return Err(error.into()),
        };

        let content = stream::iter(chunks.into_iter().map(|delta| Ok(StreamChunk::content(delta))));

        match error {
            Some(error) => Ok(Box::pin(
                content.chain(stream::once(async move { Err(AIError::from(error)) })),
            )),
            None => Ok(Box::pin(content.chain(stream::once(async {
                Ok(StreamChunk::final_chunk(
                    FinishReason::Stop,
                    Some(TokenUsage::new(10, 20)),
                ))
            })))),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
