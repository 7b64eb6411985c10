//! Mock implementations for testing.
//!
//! This module provides a mock LLM client and a mock embedder that can be
//! used across different test files without duplication.

use async_trait::async_trait;
use parking_lot::Mutex;
use scholar::llm::{CompletionRequest, LLMClient};
use scholar::rag::Embedder;
use scholar::types::{AppError, Result};
use std::sync::Arc;

type Responder = dyn Fn(&CompletionRequest, usize) -> Result<String> + Send + Sync;

/// Mock LLM client for testing with configurable responses.
///
/// Every request is recorded so tests can assert on prompts, history and
/// sampling parameters.
///
/// # Examples
///
/// ```ignore
/// // Always the same reply
/// let client = MockLLMClient::new("Hello, world!");
///
/// // Replies in order, the last one repeats
/// let client = MockLLMClient::scripted(&["first", "second"]);
///
/// // Always fails
/// let client = MockLLMClient::failing();
/// ```
#[derive(Clone)]
pub struct MockLLMClient {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLLMClient {
    /// Create a mock client that answers with `responder(request, call_index)`.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest, usize) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        let response = response.to_string();
        Self::with_responder(move |_, _| Ok(response.clone()))
    }

    /// Replies in order; the last reply repeats once the script runs out.
    pub fn scripted(replies: &[&str]) -> Self {
        let replies: Vec<String> = replies.iter().map(|r| r.to_string()).collect();
        Self::with_responder(move |_, i| {
            Ok(replies
                .get(i)
                .or_else(|| replies.last())
                .cloned()
                .unwrap_or_default())
        })
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self::with_responder(|_, _| Err(AppError::LLM("Mock LLM failure".to_string())))
    }

    /// Succeeds with numbered replies until call `n` (0-based), which fails.
    pub fn failing_on_call(n: usize) -> Self {
        Self::with_responder(move |_, i| {
            if i == n {
                Err(AppError::LLM("Mock LLM failure".to_string()))
            } else {
                Ok(format!("reply {}", i + 1))
            }
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let index = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len() - 1
        };
        (self.responder)(request, index)
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Deterministic embedder: counts of a few marker words, plus a small
/// constant so no vector is all zeros.
#[derive(Clone, Default)]
pub struct MockEmbedder {
    calls: Arc<Mutex<usize>>,
}

pub const MARKER_WORDS: [&str; 4] = ["attention", "results", "method", "conclusion"];

fn bag(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    MARKER_WORDS
        .iter()
        .map(|w| lower.matches(w).count() as f32 + 0.01)
        .collect()
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        *self.calls.lock() += 1;
        Ok(texts.iter().map(|t| bag(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        *self.calls.lock() += 1;
        Ok(bag(text))
    }

    fn model_name(&self) -> &str {
        "mock-embedder"
    }
}
