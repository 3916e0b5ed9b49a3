//! Test-only mock LLM provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message};

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    received: Arc<Mutex<Vec<Vec<Message>>>>,
    chat_calls: Arc<AtomicUsize>,
    pub default_response: String,
    /// Returned for every text when `keywords` is empty.
    pub embedding: Vec<f32>,
    /// When set, embeddings count keyword occurrences, one dimension per keyword.
    pub keywords: Vec<String>,
    pub supports_embeddings: bool,
    pub fail_chat: bool,
    pub fail_embed: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            received: Arc::new(Mutex::new(Vec::new())),
            chat_calls: Arc::new(AtomicUsize::new(0)),
            default_response: "mock response".into(),
            embedding: vec![0.1, 0.2, 0.3, 0.4],
            keywords: Vec::new(),
            supports_embeddings: true,
            fail_chat: false,
            fail_embed: false,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    /// Number of `chat` calls made so far, across clones.
    #[must_use]
    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    /// Message lists passed to `chat`, oldest first.
    #[must_use]
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received.lock().unwrap().clone()
    }

    #[allow(clippy::cast_precision_loss)]
    fn keyword_vector(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| lower.matches(k.as_str()).count() as f32)
            .collect();
        // keeps texts without any keyword off the zero vector
        vector.push(0.01);
        vector
    }
}

impl LlmProvider for MockProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(messages.to_vec());
        if self.fail_chat {
            return Err(LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if !self.supports_embeddings {
            return Err(LlmError::EmbedUnsupported { provider: "mock" });
        }
        if self.fail_embed {
            return Err(LlmError::Other("mock embed error".into()));
        }
        if self.keywords.is_empty() {
            Ok(self.embedding.clone())
        } else {
            Ok(self.keyword_vector(text))
        }
    }

    fn supports_embeddings(&self) -> bool {
        self.supports_embeddings
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}
