//! LLM provider abstraction
//!
//! The hosted model is an external collaborator: a stateful chat session
//! that streams reply fragments, plus one-shot structured generation.

mod error;
mod gemini;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiService;
pub use types::*;

use crate::config::LlmConfig;
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Open a fresh chat session seeded with a system instruction.
    ///
    /// Each call returns an independent handle; dropping a handle discards
    /// the context it accumulated.
    fn start_chat(&self, system_instruction: &str) -> Arc<dyn ChatSession>;

    /// Generate JSON text constrained by a schema. `Ok(None)` means the
    /// provider answered without any text.
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// A chat context held by the provider side. Callers send only the new
/// utterance; history is carried by the session.
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Send one user utterance and stream the reply
    async fn send_message_stream(&self, utterance: &str) -> Result<FragmentStream, LlmError>;
}

/// Build the configured provider, wrapped with logging
pub fn from_config(config: &LlmConfig) -> Arc<dyn LlmService> {
    let gemini = GeminiService::new(
        config.api_key.clone().unwrap_or_default(),
        config.model.clone(),
        config.gateway.as_deref(),
    );
    Arc::new(LoggingService::new(Arc::new(gemini)))
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    fn start_chat(&self, system_instruction: &str) -> Arc<dyn ChatSession> {
        tracing::debug!(model = %self.model_id, "Starting chat session");
        Arc::new(LoggingChatSession {
            inner: self.inner.start_chat(system_instruction),
            model_id: self.model_id.clone(),
        })
    }

    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, LlmError> {
        let start = Instant::now();
        let result = self.inner.generate_structured(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(text) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    response_bytes = text.as_ref().map_or(0, String::len),
                    "Structured generation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "Structured generation failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

struct LoggingChatSession {
    inner: Arc<dyn ChatSession>,
    model_id: String,
}

#[async_trait]
impl ChatSession for LoggingChatSession {
    async fn send_message_stream(&self, utterance: &str) -> Result<FragmentStream, LlmError> {
        let start = Instant::now();
        match self.inner.send_message_stream(utterance).await {
            Ok(stream) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    "Chat stream opened"
                );
                let model_id = self.model_id.clone();
                let mut fragments = 0usize;
                Ok(stream
                    .inspect(move |item| match item {
                        Ok(_) => fragments += 1,
                        Err(e) => tracing::error!(
                            model = %model_id,
                            fragments,
                            error = %e.message,
                            retryable = e.kind.is_retryable(),
                            "Chat stream failed"
                        ),
                    })
                    .boxed())
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "Chat request failed"
                );
                Err(e)
            }
        }
    }
}
