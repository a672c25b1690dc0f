//! Common types for LLM interactions

use super::LlmError;
use futures::stream::BoxStream;

/// Ordered text fragments of one streamed model reply.
///
/// Finite: ends after the last fragment, or yields a single `Err` and ends.
pub type FragmentStream = BoxStream<'static, Result<String, LlmError>>;

/// One-shot request for JSON output constrained by a response schema
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub prompt: String,
    /// Schema in the provider's OpenAPI subset
    pub schema: serde_json::Value,
    pub temperature: Option<f32>,
}

impl StructuredRequest {
    pub fn new(prompt: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            prompt: prompt.into(),
            schema,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}
