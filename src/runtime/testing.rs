//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use crate::llm::{ChatSession, FragmentStream, LlmError, LlmService, StructuredRequest};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Scripted chat replies
// ============================================================================

/// How the mock answers one utterance
#[derive(Debug, Clone)]
pub struct ScriptedReply {
    fragments: Vec<String>,
    /// Error yielded after the fragments
    failure: Option<LlmError>,
    /// Error returned instead of opening a stream
    refusal: Option<LlmError>,
    /// Pause before each fragment
    delay: Duration,
}

impl ScriptedReply {
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            failure: None,
            refusal: None,
            delay: Duration::ZERO,
        }
    }

    pub fn refuse(error: LlmError) -> Self {
        Self {
            refusal: Some(error),
            ..Self::fragments(Vec::<String>::new())
        }
    }

    pub fn then_fail(mut self, error: LlmError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn into_stream(self) -> FragmentStream {
        let delay = self.delay;
        let items: Vec<Result<String, LlmError>> = self
            .fragments
            .into_iter()
            .map(Ok)
            .chain(self.failure.map(Err))
            .collect();
        futures::stream::iter(items)
            .then(move |item| async move {
                tokio::time::sleep(delay).await;
                item
            })
            .boxed()
    }
}

// ============================================================================
// Mock LLM service
// ============================================================================

#[derive(Default)]
struct Recorded {
    replies: VecDeque<ScriptedReply>,
    generations: VecDeque<Result<Option<String>, LlmError>>,
    system_instructions: Vec<String>,
    utterances: Vec<String>,
    structured_requests: Vec<StructuredRequest>,
}

/// Mock service that answers from queued scripts and records every call
pub struct MockLlmService {
    recorded: Arc<Mutex<Recorded>>,
    stream_started: Arc<Notify>,
    generation_delay: Duration,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            recorded: Arc::new(Mutex::new(Recorded::default())),
            stream_started: Arc::new(Notify::new()),
            generation_delay: Duration::ZERO,
        }
    }

    pub fn with_generation_delay(mut self, delay: Duration) -> Self {
        self.generation_delay = delay;
        self
    }

    /// Queue the reply for the next utterance, whichever session sends it
    pub fn queue_reply(&self, reply: ScriptedReply) {
        self.recorded.lock().unwrap().replies.push_back(reply);
    }

    pub fn queue_generation(&self, outcome: Result<Option<String>, LlmError>) {
        self.recorded.lock().unwrap().generations.push_back(outcome);
    }

    /// Notified once per opened reply stream
    pub fn stream_started(&self) -> Arc<Notify> {
        self.stream_started.clone()
    }

    pub fn system_instructions(&self) -> Vec<String> {
        self.recorded.lock().unwrap().system_instructions.clone()
    }

    pub fn utterances(&self) -> Vec<String> {
        self.recorded.lock().unwrap().utterances.clone()
    }

    pub fn structured_requests(&self) -> Vec<StructuredRequest> {
        self.recorded.lock().unwrap().structured_requests.clone()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    fn start_chat(&self, system_instruction: &str) -> Arc<dyn ChatSession> {
        self.recorded
            .lock()
            .unwrap()
            .system_instructions
            .push(system_instruction.to_string());
        Arc::new(MockChatSession {
            recorded: self.recorded.clone(),
            stream_started: self.stream_started.clone(),
        })
    }

    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, LlmError> {
        let outcome = {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.structured_requests.push(request.clone());
            recorded
                .generations
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::network("No mock generation queued")))
        };
        tokio::time::sleep(self.generation_delay).await;
        outcome
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

struct MockChatSession {
    recorded: Arc<Mutex<Recorded>>,
    stream_started: Arc<Notify>,
}

#[async_trait]
impl ChatSession for MockChatSession {
    async fn send_message_stream(&self, utterance: &str) -> Result<FragmentStream, LlmError> {
        let reply = {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.utterances.push(utterance.to_string());
            recorded
                .replies
                .pop_front()
                .unwrap_or_else(|| ScriptedReply::fragments(["ok"]))
        };
        self.stream_started.notify_one();

        match reply.refusal {
            Some(error) => Err(error),
            None => Ok(reply.into_stream()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Poll until `check` yields a value, failing the test after two seconds
pub async fn wait_for<T>(mut check: impl FnMut() -> Option<T>) -> T {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(value) = check() {
            return value;
        }
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Well-formed four-option quiz data with the given correct answers
pub fn quiz_json(correct: &[i64]) -> String {
    let questions: Vec<_> = correct
        .iter()
        .enumerate()
        .map(|(i, c)| {
            serde_json::json!({
                "question": format!("Câu hỏi số {}", i + 1),
                "options": ["A", "B", "C", "D"],
                "correctAnswerIndex": c,
                "explanation": "Giải thích."
            })
        })
        .collect();
    serde_json::Value::Array(questions).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_reply_streams_in_order() {
        let mock = MockLlmService::new();
        mock.queue_reply(ScriptedReply::fragments(["a", "b"]).then_fail(LlmError::network("x")));
        let session = mock.start_chat("persona");

        let items: Vec<_> = session.send_message_stream("hi").await.unwrap().collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_deref().unwrap(), "a");
        assert!(items[2].is_err());
        assert_eq!(mock.utterances(), vec!["hi".to_string()]);
    }

    #[tokio::test]
    async fn test_unqueued_generation_fails() {
        let mock = MockLlmService::new();
        let request = StructuredRequest::new("p", serde_json::json!({}));
        assert!(mock.generate_structured(&request).await.is_err());
        assert_eq!(mock.structured_requests().len(), 1);
    }
}
