//! Events that drive the quiz

use super::config::QuizConfig;
use crate::llm::LlmError;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum Event {
    // User events
    OpenConfig,
    StartQuiz { config: QuizConfig, request_id: Uuid },
    SelectOption { index: usize },
    Advance,
    Close,

    // Generation outcome; `Ok(None)` means no text came back
    GenerationFinished {
        request_id: Uuid,
        outcome: Result<Option<String>, LlmError>,
    },
}

impl Event {
    pub fn start_quiz(config: QuizConfig) -> Self {
        Event::StartQuiz {
            config,
            request_id: Uuid::new_v4(),
        }
    }
}
