//! API request and response types

use crate::conversation::prompts::QuickPrompt;
use crate::db::Theme;
use crate::quiz::QuestionType;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response for chat action. Blank text, or text sent while a reply is
/// still streaming, is not accepted.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub accepted: bool,
}

/// Request to clear the conversation
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// Response with the quick prompt catalogue
#[derive(Debug, Serialize)]
pub struct QuickPromptsResponse {
    pub prompts: &'static [QuickPrompt],
}

/// Quiz setup form as submitted
#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    pub count: u32,
}

/// Option chosen for the current question
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub index: usize,
}

/// Theme preference, both directions
#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
