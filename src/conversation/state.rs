//! Conversation state types

use super::message::MessageId;
use super::prompts::{RESET_GREETING, RESET_SYSTEM_INSTRUCTION, STREAM_ERROR_TEXT};
use serde::{Deserialize, Serialize};

/// Conversation state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for user input, no request outstanding
    #[default]
    Idle,

    /// A reply is streaming into the placeholder `reply_id`
    AwaitingResponse { reply_id: MessageId },
}

impl ConvState {
    /// Check if a request is outstanding
    pub fn is_awaiting(&self) -> bool {
        matches!(self, ConvState::AwaitingResponse { .. })
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    /// Text that replaces a reply whose stream failed
    pub error_text: String,
    /// Greeting that seeds the log after a reset
    pub reset_greeting: String,
    /// Persona for sessions created by a reset
    pub reset_instruction: String,
}

impl Default for ConvContext {
    fn default() -> Self {
        Self {
            error_text: STREAM_ERROR_TEXT.to_string(),
            reset_greeting: RESET_GREETING.to_string(),
            reset_instruction: RESET_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}
