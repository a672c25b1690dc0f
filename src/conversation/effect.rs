//! Effects produced by state transitions

use super::message::{Message, MessageId};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append an entry to the log
    AppendMessage(Message),

    /// Concatenate a fragment onto an in-flight reply
    AppendFragment { message_id: MessageId, text: String },

    /// Turn an in-flight reply into an error bubble
    MarkFailed { message_id: MessageId, text: String },

    /// Discard the log, leaving only the greeting
    ReplaceLog { greeting: Message },

    /// Send the utterance through the current chat session and stream the
    /// reply back as events tagged with `reply_id`
    OpenStream { reply_id: MessageId, utterance: String },

    /// Drop the chat session and start a new one
    ResetSession { system_instruction: String },

    /// Stop forwarding fragments of the outstanding stream
    CancelStream,
}

impl Effect {
    pub fn fragment(message_id: &MessageId, text: impl Into<String>) -> Self {
        Effect::AppendFragment {
            message_id: message_id.clone(),
            text: text.into(),
        }
    }
}
