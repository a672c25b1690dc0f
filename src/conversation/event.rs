//! Events that can occur in a conversation

use super::message::MessageId;
use crate::llm::LlmErrorKind;
use chrono::{DateTime, Utc};

/// Ids minted for one user turn: the user entry and its reply placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnIds {
    pub user: MessageId,
    pub reply: MessageId,
}

impl TurnIds {
    pub fn fresh() -> Self {
        Self {
            user: MessageId::new(),
            reply: MessageId::new(),
        }
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
        turn: TurnIds,
        at: DateTime<Utc>,
    },
    Reset {
        confirmed: bool,
        greeting_id: MessageId,
        at: DateTime<Utc>,
    },

    // Stream events, tagged with the reply they belong to
    Fragment {
        reply_id: MessageId,
        text: String,
    },
    StreamComplete {
        reply_id: MessageId,
    },
    StreamFailed {
        reply_id: MessageId,
        message: String,
        error_kind: LlmErrorKind,
    },
}

impl Event {
    pub fn user_message(text: impl Into<String>) -> Self {
        Event::UserMessage {
            text: text.into(),
            turn: TurnIds::fresh(),
            at: Utc::now(),
        }
    }

    pub fn reset(confirmed: bool) -> Self {
        Event::Reset {
            confirmed,
            greeting_id: MessageId::new(),
            at: Utc::now(),
        }
    }
}
