//! Conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the log and the chat session are only touched by the runtime when it
//! executes the effects a transition returns.

mod effect;
pub mod event;
pub mod message;
pub mod prompts;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use message::{ConversationLog, LogChange, Message, MessageId, Role};
pub use state::{ConvContext, ConvState};
pub use transition::{transition, TransitionError};

use chrono::Utc;

/// The log shown at startup: the advisor's welcome message
pub fn initial_log() -> ConversationLog {
    ConversationLog::with_greeting(Message::model(
        MessageId::from(prompts::WELCOME_ID),
        prompts::WELCOME_MESSAGE,
        Utc::now(),
    ))
}
