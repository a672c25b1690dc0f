//! Pure state transition function

use super::message::Message;
use super::prompts::RESET_CONFIRMATION;
use super::{ConvContext, ConvState, Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// The event changes nothing
    pub fn unchanged(state: &ConvState) -> Self {
        Self::new(state.clone())
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{}", RESET_CONFIRMATION)]
    ConfirmationRequired,
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
/// Submissions while a reply is outstanding, blank submissions, and stream
/// events for any reply other than the in-flight one are no-ops.
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Idle + UserMessage -> AwaitingResponse
        (ConvState::Idle, Event::UserMessage { text, turn, at }) => {
            let utterance = text.trim();
            if utterance.is_empty() {
                return Ok(TransitionResult::unchanged(state));
            }

            Ok(TransitionResult::new(ConvState::AwaitingResponse {
                reply_id: turn.reply.clone(),
            })
            .with_effects([
                Effect::AppendMessage(Message::user(turn.user, utterance, at)),
                Effect::AppendMessage(Message::placeholder(turn.reply.clone(), at)),
                Effect::OpenStream {
                    reply_id: turn.reply,
                    utterance: utterance.to_string(),
                },
            ]))
        }

        // Busy + UserMessage -> ignored
        (ConvState::AwaitingResponse { .. }, Event::UserMessage { .. }) => {
            Ok(TransitionResult::unchanged(state))
        }

        // ============================================================
        // Streaming
        // ============================================================

        (ConvState::AwaitingResponse { reply_id }, Event::Fragment { reply_id: from, text })
            if *reply_id == from =>
        {
            Ok(TransitionResult::unchanged(state).with_effect(Effect::fragment(reply_id, text)))
        }

        (ConvState::AwaitingResponse { reply_id }, Event::StreamComplete { reply_id: from })
            if *reply_id == from =>
        {
            Ok(TransitionResult::new(ConvState::Idle))
        }

        (ConvState::AwaitingResponse { reply_id }, Event::StreamFailed { reply_id: from, .. })
            if *reply_id == from =>
        {
            Ok(TransitionResult::new(ConvState::Idle).with_effect(Effect::MarkFailed {
                message_id: from,
                text: context.error_text.clone(),
            }))
        }

        // Events from a stream that is no longer current
        (
            _,
            Event::Fragment { .. } | Event::StreamComplete { .. } | Event::StreamFailed { .. },
        ) => Ok(TransitionResult::unchanged(state)),

        // ============================================================
        // Reset
        // ============================================================

        (_, Event::Reset { confirmed: false, .. }) => Err(TransitionError::ConfirmationRequired),

        (_, Event::Reset { confirmed: true, greeting_id, at }) => {
            let cancel = state.is_awaiting().then_some(Effect::CancelStream);
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effects(cancel)
                .with_effect(Effect::ResetSession {
                    system_instruction: context.reset_instruction.clone(),
                })
                .with_effect(Effect::ReplaceLog {
                    greeting: Message::model(greeting_id, context.reset_greeting.clone(), at),
                }))
        }
    }
}
