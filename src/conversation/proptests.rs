//! Property-based tests for the conversation state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::event::TurnIds;
use super::*;
use crate::llm::LlmErrorKind;
use chrono::Utc;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    state: ConvState,
    log: ConversationLog,
    context: ConvContext,
}

impl Harness {
    fn new() -> Self {
        Self {
            state: ConvState::Idle,
            log: initial_log(),
            context: ConvContext::default(),
        }
    }

    fn send(&mut self, event: Event) -> Vec<Effect> {
        let result = transition(&self.state, &self.context, event).unwrap();
        for effect in &result.effects {
            self.log.apply(effect);
        }
        self.state = result.new_state;
        result.effects
    }

    /// Submit and return the placeholder id
    fn submit(&mut self, text: &str) -> MessageId {
        let turn = TurnIds::fresh();
        let reply = turn.reply.clone();
        self.send(Event::UserMessage {
            text: text.to_string(),
            turn,
            at: Utc::now(),
        });
        reply
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_utterance() -> impl Strategy<Value = String> {
    "[ \t]{0,3}[a-zA-Zàáạảãâầấậẩẫăằắặẳẵđèéẹẻẽ?!0-9][a-zA-Z0-9 àáđ?]{0,40}[ \n]{0,2}"
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::Unknown),
    ]
}

/// Split text into arbitrary consecutive pieces (by char)
fn arb_split(text: String) -> impl Strategy<Value = Vec<String>> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    proptest::collection::vec(any::<bool>(), len).prop_map(move |cuts| {
        let mut pieces = Vec::new();
        let mut current = String::new();
        for (c, cut) in chars.iter().zip(cuts) {
            current.push(*c);
            if cut {
                pieces.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            pieces.push(current);
        }
        pieces
    })
}

fn arb_reply_and_split() -> impl Strategy<Value = (String, Vec<String>)> {
    "[a-zA-Z àâđêôơưạ.,!]{0,60}"
        .prop_flat_map(|reply| (Just(reply.clone()), arb_split(reply)))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_idle_submit_appends_user_then_placeholder(text in arb_utterance()) {
        let mut h = Harness::new();
        let before = h.log.len();
        let reply = h.submit(&text);

        prop_assert_eq!(h.log.len(), before + 2);
        let user = &h.log.messages()[before];
        let model = &h.log.messages()[before + 1];
        prop_assert_eq!(user.role, Role::User);
        prop_assert_eq!(user.text.as_str(), text.trim());
        prop_assert_eq!(model.role, Role::Model);
        prop_assert_eq!(&model.id, &reply);
        prop_assert!(model.text.is_empty());
        prop_assert!(h.state.is_awaiting());
    }

    #[test]
    fn prop_blank_submit_is_noop(text in arb_blank()) {
        let mut h = Harness::new();
        let effects = h.send(Event::user_message(text));
        prop_assert!(effects.is_empty());
        prop_assert_eq!(h.log.len(), 1);
        prop_assert_eq!(&h.state, &ConvState::Idle);
    }

    #[test]
    fn prop_submit_while_awaiting_is_noop(first in arb_utterance(), second in arb_utterance()) {
        let mut h = Harness::new();
        h.submit(&first);
        let len = h.log.len();
        let state = h.state.clone();

        let effects = h.send(Event::user_message(second));
        prop_assert!(effects.is_empty());
        prop_assert_eq!(h.log.len(), len);
        prop_assert_eq!(&h.state, &state);
    }

    #[test]
    fn prop_fragments_concatenate_regardless_of_granularity(
        (reply_text, pieces) in arb_reply_and_split()
    ) {
        let mut h = Harness::new();
        let reply = h.submit("hỏi");
        for piece in pieces {
            h.send(Event::Fragment { reply_id: reply.clone(), text: piece });
        }
        h.send(Event::StreamComplete { reply_id: reply.clone() });

        prop_assert_eq!(&h.state, &ConvState::Idle);
        prop_assert_eq!(h.log.get(&reply).unwrap().text.as_str(), reply_text.as_str());
    }

    #[test]
    fn prop_failure_always_returns_to_idle(
        pieces in proptest::collection::vec("[a-z ]{0,8}", 0..5),
        kind in arb_error_kind(),
    ) {
        let mut h = Harness::new();
        let reply = h.submit("hỏi");
        for piece in pieces {
            h.send(Event::Fragment { reply_id: reply.clone(), text: piece });
        }
        h.send(Event::StreamFailed {
            reply_id: reply.clone(),
            message: "boom".to_string(),
            error_kind: kind,
        });

        prop_assert_eq!(&h.state, &ConvState::Idle);
        let message = h.log.get(&reply).unwrap();
        prop_assert!(message.is_error);
        prop_assert_eq!(message.text.as_str(), h.context.error_text.as_str());
    }

    #[test]
    fn prop_reset_yields_single_model_message(
        turns in proptest::collection::vec(arb_utterance(), 0..4),
        leave_streaming in any::<bool>(),
    ) {
        let mut h = Harness::new();
        for text in &turns {
            let reply = h.submit(text);
            h.send(Event::Fragment { reply_id: reply.clone(), text: "ok".to_string() });
            h.send(Event::StreamComplete { reply_id: reply });
        }
        let stale = leave_streaming.then(|| h.submit("đang chờ"));

        h.send(Event::reset(true));
        prop_assert_eq!(h.log.len(), 1);
        prop_assert_eq!(h.log.messages()[0].role, Role::Model);
        prop_assert_eq!(&h.state, &ConvState::Idle);

        // A stream that was outstanding cannot write into the new log
        if let Some(reply) = stale {
            h.send(Event::Fragment { reply_id: reply.clone(), text: "late".to_string() });
            h.send(Event::StreamComplete { reply_id: reply });
            prop_assert_eq!(h.log.len(), 1);
            prop_assert_eq!(h.log.messages()[0].text.as_str(), h.context.reset_greeting.as_str());
        }
    }

    #[test]
    fn prop_at_most_one_placeholder_in_flight(
        texts in proptest::collection::vec(arb_utterance(), 1..6),
    ) {
        let mut h = Harness::new();
        for text in &texts {
            h.submit(text);
        }
        // Only the first submission was accepted
        prop_assert_eq!(h.log.len(), 3);
        let empty_models = h
            .log
            .messages()
            .iter()
            .filter(|m| m.role == Role::Model && m.text.is_empty())
            .count();
        prop_assert_eq!(empty_models, 1);
    }
}

#[test]
fn test_granularity_example() {
    let coarse = ["Xin ", "chào"];
    let fine = ["X", "i", "n ", "c", "h", "à", "o"];
    let mut texts = Vec::new();
    for pieces in [&coarse[..], &fine[..]] {
        let mut h = Harness::new();
        let reply = h.submit("chào");
        for piece in pieces {
            h.send(Event::Fragment { reply_id: reply.clone(), text: (*piece).to_string() });
        }
        h.send(Event::StreamComplete { reply_id: reply.clone() });
        texts.push(h.log.get(&reply).unwrap().text.clone());
    }
    assert_eq!(texts, vec!["Xin chào".to_string(), "Xin chào".to_string()]);
}
