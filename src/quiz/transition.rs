//! Pure quiz transition function

use super::config::{ConfigError, QuizConfig};
use super::prompt::quiz_request;
use super::question::{parse_questions, GenerationError};
use super::session::QuizSession;
use super::{Effect, Event, QuizState, GENERATION_ALERT};
use thiserror::Error;

/// Result of a quiz transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: QuizState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: QuizState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn unchanged(state: &QuizState) -> Self {
        Self::new(state.clone())
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Invalid quiz config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Option {index} does not exist (question has {options})")]
    OptionOutOfRange { index: usize, options: usize },
}

fn invalid(state: &QuizState, action: &str) -> TransitionError {
    TransitionError::InvalidTransition(format!("cannot {action} while {}", state.phase()))
}

/// Pure transition function
pub fn transition(state: &QuizState, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Configuration
        // ============================================================
        // Reopening keeps the draft and dismisses any notice
        (QuizState::Configuring { draft, .. }, Event::OpenConfig) => {
            Ok(TransitionResult::new(QuizState::configuring(draft.clone())))
        }

        (
            QuizState::Closed | QuizState::Playing { .. } | QuizState::Results { .. },
            Event::OpenConfig,
        ) => Ok(TransitionResult::new(QuizState::configuring(QuizConfig::default()))),

        (QuizState::Configuring { .. }, Event::StartQuiz { config, request_id }) => {
            config.validate()?;
            let request = quiz_request(&config);
            Ok(TransitionResult::new(QuizState::Generating { config, request_id })
                .with_effect(Effect::Generate { request_id, request }))
        }

        // ============================================================
        // Generation
        // ============================================================
        (
            QuizState::Generating { config, request_id },
            Event::GenerationFinished { request_id: finished, outcome },
        ) if *request_id == finished => match questions_from(outcome, config) {
            Ok(questions) => Ok(TransitionResult::new(QuizState::Playing {
                session: QuizSession::new(questions),
            })),
            Err(e) => Ok(TransitionResult::new(QuizState::Configuring {
                draft: config.clone(),
                alert: Some(GENERATION_ALERT.to_string()),
            })
            .with_effect(Effect::Alert {
                message: GENERATION_ALERT.to_string(),
                detail: e.to_string(),
            })),
        },

        // Result of a closed or superseded request
        (_, Event::GenerationFinished { .. }) => Ok(TransitionResult::unchanged(state)),

        // ============================================================
        // Play
        // ============================================================
        (QuizState::Playing { session }, Event::SelectOption { index }) => {
            let options = session.current().options.len();
            if index >= options {
                return Err(TransitionError::OptionOutOfRange { index, options });
            }
            let mut session = session.clone();
            session.select(index);
            Ok(TransitionResult::new(QuizState::Playing { session }))
        }

        (QuizState::Playing { session }, Event::Advance) => {
            let mut session = session.clone();
            session.advance();
            if session.finished() {
                Ok(TransitionResult::new(QuizState::Results { session }))
            } else {
                Ok(TransitionResult::new(QuizState::Playing { session }))
            }
        }

        // ============================================================
        // Close
        // ============================================================
        (QuizState::Generating { .. }, Event::Close) => {
            Ok(TransitionResult::new(QuizState::Closed).with_effect(Effect::AbortGeneration))
        }

        (_, Event::Close) => Ok(TransitionResult::new(QuizState::Closed)),

        // ============================================================
        // Everything else is out of place
        // ============================================================
        (_, Event::OpenConfig) => Err(invalid(state, "open the quiz setup")),
        (_, Event::StartQuiz { .. }) => Err(invalid(state, "start a quiz")),
        (_, Event::SelectOption { .. }) => Err(invalid(state, "answer")),
        (_, Event::Advance) => Err(invalid(state, "advance")),
    }
}

fn questions_from(
    outcome: Result<Option<String>, crate::llm::LlmError>,
    config: &QuizConfig,
) -> Result<Vec<super::QuizQuestion>, GenerationError> {
    let text = outcome?.ok_or(GenerationError::EmptyResponse)?;
    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    parse_questions(&text, config)
}
