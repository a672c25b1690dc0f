//! Quiz state types

use super::config::QuizConfig;
use super::session::QuizSession;
use uuid::Uuid;

/// Quiz state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QuizState {
    /// No quiz view open
    #[default]
    Closed,

    /// Setup form shown, populated with `draft`. `alert` holds the notice
    /// from a failed generation until the form is reopened or resubmitted.
    Configuring {
        draft: QuizConfig,
        alert: Option<String>,
    },

    /// Generation request `request_id` in flight
    Generating { config: QuizConfig, request_id: Uuid },

    /// Answering questions
    Playing { session: QuizSession },

    /// All questions answered; `session.finished()` holds
    Results { session: QuizSession },
}

impl QuizState {
    /// Setup form without a pending notice
    pub fn configuring(draft: QuizConfig) -> Self {
        QuizState::Configuring { draft, alert: None }
    }

    pub fn phase(&self) -> &'static str {
        match self {
            QuizState::Closed => "closed",
            QuizState::Configuring { .. } => "configuring",
            QuizState::Generating { .. } => "generating",
            QuizState::Playing { .. } => "playing",
            QuizState::Results { .. } => "results",
        }
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match self {
            QuizState::Playing { session } | QuizState::Results { session } => Some(session),
            _ => None,
        }
    }
}
