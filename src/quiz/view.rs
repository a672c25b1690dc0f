//! Client-facing snapshot of the quiz

use super::config::QuizConfig;
use super::results::QuizResults;
use super::session::QuizSession;
use super::QuizState;
use serde::Serialize;

/// The question on screen. The answer and explanation stay hidden until
/// the question is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub prompt: String,
    pub options: Vec<String>,
    /// 1-based position, for "Câu n / total"
    pub number: usize,
    pub total: u32,
    pub answered: bool,
    pub selected_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub is_last: bool,
}

impl QuestionView {
    fn of(session: &QuizSession) -> Self {
        let question = session.current();
        let answered = session.answered();
        Self {
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            number: session.current_index() + 1,
            total: session.total(),
            answered,
            selected_index: session.selected_index(),
            correct_index: answered.then_some(question.correct_index),
            explanation: answered.then(|| question.explanation.clone()),
            is_last: session.is_last(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizView {
    pub phase: &'static str,
    /// Form contents while configuring or generating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<QuizConfig>,
    /// Notice left by a failed generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<QuizResults>,
}

impl From<&QuizState> for QuizView {
    fn from(state: &QuizState) -> Self {
        let mut view = QuizView {
            phase: state.phase(),
            config: None,
            alert: None,
            question: None,
            score: None,
            results: None,
        };
        match state {
            QuizState::Closed => {}
            QuizState::Configuring { draft, alert } => {
                view.config = Some(draft.clone());
                view.alert.clone_from(alert);
            }
            QuizState::Generating { config, .. } => {
                view.config = Some(config.clone());
            }
            QuizState::Playing { session } => {
                view.question = Some(QuestionView::of(session));
                view.score = Some(session.score());
            }
            QuizState::Results { session } => {
                view.score = Some(session.score());
                view.results = Some(session.results());
            }
        }
        view
    }
}
