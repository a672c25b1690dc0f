//! Generated questions and the checks they must pass before play

use super::config::QuizConfig;
use crate::llm::LlmError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A question ready to be played. `correct_index` always indexes `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

/// Shape requested from the model
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    question: String,
    options: Vec<String>,
    correct_answer_index: i64,
    explanation: String,
}

/// Why a generation produced nothing playable
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(#[from] LlmError),
    #[error("model returned no data")]
    EmptyResponse,
    #[error("model returned malformed quiz data: {0}")]
    MalformedJson(String),
    #[error("model returned no questions")]
    NoQuestions,
    #[error("question {index}: {violation}")]
    Contract {
        index: usize,
        violation: ContractViolation,
    },
}

/// Generated data that parses but breaks the question invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("empty question text")]
    EmptyPrompt,
    #[error("expected {expected} options, found {found}")]
    OptionCount { expected: usize, found: usize },
    #[error("correct answer index {index} outside {options} options")]
    CorrectIndexOutOfRange { index: i64, options: usize },
}

/// Parse and check the model's JSON text against the requested config.
///
/// Any invalid question rejects the whole set. Questions beyond the
/// requested count are dropped.
pub fn parse_questions(text: &str, config: &QuizConfig) -> Result<Vec<QuizQuestion>, GenerationError> {
    let wire: Vec<WireQuestion> =
        serde_json::from_str(text).map_err(|e| GenerationError::MalformedJson(e.to_string()))?;

    if wire.is_empty() {
        return Err(GenerationError::NoQuestions);
    }

    if wire.len() > usize::from(config.count) {
        tracing::warn!(
            requested = config.count,
            received = wire.len(),
            "Dropping extra generated questions"
        );
    }

    let expected = config.question_type.option_count();
    wire.into_iter()
        .take(usize::from(config.count))
        .enumerate()
        .map(|(index, q)| {
            check(q, expected).map_err(|violation| GenerationError::Contract { index, violation })
        })
        .collect()
}

fn check(q: WireQuestion, expected: usize) -> Result<QuizQuestion, ContractViolation> {
    if q.question.trim().is_empty() {
        return Err(ContractViolation::EmptyPrompt);
    }
    if q.options.len() != expected {
        return Err(ContractViolation::OptionCount {
            expected,
            found: q.options.len(),
        });
    }
    let correct_index = usize::try_from(q.correct_answer_index)
        .ok()
        .filter(|i| *i < q.options.len())
        .ok_or(ContractViolation::CorrectIndexOutOfRange {
            index: q.correct_answer_index,
            options: q.options.len(),
        })?;

    Ok(QuizQuestion {
        prompt: q.question,
        options: q.options,
        correct_index,
        explanation: q.explanation,
    })
}
