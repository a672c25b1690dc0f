//! Quiz configuration chosen in the setup form

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_QUESTIONS: u8 = 1;
pub const MAX_QUESTIONS: u8 = 10;
pub const DEFAULT_QUESTIONS: u8 = 5;

/// Kind of question to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
}

impl QuestionType {
    /// Number of options every question of this type must carry
    pub fn option_count(self) -> usize {
        match self {
            QuestionType::MultipleChoice => 4,
            QuestionType::TrueFalse => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("question count must be between {MIN_QUESTIONS} and {MAX_QUESTIONS}, got {0}")]
    CountOutOfRange(u32),
}

/// Topic, type and size of a quiz. An empty topic leaves the choice to
/// the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub topic: String,
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    pub count: u8,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            topic: String::new(),
            question_type: QuestionType::MultipleChoice,
            count: DEFAULT_QUESTIONS,
        }
    }
}

impl QuizConfig {
    /// Build from untrusted input, enforcing the count bounds
    pub fn new(topic: impl Into<String>, question_type: QuestionType, count: u32) -> Result<Self, ConfigError> {
        let count = u8::try_from(count)
            .ok()
            .filter(|c| (MIN_QUESTIONS..=MAX_QUESTIONS).contains(c))
            .ok_or(ConfigError::CountOutOfRange(count))?;
        Ok(Self {
            topic: topic.into().trim().to_string(),
            question_type,
            count,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (MIN_QUESTIONS..=MAX_QUESTIONS).contains(&self.count) {
            Ok(())
        } else {
            Err(ConfigError::CountOutOfRange(u32::from(self.count)))
        }
    }
}
