//! A quiz being played: sequential, forward-only, answers lock

use super::question::QuizQuestion;
use super::results::QuizResults;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current_index: usize,
    selected_index: Option<usize>,
    answered: bool,
    score: u32,
    finished: bool,
}

impl QuizSession {
    /// Start at the first question. `questions` must be non-empty.
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        debug_assert!(!questions.is_empty());
        Self {
            questions,
            current_index: 0,
            selected_index: None,
            answered: false,
            score: 0,
            finished: false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> &QuizQuestion {
        &self.questions[self.current_index]
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn answered(&self) -> bool {
        self.answered
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn total(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    /// Answer the current question. Only the first selection counts; later
    /// calls return `false` and change nothing.
    pub fn select(&mut self, index: usize) -> bool {
        if self.answered || self.finished {
            return false;
        }
        self.selected_index = Some(index);
        self.answered = true;
        if index == self.current().correct_index {
            self.score += 1;
        }
        true
    }

    /// Move past an answered question, finishing after the last one.
    /// Returns `false` if the current question is unanswered.
    pub fn advance(&mut self) -> bool {
        if !self.answered || self.finished {
            return false;
        }
        if self.is_last() {
            self.finished = true;
        } else {
            self.current_index += 1;
            self.selected_index = None;
            self.answered = false;
        }
        true
    }

    pub fn results(&self) -> QuizResults {
        QuizResults::from_score(self.score, self.total())
    }
}
