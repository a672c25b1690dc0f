//! Property-based tests for quiz play

use super::results::{QuizResults, Tier};
use super::session::QuizSession;
use super::*;
use proptest::prelude::*;

fn arb_question() -> impl Strategy<Value = QuizQuestion> {
    prop_oneof![Just(2usize), Just(4usize)].prop_flat_map(|n| {
        (0..n).prop_map(move |correct| QuizQuestion {
            prompt: "Câu hỏi".to_string(),
            options: (0..n).map(|i| format!("Lựa chọn {i}")).collect(),
            correct_index: correct,
            explanation: "Giải thích".to_string(),
        })
    })
}

/// Questions plus one answer per question, each in range
fn arb_play() -> impl Strategy<Value = (Vec<QuizQuestion>, Vec<usize>)> {
    proptest::collection::vec(arb_question(), 1..=10).prop_flat_map(|questions| {
        let answers: Vec<_> = questions.iter().map(|q| 0..q.options.len()).collect();
        (Just(questions), answers)
    })
}

fn play(questions: Vec<QuizQuestion>, answers: &[usize]) -> QuizState {
    let mut state = QuizState::Playing {
        session: QuizSession::new(questions),
    };
    for &index in answers {
        state = transition(&state, Event::SelectOption { index }).unwrap().new_state;
        state = transition(&state, Event::Advance).unwrap().new_state;
    }
    state
}

proptest! {
    #[test]
    fn prop_score_counts_correct_answers((questions, answers) in arb_play()) {
        let correct = questions
            .iter()
            .zip(&answers)
            .filter(|(q, a)| q.correct_index == **a)
            .count();
        let total = questions.len();

        let state = play(questions, &answers);
        let QuizState::Results { session } = state else {
            return Err(TestCaseError::fail("quiz did not finish"));
        };
        prop_assert!(session.score() as usize <= total);
        prop_assert_eq!(session.score() as usize, correct);
        prop_assert_eq!(session.results().total as usize, total);
    }

    #[test]
    fn prop_selection_is_idempotent(
        question in arb_question(),
        first in 0usize..2,
        again in proptest::collection::vec(0usize..2, 1..5),
    ) {
        let mut state = QuizState::Playing { session: QuizSession::new(vec![question]) };
        state = transition(&state, Event::SelectOption { index: first }).unwrap().new_state;
        let locked = state.clone();
        for index in again {
            state = transition(&state, Event::SelectOption { index }).unwrap().new_state;
        }
        prop_assert_eq!(state, locked);
    }

    #[test]
    fn prop_tier_is_function_of_percentage(score in 0u32..=10, extra in 0u32..=10) {
        let total = (score + extra).max(1);
        let score = score.min(total);
        let a = QuizResults::from_score(score, total);
        let b = QuizResults::from_score(score, total);
        prop_assert_eq!(a, b);
        prop_assert!(a.percentage <= 100);
        prop_assert_eq!(a.tier, Tier::from_percentage(a.percentage));
    }
}

#[test]
fn test_tier_examples() {
    assert_eq!(QuizResults::from_score(4, 5).tier, Tier::Excellent);
    assert_eq!(QuizResults::from_score(3, 5).tier, Tier::Good);
    assert_eq!(QuizResults::from_score(2, 5).tier, Tier::NeedsImprovement);
    assert_eq!(QuizResults::from_score(2, 5).percentage, 40);
}
