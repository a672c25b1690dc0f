//! Quiz generator and player
//!
//! Same shape as the conversation machine: a pure `transition` over
//! `QuizState`, with generation requests and alerts returned as effects.

pub mod config;
mod effect;
mod event;
mod prompt;
pub mod question;
pub mod results;
pub mod session;
mod state;
pub(crate) mod transition;
pub mod view;

#[cfg(test)]
mod proptests;

pub use config::{QuestionType, QuizConfig};
pub use effect::Effect;
pub use event::Event;
pub use question::QuizQuestion;
pub use state::QuizState;
pub use transition::{transition, TransitionError};
pub use view::QuizView;

/// Shown when generation yields nothing playable
pub const GENERATION_ALERT: &str = "Không thể tạo câu đố lúc này. Vui lòng thử lại.";
