//! HTTP API for the advisor

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::db::Database;
use crate::llm::LlmService;
use crate::runtime::{ChatHandle, ChatRuntime, QuizHandle, QuizRuntime, SseEvent};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatHandle,
    pub quiz: QuizHandle,
    pub db: Database,
    pub broadcast_tx: broadcast::Sender<SseEvent>,
}

impl AppState {
    /// Start both runtimes on the current tokio runtime
    pub fn new(db: Database, llm: Arc<dyn LlmService>) -> Self {
        let (broadcast_tx, _) = broadcast::channel(256);
        Self {
            chat: ChatRuntime::spawn(llm.clone(), broadcast_tx.clone()),
            quiz: QuizRuntime::spawn(llm, broadcast_tx.clone()),
            db,
            broadcast_tx,
        }
    }
}
