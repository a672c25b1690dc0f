//! Runtimes that drive the state machines
//!
//! Each machine gets one task that owns its state, applies transitions
//! in arrival order and executes the returned effects. Handlers talk to
//! the tasks through channels and read the latest snapshot from a watch.

mod chat;
mod quiz;

#[cfg(test)]
pub mod testing;

pub use chat::{ChatHandle, ChatRuntime, ChatSnapshot};
pub use quiz::{QuizHandle, QuizRuntime};

use crate::conversation::Message;
use crate::quiz::QuizView;
use thiserror::Error;
use tokio::sync::oneshot;

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init {
        chat: ChatSnapshot,
        quiz: QuizView,
    },
    /// Messages were added or replaced, or the conversation state changed
    Chat {
        snapshot: ChatSnapshot,
    },
    /// A single message changed in place (fragment appended, marked failed)
    MessageUpdated {
        message: Message,
    },
    Quiz {
        view: QuizView,
    },
    Alert {
        message: String,
    },
}

/// Why a dispatched event was not applied
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Chat(#[from] crate::conversation::TransitionError),
    #[error(transparent)]
    Quiz(#[from] crate::quiz::TransitionError),
    #[error("runtime is not running")]
    Stopped,
}

/// Outcome reported back to the dispatcher: whether the event changed
/// anything
pub type Outcome = Result<bool, RuntimeError>;

/// An event on its way into a runtime. Internal events (stream fragments,
/// generation results) carry no reply channel.
pub(crate) struct Envelope<E> {
    event: E,
    reply: Option<oneshot::Sender<Outcome>>,
}

impl<E> Envelope<E> {
    fn internal(event: E) -> Self {
        Self { event, reply: None }
    }

    fn request(event: E) -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                event,
                reply: Some(tx),
            },
            rx,
        )
    }

    fn respond(reply: Option<oneshot::Sender<Outcome>>, outcome: Outcome) {
        if let Some(reply) = reply {
            // The dispatcher may have gone away
            let _ = reply.send(outcome);
        }
    }
}

/// Send a request to a runtime and wait for its outcome
async fn dispatch<E>(tx: &tokio::sync::mpsc::Sender<Envelope<E>>, event: E) -> Outcome {
    let (envelope, rx) = Envelope::request(event);
    tx.send(envelope).await.map_err(|_| RuntimeError::Stopped)?;
    rx.await.map_err(|_| RuntimeError::Stopped)?
}
