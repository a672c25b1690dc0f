//! Quiz runtime: owns the quiz state and the outstanding generation

use super::{dispatch, Envelope, Outcome, SseEvent};
use crate::llm::{LlmService, StructuredRequest};
use crate::quiz::{transition, Effect, Event, QuizState, QuizView};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Handle to interact with the running quiz
#[derive(Clone)]
pub struct QuizHandle {
    event_tx: mpsc::Sender<Envelope<Event>>,
    view_rx: watch::Receiver<QuizView>,
}

impl QuizHandle {
    pub async fn dispatch(&self, event: Event) -> Outcome {
        dispatch(&self.event_tx, event).await
    }

    pub fn view(&self) -> QuizView {
        self.view_rx.borrow().clone()
    }
}

pub struct QuizRuntime {
    state: QuizState,
    llm: Arc<dyn LlmService>,
    event_rx: mpsc::Receiver<Envelope<Event>>,
    event_tx: mpsc::Sender<Envelope<Event>>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    view_tx: watch::Sender<QuizView>,
    /// Token to cancel the generation request in flight
    generation_cancel: Option<CancellationToken>,
}

impl QuizRuntime {
    pub fn spawn(llm: Arc<dyn LlmService>, broadcast_tx: broadcast::Sender<SseEvent>) -> QuizHandle {
        let (event_tx, event_rx) = mpsc::channel(16);
        let state = QuizState::Closed;
        let (view_tx, view_rx) = watch::channel(QuizView::from(&state));

        let runtime = Self {
            state,
            llm,
            event_rx,
            event_tx: event_tx.clone(),
            broadcast_tx,
            view_tx,
            generation_cancel: None,
        };
        tokio::spawn(runtime.run());

        QuizHandle { event_tx, view_rx }
    }

    async fn run(mut self) {
        tracing::info!("Starting quiz runtime");

        while let Some(Envelope { event, reply }) = self.event_rx.recv().await {
            let outcome = self.process_event(event);
            if let Err(e) = &outcome {
                tracing::debug!(error = %e, "Quiz event rejected");
            }
            Envelope::<Event>::respond(reply, outcome);
        }

        tracing::info!("Quiz runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Outcome {
        let result = transition(&self.state, event)?;
        let changed = result.new_state != self.state;

        if changed {
            tracing::debug!(from = self.state.phase(), to = result.new_state.phase(), "Quiz transition");
        }
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        if changed {
            let view = QuizView::from(&self.state);
            self.view_tx.send_replace(view.clone());
            let _ = self.broadcast_tx.send(SseEvent::Quiz { view });
        }
        Ok(changed)
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Generate {
                request_id,
                request,
            } => self.generate(request_id, request),

            Effect::AbortGeneration => {
                if let Some(token) = self.generation_cancel.take() {
                    tracing::info!("Abandoning quiz generation");
                    token.cancel();
                }
            }

            Effect::Alert { message, detail } => {
                tracing::warn!(detail = %detail, "Quiz generation failed");
                let _ = self.broadcast_tx.send(SseEvent::Alert { message });
            }
        }
    }

    fn generate(&mut self, request_id: Uuid, request: StructuredRequest) {
        let cancel_token = CancellationToken::new();
        if let Some(previous) = self.generation_cancel.replace(cancel_token.clone()) {
            previous.cancel();
        }

        let llm = self.llm.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = cancel_token.cancelled() => {
                    tracing::info!(%request_id, "Quiz generation cancelled");
                }

                outcome = llm.generate_structured(&request) => {
                    let event = Event::GenerationFinished { request_id, outcome };
                    let _ = event_tx.send(Envelope::internal(event)).await;
                }
            }
        });
    }
}
