//! Chat runtime: owns the conversation log and the chat session

use super::{dispatch, Envelope, Outcome, SseEvent};
use crate::conversation::prompts::SYSTEM_INSTRUCTION;
use crate::conversation::{
    initial_log, transition, ConvContext, ConvState, ConversationLog, Effect, Event, LogChange,
    MessageId,
};
use crate::llm::{ChatSession, LlmService};
use futures::StreamExt;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// What clients see of the conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatSnapshot {
    pub state: ConvState,
    pub messages: ConversationLog,
}

/// Handle to interact with the running chat
#[derive(Clone)]
pub struct ChatHandle {
    event_tx: mpsc::Sender<Envelope<Event>>,
    snapshot_rx: watch::Receiver<ChatSnapshot>,
}

impl ChatHandle {
    /// Apply an event and report whether it changed anything
    pub async fn dispatch(&self, event: Event) -> Outcome {
        dispatch(&self.event_tx, event).await
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}

pub struct ChatRuntime {
    context: ConvContext,
    state: ConvState,
    log: ConversationLog,
    llm: Arc<dyn LlmService>,
    session: Arc<dyn ChatSession>,
    event_rx: mpsc::Receiver<Envelope<Event>>,
    event_tx: mpsc::Sender<Envelope<Event>>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
    /// Token to cancel the reply stream being consumed
    stream_cancel: Option<CancellationToken>,
}

impl ChatRuntime {
    /// Start the chat with the welcome log and a session seeded with the
    /// advisor persona
    pub fn spawn(llm: Arc<dyn LlmService>, broadcast_tx: broadcast::Sender<SseEvent>) -> ChatHandle {
        let (event_tx, event_rx) = mpsc::channel(64);
        let log = initial_log();
        let (snapshot_tx, snapshot_rx) = watch::channel(ChatSnapshot {
            state: ConvState::Idle,
            messages: log.clone(),
        });

        let runtime = Self {
            context: ConvContext::default(),
            state: ConvState::Idle,
            log,
            session: llm.start_chat(SYSTEM_INSTRUCTION),
            llm,
            event_rx,
            event_tx: event_tx.clone(),
            broadcast_tx,
            snapshot_tx,
            stream_cancel: None,
        };
        tokio::spawn(runtime.run());

        ChatHandle {
            event_tx,
            snapshot_rx,
        }
    }

    async fn run(mut self) {
        tracing::info!(model = %self.llm.model_id(), "Starting chat runtime");

        while let Some(Envelope { event, reply }) = self.event_rx.recv().await {
            let outcome = self.process_event(event);
            if let Err(e) = &outcome {
                tracing::debug!(error = %e, "Chat event rejected");
            }
            Envelope::<Event>::respond(reply, outcome);
        }

        tracing::info!("Chat runtime stopped");
    }

    fn process_event(&mut self, event: Event) -> Outcome {
        let result = transition(&self.state, &self.context, event)?;
        let state_changed = result.new_state != self.state;
        let changed = state_changed || !result.effects.is_empty();
        self.state = result.new_state;

        let mut structural = state_changed;
        for effect in result.effects {
            structural |= self.execute_effect(effect);
        }

        if structural {
            self.publish_snapshot();
        }
        Ok(changed)
    }

    /// Execute an effect; returns true when clients need a full snapshot
    fn execute_effect(&mut self, effect: Effect) -> bool {
        match &effect {
            Effect::OpenStream { reply_id, utterance } => {
                self.open_stream(reply_id.clone(), utterance.clone());
                return false;
            }
            Effect::CancelStream => {
                if let Some(token) = self.stream_cancel.take() {
                    tracing::info!("Cancelling reply stream");
                    token.cancel();
                }
                return false;
            }
            Effect::ResetSession { system_instruction } => {
                // Dropping the old handle discards its history
                self.session = self.llm.start_chat(system_instruction);
                return false;
            }
            Effect::AppendMessage(_)
            | Effect::AppendFragment { .. }
            | Effect::MarkFailed { .. }
            | Effect::ReplaceLog { .. } => {}
        }

        match self.log.apply(&effect) {
            Some(LogChange::Added(_) | LogChange::Replaced) => true,
            Some(LogChange::Updated(message)) => {
                self.snapshot_tx.send_modify(|s| s.messages = self.log.clone());
                let _ = self.broadcast_tx.send(SseEvent::MessageUpdated { message });
                false
            }
            None => false,
        }
    }

    fn publish_snapshot(&self) {
        let snapshot = ChatSnapshot {
            state: self.state.clone(),
            messages: self.log.clone(),
        };
        self.snapshot_tx.send_replace(snapshot.clone());
        let _ = self.broadcast_tx.send(SseEvent::Chat { snapshot });
    }

    /// Consume the reply stream in the background, feeding fragments back
    /// as events tagged with `reply_id`
    fn open_stream(&mut self, reply_id: MessageId, utterance: String) {
        let cancel_token = CancellationToken::new();
        if let Some(previous) = self.stream_cancel.replace(cancel_token.clone()) {
            previous.cancel();
        }

        let session = self.session.clone();
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                biased;

                () = cancel_token.cancelled() => {
                    tracing::info!(reply_id = %reply_id, "Reply stream cancelled");
                }

                last = pump_reply(session, reply_id.clone(), &utterance, &event_tx) => {
                    let _ = event_tx.send(Envelope::internal(last)).await;
                }
            }
        });
    }
}

/// Forward fragments until the stream ends; returns the terminal event
async fn pump_reply(
    session: Arc<dyn ChatSession>,
    reply_id: MessageId,
    utterance: &str,
    event_tx: &mpsc::Sender<Envelope<Event>>,
) -> Event {
    let mut stream = match session.send_message_stream(utterance).await {
        Ok(stream) => stream,
        Err(e) => {
            return Event::StreamFailed {
                reply_id,
                message: e.message,
                error_kind: e.kind,
            }
        }
    };

    while let Some(item) = stream.next().await {
        match item {
            Ok(text) if text.is_empty() => {}
            Ok(text) => {
                let fragment = Event::Fragment {
                    reply_id: reply_id.clone(),
                    text,
                };
                if event_tx.send(Envelope::internal(fragment)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(reply_id = %reply_id, error = %e, "Reply stream failed");
                return Event::StreamFailed {
                    reply_id,
                    message: e.message,
                    error_kind: e.kind,
                };
            }
        }
    }

    Event::StreamComplete { reply_id }
}
