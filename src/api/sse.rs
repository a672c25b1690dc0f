//! Server-Sent Events support

use crate::runtime::SseEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init_event: SseEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with init event then broadcasts
    let init = futures::stream::once(async move { Ok(sse_event_to_axum(init_event)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(sse_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

/// SSE event name and JSON body for each runtime event
fn event_payload(event: SseEvent) -> (&'static str, Value) {
    match event {
        SseEvent::Init { chat, quiz } => (
            "init",
            json!({
                "type": "init",
                "chat": to_json(&chat),
                "quiz": to_json(&quiz)
            }),
        ),
        SseEvent::Chat { snapshot } => (
            "chat",
            json!({
                "type": "chat",
                "chat": to_json(&snapshot)
            }),
        ),
        SseEvent::MessageUpdated { message } => (
            "message_updated",
            json!({
                "type": "message_updated",
                "message": to_json(&message)
            }),
        ),
        SseEvent::Quiz { view } => (
            "quiz",
            json!({
                "type": "quiz",
                "quiz": to_json(&view)
            }),
        ),
        SseEvent::Alert { message } => (
            "alert",
            json!({
                "type": "alert",
                "message": message
            }),
        ),
    }
}
