//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    AnswerRequest, ChatRequest, ChatResponse, ErrorResponse, QuickPromptsResponse, ResetRequest,
    StartQuizRequest, ThemeBody,
};
use super::AppState;
use crate::conversation::prompts::QUICK_PROMPTS;
use crate::conversation::{self, TransitionError};
use crate::db::DbError;
use crate::quiz::{self, QuizConfig, QuizView};
use crate::runtime::{ChatSnapshot, RuntimeError, SseEvent};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Conversation
        .route("/api/chat", get(get_chat))
        .route("/api/chat/messages", post(send_chat))
        .route("/api/chat/reset", post(reset_chat))
        .route("/api/quick-prompts", get(list_quick_prompts))
        // Quiz
        .route("/api/quiz", get(get_quiz))
        .route("/api/quiz/open", post(open_quiz))
        .route("/api/quiz/start", post(start_quiz))
        .route("/api/quiz/answer", post(answer_question))
        .route("/api/quiz/next", post(next_question))
        .route("/api/quiz/close", post(close_quiz))
        // Live updates
        .route("/api/stream", get(stream_updates))
        // Preferences
        .route("/api/preferences/theme", get(get_theme).put(set_theme))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Conversation
// ============================================================

async fn get_chat(State(state): State<AppState>) -> Json<ChatSnapshot> {
    Json(state.chat.snapshot())
}

async fn send_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let accepted = state
        .chat
        .dispatch(conversation::Event::user_message(req.text))
        .await?;
    Ok(Json(ChatResponse { accepted }))
}

async fn reset_chat(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<ChatSnapshot>, AppError> {
    state
        .chat
        .dispatch(conversation::Event::reset(req.confirm))
        .await?;
    Ok(Json(state.chat.snapshot()))
}

async fn list_quick_prompts() -> Json<QuickPromptsResponse> {
    Json(QuickPromptsResponse {
        prompts: &QUICK_PROMPTS,
    })
}

// ============================================================
// Quiz
// ============================================================

async fn get_quiz(State(state): State<AppState>) -> Json<QuizView> {
    Json(state.quiz.view())
}

/// Apply a quiz event and return the view it produced
async fn quiz_action(state: &AppState, event: quiz::Event) -> Result<Json<QuizView>, AppError> {
    state.quiz.dispatch(event).await?;
    Ok(Json(state.quiz.view()))
}

async fn open_quiz(State(state): State<AppState>) -> Result<Json<QuizView>, AppError> {
    quiz_action(&state, quiz::Event::OpenConfig).await
}

async fn start_quiz(
    State(state): State<AppState>,
    Json(req): Json<StartQuizRequest>,
) -> Result<Json<QuizView>, AppError> {
    let config = QuizConfig::new(req.topic, req.question_type, req.count)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    quiz_action(&state, quiz::Event::start_quiz(config)).await
}

async fn answer_question(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<QuizView>, AppError> {
    quiz_action(&state, quiz::Event::SelectOption { index: req.index }).await
}

async fn next_question(State(state): State<AppState>) -> Result<Json<QuizView>, AppError> {
    quiz_action(&state, quiz::Event::Advance).await
}

async fn close_quiz(State(state): State<AppState>) -> Result<Json<QuizView>, AppError> {
    quiz_action(&state, quiz::Event::Close).await
}

// ============================================================
// Live updates
// ============================================================

async fn stream_updates(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before taking snapshots so nothing falls in between
    let broadcast_rx = state.broadcast_tx.subscribe();
    let init_event = SseEvent::Init {
        chat: state.chat.snapshot(),
        quiz: state.quiz.view(),
    };
    sse_stream(init_event, broadcast_rx)
}

// ============================================================
// Preferences
// ============================================================

async fn get_theme(State(state): State<AppState>) -> Result<Json<ThemeBody>, AppError> {
    let theme = state.db.get_theme()?;
    Ok(Json(ThemeBody { theme }))
}

async fn set_theme(
    State(state): State<AppState>,
    Json(req): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, AppError> {
    state.db.set_theme(req.theme)?;
    tracing::info!(theme = %req.theme, "Theme changed");
    Ok(Json(req))
}

async fn get_version() -> &'static str {
    concat!("an-toan-so ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<RuntimeError> for AppError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::Chat(TransitionError::ConfirmationRequired)
            | RuntimeError::Quiz(quiz::TransitionError::InvalidTransition(_)) => {
                AppError::Conflict(e.to_string())
            }
            RuntimeError::Quiz(
                quiz::TransitionError::InvalidConfig(_)
                | quiz::TransitionError::OptionOutOfRange { .. },
            ) => AppError::BadRequest(e.to_string()),
            RuntimeError::Stopped => AppError::Internal(e.to_string()),
        }
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        tracing::error!(error = %e, "Preference storage failed");
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::prompts::RESET_CONFIRMATION;
    use crate::db::Database;
    use crate::llm::LlmError;
    use crate::quiz::GENERATION_ALERT;
    use crate::runtime::testing::{quiz_json, MockLlmService, ScriptedReply};
    use axum::body::{to_bytes, Body, BodyDataStream};
    use axum::http::Request;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<MockLlmService>) {
        let llm = Arc::new(MockLlmService::new());
        let state = AppState::new(Database::open_in_memory().unwrap(), llm.clone());
        (create_router(state), llm)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let (app, llm) = app();
        llm.queue_reply(ScriptedReply::fragments(["Xin ", "chào"]));

        let (status, body) = call(&app, "POST", "/api/chat/messages", Some(json!({ "text": "chào" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], true);

        let chat = loop {
            let (_, chat) = call(&app, "GET", "/api/chat", None).await;
            if chat["state"]["type"] == "idle" {
                break chat;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        };
        assert_eq!(chat["messages"].as_array().unwrap().len(), 3);
        assert_eq!(chat["messages"][2]["text"], "Xin chào");
    }

    #[tokio::test]
    async fn test_blank_message_not_accepted() {
        let (app, _) = app();
        let (status, body) = call(&app, "POST", "/api/chat/messages", Some(json!({ "text": "  " }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], false);
    }

    #[tokio::test]
    async fn test_reset_needs_confirmation() {
        let (app, _) = app();
        let (status, body) = call(&app, "POST", "/api/chat/reset", Some(json!({}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], RESET_CONFIRMATION);

        let (status, body) = call(&app, "POST", "/api/chat/reset", Some(json!({ "confirm": true }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quick_prompts() {
        let (app, _) = app();
        let (_, body) = call(&app, "GET", "/api/quick-prompts", None).await;
        assert_eq!(body["prompts"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_quiz_flow() {
        let (app, llm) = app();
        llm.queue_generation(Ok(Some(quiz_json(&[0]))));

        let (_, body) = call(&app, "POST", "/api/quiz/open", None).await;
        assert_eq!(body["phase"], "configuring");
        assert_eq!(body["config"]["count"], 5);

        let (status, _) = call(&app, "POST", "/api/quiz/start", Some(json!({ "count": 11 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "POST",
            "/api/quiz/start",
            Some(json!({ "topic": "", "type": "multiple-choice", "count": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        loop {
            let (_, quiz) = call(&app, "GET", "/api/quiz", None).await;
            if quiz["phase"] == "playing" {
                assert!(quiz["question"].get("correct_index").is_none());
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let (_, body) = call(&app, "POST", "/api/quiz/answer", Some(json!({ "index": 0 }))).await;
        assert_eq!(body["question"]["correct_index"], 0);
        assert_eq!(body["question"]["is_last"], true);

        let (_, body) = call(&app, "POST", "/api/quiz/next", None).await;
        assert_eq!(body["phase"], "results");
        assert_eq!(body["results"]["percentage"], 100);
        assert_eq!(body["results"]["tier"], "excellent");

        let (status, _) = call(&app, "POST", "/api/quiz/next", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_generation_failure_visible_in_view() {
        let (app, llm) = app();
        llm.queue_generation(Err(LlmError::server_error("overloaded")));

        call(&app, "POST", "/api/quiz/open", None).await;
        let (status, _) = call(
            &app,
            "POST",
            "/api/quiz/start",
            Some(json!({ "topic": "", "type": "multiple-choice", "count": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let quiz = loop {
            let (_, quiz) = call(&app, "GET", "/api/quiz", None).await;
            if quiz["phase"] != "generating" {
                break quiz;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        };
        assert_eq!(quiz["phase"], "configuring");
        assert_eq!(quiz["config"]["count"], 3);
        assert_eq!(quiz["alert"], GENERATION_ALERT);

        // Reopening the form dismisses the notice and keeps the draft
        let (_, quiz) = call(&app, "POST", "/api/quiz/open", None).await;
        assert!(quiz.get("alert").is_none());
        assert_eq!(quiz["config"]["count"], 3);
    }

    /// Read the next SSE frame as (event name, JSON data)
    async fn next_frame(body: &mut BodyDataStream) -> (String, Value) {
        let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
            .await
            .expect("no SSE frame in time")
            .unwrap()
            .unwrap();
        let text = String::from_utf8(chunk.to_vec()).unwrap();
        let field = |name: &str| {
            text.lines()
                .find_map(|line| line.strip_prefix(name))
                .unwrap()
                .to_string()
        };
        (field("event: "), serde_json::from_str(&field("data: ")).unwrap())
    }

    #[tokio::test]
    async fn test_stream_starts_with_init_then_updates() {
        let (app, _) = app();
        let request = Request::builder().uri("/api/stream").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        let mut body = response.into_body().into_data_stream();

        let (event, data) = next_frame(&mut body).await;
        assert_eq!(event, "init");
        assert_eq!(data["type"], "init");
        assert_eq!(data["chat"]["state"]["type"], "idle");
        assert_eq!(data["chat"]["messages"].as_array().unwrap().len(), 1);
        assert_eq!(data["quiz"]["phase"], "closed");

        call(&app, "POST", "/api/quiz/open", None).await;
        let (event, data) = next_frame(&mut body).await;
        assert_eq!(event, "quiz");
        assert_eq!(data["quiz"]["phase"], "configuring");
    }

    #[tokio::test]
    async fn test_theme_preference() {
        let (app, _) = app();
        let (_, body) = call(&app, "GET", "/api/preferences/theme", None).await;
        assert_eq!(body["theme"], "light");

        let (status, _) = call(&app, "PUT", "/api/preferences/theme", Some(json!({ "theme": "dark" }))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call(&app, "GET", "/api/preferences/theme", None).await;
        assert_eq!(body["theme"], "dark");
    }
}
