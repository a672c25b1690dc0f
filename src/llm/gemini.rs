//! Google Gemini provider implementation

use super::types::{FragmentStream, StructuredRequest};
use super::{ChatSession, LlmError, LlmService};
use async_trait::async_trait;
use eventsource_stream::{EventStreamError, Eventsource};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DIRECT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// How requests are authenticated
#[derive(Debug, Clone)]
enum Auth {
    /// Direct API access with a key header
    Key(String),
    /// Gateway handles authentication
    Gateway,
    /// No key configured; every call fails with an auth error
    Missing,
}

impl Auth {
    fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, LlmError> {
        match self {
            Auth::Key(key) => Ok(builder.header("x-goog-api-key", key)),
            Auth::Gateway => Ok(builder),
            Auth::Missing => Err(LlmError::auth(
                "No API key configured (set GEMINI_API_KEY or LLM_GATEWAY)",
            )),
        }
    }
}

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    auth: Auth,
    model_url: String,
    model_id: String,
}

impl GeminiService {
    pub fn new(api_key: String, model_id: String, gateway: Option<&str>) -> Self {
        let (model_url, auth) = match gateway {
            // Gateway base URL with the provider path appended
            Some(gw) => (
                format!("{}/gemini/v1beta/models/{model_id}", gw.trim_end_matches('/')),
                Auth::Gateway,
            ),
            None => (
                format!("{DIRECT_BASE_URL}/models/{model_id}"),
                if api_key.is_empty() {
                    Auth::Missing
                } else {
                    Auth::Key(api_key)
                },
            ),
        };

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });

        Self {
            client,
            auth,
            model_url,
            model_id,
        }
    }

    fn generate_url(&self) -> String {
        format!("{}:generateContent", self.model_url)
    }

    fn stream_url(&self) -> String {
        format!("{}:streamGenerateContent?alt=sse", self.model_url)
    }
}

#[async_trait]
impl LlmService for GeminiService {
    fn start_chat(&self, system_instruction: &str) -> Arc<dyn ChatSession> {
        Arc::new(GeminiChatSession {
            client: self.client.clone(),
            auth: self.auth.clone(),
            stream_url: self.stream_url(),
            system_instruction: GeminiContent::system(system_instruction),
            history: Arc::new(Mutex::new(Vec::new())),
        })
    }

    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, LlmError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent::user(&request.prompt)],
            system_instruction: None,
            generation_config: Some(GeminiGenerationConfig {
                temperature: request.temperature,
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(request.schema.clone()),
            }),
        };

        let response = self
            .auth
            .apply(self.client.post(self.generate_url()))?
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &text));
        }

        let parsed: GeminiResponse = serde_json::from_str(&text).map_err(|e| {
            LlmError::unknown(format!("Failed to parse response: {e} - body: {text}"))
        })?;

        Ok(parsed.text())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Chat context kept client-side and resent with each turn, as the
/// provider API itself is stateless.
struct GeminiChatSession {
    client: Client,
    auth: Auth,
    stream_url: String,
    system_instruction: GeminiContent,
    history: Arc<Mutex<Vec<GeminiContent>>>,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message_stream(&self, utterance: &str) -> Result<FragmentStream, LlmError> {
        let user_turn = GeminiContent::user(utterance);
        let mut contents = self.history.lock().unwrap().clone();
        contents.push(user_turn.clone());

        let body = GeminiRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
            generation_config: None,
        };

        let response = self
            .auth
            .apply(self.client.post(&self.stream_url))?
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;
            return Err(error_from_body(status.as_u16(), &text));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();

        Ok(reply_stream(body, user_turn, Arc::clone(&self.history)))
    }
}

fn error_from_body(status: u16, body: &str) -> LlmError {
    match serde_json::from_str::<GeminiErrorResponse>(body) {
        Ok(resp) => LlmError::from_status(status, &resp.error.message),
        Err(_) => LlmError::from_status(status, body),
    }
}

type ByteStream = BoxStream<'static, reqwest::Result<Vec<u8>>>;
type EventStream =
    BoxStream<'static, Result<eventsource_stream::Event, EventStreamError<reqwest::Error>>>;

/// State carried between polls of a streamed reply
struct ReplyState {
    events: EventStream,
    finished: bool,
    reply: String,
    user_turn: GeminiContent,
    history: Arc<Mutex<Vec<GeminiContent>>>,
}

impl ReplyState {
    /// Text carried by one event; an error payload ends the reply
    fn accept(&mut self, data: &str) -> Result<Option<String>, LlmError> {
        let chunk: GeminiResponse = serde_json::from_str(data)
            .map_err(|e| LlmError::unknown(format!("Failed to parse stream chunk: {e}")))?;

        if let Some(error) = chunk.error {
            let status = error.code.and_then(|c| u16::try_from(c).ok()).unwrap_or(500);
            return Err(LlmError::from_status(status, &error.message));
        }

        let text = chunk.text();
        if let Some(text) = &text {
            self.reply.push_str(text);
        }
        Ok(text)
    }

    /// Record the completed exchange in the session history
    fn commit(&mut self) {
        if self.reply.is_empty() {
            return;
        }
        let mut history = self.history.lock().unwrap();
        history.push(self.user_turn.clone());
        history.push(GeminiContent::model(&self.reply));
    }
}

fn stream_error(e: EventStreamError<reqwest::Error>) -> LlmError {
    match e {
        EventStreamError::Transport(e) => LlmError::from_transport(&e),
        other => LlmError::unknown(format!("Malformed event stream: {other}")),
    }
}

/// Turn the raw SSE body into ordered text fragments. History is only
/// extended once the body ends cleanly.
fn reply_stream(
    body: ByteStream,
    user_turn: GeminiContent,
    history: Arc<Mutex<Vec<GeminiContent>>>,
) -> FragmentStream {
    let state = ReplyState {
        events: body.eventsource().boxed(),
        finished: false,
        reply: String::new(),
        user_turn,
        history,
    };

    futures::stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }
        loop {
            let failure = match state.events.next().await {
                Some(Ok(event)) => match state.accept(&event.data) {
                    Ok(Some(fragment)) => return Some((Ok(fragment), state)),
                    Ok(None) => continue,
                    Err(e) => e,
                },
                Some(Err(e)) => stream_error(e),
                None => {
                    state.commit();
                    return None;
                }
            };
            state.finished = true;
            return Some((Err(failure), state));
        }
    })
    .boxed()
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn with_role(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(String::from),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
            }],
        }
    }

    fn system(text: &str) -> Self {
        Self::with_role(None, text)
    }

    fn user(text: &str) -> Self {
        Self::with_role(Some("user"), text)
    }

    fn model(text: &str) -> Self {
        Self::with_role(Some("model"), text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    error: Option<GeminiError>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, if any
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    code: Option<i64>,
}
