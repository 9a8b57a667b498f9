//! HTTP surface: chat-completion proxy and health probe.
//!
//! The proxy forwards one user message (optionally prefixed with caller
//! context) to an OpenAI-compatible `/chat/completions` endpoint and returns
//! the first choice's content.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::RelayError;
use crate::infra::BearerToken;

/// Reply used when the upstream answers without usable content.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat request payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User message; required.
    #[serde(default)]
    pub message: Option<String>,
    /// Optional context placed before the message.
    #[serde(default)]
    pub context: Option<String>,
}

/// Successful chat response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Assistant reply.
    pub reply: String,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Why a chat request could not be answered.
#[derive(Debug)]
pub enum ChatError {
    /// No usable `message` in the request.
    MissingMessage,
    /// The upstream credential is not configured.
    MissingCredential,
    /// Transport or decoding failure talking to the upstream.
    Upstream(RelayError),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::MissingMessage => (StatusCode::BAD_REQUEST, "No message provided"),
            Self::MissingCredential => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Missing upstream API key")
            }
            Self::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// A chat-completion backend.
#[async_trait]
pub trait CompletionUpstream: Send + Sync {
    /// Whether credentials are available for a call.
    fn is_configured(&self) -> bool {
        true
    }

    /// Complete `prompt` under `system`; `None` when the answer has no content.
    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, RelayError>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
    }
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiUpstream {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: BearerToken,
    timeout: Duration,
}

impl OpenAiUpstream {
    /// Create a client for `endpoint` (API root, e.g. `https://api.openai.com/v1`).
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: BearerToken,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl CompletionUpstream for OpenAiUpstream {
    fn is_configured(&self) -> bool {
        self.api_key.resolve().is_ok()
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, RelayError> {
        let key = self.api_key.resolve().map_err(RelayError::Upstream)?;
        let url = format!("{}/chat/completions", self.endpoint.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
        });

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::Timeout(self.timeout.as_millis())
                } else {
                    RelayError::Upstream(format!("completion request failed: {e}"))
                }
            })?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "completion upstream returned an error status");
        }
        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Upstream(format!("completion decode failed: {e}")))?;
        Ok(parsed.into_content())
    }
}

/// Prompt sent upstream: `"{context}\nUser: {message}"`, or the bare message
/// when there is no context.
pub fn build_prompt(context: Option<&str>, message: &str) -> String {
    match context.filter(|c| !c.is_empty()) {
        Some(context) => format!("{context}\nUser: {message}"),
        None => message.to_string(),
    }
}

/// Request handling independent of the HTTP framework.
pub struct ChatProxy {
    upstream: Arc<dyn CompletionUpstream>,
    system_prompt: String,
}

impl ChatProxy {
    /// Create a proxy over `upstream`.
    pub fn new(upstream: Arc<dyn CompletionUpstream>, system_prompt: impl Into<String>) -> Self {
        Self {
            upstream,
            system_prompt: system_prompt.into(),
        }
    }

    /// Answer one request.
    pub async fn reply(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let message = request
            .message
            .filter(|m| !m.is_empty())
            .ok_or(ChatError::MissingMessage)?;
        if !self.upstream.is_configured() {
            tracing::error!("chat upstream credential missing");
            return Err(ChatError::MissingCredential);
        }

        let prompt = build_prompt(request.context.as_deref(), &message);
        match self.upstream.complete(&self.system_prompt, &prompt).await {
            Ok(Some(reply)) => Ok(ChatReply { reply }),
            Ok(None) => Ok(ChatReply {
                reply: FALLBACK_REPLY.to_string(),
            }),
            Err(e) => {
                tracing::error!("chat upstream failed: {e}");
                Err(ChatError::Upstream(e))
            }
        }
    }
}

async fn chat(
    State(proxy): State<Arc<ChatProxy>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ChatError> {
    // An unreadable body is treated as a request without a message.
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    proxy.reply(request).await.map(Json)
}

async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

/// Routes: `POST /chat`, `GET /health`.
pub fn router(proxy: Arc<ChatProxy>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(proxy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_with_and_without_context() {
        assert_eq!(build_prompt(Some("Budget: 100"), "hi"), "Budget: 100\nUser: hi");
        assert_eq!(build_prompt(Some(""), "hi"), "hi");
        assert_eq!(build_prompt(None, "hi"), "hi");
    }

    #[test]
    fn completion_content_extraction() {
        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Save more."}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_content().as_deref(), Some("Save more."));

        let error_body: CompletionResponse =
            serde_json::from_str(r#"{"error":{"message":"rate limited"}}"#).unwrap();
        assert_eq!(error_body.into_content(), None);
    }
}
