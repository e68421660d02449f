//! The assistant chat endpoint and its inference-service client.
//!
//! The inference call is a single bounded attempt.  Whatever happens, the
//! user gets HTTP 200 with a reply string (possibly one of the fixed
//! unavailability texts) and the exchange lands in the chat log, so the
//! conversation stays continuous across backend outages.

use std::time::Duration;

use axum::extract::{Extension, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use notebuddy_store::ChatMessage;

use crate::api::AppState;
use crate::error::ApiError;
use crate::session::SessionContext;

/// Reply when the inference service answered with a non-success status.
pub const FALLBACK_UNAVAILABLE: &str = "Sorry, I am currently unavailable.";
/// Reply when the inference service could not be reached at all (connection
/// failure or timeout).
pub const FALLBACK_UNREACHABLE: &str =
    "Sorry, I am currently unavailable. Please make sure Ollama is running.";
/// Reply when the service returned success but no usable text.
const EMPTY_RESPONSE: &str = "No response from AI";

/// How many chat-log rows `/api/chat/history` returns.
const HISTORY_LIMIT: u32 = 50;

// ---------------------------------------------------------------------------
// Inference client
// ---------------------------------------------------------------------------

/// Thin client for an Ollama-compatible `/api/generate` endpoint.
pub struct InferenceClient {
    http: reqwest::Client,
    generate_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl InferenceClient {
    /// Build a client with the given base URL, model and request timeout.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            generate_url: format!("{}/api/generate", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    /// One attempt, no retry, no backoff.  Failures never escape: the
    /// returned string is always presentable to the user.
    pub async fn generate(&self, prompt: &str) -> String {
        let result = self
            .http
            .post(&self.generate_url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => match resp.json::<GenerateResponse>().await {
                Ok(body) => body
                    .response
                    .unwrap_or_else(|| EMPTY_RESPONSE.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "inference response was not decodable");
                    EMPTY_RESPONSE.to_string()
                }
            },
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), "inference service returned an error");
                FALLBACK_UNAVAILABLE.to_string()
            }
            Err(e) => {
                tracing::warn!(error = %e, "inference service unreachable");
                FALLBACK_UNREACHABLE.to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /api/chat
pub async fn send_message(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = body.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        return Err(ApiError::Validation("Message is required".into()));
    }

    // The store lock is not held across the (slow) inference call.
    let response = state.inference.generate(message).await;

    {
        let db = state.db.lock().await;
        db.insert_chat_message(session.user_id, message, &response)?;
    }

    Ok(Json(ChatResponse { response }))
}

/// GET /api/chat/history
pub async fn history(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let db = state.db.lock().await;
    Ok(Json(db.chat_history(session.user_id, HISTORY_LIMIT)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_service_yields_fixed_fallback() {
        // Nothing listens on the discard port; connection is refused fast.
        let client =
            InferenceClient::new("http://127.0.0.1:9", "test-model", Duration::from_secs(2))
                .unwrap();
        let reply = client.generate("hello?").await;
        assert_eq!(reply, FALLBACK_UNREACHABLE);
    }

    #[test]
    fn generate_url_is_normalized() {
        let client = InferenceClient::new(
            "http://localhost:11434/",
            "llama3.2:3b",
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(client.generate_url, "http://localhost:11434/api/generate");
    }
}
