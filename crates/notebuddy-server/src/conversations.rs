//! Saved-conversation endpoints.
//!
//! A conversation is a titled, ordered array of chat turns.  The turn array
//! is validated on the way in and decoded with an explicit error on the way
//! out; undecodable stored data becomes a handled 500, never a panic.

use axum::extract::{Extension, Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use notebuddy_store::{ChatTurn, ConversationSummary};

use crate::api::AppState;
use crate::error::ApiError;
use crate::session::SessionContext;

#[derive(Debug, Deserialize)]
pub struct SaveConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatTurn>>,
    /// When present, update that conversation instead of creating a new one.
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SaveConversationResponse {
    pub id: i64,
    pub title: String,
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    pub id: i64,
    pub title: String,
    pub messages: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let db = state.db.lock().await;
    Ok(Json(db.list_conversations(session.user_id)?))
}

/// POST /api/conversations  (insert, or owner-scoped update when
/// `conversation_id` is given)
pub async fn save_conversation(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<SaveConversationRequest>,
) -> Result<Json<SaveConversationResponse>, ApiError> {
    let title = body.title.as_deref().map(str::trim).unwrap_or_default();
    let turns = body.messages.unwrap_or_default();
    if title.is_empty() || turns.is_empty() {
        return Err(ApiError::Validation("Title and messages are required".into()));
    }

    let messages_json =
        serde_json::to_string(&turns).map_err(|e| ApiError::Internal(e.into()))?;

    let db = state.db.lock().await;
    let id = match body.conversation_id {
        // Foreign ids match zero rows; the response still reports success.
        Some(id) => {
            db.update_conversation(session.user_id, id, title, &messages_json)?;
            id
        }
        None => db.create_conversation(session.user_id, title, &messages_json)?,
    };

    Ok(Json(SaveConversationResponse {
        id,
        title: title.to_string(),
        success: true,
    }))
}

/// GET /api/conversations/{id}
pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
) -> Result<Json<ConversationDetail>, ApiError> {
    let conversation = {
        let db = state.db.lock().await;
        db.get_conversation(session.user_id, id)?
    }
    .ok_or(ApiError::NotFound("Conversation"))?;

    let messages: Vec<ChatTurn> = serde_json::from_str(&conversation.messages)
        .map_err(|_| ApiError::CorruptData("Invalid conversation data"))?;

    Ok(Json(ConversationDetail {
        id: conversation.id,
        title: conversation.title,
        messages,
        created_at: conversation.created_at,
        updated_at: conversation.updated_at,
    }))
}

/// DELETE /api/conversations/{id}  (idempotent, silent no-op on foreign ids)
pub async fn delete_conversation(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    db.delete_conversation(session.user_id, id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}
