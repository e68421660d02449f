//! Owner-scoped todo endpoints.

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Deserialize;

use notebuddy_store::Todo;

use crate::api::AppState;
use crate::error::ApiError;
use crate::session::SessionContext;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub completed: Option<bool>,
}

/// GET /api/todos
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let db = state.db.lock().await;
    Ok(Json(db.list_todos(session.user_id)?))
}

/// POST /api/todos
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<CreateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    let title = body.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }

    let db = state.db.lock().await;
    // Owner is always the caller; there is no owner field to spoof.
    Ok(Json(db.create_todo(session.user_id, title)?))
}

/// PUT /api/todos/{id}
///
/// Reports success even when the id belongs to another user: the owner-scoped
/// predicate matches zero rows and nothing changes, without leaking that the
/// row exists.
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(todo_id): Path<i64>,
    Json(body): Json<UpdateTodoRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(completed) = body.completed else {
        return Err(ApiError::Validation("Completed flag is required".into()));
    };

    let db = state.db.lock().await;
    db.update_todo(session.user_id, todo_id, completed)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /api/todos/{id}  (idempotent, same silent no-op contract)
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(todo_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    db.delete_todo(session.user_id, todo_id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}
