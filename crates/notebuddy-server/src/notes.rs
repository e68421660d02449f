//! Owner-scoped note endpoints, including export.

use axum::extract::{Extension, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use notebuddy_store::{Note, NoteContent};

use crate::api::AppState;
use crate::error::ApiError;
use crate::session::SessionContext;

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Payload returned for `format=pdf`: the client-side renderer builds the
/// document from these fields.
#[derive(Debug, Serialize)]
pub struct ExportPayload {
    pub title: String,
    pub content: String,
    pub html: String,
}

/// GET /api/notes
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let db = state.db.lock().await;
    Ok(Json(db.list_notes(session.user_id)?))
}

/// POST /api/notes
pub async fn create_note(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<CreateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    let title = body.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".into()));
    }
    let content = body.content.unwrap_or_default();

    let db = state.db.lock().await;
    Ok(Json(db.create_note(session.user_id, title, &content)?))
}

/// PUT /api/notes/{id}  (silent no-op on foreign ids)
pub async fn update_note(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(note_id): Path<i64>,
    Json(body): Json<UpdateNoteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (Some(title), Some(content)) = (body.title, body.content) else {
        return Err(ApiError::Validation("Title and content are required".into()));
    };

    let db = state.db.lock().await;
    db.update_note(session.user_id, note_id, &title, &content)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /api/notes/{id}  (idempotent, silent no-op on foreign ids)
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(note_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state.db.lock().await;
    db.delete_note(session.user_id, note_id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/notes/{id}/export/{format}
///
/// `html` returns a standalone document; `pdf` returns the text/html payload
/// as JSON.  Legacy plain-text notes export with the raw text wrapped in a
/// paragraph tag instead of failing to parse.
pub async fn export_note(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path((note_id, format)): Path<(i64, String)>,
) -> Result<Response, ApiError> {
    let note = {
        let db = state.db.lock().await;
        db.get_note(session.user_id, note_id)?
    }
    .ok_or(ApiError::NotFound("Note"))?;

    let (text, html) = match NoteContent::parse(&note.content) {
        NoteContent::Rich { text, html } => (text, html),
        NoteContent::Plain(raw) => {
            let html = format!("<p>{raw}</p>");
            (raw, html)
        }
    };

    match format.as_str() {
        "pdf" => Ok(Json(ExportPayload {
            title: note.title,
            content: text,
            html,
        })
        .into_response()),
        "html" => {
            let document = html_document(&note.title, &html);
            Ok((
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                document,
            )
                .into_response())
        }
        _ => Err(ApiError::Validation("Invalid format".into())),
    }
}

/// Wrap an exported note body in a minimal standalone HTML document.
fn html_document(title: &str, body_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; line-height: 1.6; }}
        h1 {{ margin-bottom: 20px; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    {body_html}
</body>
</html>
"#
    )
}
