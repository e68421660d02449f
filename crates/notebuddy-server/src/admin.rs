//! Admin-only endpoints.  Every handler consults the access control guard
//! before touching any store, so a mid-session demotion locks the caller out
//! on their next request.

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::Deserialize;

use notebuddy_store::{RoleInfo, UsageStats, UserWithRole};

use crate::api::AppState;
use crate::error::ApiError;
use crate::guard;
use crate::session::SessionContext;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub role_id: Option<i64>,
}

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<UserWithRole>>, ApiError> {
    guard::require_admin(&state, &session).await?;

    let db = state.db.lock().await;
    Ok(Json(db.list_users_with_roles()?))
}

/// PUT /api/admin/users/{id}/role
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    guard::require_admin(&state, &session).await?;

    let Some(role_id) = body.role_id else {
        return Err(ApiError::Validation("Role ID is required".into()));
    };

    let db = state.db.lock().await;
    if db.get_role(role_id)?.is_none() {
        return Err(ApiError::Validation("Role does not exist".into()));
    }
    db.set_user_role(user_id, role_id)?;

    tracing::info!(actor = %session.username, user_id, role_id, "role changed");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// DELETE /api/admin/users/{id}
///
/// Rejects self-deletion (admin lockout protection), then removes the user
/// and everything it owns in one transaction.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(user_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    guard::require_admin(&state, &session).await?;

    if user_id == session.user_id {
        return Err(ApiError::Validation("Cannot delete your own account".into()));
    }

    let mut db = state.db.lock().await;
    db.delete_user_cascade(user_id)?;

    tracing::info!(actor = %session.username, user_id, "user deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/admin/roles
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<RoleInfo>>, ApiError> {
    guard::require_admin(&state, &session).await?;

    let db = state.db.lock().await;
    Ok(Json(db.list_roles()?))
}

/// GET /api/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<UsageStats>, ApiError> {
    guard::require_admin(&state, &session).await?;

    let db = state.db.lock().await;
    Ok(Json(db.usage_stats()?))
}
