//! The access control guard for admin-only operations.

use notebuddy_store::Role;

use crate::api::AppState;
use crate::error::ApiError;
use crate::session::SessionContext;

/// Allow the request only if the caller is *currently* an admin.
///
/// The role is re-read from the users/roles tables on every call; the
/// session's cached role name is deliberately ignored so a demotion takes
/// effect on the very next guarded request, not at the next login.  Missing
/// users and unknown role names both deny.
pub async fn require_admin(state: &AppState, session: &SessionContext) -> Result<(), ApiError> {
    let db = state.db.lock().await;
    match db.get_user_role(session.user_id)? {
        Some(Role::Admin) => Ok(()),
        _ => {
            tracing::debug!(
                user_id = session.user_id,
                username = %session.username,
                "admin access denied"
            );
            Err(ApiError::Forbidden)
        }
    }
}
