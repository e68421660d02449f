//! Per-request session resolution.
//!
//! The auth cookie carries a random token referencing a server-side session
//! row.  [`auth_middleware`] resolves it once per request into a
//! [`SessionContext`] value stored in the request extensions; nothing global
//! holds a "current user".

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use notebuddy_store::Role;

use crate::api::AppState;
use crate::error::ApiError;

/// Name of the auth cookie.
pub const SESSION_COOKIE: &str = "notebuddy_session";

/// Request-scoped identity resolved from the auth cookie.
///
/// `role` is the snapshot cached in the session row at login.  It is fine
/// for display (`/api/me`, landing redirects) but privileged decisions go
/// through the guard, which re-reads the users table.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// Build the `Set-Cookie` value for a fresh session.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Build the `Set-Cookie` value that expires the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Extract the session token from the request's `Cookie` header(s).
pub fn cookie_token(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((name, token)) = pair.trim().split_once('=') {
                if name == SESSION_COOKIE && !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    None
}

/// Resolve the caller's session, or fail with `Unauthenticated`.
pub async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionContext, ApiError> {
    let token = cookie_token(headers).ok_or(ApiError::Unauthenticated)?;

    let db = state.db.lock().await;
    let session = db.get_session(&token)?.ok_or(ApiError::Unauthenticated)?;

    Ok(SessionContext {
        user_id: session.user_id,
        username: session.username,
        // Unknown role names degrade to the unprivileged role.
        role: Role::from_name(&session.role_name).unwrap_or(Role::User),
    })
}

/// Authentication middleware: validates the session cookie and stores the
/// resolved [`SessionContext`] in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = resolve_session(&state, request.headers()).await?;
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn token_is_extracted_from_cookie_header() {
        let headers = headers_with_cookie("notebuddy_session=abc123");
        assert_eq!(cookie_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn token_is_found_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; notebuddy_session=tok; lang=en");
        assert_eq!(cookie_token(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        assert_eq!(cookie_token(&HeaderMap::new()), None);
        let headers = headers_with_cookie("theme=dark");
        assert_eq!(cookie_token(&headers), None);
        let headers = headers_with_cookie("notebuddy_session=");
        assert_eq!(cookie_token(&headers), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("tok", 3600);
        assert!(cookie.starts_with("notebuddy_session=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));

        let cleared = clear_session_cookie();
        assert!(cleared.contains("Max-Age=0"));
    }
}
