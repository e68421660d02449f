//! Authentication endpoints: register, login, logout, and `/api/me`.
//!
//! Login and register speak classic form-encoding and redirect on success so
//! the plain HTML front-end can drive them; failures come back as the usual
//! `{"error"}` JSON.

use axum::extract::{Extension, Form, State};
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notebuddy_store::{Database, Role, ADMIN_ROLE_ID, USER_ROLE_ID};

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::password;
use crate::session::{self, SessionContext};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let (user, role_name) = {
        let db = state.db.lock().await;
        let Some(user) = db.get_user_by_username(form.username.trim())? else {
            return Err(ApiError::InvalidCredentials);
        };
        let role_name = db
            .get_role(user.role_id)?
            .map(|r| r.name)
            .unwrap_or_else(|| Role::User.name().to_string());
        (user, role_name)
    };

    // Argon2 verify runs outside the store lock; it is deliberately slow.
    if !password::verify_password(&user.password_hash, &form.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = Uuid::new_v4().to_string();
    let ttl = Duration::hours(state.config.session_ttl_hours);
    {
        let db = state.db.lock().await;
        db.create_session(&token, user.id, &user.username, &role_name, ttl)?;
    }

    tracing::info!(user = %user.username, role = %role_name, "login");

    // Admins land on the dashboard, everyone else on the app.
    let destination = match Role::from_name(&role_name) {
        Some(Role::Admin) => "/admin",
        _ => "/",
    };

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            session::session_cookie(&token, ttl.num_seconds()),
        )]),
        Redirect::to(destination),
    ))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<impl IntoResponse, ApiError> {
    let username = form.username.trim();
    let email = form.email.trim();

    if username.is_empty() || email.is_empty() {
        return Err(ApiError::Validation("Username and email are required".into()));
    }
    if form.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }

    let password_hash = password::hash_password(&form.password)?;

    {
        let db = state.db.lock().await;
        // Duplicate username/email surfaces as a 400 conflict message.
        db.create_user(username, email, &password_hash, USER_ROLE_ID)?;
    }

    tracing::info!(user = %username, "registered");
    Ok(Redirect::to("/login"))
}

/// GET /logout
///
/// Public on purpose: logging out with a dead or missing cookie is still a
/// successful logout.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = session::cookie_token(&headers) {
        let db = state.db.lock().await;
        db.delete_session(&token)?;
    }

    Ok((
        AppendHeaders([(header::SET_COOKIE, session::clear_session_cookie())]),
        Redirect::to("/login"),
    ))
}

/// GET /api/me
pub async fn me(Extension(session): Extension<SessionContext>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: session.user_id,
        username: session.username,
        role: session.role,
    })
}

/// Seed the default `admin` account on first start.
pub fn ensure_admin_account(db: &Database, config: &ServerConfig) -> anyhow::Result<()> {
    if db.get_user_by_username("admin")?.is_none() {
        let password_hash = password::hash_password(&config.admin_password)?;
        db.create_user("admin", "admin@notebuddy.com", &password_hash, ADMIN_ROLE_ID)?;
        tracing::info!("seeded default admin account");
    }
    Ok(())
}
