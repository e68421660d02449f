//! Application state, router assembly, and the HTTP entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use notebuddy_store::Database;

use crate::chat::InferenceClient;
use crate::config::ServerConfig;
use crate::session;
use crate::{admin, auth, chat, conversations, notes, todos};

#[derive(Clone)]
pub struct AppState {
    /// The store handle.  One writer at a time, like the single SQLite file
    /// underneath; handlers take the lock only around their store calls.
    pub db: Arc<Mutex<Database>>,
    pub inference: Arc<InferenceClient>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> anyhow::Result<Self> {
        let inference = InferenceClient::new(
            &config.ollama_url,
            &config.ollama_model,
            Duration::from_secs(config.chat_timeout_secs),
        )?;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            inference: Arc::new(inference),
            config: Arc::new(config),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    // Everything here resolves a session first; handlers receive the
    // SessionContext extension inserted by the middleware.
    let protected = Router::new()
        .route("/api/me", get(auth::me))
        .route("/api/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/api/todos/{id}",
            put(todos::update_todo).delete(todos::delete_todo),
        )
        .route("/api/notes", get(notes::list_notes).post(notes::create_note))
        .route(
            "/api/notes/{id}",
            put(notes::update_note).delete(notes::delete_note),
        )
        .route("/api/notes/{id}/export/{format}", get(notes::export_note))
        .route("/api/chat", post(chat::send_message))
        .route("/api/chat/history", get(chat::history))
        .route(
            "/api/conversations",
            get(conversations::list_conversations).post(conversations::save_conversation),
        )
        .route(
            "/api/conversations/{id}",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}/role", put(admin::update_user_role))
        .route("/api/admin/users/{id}", delete(admin::delete_user))
        .route("/api/admin/roles", get(admin::list_roles))
        .route("/api/admin/stats", get(admin::stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", get(auth::logout))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
