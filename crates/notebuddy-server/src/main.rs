//! # notebuddy-server
//!
//! HTTP server for the NoteBuddy personal productivity app.
//!
//! This binary provides:
//! - **Session-cookie authentication** (register / login / logout) with
//!   Argon2id password hashing
//! - **Owner-scoped resource APIs** for todos, notes, chat history, and
//!   saved conversations -- every query is filtered by the caller's user id
//! - **An assistant chat endpoint** proxied to a local Ollama-compatible
//!   inference service, with a fixed fallback reply when it is down
//! - **An admin API** (users, roles, stats, cascading account delete) gated
//!   by a role check that re-reads storage on every call

mod admin;
mod api;
mod auth;
mod chat;
mod config;
mod conversations;
mod error;
mod guard;
mod notes;
mod password;
mod session;
mod todos;

use tracing::info;
use tracing_subscriber::EnvFilter;

use notebuddy_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;

/// How often expired session rows are swept.
const SESSION_SWEEP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,notebuddy_server=debug")),
        )
        .init();

    info!("Starting NoteBuddy server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(
        addr = %config.http_addr,
        db = %config.database_path.display(),
        ollama = %config.ollama_url,
        model = %config.ollama_model,
        "Loaded configuration"
    );

    // -----------------------------------------------------------------------
    // 3. Open the database and seed the default admin account
    // -----------------------------------------------------------------------
    let db = Database::open_at(&config.database_path)?;
    auth::ensure_admin_account(&db, &config)?;

    let http_addr = config.http_addr;
    let state = AppState::new(db, config)?;

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Periodic sweep of expired session rows.
    let sweep_db = state.db.clone();
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let db = sweep_db.lock().await;
            if let Err(e) = db.cleanup_expired_sessions() {
                tracing::warn!(error = %e, "session sweep failed");
            }
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
