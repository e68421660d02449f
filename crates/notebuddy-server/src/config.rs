//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Filesystem path of the SQLite database.
    /// Env: `DATABASE_PATH`
    /// Default: `./notebuddy.db`
    pub database_path: PathBuf,

    /// Base URL of the Ollama-compatible inference service.
    /// Env: `OLLAMA_URL`
    /// Default: `http://localhost:11434`
    pub ollama_url: String,

    /// Model name sent with every generate request.
    /// Env: `OLLAMA_MODEL`
    /// Default: `llama3.2:3b`
    pub ollama_model: String,

    /// Timeout for a single inference request, in seconds.
    /// Env: `CHAT_TIMEOUT_SECS`
    /// Default: `30`
    pub chat_timeout_secs: u64,

    /// Session lifetime, in hours.
    /// Env: `SESSION_TTL_HOURS`
    /// Default: `24`
    pub session_ttl_hours: i64,

    /// Password for the seeded `admin` account (only used when the account
    /// does not exist yet).
    /// Env: `ADMIN_PASSWORD`
    /// Default: `admin123`
    pub admin_password: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            database_path: PathBuf::from("./notebuddy.db"),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
            chat_timeout_secs: 30,
            session_ttl_hours: 24,
            admin_password: "admin123".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.ollama_url = url;
        }

        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.ollama_model = model;
        }

        if let Ok(val) = std::env::var("CHAT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse::<u64>() {
                config.chat_timeout_secs = secs;
            } else {
                tracing::warn!(value = %val, "Invalid CHAT_TIMEOUT_SECS, using default");
            }
        }

        if let Ok(val) = std::env::var("SESSION_TTL_HOURS") {
            if let Ok(hours) = val.parse::<i64>() {
                config.session_ttl_hours = hours;
            } else {
                tracing::warn!(value = %val, "Invalid SESSION_TTL_HOURS, using default");
            }
        }

        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            if !password.is_empty() {
                config.admin_password = password;
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.chat_timeout_secs, 30);
        assert_eq!(config.session_ttl_hours, 24);
    }
}
