//! The per-user chat log.
//!
//! Append-only from the HTTP layer's point of view: one row per exchange,
//! including exchanges where the inference service was unavailable and the
//! fixed fallback text was substituted.

use chrono::Utc;
use rusqlite::params;

use crate::database::{parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::models::ChatMessage;

impl Database {
    /// Append an exchange to the caller's chat log.
    pub fn insert_chat_message(
        &self,
        user_id: i64,
        message: &str,
        response: &str,
    ) -> Result<ChatMessage> {
        let timestamp = Utc::now();
        self.conn().execute(
            "INSERT INTO chat_messages (user_id, message, response, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, message, response, timestamp.to_rfc3339()],
        )?;

        Ok(ChatMessage {
            id: self.conn().last_insert_rowid(),
            user_id,
            message: message.to_string(),
            response: response.to_string(),
            timestamp,
        })
    }

    /// The caller's most recent exchanges, newest first, capped at `limit`.
    pub fn chat_history(&self, user_id: i64, limit: u32) -> Result<Vec<ChatMessage>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, message, response, timestamp
             FROM chat_messages
             WHERE user_id = ?1
             ORDER BY timestamp DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![user_id, limit], row_to_chat_message)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

fn row_to_chat_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    let ts_str: String = row.get(4)?;
    Ok(ChatMessage {
        id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        response: row.get(3)?,
        timestamp: parse_timestamp(4, &ts_str)?,
    })
}
