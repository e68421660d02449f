//! Owner-scoped CRUD for saved [`Conversation`] records.
//!
//! The `messages` column holds the serialized turn array exactly as the
//! HTTP layer validated it; decoding back out (with its fallback) also lives
//! there.  Listing returns summaries without the payload.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::{parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::models::{Conversation, ConversationSummary};

impl Database {
    /// Conversation summaries owned by `user_id`, most recently updated first.
    pub fn list_conversations(&self, user_id: i64) -> Result<Vec<ConversationSummary>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, title, created_at, updated_at
             FROM conversations
             WHERE user_id = ?1
             ORDER BY updated_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            let created_str: String = row.get(2)?;
            let updated_str: String = row.get(3)?;
            Ok(ConversationSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                created_at: parse_timestamp(2, &created_str)?,
                updated_at: parse_timestamp(3, &updated_str)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Fetch one conversation (with payload) through the owner-scoped
    /// predicate.
    pub fn get_conversation(&self, user_id: i64, id: i64) -> Result<Option<Conversation>> {
        self.conn()
            .query_row(
                "SELECT id, user_id, title, messages, created_at, updated_at
                 FROM conversations WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                row_to_conversation,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    /// Insert a new conversation and return its id.
    pub fn create_conversation(
        &self,
        user_id: i64,
        title: &str,
        messages_json: &str,
    ) -> Result<i64> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO conversations (user_id, title, messages, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![user_id, title, messages_json, now.to_rfc3339()],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Replace title and payload, refreshing `updated_at`.  Returns `true`
    /// if a row owned by `user_id` matched.
    pub fn update_conversation(
        &self,
        user_id: i64,
        id: i64,
        title: &str,
        messages_json: &str,
    ) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE conversations SET title = ?1, messages = ?2, updated_at = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![title, messages_json, Utc::now().to_rfc3339(), id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Delete a conversation.  Idempotent; owner-scoped.
    pub fn delete_conversation(&self, user_id: i64, id: i64) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM conversations WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        messages: row.get(3)?,
        created_at: parse_timestamp(4, &created_str)?,
        updated_at: parse_timestamp(5, &updated_str)?,
    })
}
