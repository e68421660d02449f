//! Server-side session records referenced by the auth cookie.
//!
//! Each row carries a snapshot of the username and role name taken at login;
//! the snapshot goes stale on role change by design (documented trade-off:
//! privileged decisions re-read the users table instead of trusting it).

use chrono::{Duration, Utc};
use rusqlite::{params, OptionalExtension};

use crate::database::{parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::models::Session;

impl Database {
    /// Insert a session for a freshly authenticated user.
    pub fn create_session(
        &self,
        token: &str,
        user_id: i64,
        username: &str,
        role_name: &str,
        ttl: Duration,
    ) -> Result<Session> {
        let created_at = Utc::now();
        let expires_at = created_at + ttl;

        self.conn().execute(
            "INSERT INTO sessions (token, user_id, username, role_name, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token,
                user_id,
                username,
                role_name,
                created_at.to_rfc3339(),
                expires_at.to_rfc3339()
            ],
        )?;

        Ok(Session {
            token: token.to_string(),
            user_id,
            username: username.to_string(),
            role_name: role_name.to_string(),
            created_at,
            expires_at,
        })
    }

    /// Look up a live session by token.  Expired rows are treated as absent.
    pub fn get_session(&self, token: &str) -> Result<Option<Session>> {
        let now = Utc::now().to_rfc3339();
        self.conn()
            .query_row(
                "SELECT token, user_id, username, role_name, created_at, expires_at
                 FROM sessions WHERE token = ?1 AND expires_at > ?2",
                params![token, now],
                row_to_session,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    /// Remove a session (logout).  Returns `true` if a row was deleted.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(affected > 0)
    }

    /// Sweep expired rows.  Returns the number removed.
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let removed = self
            .conn()
            .execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
        if removed > 0 {
            tracing::debug!(removed, "purged expired sessions");
        }
        Ok(removed)
    }
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    let created_str: String = row.get(4)?;
    let expires_str: String = row.get(5)?;
    Ok(Session {
        token: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        role_name: row.get(3)?,
        created_at: parse_timestamp(4, &created_str)?,
        expires_at: parse_timestamp(5, &expires_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_user() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("alice", "alice@example.com", "phc", 2).unwrap();
        (db, user.id)
    }

    #[test]
    fn create_and_resolve_session() {
        let (db, user_id) = db_with_user();
        db.create_session("tok-1", user_id, "alice", "user", Duration::hours(1))
            .unwrap();

        let session = db.get_session("tok-1").unwrap().unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.username, "alice");
        assert_eq!(session.role_name, "user");

        assert!(db.get_session("unknown").unwrap().is_none());
    }

    #[test]
    fn expired_sessions_are_invisible_and_swept() {
        let (db, user_id) = db_with_user();
        db.create_session("stale", user_id, "alice", "user", Duration::hours(-1))
            .unwrap();
        db.create_session("live", user_id, "alice", "user", Duration::hours(1))
            .unwrap();

        assert!(db.get_session("stale").unwrap().is_none());
        assert!(db.get_session("live").unwrap().is_some());

        assert_eq!(db.cleanup_expired_sessions().unwrap(), 1);
        assert!(db.get_session("live").unwrap().is_some());
    }

    #[test]
    fn logout_deletes_the_row() {
        let (db, user_id) = db_with_user();
        db.create_session("tok", user_id, "alice", "user", Duration::hours(1))
            .unwrap();

        assert!(db.delete_session("tok").unwrap());
        assert!(!db.delete_session("tok").unwrap());
        assert!(db.get_session("tok").unwrap().is_none());
    }
}
