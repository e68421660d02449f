//! Owner-scoped CRUD for [`Note`] records.
//!
//! `updated_at` is refreshed on every content mutation and drives the
//! listing order.  The same silent-no-op ownership contract as todos applies.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::{parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::models::Note;

impl Database {
    /// Notes owned by `user_id`, most recently updated first.
    pub fn list_notes(&self, user_id: i64) -> Result<Vec<Note>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, title, content, created_at, updated_at
             FROM notes
             WHERE user_id = ?1
             ORDER BY updated_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], row_to_note)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Fetch one note through the owner-scoped predicate.
    pub fn get_note(&self, user_id: i64, note_id: i64) -> Result<Option<Note>> {
        self.conn()
            .query_row(
                "SELECT id, user_id, title, content, created_at, updated_at
                 FROM notes WHERE id = ?1 AND user_id = ?2",
                params![note_id, user_id],
                row_to_note,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    /// Insert a note owned by `user_id`.
    pub fn create_note(&self, user_id: i64, title: &str, content: &str) -> Result<Note> {
        let now = Utc::now();
        self.conn().execute(
            "INSERT INTO notes (user_id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![user_id, title, content, now.to_rfc3339()],
        )?;

        Ok(Note {
            id: self.conn().last_insert_rowid(),
            user_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace title and content, refreshing `updated_at`.  Returns `true`
    /// if a row owned by `user_id` matched.
    pub fn update_note(
        &self,
        user_id: i64,
        note_id: i64,
        title: &str,
        content: &str,
    ) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE notes SET title = ?1, content = ?2, updated_at = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![title, content, Utc::now().to_rfc3339(), note_id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Delete a note.  Idempotent; owner-scoped.
    pub fn delete_note(&self, user_id: i64, note_id: i64) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            params![note_id, user_id],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_note(row: &rusqlite::Row<'_>) -> rusqlite::Result<Note> {
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;
    Ok(Note {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        created_at: parse_timestamp(4, &created_str)?,
        updated_at: parse_timestamp(5, &updated_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_two_users() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let a = db.create_user("a", "a@example.com", "phc", 2).unwrap();
        let b = db.create_user("b", "b@example.com", "phc", 2).unwrap();
        (db, a.id, b.id)
    }

    #[test]
    fn update_refreshes_updated_at_and_ordering() {
        let (db, a, _) = db_with_two_users();
        let older = db.create_note(a, "older", "x").unwrap();
        let newer = db.create_note(a, "newer", "y").unwrap();
        db.conn()
            .execute(
                "UPDATE notes SET updated_at = '2000-01-01T00:00:00+00:00' WHERE id = ?1",
                params![older.id],
            )
            .unwrap();

        assert_eq!(db.list_notes(a).unwrap()[0].id, newer.id);

        // Touching the older note bumps it back to the top.
        assert!(db.update_note(a, older.id, "older", "edited").unwrap());
        let notes = db.list_notes(a).unwrap();
        assert_eq!(notes[0].id, older.id);
        assert_eq!(notes[0].content, "edited");
        assert!(notes[0].updated_at > notes[0].created_at);
    }

    #[test]
    fn get_is_owner_scoped() {
        let (db, a, b) = db_with_two_users();
        let note = db.create_note(a, "mine", "secret").unwrap();

        assert!(db.get_note(a, note.id).unwrap().is_some());
        assert!(db.get_note(b, note.id).unwrap().is_none());
    }

    #[test]
    fn update_and_delete_across_owners_are_silent_no_ops() {
        let (db, a, b) = db_with_two_users();
        let note = db.create_note(a, "mine", "original").unwrap();

        assert!(!db.update_note(b, note.id, "stolen", "hacked").unwrap());
        assert!(!db.delete_note(b, note.id).unwrap());

        let intact = db.get_note(a, note.id).unwrap().unwrap();
        assert_eq!(intact.title, "mine");
        assert_eq!(intact.content, "original");

        assert!(db.delete_note(a, note.id).unwrap());
        assert!(!db.delete_note(a, note.id).unwrap());
    }
}
