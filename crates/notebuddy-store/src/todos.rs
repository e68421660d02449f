//! Owner-scoped CRUD for [`Todo`] records.
//!
//! Every update/delete predicate includes the owner's user id.  A call that
//! names another user's todo id matches zero rows and reports `false`; it
//! never errors, so the HTTP layer can keep its silent-no-op contract.

use chrono::Utc;
use rusqlite::params;

use crate::database::{parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::models::Todo;

impl Database {
    /// Todos owned by `user_id`, newest first.
    pub fn list_todos(&self, user_id: i64) -> Result<Vec<Todo>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, title, completed, created_at
             FROM todos
             WHERE user_id = ?1
             ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], row_to_todo)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Insert a todo owned by `user_id`.
    pub fn create_todo(&self, user_id: i64, title: &str) -> Result<Todo> {
        let created_at = Utc::now();
        self.conn().execute(
            "INSERT INTO todos (user_id, title, completed, created_at)
             VALUES (?1, ?2, 0, ?3)",
            params![user_id, title, created_at.to_rfc3339()],
        )?;

        Ok(Todo {
            id: self.conn().last_insert_rowid(),
            user_id,
            title: title.to_string(),
            completed: false,
            created_at,
        })
    }

    /// Set the completion flag.  Returns `true` if a row owned by `user_id`
    /// matched.
    pub fn update_todo(&self, user_id: i64, todo_id: i64, completed: bool) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE todos SET completed = ?1 WHERE id = ?2 AND user_id = ?3",
            params![completed, todo_id, user_id],
        )?;
        Ok(affected > 0)
    }

    /// Delete a todo.  Idempotent; same owner-scoped predicate.
    pub fn delete_todo(&self, user_id: i64, todo_id: i64) -> Result<bool> {
        let affected = self.conn().execute(
            "DELETE FROM todos WHERE id = ?1 AND user_id = ?2",
            params![todo_id, user_id],
        )?;
        Ok(affected > 0)
    }
}

fn row_to_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    let completed: i64 = row.get(3)?;
    let created_str: String = row.get(4)?;
    Ok(Todo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        completed: completed != 0,
        created_at: parse_timestamp(4, &created_str)?,
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
    fn list_is_owner_scoped_and_newest_first() {
        let (db, a, b) = db_with_two_users();
        let first = db.create_todo(a, "first").unwrap();
        db.conn()
            .execute(
                "UPDATE todos SET created_at = '2000-01-01T00:00:00+00:00' WHERE id = ?1",
                params![first.id],
            )
            .unwrap();
        db.create_todo(a, "second").unwrap();
        db.create_todo(b, "not yours").unwrap();

        let todos = db.list_todos(a).unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].title, "second");
        assert_eq!(todos[1].title, "first");
        assert!(todos.iter().all(|t| t.user_id == a));
    }

    #[test]
    fn update_across_owners_is_a_silent_no_op() {
        let (db, a, b) = db_with_two_users();
        let todo = db.create_todo(a, "mine").unwrap();

        // B targeting A's id changes nothing and reports no match.
        assert!(!db.update_todo(b, todo.id, true).unwrap());
        let reread = &db.list_todos(a).unwrap()[0];
        assert!(!reread.completed);

        // The owner can flip it.
        assert!(db.update_todo(a, todo.id, true).unwrap());
        assert!(db.list_todos(a).unwrap()[0].completed);
    }

    #[test]
    fn delete_is_owner_scoped_and_idempotent() {
        let (db, a, b) = db_with_two_users();
        let todo = db.create_todo(a, "mine").unwrap();

        assert!(!db.delete_todo(b, todo.id).unwrap());
        assert_eq!(db.list_todos(a).unwrap().len(), 1);

        assert!(db.delete_todo(a, todo.id).unwrap());
        assert!(!db.delete_todo(a, todo.id).unwrap());
        assert!(db.list_todos(a).unwrap().is_empty());
    }
}
