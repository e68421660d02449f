//! CRUD operations for [`User`] records, the fresh role lookup behind the
//! admin guard, and the cascading account delete.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use crate::database::{parse_timestamp, Database};
use crate::error::{Result, StoreError};
use crate::models::{Role, UsageStats, User, UserWithRole};

/// User-visible message for a registration that collides with an existing row.
pub const DUPLICATE_USER_MESSAGE: &str = "Username or email already exists";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new user.  A UNIQUE collision on username or email surfaces
    /// as [`StoreError::Conflict`] with [`DUPLICATE_USER_MESSAGE`]; nothing
    /// is committed in that case.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role_id: i64,
    ) -> Result<User> {
        let created_at = Utc::now();
        self.conn()
            .execute(
                "INSERT INTO users (username, email, password_hash, role_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    username,
                    email,
                    password_hash,
                    role_id,
                    created_at.to_rfc3339()
                ],
            )
            .map_err(|e| StoreError::on_conflict(e, DUPLICATE_USER_MESSAGE))?;

        Ok(User {
            id: self.conn().last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role_id,
            created_at,
        })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a user by login name.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.conn()
            .query_row(
                "SELECT id, username, email, password_hash, role_id, created_at
                 FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    /// Current role of a user, read fresh from the users/roles tables.
    ///
    /// This is the lookup the admin guard relies on: it must never be
    /// replaced by the session's cached role name, otherwise a demoted admin
    /// keeps privileges until re-login.  Returns `None` for a missing user
    /// or an unrecognized role name.
    pub fn get_user_role(&self, user_id: i64) -> Result<Option<Role>> {
        let name: Option<String> = self
            .conn()
            .query_row(
                "SELECT r.name FROM users u JOIN roles r ON u.role_id = r.id
                 WHERE u.id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(name.as_deref().and_then(Role::from_name))
    }

    /// All users joined with their role, newest account first.
    pub fn list_users_with_roles(&self) -> Result<Vec<UserWithRole>> {
        let mut stmt = self.conn().prepare(
            "SELECT u.id, u.username, u.email, u.created_at, r.id, r.name
             FROM users u JOIN roles r ON u.role_id = r.id
             ORDER BY u.created_at DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let created_str: String = row.get(3)?;
            Ok(UserWithRole {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                created_at: parse_timestamp(3, &created_str)?,
                role_id: row.get(4)?,
                role_name: row.get(5)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Reassign a user's role.  Returns `true` if the user row existed.
    pub fn set_user_role(&self, user_id: i64, role_id: i64) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE users SET role_id = ?1 WHERE id = ?2",
            params![role_id, user_id],
        )?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a user together with everything it owns, as one transaction.
    ///
    /// Order: todos, notes, chat messages, conversations, sessions, then the
    /// user row itself.  Either all six deletes commit or none are visible.
    /// Removing the sessions revokes any live cookie the account still had.
    ///
    /// Returns `true` if the user row existed.
    pub fn delete_user_cascade(&mut self, user_id: i64) -> Result<bool> {
        let tx = self.conn_mut().transaction()?;

        tx.execute("DELETE FROM todos WHERE user_id = ?1", params![user_id])?;
        tx.execute("DELETE FROM notes WHERE user_id = ?1", params![user_id])?;
        tx.execute(
            "DELETE FROM chat_messages WHERE user_id = ?1",
            params![user_id],
        )?;
        tx.execute(
            "DELETE FROM conversations WHERE user_id = ?1",
            params![user_id],
        )?;
        tx.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?;
        let affected = tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;

        tx.commit()?;

        if affected > 0 {
            tracing::info!(user_id, "deleted user and all owned resources");
        }
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    /// Aggregate row counts for the admin dashboard.
    pub fn usage_stats(&self) -> Result<UsageStats> {
        let count = |table: &str| -> Result<i64> {
            // Table names are the fixed literals below, never user input.
            let sql = format!("SELECT COUNT(*) FROM {table}");
            self.conn()
                .query_row(&sql, [], |row| row.get(0))
                .map_err(StoreError::Sqlite)
        };

        Ok(UsageStats {
            users: count("users")?,
            todos: count("todos")?,
            notes: count("notes")?,
            conversations: count("conversations")?,
        })
    }
}

/// Map a `rusqlite::Row` to a [`User`].
fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_str: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role_id: row.get(4)?,
        created_at: parse_timestamp(5, &created_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatTurn;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn count(db: &Database, table: &str, user_id: i64) -> i64 {
        db.conn()
            .query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE user_id = ?1"),
                params![user_id],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn create_and_fetch_user() {
        let db = db();
        let user = db.create_user("alice", "alice@example.com", "phc", 2).unwrap();
        assert!(user.id > 0);

        let fetched = db.get_user_by_username("alice").unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(fetched.role_id, 2);

        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_or_email_conflicts() {
        let db = db();
        db.create_user("alice", "alice@example.com", "phc", 2).unwrap();

        let same_name = db.create_user("alice", "other@example.com", "phc", 2);
        assert!(matches!(same_name, Err(StoreError::Conflict(_))));

        let same_email = db.create_user("bob", "alice@example.com", "phc", 2);
        assert!(matches!(same_email, Err(StoreError::Conflict(_))));

        // No partial rows were committed.
        let users: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 1);
    }

    #[test]
    fn role_lookup_reflects_reassignment() {
        let db = db();
        let user = db.create_user("alice", "alice@example.com", "phc", 2).unwrap();
        assert_eq!(db.get_user_role(user.id).unwrap(), Some(Role::User));

        assert!(db.set_user_role(user.id, 1).unwrap());
        assert_eq!(db.get_user_role(user.id).unwrap(), Some(Role::Admin));

        assert!(db.set_user_role(user.id, 2).unwrap());
        assert_eq!(db.get_user_role(user.id).unwrap(), Some(Role::User));

        assert_eq!(db.get_user_role(9999).unwrap(), None);
    }

    #[test]
    fn cascade_delete_removes_all_owned_rows() {
        let mut db = db();
        let user = db.create_user("doomed", "doomed@example.com", "phc", 2).unwrap();
        let survivor = db
            .create_user("survivor", "survivor@example.com", "phc", 2)
            .unwrap();

        db.create_todo(user.id, "buy milk").unwrap();
        db.create_note(user.id, "note", "body").unwrap();
        db.insert_chat_message(user.id, "hi", "hello").unwrap();
        let turns = vec![ChatTurn {
            content: "hi".into(),
            sender: "user".into(),
        }];
        db.create_conversation(user.id, "conv", &serde_json::to_string(&turns).unwrap())
            .unwrap();
        db.create_session("tok", user.id, "doomed", "user", chrono::Duration::hours(1))
            .unwrap();
        db.create_todo(survivor.id, "keep me").unwrap();

        assert!(db.delete_user_cascade(user.id).unwrap());

        for table in ["todos", "notes", "chat_messages", "conversations", "sessions"] {
            assert_eq!(count(&db, table, user.id), 0, "{table} not emptied");
        }
        assert!(db.get_user_by_username("doomed").unwrap().is_none());

        // Other users' data is untouched.
        assert_eq!(count(&db, "todos", survivor.id), 1);

        // Idempotent on a missing user.
        assert!(!db.delete_user_cascade(user.id).unwrap());
    }

    #[test]
    fn usage_stats_counts_rows() {
        let db = db();
        let a = db.create_user("a", "a@example.com", "phc", 2).unwrap();
        let b = db.create_user("b", "b@example.com", "phc", 2).unwrap();
        db.create_todo(a.id, "one").unwrap();
        db.create_todo(b.id, "two").unwrap();
        db.create_note(a.id, "n", "").unwrap();

        let stats = db.usage_stats().unwrap();
        assert_eq!(stats.users, 2);
        assert_eq!(stats.todos, 2);
        assert_eq!(stats.notes, 1);
        assert_eq!(stats.conversations, 0);
    }

    #[test]
    fn list_users_newest_first() {
        let db = db();
        db.create_user("first", "first@example.com", "phc", 2).unwrap();
        // Force distinct created_at values.
        db.conn()
            .execute(
                "UPDATE users SET created_at = '2000-01-01T00:00:00+00:00' WHERE username = 'first'",
                [],
            )
            .unwrap();
        db.create_user("second", "second@example.com", "phc", 1).unwrap();

        let users = db.list_users_with_roles().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].username, "second");
        assert_eq!(users[0].role_name, "admin");
        assert_eq!(users[1].username, "first");
        assert_eq!(users[1].role_name, "user");
    }
}
