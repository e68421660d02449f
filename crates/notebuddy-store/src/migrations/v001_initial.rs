//! v001 -- Initial schema creation.
//!
//! Creates the seven core tables (`roles`, `users`, `sessions`, `todos`,
//! `notes`, `chat_messages`, `conversations`) and seeds the two fixed role
//! rows.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Roles
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS roles (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT UNIQUE NOT NULL,
    description TEXT
);

-- The fixed role set.  The admin check compares role *names*, so these two
-- rows must keep their names even if ids ever shift.
INSERT OR IGNORE INTO roles (id, name, description) VALUES
    (1, 'admin', 'NoteBuddy administrator with full system access'),
    (2, 'user',  'NoteBuddy user with standard access');

-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT UNIQUE NOT NULL,
    email         TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,                -- Argon2id PHC string
    role_id       INTEGER NOT NULL DEFAULT 2,   -- FK -> roles(id), 2 = user
    created_at    TEXT NOT NULL,                -- ISO-8601 / RFC-3339

    FOREIGN KEY (role_id) REFERENCES roles(id)
);

-- ----------------------------------------------------------------
-- Sessions
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS sessions (
    token      TEXT PRIMARY KEY NOT NULL,       -- random, unguessable
    user_id    INTEGER NOT NULL,
    username   TEXT NOT NULL,                   -- snapshot taken at login
    role_name  TEXT NOT NULL,                   -- snapshot taken at login
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);

-- ----------------------------------------------------------------
-- Todos
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS todos (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    title      TEXT NOT NULL,
    completed  INTEGER NOT NULL DEFAULT 0,      -- boolean 0/1
    created_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_todos_user_created
    ON todos(user_id, created_at DESC);

-- ----------------------------------------------------------------
-- Notes
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS notes (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    title      TEXT NOT NULL,
    content    TEXT NOT NULL DEFAULT '',        -- rich-text JSON or legacy plain text
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_notes_user_updated
    ON notes(user_id, updated_at DESC);

-- ----------------------------------------------------------------
-- Chat messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chat_messages (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id   INTEGER NOT NULL,
    message   TEXT NOT NULL,
    response  TEXT NOT NULL DEFAULT '',
    timestamp TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_chat_messages_user_ts
    ON chat_messages(user_id, timestamp DESC);

-- ----------------------------------------------------------------
-- Conversations
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS conversations (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    INTEGER NOT NULL,
    title      TEXT NOT NULL,
    messages   TEXT NOT NULL,                   -- serialized array of chat turns
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_conversations_user_updated
    ON conversations(user_id, updated_at DESC);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
