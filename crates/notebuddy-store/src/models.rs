//! Domain model structs persisted in the SQLite database.
//!
//! Every struct derives `Serialize` so it can be handed directly to the HTTP
//! layer as a JSON response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The fixed set of roles a user can hold.
///
/// Admin-equivalence is decided by comparing this typed value, which is in
/// turn derived from the role row's *name* (never its numeric id), so a
/// renamed role row loses its privileges rather than silently keeping them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Map a role row's name to the typed value.  Unknown names yield `None`
    /// and are treated as unprivileged by callers.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// The canonical role name as stored in the `roles` table.
    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Seeded id of the `admin` role row.  Convenience for inserts only; the
/// admin check itself goes through [`Role::from_name`].
pub const ADMIN_ROLE_ID: i64 = 1;
/// Seeded id of the `user` role row, the default for self-registration.
pub const USER_ROLE_ID: i64 = 2;

/// A row of the `roles` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleInfo {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A registered account.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Unique contact address.
    pub email: String,
    /// Argon2id PHC hash string.  Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// FK into `roles`.
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A user row joined with its role, as shown in the admin panel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserWithRole {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub role_id: i64,
    pub role_name: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A server-side session record referenced by the auth cookie.
///
/// `username` and `role_name` are snapshots taken at login so guarded
/// requests don't need a join; the admin guard deliberately ignores the
/// snapshot and re-reads the users table instead.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Todo
// ---------------------------------------------------------------------------

/// A single todo item.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Note
// ---------------------------------------------------------------------------

/// A note.  `content` is stored raw; use [`NoteContent::parse`] to decode it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Note {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decoded note body.
///
/// The editor saves notes as a serialized `{"text", "html"}` object, but
/// rows written before that format existed hold plain text.  Parsing is
/// best-effort: anything that isn't the structured object is carried as
/// [`NoteContent::Plain`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteContent {
    /// Structured rich-text body.
    Rich { text: String, html: String },
    /// Legacy plain-text body.
    Plain(String),
}

impl NoteContent {
    /// Decode a raw `content` column value.
    pub fn parse(raw: &str) -> Self {
        #[derive(Deserialize)]
        struct RichBody {
            #[serde(default)]
            text: String,
            #[serde(default)]
            html: String,
        }

        if raw.is_empty() {
            return NoteContent::Rich {
                text: String::new(),
                html: String::new(),
            };
        }

        match serde_json::from_str::<RichBody>(raw) {
            Ok(body) => NoteContent::Rich {
                text: body.text,
                html: body.html,
            },
            Err(_) => NoteContent::Plain(raw.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// One exchange with the assistant: the user's message and whatever reply
/// was produced (possibly the fixed unavailability text).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// One turn inside a saved conversation, as produced by the chat UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub content: String,
    pub sender: String,
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// A saved conversation.  `messages` holds the serialized turn array; the
/// HTTP layer decodes it with an explicit fallback.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub messages: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conversation listing row (no message payload).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct UsageStats {
    pub users: i64,
    pub todos: i64,
    pub notes: i64,
    pub conversations: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_from_name() {
        assert_eq!(Role::from_name("admin"), Some(Role::Admin));
        assert_eq!(Role::from_name("user"), Some(Role::User));
        assert_eq!(Role::from_name("Admin"), None);
        assert_eq!(Role::from_name("superuser"), None);
    }

    #[test]
    fn note_content_structured() {
        let parsed = NoteContent::parse(r#"{"text":"hi","html":"<p>hi</p>"}"#);
        assert_eq!(
            parsed,
            NoteContent::Rich {
                text: "hi".into(),
                html: "<p>hi</p>".into()
            }
        );
    }

    #[test]
    fn note_content_legacy_plain_text() {
        let parsed = NoteContent::parse("just some old note");
        assert_eq!(parsed, NoteContent::Plain("just some old note".into()));
    }

    #[test]
    fn note_content_empty() {
        let parsed = NoteContent::parse("");
        assert_eq!(
            parsed,
            NoteContent::Rich {
                text: String::new(),
                html: String::new()
            }
        );
    }

    #[test]
    fn note_content_partial_object() {
        // Missing fields default to empty rather than failing.
        let parsed = NoteContent::parse(r#"{"text":"only text"}"#);
        assert_eq!(
            parsed,
            NoteContent::Rich {
                text: "only text".into(),
                html: String::new()
            }
        );
    }

    #[test]
    fn note_content_non_object_json() {
        // Valid JSON that isn't the structured shape falls back to plain.
        let parsed = NoteContent::parse("42");
        assert_eq!(parsed, NoteContent::Plain("42".into()));
    }
}
