//! # notebuddy-store
//!
//! Persistence layer for the NoteBuddy server, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every domain
//! model.  Every resource table carries an owning `user_id`, and all
//! update/delete helpers take that owner id as part of their predicate so a
//! caller can never touch another user's rows through them.

pub mod chat;
pub mod conversations;
pub mod database;
pub mod migrations;
pub mod models;
pub mod notes;
pub mod roles;
pub mod sessions;
pub mod todos;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
