//! Database models for the storage layer.
//!
//! Row types map directly to database rows and are used for sqlx queries.
//! Identifiers are stored as their 24-character hex form (`CHAR(24)`); the
//! `record_id()` accessors convert back to the typed `RecordId`.

use chrono::{DateTime, Utc};
use notes_core::{NoteSortField, Page, RecordId, SortDirection};
use sqlx::FromRow;

use crate::error::{StoreError, StoreResult};

/// Database row for the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    /// RecordId as 24-char hex.
    pub id: String,
    pub name: String,
    /// Normalized (trimmed, lowercased) email.
    pub email: String,
    /// Argon2 password hash. Never serialized to clients.
    pub password_hash: String,
    /// Stored avatar filename, if any.
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Parse the stored id back into a `RecordId`.
    pub fn record_id(&self) -> StoreResult<RecordId> {
        self.id
            .trim()
            .parse()
            .map_err(|_| StoreError::CorruptId(self.id.clone()))
    }
}

/// Database row for the `notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    /// RecordId as 24-char hex.
    pub id: String,
    pub title: String,
    pub body: String,
    /// Owning user's RecordId as 24-char hex.
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteRow {
    /// Parse the stored id back into a `RecordId`.
    pub fn record_id(&self) -> StoreResult<RecordId> {
        self.id
            .trim()
            .parse()
            .map_err(|_| StoreError::CorruptId(self.id.clone()))
    }
}

/// Fields for inserting a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

impl NewUser {
    /// Build a new user with a generated id.
    pub fn new(name: String, email: String, password_hash: String, avatar: Option<String>) -> Self {
        Self {
            id: RecordId::generate(),
            name,
            email,
            password_hash,
            avatar,
        }
    }
}

/// Partial update for a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub avatar: Option<String>,
}

impl UserPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.avatar.is_none()
    }
}

/// Fields for inserting a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub id: RecordId,
    pub title: String,
    pub body: String,
    pub owner: RecordId,
}

impl NewNote {
    /// Build a new note with a generated id.
    pub fn new(title: String, body: String, owner: RecordId) -> Self {
        Self {
            id: RecordId::generate(),
            title,
            body,
            owner,
        }
    }
}

/// Partial update for a note. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Sanitized query for listing notes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoteQuery {
    pub page: Page,
    pub sort_by: NoteSortField,
    pub sort_type: SortDirection,
}

impl NoteQuery {
    /// ORDER BY clause with the allow-listed sort column and the identifier
    /// as a deterministic secondary key in the same direction.
    pub fn order_clause(&self) -> String {
        let dir = self.sort_type.as_sql();
        format!("ORDER BY {} {dir}, id {dir}", self.sort_by.column())
    }
}
