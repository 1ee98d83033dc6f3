//! notes-store: Storage layer for the notes platform
//!
//! This crate provides:
//! - PostgreSQL storage for users and notes
//! - Embedded schema migrations
//! - Type-safe database operations via sqlx
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_store::{Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let user = store.insert_user(&new_user).await?;
//! let notes = store.list_notes(user.record_id()?, &query).await?;
//! ```

pub mod error;
pub mod models;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::{NewNote, NewUser, NoteQuery, NotePatch, NoteRow, UserPatch, UserRow};
pub use store::{Store, StoreConfig};

// Re-export notes-core for downstream crates
pub use notes_core;
