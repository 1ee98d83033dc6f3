//! notes-core: Shared domain types for the notes platform
//!
//! This crate provides:
//! - `RecordId`: the 24-character hex identifier used for users and notes
//! - Pagination and sort primitives shared by the store and the HTTP API
//!
//! It deliberately has no I/O dependencies so both the storage layer and
//! the server can depend on it.

pub mod id;
pub mod pagination;

pub use id::{ParseIdError, RecordId};
pub use pagination::{NoteSortField, Page, SortDirection};
