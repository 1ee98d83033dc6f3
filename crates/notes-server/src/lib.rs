//! notes-server: HTTP API for the notes service.
//!
//! This crate provides:
//! - User accounts: registration with avatar upload, login, profile CRUD
//! - Owner-scoped note CRUD with pagination and sorting
//! - Bearer-token authentication
//! - Transactional welcome mail with registration rollback
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for request
//! tracing, CORS, and request IDs. Every response, success or failure,
//! uses the same JSON envelope.
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_server::config::ServerConfig;
//!
//! let config = ServerConfig::from_env()?;
//! ```
//!
//! Owned by: agent-server

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod mail;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod upload;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use notes_core;
pub use notes_store;
