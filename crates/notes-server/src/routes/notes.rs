//! Note resource routes: create, list, show, update, delete.
//!
//! Every operation is scoped to the authenticated owner. A note owned by
//! someone else is reported exactly like a missing note (404), so record
//! existence never leaks across accounts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use notes_store::{NewNote, NotePatch, NoteRow};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{parse_id, RawNoteListQuery, ValidatedJson};
use crate::response;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /notes.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNoteRequest {
    #[serde(default)]
    #[validate(custom(function = "non_blank", message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// Request body for PATCH /notes/{id}. At least one field must be present.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "at_least_one_field"))]
pub struct UpdateNoteRequest {
    #[validate(custom(function = "non_blank", message = "Title must not be empty"))]
    pub title: Option<String>,
    pub body: Option<String>,
}

/// A note as returned to its owner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePublic {
    pub id: String,
    pub title: String,
    pub body: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotePublic {
    fn from_row(row: &NoteRow) -> Self {
        Self {
            id: row.id.trim().to_string(),
            title: row.title.clone(),
            body: row.body.clone(),
            owner: row.owner.trim().to_string(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("non_blank"));
    }
    Ok(())
}

fn at_least_one_field(request: &UpdateNoteRequest) -> Result<(), ValidationError> {
    if request.title.is_none() && request.body.is_none() {
        let mut error = ValidationError::new("min_fields");
        error.message = Some("At least one field (title or body) must be provided".into());
        return Err(error);
    }
    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /notes - Create a note owned by the authenticated user.
async fn create_note(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    ValidatedJson(request): ValidatedJson<CreateNoteRequest>,
) -> ApiResult<Response> {
    let new_note = NewNote::new(
        request.title.trim().to_string(),
        request.body.trim().to_string(),
        owner,
    );

    let row = state.store().insert_note(&new_note).await?;

    tracing::info!(note_id = %new_note.id, owner = %owner, "Note created");

    Ok(response::success(
        NotePublic::from_row(&row),
        "Note created successfully",
        StatusCode::CREATED,
    ))
}

/// GET /notes - List the authenticated user's notes.
///
/// Supports `limit`, `page`, `sortBy` (createdAt | title) and `sortType`
/// (asc | desc, case-insensitive). The identifier acts as a secondary sort
/// key in the same direction, so pages stay disjoint.
async fn list_notes(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Query(raw): Query<RawNoteListQuery>,
) -> ApiResult<Response> {
    let query = raw.into_note_query()?;
    let rows = state.store().list_notes(owner, &query).await?;

    let notes: Vec<NotePublic> = rows.iter().map(NotePublic::from_row).collect();
    Ok(response::ok(notes))
}

/// GET /notes/{id} - Fetch a single note.
async fn show_note(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id, "Invalid note id")?;

    let row = state
        .store()
        .get_note(id, owner)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    Ok(response::ok(NotePublic::from_row(&row)))
}

/// PATCH /notes/{id} - Partially update a note.
async fn update_note(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(raw_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateNoteRequest>,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id, "Invalid note id")?;

    let patch = NotePatch {
        title: request.title.map(|t| t.trim().to_string()),
        body: request.body.map(|b| b.trim().to_string()),
    };

    let row = state
        .store()
        .update_note(id, owner, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

    tracing::info!(note_id = %id, owner = %owner, "Note updated");

    Ok(response::success(
        NotePublic::from_row(&row),
        "Note updated successfully",
        StatusCode::OK,
    ))
}

/// DELETE /notes/{id} - Delete a note.
async fn delete_note(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id, "Invalid note id")?;

    let deleted = state.store().delete_note(id, owner).await?;
    if !deleted {
        return Err(ApiError::NotFound("Note not found".to_string()));
    }

    tracing::info!(note_id = %id, owner = %owner, "Note deleted");

    Ok(response::ok_empty("Note deleted successfully"))
}

/// Build note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route(
            "/notes/{id}",
            get(show_note).patch(update_note).delete(delete_note),
        )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::validation_error_map;

    #[test]
    fn test_create_request_missing_title_is_field_keyed() {
        let request: CreateNoteRequest = serde_json::from_str("{}").unwrap();
        let errors = request.validate().unwrap_err();
        let map = validation_error_map(&errors);
        assert_eq!(map.get("title").unwrap(), "Title is required");
    }

    #[test]
    fn test_create_request_blank_title_rejected() {
        let request: CreateNoteRequest = serde_json::from_str(r#"{"title": "   "}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_body_defaults_to_empty() {
        let request: CreateNoteRequest = serde_json::from_str(r#"{"title": "N"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.body, "");
    }

    #[test]
    fn test_create_request_ignores_unknown_fields() {
        let request: CreateNoteRequest =
            serde_json::from_str(r#"{"title": "N", "owner": "spoofed"}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_requires_one_field() {
        let request: UpdateNoteRequest = serde_json::from_str("{}").unwrap();
        let errors = request.validate().unwrap_err();
        let map = validation_error_map(&errors);
        assert_eq!(
            map.get("value").unwrap(),
            "At least one field (title or body) must be provided"
        );
    }

    #[test]
    fn test_update_request_body_alone_is_enough() {
        let request: UpdateNoteRequest = serde_json::from_str(r#"{"body": ""}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_update_request_blank_title_rejected() {
        let request: UpdateNoteRequest = serde_json::from_str(r#"{"title": " "}"#).unwrap();
        let errors = request.validate().unwrap_err();
        let map = validation_error_map(&errors);
        assert_eq!(map.get("title").unwrap(), "Title must not be empty");
    }

    #[test]
    fn test_note_public_serializes_camel_case() {
        let now = Utc::now();
        let row = NoteRow {
            id: "0".repeat(24),
            title: "N".into(),
            body: "B".into(),
            owner: "1".repeat(24),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&NotePublic::from_row(&row)).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"owner\""));
    }
}
