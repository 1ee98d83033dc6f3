//! API error taxonomy with enveloped JSON responses.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notes_store::StoreError;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::response::Envelope;

/// Field-keyed validation messages, ordered for deterministic output.
pub type FieldErrors = BTreeMap<String, String>;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Validation failure (400) with a field-keyed error map.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Bad request (400) without field detail.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unauthorized (401). The message is intentionally undifferentiated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Not found (404). Also covers ownership mismatches.
    #[error("not found: {0}")]
    NotFound(String),

    /// Conflict (409), e.g. duplicate email.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Welcome-mail failure during registration. 403 when the provider
    /// signalled an authorization problem, 500 otherwise.
    #[error("mail delivery failed")]
    Mail { forbidden: bool },

    /// Internal server error (500). The detail is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Convert validator output into a 400 with a field-keyed map.
    pub fn from_validation(errors: ValidationErrors) -> Self {
        Self::Validation(validation_error_map(&errors))
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Mail { forbidden: true } => StatusCode::FORBIDDEN,
            Self::Mail { forbidden: false } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) => match e {
                StoreError::DuplicateEmail(_) => StatusCode::CONFLICT,
                StoreError::UserNotFound(_) | StoreError::NoteNotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Client-facing message. Internal causes collapse to a generic message.
    fn client_message(&self) -> String {
        match self {
            Self::Validation(_) => "Validation failed".to_string(),
            Self::BadRequest(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Mail { .. } => {
                "Failed to send welcome email. User creation cancelled.".to_string()
            }
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Store(e) => match e {
                StoreError::DuplicateEmail(_) => "Email already exists".to_string(),
                StoreError::UserNotFound(_) => "User not found".to_string(),
                StoreError::NoteNotFound(_) => "Note not found".to_string(),
                _ => "Internal server error".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Detailed causes stay on the server side.
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        let detail = match &self {
            ApiError::Validation(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        };

        let body = Envelope::fail(&self.client_message(), detail);
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Flatten validator output into a field-keyed message map.
///
/// Struct-level (schema) errors are keyed `value`, matching the keying of
/// shape-level rules like "at least one field must be provided".
pub fn validation_error_map(errors: &ValidationErrors) -> FieldErrors {
    let mut map = FieldErrors::new();
    collect_errors(errors, "", &mut map);
    map
}

fn collect_errors(errors: &ValidationErrors, prefix: &str, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let key = if field.as_ref() == "__all__" {
            "value".to_string()
        } else if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    let message = err
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {key}"));
                    out.insert(key, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_errors(nested, &key, out),
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect_errors(nested, &format!("{key}[{idx}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
        #[validate(email(message = "Email must be a valid email address"))]
        email: String,
    }

    #[test]
    fn test_collects_all_field_errors() {
        let sample = Sample {
            name: String::new(),
            email: "nope".into(),
        };
        let errors = sample.validate().unwrap_err();
        let map = validation_error_map(&errors);
        assert_eq!(map.get("name").unwrap(), "Name is required");
        assert_eq!(map.get("email").unwrap(), "Email must be a valid email address");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation(FieldErrors::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("Unauthorized".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::NotFound("Note not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Mail { forbidden: true }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Mail { forbidden: false }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_mapping() {
        let err = ApiError::Store(StoreError::DuplicateEmail("a@b.com".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.client_message(), "Email already exists");

        let err = ApiError::Store(StoreError::NoteNotFound("0".repeat(24)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.client_message(), "Note not found");
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = ApiError::Internal("connection pool exhausted".into());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
