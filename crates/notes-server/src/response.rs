//! Uniform response envelope.
//!
//! Every endpoint, success or failure, answers with
//! `{success, message?, data?, error?}`. Keys that are not supplied are
//! omitted entirely, never serialized as null.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// The wire envelope. Built through the helpers below rather than directly.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl Envelope {
    /// Success envelope with data.
    pub fn ok(data: serde_json::Value, message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
            error: None,
        }
    }

    /// Success envelope without a data payload.
    pub fn ok_empty(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
            error: None,
        }
    }

    /// Failure envelope, optionally carrying error detail
    /// (e.g. a field-keyed validation map).
    pub fn fail(message: &str, error: Option<serde_json::Value>) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            data: None,
            error,
        }
    }
}

/// Build a success response with the given status.
///
/// Serialization of handler-owned DTOs is infallible in practice; if it
/// ever fails the failure is logged and reported as a 500 envelope.
pub fn success<T: Serialize>(data: T, message: &str, status: StatusCode) -> Response {
    match serde_json::to_value(data) {
        Ok(value) => (status, Json(Envelope::ok(value, message))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response data");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Envelope::fail("Internal server error", None)),
            )
                .into_response()
        }
    }
}

/// 200 success with the default message.
pub fn ok<T: Serialize>(data: T) -> Response {
    success(data, "success", StatusCode::OK)
}

/// Success response without a data payload.
pub fn ok_empty(message: &str) -> Response {
    (StatusCode::OK, Json(Envelope::ok_empty(message))).into_response()
}
