//! Request extraction and sanitization.
//!
//! Declared shapes are validated before any handler logic runs, with
//! collect-all-errors semantics: the client sees every invalid field at
//! once, keyed by field name. Defaults are applied here; unknown fields
//! are ignored by deserialization.

use axum::extract::{Form, FromRequest, Json, Request};
use notes_core::{NoteSortField, Page, RecordId, SortDirection};
use notes_store::NoteQuery;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ApiError, FieldErrors};

/// JSON body extractor that runs shape validation before the handler.
///
/// Rejections are enveloped 400s: a plain message for malformed JSON, a
/// field-keyed map for validation failures.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text())))?;

        value.validate().map_err(ApiError::from_validation)?;
        Ok(Self(value))
    }
}

/// Body extractor accepting either JSON or an urlencoded form,
/// dispatching on the Content-Type header. Used by login.
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + 'static,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
                ApiError::BadRequest(format!("Invalid JSON body: {}", e.body_text()))
            })?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
                ApiError::BadRequest(format!("Invalid form body: {}", e.body_text()))
            })?;
            Ok(Self(value))
        }
    }
}

/// Parse a path identifier, rejecting anything that is not 24 hex chars
/// with a field-keyed 400 rather than a lookup failure.
pub fn parse_id(raw: &str, message: &str) -> Result<RecordId, ApiError> {
    raw.parse().map_err(|_| {
        let mut map = FieldErrors::new();
        map.insert("id".to_string(), message.to_string());
        ApiError::Validation(map)
    })
}

/// Raw pagination query: values arrive as strings and are parsed here so
/// failures can be reported per field.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawPageQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl RawPageQuery {
    /// Sanitize into a `Page`, applying defaults.
    pub fn into_page(self) -> Result<Page, ApiError> {
        let mut errors = FieldErrors::new();
        let default = Page::default();
        let limit = parse_min_one(self.limit.as_deref(), "limit", default.limit, &mut errors);
        let page = parse_min_one(self.page.as_deref(), "page", default.page, &mut errors);

        if errors.is_empty() {
            Ok(Page::new(limit, page))
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

/// Raw note listing query, including the allow-listed sort parameters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawNoteListQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortType")]
    pub sort_type: Option<String>,
}

impl RawNoteListQuery {
    /// Sanitize into a `NoteQuery`, applying defaults and collecting every
    /// invalid field.
    pub fn into_note_query(self) -> Result<NoteQuery, ApiError> {
        let mut errors = FieldErrors::new();
        let default = Page::default();
        let limit = parse_min_one(self.limit.as_deref(), "limit", default.limit, &mut errors);
        let page = parse_min_one(self.page.as_deref(), "page", default.page, &mut errors);

        let sort_by = match self.sort_by.as_deref() {
            None => NoteSortField::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.insert(
                    "sortBy".to_string(),
                    "sortBy must be one of createdAt, title".to_string(),
                );
                NoteSortField::default()
            }),
        };

        let sort_type = match self.sort_type.as_deref() {
            None => SortDirection::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.insert(
                    "sortType".to_string(),
                    "sortType must be asc or desc".to_string(),
                );
                SortDirection::default()
            }),
        };

        if errors.is_empty() {
            Ok(NoteQuery {
                page: Page::new(limit, page),
                sort_by,
                sort_type,
            })
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

fn parse_min_one(raw: Option<&str>, field: &str, default: i64, errors: &mut FieldErrors) -> i64 {
    match raw {
        None => default,
        Some(s) => match s.trim().parse::<i64>() {
            Ok(n) if n >= 1 => n,
            _ => {
                errors.insert(
                    field.to_string(),
                    format!("{field} must be an integer of at least 1"),
                );
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_valid() {
        let id = RecordId::generate();
        assert_eq!(parse_id(&id.to_hex(), "Invalid note id").unwrap(), id);
    }

    #[test]
    fn test_parse_id_invalid_is_field_keyed_400() {
        let err = parse_id("short", "Invalid note id").unwrap_err();
        match err {
            ApiError::Validation(map) => {
                assert_eq!(map.get("id").unwrap(), "Invalid note id");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_page_query_defaults() {
        let page = RawPageQuery::default().into_page().unwrap();
        assert_eq!(page.limit, 10);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_page_query_rejects_zero_and_garbage() {
        let raw = RawPageQuery {
            limit: Some("0".into()),
            page: Some("abc".into()),
        };
        let err = raw.into_page().unwrap_err();
        match err {
            ApiError::Validation(map) => {
                // Both failures reported at once.
                assert!(map.contains_key("limit"));
                assert!(map.contains_key("page"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_note_query_defaults() {
        let query = RawNoteListQuery::default().into_note_query().unwrap();
        assert_eq!(query.page.limit, 10);
        assert_eq!(query.page.page, 1);
        assert_eq!(query.sort_by, NoteSortField::CreatedAt);
        assert_eq!(query.sort_type, SortDirection::Desc);
    }

    #[test]
    fn test_note_query_sort_type_case_insensitive() {
        let raw = RawNoteListQuery {
            sort_type: Some("ASC".into()),
            ..Default::default()
        };
        let query = raw.into_note_query().unwrap();
        assert_eq!(query.sort_type, SortDirection::Asc);
    }

    #[test]
    fn test_note_query_rejects_unknown_sort_field() {
        let raw = RawNoteListQuery {
            sort_by: Some("owner".into()),
            ..Default::default()
        };
        let err = raw.into_note_query().unwrap_err();
        match err {
            ApiError::Validation(map) => {
                assert!(map.contains_key("sortBy"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_note_query_collects_every_invalid_field() {
        let raw = RawNoteListQuery {
            limit: Some("-1".into()),
            page: Some("0".into()),
            sort_by: Some("nope".into()),
            sort_type: Some("sideways".into()),
        };
        let err = raw.into_note_query().unwrap_err();
        match err {
            ApiError::Validation(map) => {
                assert_eq!(map.len(), 4);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
