//! User account routes: registration, login, profile CRUD, avatars.
//!
//! Registration and profile updates accept multipart form data so an
//! avatar image can ride along with the text fields. Registration also
//! coordinates the welcome mail: if the provider refuses, the freshly
//! created account (and its avatar file) are rolled back and the request
//! fails.

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use validator::{Validate, ValidationError};

use notes_store::{NewUser, UserPatch, UserRow};

use crate::auth::{self, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::{parse_id, JsonOrForm, RawPageQuery};
use crate::mail::MailMessage;
use crate::response;
use crate::state::AppState;
use crate::upload::{content_type_for, AvatarStore};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Text fields for POST /users, assembled from the multipart form.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "non_blank_name", message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Text fields for PATCH /users/{id}; every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "non_blank_name", message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Request body for POST /users/login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// A user as exposed over the API. The password hash never leaves the
/// store layer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPublic {
    fn from_row(row: &UserRow) -> Self {
        Self {
            id: row.id.trim().to_string(),
            name: row.name.clone(),
            email: row.email.clone(),
            avatar: row.avatar.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub name: String,
    pub email: String,
    pub token: String,
}

fn non_blank_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("non_blank"));
    }
    Ok(())
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ============================================================================
// Multipart collection
// ============================================================================

/// An avatar part held in memory until validation of the whole form passes.
struct AvatarUpload {
    original_name: String,
    data: Vec<u8>,
}

/// Text and file fields gathered from a user multipart form. Unknown
/// parts are dropped.
#[derive(Default)]
struct UserForm {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    avatar: Option<AvatarUpload>,
}

async fn collect_user_form(mut multipart: Multipart, max_bytes: usize) -> Result<UserForm, ApiError> {
    let mut form = UserForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let part_name = field.name().unwrap_or_default().to_string();
        match part_name.as_str() {
            "name" => form.name = Some(text_part(field).await?),
            "email" => form.email = Some(text_part(field).await?),
            "password" => form.password = Some(text_part(field).await?),
            "avatar" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                // Reject bad extensions before buffering any bytes.
                AvatarStore::allowed_extension(&original_name).map_err(ApiError::from)?;

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?;
                if data.len() > max_bytes {
                    return Err(crate::upload::UploadError::TooLarge {
                        size: data.len(),
                        limit: max_bytes,
                    }
                    .into());
                }

                form.avatar = Some(AvatarUpload {
                    original_name,
                    data: data.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn text_part(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /users - Register a new account.
///
/// Creation is atomic with the welcome mail: if the mail cannot be sent,
/// the stored record and the avatar file are removed again and the
/// request fails (403 when the provider refused authorization, 500
/// otherwise).
async fn register(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Response> {
    let form = collect_user_form(multipart, state.config().max_upload_bytes).await?;

    let request = CreateUserRequest {
        name: form.name.unwrap_or_default().trim().to_string(),
        email: normalize_email(form.email.as_deref().unwrap_or_default()),
        password: form.password.unwrap_or_default(),
    };
    request.validate().map_err(ApiError::from_validation)?;

    let password_hash = auth::hash_password(&request.password)?;

    let avatar = match &form.avatar {
        Some(upload) => Some(
            state
                .avatars()
                .save(
                    &upload.original_name,
                    &upload.data,
                    state.config().max_upload_bytes,
                )
                .await
                .map_err(ApiError::from)?,
        ),
        None => None,
    };

    let new_user = NewUser::new(request.name, request.email, password_hash, avatar.clone());
    let row = match state.store().insert_user(&new_user).await {
        Ok(row) => row,
        Err(e) => {
            if let Some(filename) = &avatar {
                state.avatars().remove(filename).await;
            }
            return Err(e.into());
        }
    };

    let welcome = MailMessage::welcome(&row.email, &row.name);
    if let Err(mail_err) = state.mailer().send(&welcome).await {
        tracing::error!(
            error = %mail_err,
            user_id = %row.id.trim(),
            "Welcome email failed, rolling back registration"
        );
        rollback_registration(&state, &row, avatar.as_deref()).await;
        return Err(ApiError::Mail {
            forbidden: mail_err.is_forbidden(),
        });
    }

    tracing::info!(user_id = %row.id.trim(), email = %row.email, "User registered");

    Ok(response::success(
        UserPublic::from_row(&row),
        "User created successfully",
        StatusCode::CREATED,
    ))
}

/// Compensating actions when the welcome mail fails: drop the record,
/// then the avatar file. Failures here are logged, not surfaced; the
/// client still sees the mail failure.
async fn rollback_registration(state: &AppState, row: &UserRow, avatar: Option<&str>) {
    match row.record_id() {
        Ok(id) => {
            if let Err(e) = state.store().delete_user(id).await {
                tracing::error!(error = %e, user_id = %row.id.trim(), "Registration rollback failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Registration rollback skipped: unparsable id");
        }
    }
    if let Some(filename) = avatar {
        state.avatars().remove(filename).await;
    }
}

/// POST /users/login - Exchange credentials for a token.
///
/// An unknown email and a wrong password produce the identical 401; a
/// comparable amount of hashing work is burned in both cases.
async fn login(
    State(state): State<AppState>,
    JsonOrForm(mut request): JsonOrForm<LoginRequest>,
) -> ApiResult<Response> {
    request.email = normalize_email(&request.email);
    request.validate().map_err(ApiError::from_validation)?;

    let user = state.store().get_user_by_email(&request.email).await?;

    let verified = match &user {
        Some(row) => auth::verify_password(&request.password, &row.password_hash)?,
        None => {
            let _ = auth::hash_password(&request.password)?;
            false
        }
    };

    let Some(row) = user.filter(|_| verified) else {
        return Err(ApiError::Unauthorized(
            "Email or password is incorrect.".to_string(),
        ));
    };

    let token = auth::create_token(
        row.record_id()?,
        &state.config().jwt_secret,
        state.config().jwt_expiry_hours,
    )?;

    tracing::info!(user_id = %row.id.trim(), "User logged in");

    Ok(response::ok(LoginResponse {
        name: row.name,
        email: row.email,
        token,
    }))
}

/// GET /users - List accounts, newest first.
async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(raw): Query<RawPageQuery>,
) -> ApiResult<Response> {
    let page = raw.into_page()?;
    let rows = state.store().list_users(page).await?;

    let users: Vec<UserPublic> = rows.iter().map(UserPublic::from_row).collect();
    Ok(response::ok(users))
}

/// GET /users/{id} - Fetch a single account.
async fn show_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id, "Invalid user id")?;

    let row = state
        .store()
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(response::ok(UserPublic::from_row(&row)))
}

/// PATCH /users/{id} - Partially update an account.
///
/// A new avatar replaces the stored reference; the previous file is left
/// on disk.
async fn update_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(raw_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id, "Invalid user id")?;

    let form = collect_user_form(multipart, state.config().max_upload_bytes).await?;

    let request = UpdateUserRequest {
        name: form.name.map(|s| s.trim().to_string()),
        email: form.email.map(|s| normalize_email(&s)),
        password: form.password,
    };
    request.validate().map_err(ApiError::from_validation)?;

    let password_hash = match &request.password {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };

    let avatar = match &form.avatar {
        Some(upload) => Some(
            state
                .avatars()
                .save(
                    &upload.original_name,
                    &upload.data,
                    state.config().max_upload_bytes,
                )
                .await
                .map_err(ApiError::from)?,
        ),
        None => None,
    };

    let patch = UserPatch {
        name: request.name,
        email: request.email,
        password_hash,
        avatar: avatar.clone(),
    };

    match state.store().update_user(id, &patch).await {
        Ok(Some(row)) => {
            tracing::info!(user_id = %id, "User updated");
            Ok(response::success(
                UserPublic::from_row(&row),
                "User updated successfully",
                StatusCode::OK,
            ))
        }
        Ok(None) => {
            if let Some(filename) = &avatar {
                state.avatars().remove(filename).await;
            }
            Err(ApiError::NotFound("User not found".to_string()))
        }
        Err(e) => {
            if let Some(filename) = &avatar {
                state.avatars().remove(filename).await;
            }
            Err(e.into())
        }
    }
}

/// DELETE /users/{id} - Delete an account and all notes it owns.
async fn delete_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_id(&raw_id, "Invalid user id")?;

    let deleted = state.store().delete_user(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, "User deleted");

    Ok(response::ok_empty("User deleted successfully"))
}

/// GET /users/{id}/avatar - Stream a user's avatar image.
///
/// Unauthenticated; a missing user, a user without an avatar, and a
/// dangling file reference all read as the same 404.
async fn avatar(State(state): State<AppState>, Path(raw_id): Path<String>) -> ApiResult<Response> {
    let id = parse_id(&raw_id, "Invalid user id")?;

    let filename = state
        .store()
        .get_user(id)
        .await?
        .and_then(|row| row.avatar)
        .ok_or_else(|| ApiError::NotFound("Avatar not found".to_string()))?;

    let file = state
        .avatars()
        .open(&filename)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("Avatar not found".to_string()))?;

    let body = Body::from_stream(ReaderStream::new(file));
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&filename))
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build avatar response: {e}")))
}

/// Build user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register).get(list_users))
        .route("/users/login", post(login))
        .route(
            "/users/{id}",
            get(show_user).patch(update_user).delete(delete_user),
        )
        .route("/users/{id}/avatar", get(avatar))
}

// ============================================================================
// Tests
// ============================================================================
