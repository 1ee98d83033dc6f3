//! Authentication: token management, password hashing, and the
//! authenticated-user extractor.
//!
//! Tokens are HS256 JWTs carrying the user's RecordId in `sub` with an
//! expiry; there is no server-side session or revocation list. Every
//! verification failure is reported as the same undifferentiated 401.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use notes_core::RecordId;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id (subject) as 24-char hex.
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: usize,
    /// Expiration time (unix timestamp).
    pub exp: usize,
}

/// The authenticated subject, extracted from a Bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub RecordId);

/// Create a signed token for a user.
pub fn create_token(
    user_id: RecordId,
    secret: &str,
    expiry_hours: u64,
) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let exp = (now + chrono::Duration::hours(expiry_hours as i64)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_hex(),
        iat: now.timestamp() as usize,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
}

/// Validate a token and return the subject's RecordId.
///
/// The rejection carries no detail about why verification failed.
pub fn validate_token(token: &str, secret: &str) -> Result<RecordId, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        ApiError::Unauthorized("Unauthorized".to_string())
    })?;

    token_data
        .claims
        .sub
        .parse()
        .map_err(|_| ApiError::Unauthorized("Unauthorized".to_string()))
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// The scheme must be exactly "Bearer" with a single token part.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    let mut parts = header_value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(ApiError::Unauthorized("Unauthorized".to_string())),
    }
}

/// Hash a password with a per-record random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Invalid stored password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user_id = validate_token(token, &state.config().jwt_secret)?;
        Ok(AuthUser(user_id))
    }
}
