//! Server configuration from environment variables.
//!
//! Everything is read once at startup into an immutable struct; no component
//! reads ambient environment state afterwards.

use std::env;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Secret for signing and verifying auth tokens.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub jwt_expiry_hours: u64,
    /// SendGrid API key. Empty means mail is not configured.
    pub sendgrid_api_key: String,
    /// Default sender address for transactional mail.
    pub mail_from: String,
    /// Root directory for uploaded files.
    pub uploads_dir: String,
    /// Upload size ceiling in bytes.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional (with defaults):
    /// - `PORT`: Server port (default: 3000)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `JWT_SECRET`: Token signing secret (default: "dev-secret")
    /// - `JWT_EXPIRY_HOURS`: Token lifetime (default: 24)
    /// - `SENDGRID_API_KEY`: Mail provider key (default: unset)
    /// - `SENDGRID_FROM`: Sender address (default: "no-reply@example.com")
    /// - `UPLOADS_DIR`: Upload root (default: "uploads")
    /// - `MAX_UPLOAD_SIZE_MB`: Upload ceiling (default: 2)
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cors_allowed_origins =
            env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string());

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string());

        let jwt_expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                name: "JWT_EXPIRY_HOURS".to_string(),
                reason: format!("not a number: {s}"),
            })?,
            Err(_) => 24,
        };

        let sendgrid_api_key = env::var("SENDGRID_API_KEY").unwrap_or_default();

        let mail_from =
            env::var("SENDGRID_FROM").unwrap_or_else(|_| "no-reply@example.com".to_string());

        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string());

        let max_upload_mb: usize = match env::var("MAX_UPLOAD_SIZE_MB") {
            Ok(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                name: "MAX_UPLOAD_SIZE_MB".to_string(),
                reason: format!("not a number: {s}"),
            })?,
            Err(_) => 2,
        };

        Ok(Self {
            port,
            log_level,
            cors_allowed_origins,
            jwt_secret,
            jwt_expiry_hours,
            sendgrid_api_key,
            mail_from,
            uploads_dir,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
