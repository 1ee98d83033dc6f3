//! Transactional mail collaborator.
//!
//! Mail delivery is an external capability behind the `Mailer` trait, with
//! a SendGrid HTTP implementation. Provider failure categories are mapped
//! to local error kinds explicitly; handlers never inspect provider
//! payloads themselves.

use async_trait::async_trait;
use reqwest::StatusCode;

/// SendGrid v3 send endpoint.
const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// A transactional message.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl MailMessage {
    /// The welcome message sent after registration.
    pub fn welcome(to: &str, name: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Welcome to Notes API".to_string(),
            text: format!("Hi {name}, your account was created successfully."),
            html: format!(
                "<p>Hi <strong>{name}</strong>,</p><p>Your account was created successfully.</p>"
            ),
        }
    }
}

/// Errors from the mail collaborator.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// No API key configured; sending cannot be attempted.
    #[error("mail provider not configured")]
    NotConfigured,

    /// The provider rejected our credentials or permissions.
    #[error("mail provider refused request: {0}")]
    Forbidden(String),

    /// Any other non-success provider response.
    #[error("mail provider error (status {status}): {body}")]
    Provider { status: u16, body: String },

    /// Transport-level failure reaching the provider.
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl MailError {
    /// Whether this failure is an authorization/permission problem at the
    /// provider, which registration escalates to a 403.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

/// External mail capability with a success/failure outcome.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// SendGrid implementation over HTTP.
pub struct SendGridMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl SendGridMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }

    /// SendGrid v3 request payload for a message.
    fn payload(&self, message: &MailMessage) -> serde_json::Value {
        serde_json::json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.from },
            "subject": message.subject,
            "content": [
                { "type": "text/plain", "value": message.text },
                { "type": "text/html", "value": message.html },
            ],
        })
    }

    /// Map a non-success provider status to a local error kind.
    fn classify(status: StatusCode, body: String) -> MailError {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            MailError::Forbidden(body)
        } else {
            MailError::Provider {
                status: status.as_u16(),
                body,
            }
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.api_key.is_empty() {
            return Err(MailError::NotConfigured);
        }

        let response = self
            .client
            .post(SENDGRID_SEND_URL)
            .bearer_auth(&self.api_key)
            .json(&self.payload(message))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %message.to, "Sent mail");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::classify(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_message_contents() {
        let msg = MailMessage::welcome("alice@example.com", "Alice");
        assert_eq!(msg.to, "alice@example.com");
        assert_eq!(msg.subject, "Welcome to Notes API");
        assert!(msg.text.contains("Alice"));
        assert!(msg.html.contains("<strong>Alice</strong>"));
    }

    #[test]
    fn test_payload_shape() {
        let mailer = SendGridMailer::new("key".into(), "no-reply@example.com".into());
        let payload = mailer.payload(&MailMessage::welcome("a@b.com", "A"));
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "a@b.com");
        assert_eq!(payload["from"]["email"], "no-reply@example.com");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        assert_eq!(payload["content"][1]["type"], "text/html");
    }

    #[test]
    fn test_classify_forbidden_statuses() {
        assert!(SendGridMailer::classify(StatusCode::FORBIDDEN, String::new()).is_forbidden());
        assert!(SendGridMailer::classify(StatusCode::UNAUTHORIZED, String::new()).is_forbidden());
    }

    #[test]
    fn test_classify_other_statuses() {
        let err = SendGridMailer::classify(StatusCode::SERVICE_UNAVAILABLE, "down".into());
        assert!(!err.is_forbidden());
        assert!(matches!(err, MailError::Provider { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_fails_without_network() {
        let mailer = SendGridMailer::new(String::new(), "no-reply@example.com".into());
        let err = mailer
            .send(&MailMessage::welcome("a@b.com", "A"))
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::NotConfigured));
        assert!(!err.is_forbidden());
    }
}
