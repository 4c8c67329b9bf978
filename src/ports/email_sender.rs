//! Email sender port for outbound notifications.
//!
//! The delivery provider itself is an external collaborator; this port
//! covers only what the billing flows need (reminder and downgrade
//! notices from the expiry sweep).

use async_trait::async_trait;
use thiserror::Error;

/// A single outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,

    /// Subject line.
    pub subject: String,

    /// HTML body.
    pub html_body: String,
}

/// Errors from sending email.
#[derive(Debug, Clone, Error)]
pub enum EmailError {
    /// Network connectivity issue.
    #[error("Email network error: {0}")]
    Network(String),

    /// Provider rejected the request.
    #[error("Email provider error: {0}")]
    Provider(String),

    /// Recipient address is not deliverable.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

/// Port for the email delivery provider.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends a single message.
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}
