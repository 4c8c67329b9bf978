//! Resend email adapter.
//!
//! Implements the `EmailSender` port against the Resend HTTP API. Only
//! what the billing sweep needs: fire a single transactional message.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::ports::{EmailError, EmailMessage, EmailSender};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Resend implementation of the `EmailSender` port.
pub struct ResendEmailSender {
    api_key: SecretString,
    from_header: String,
    api_url: String,
    http_client: reqwest::Client,
}

impl ResendEmailSender {
    /// Creates a sender from the email configuration.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: SecretString::new(config.resend_api_key.clone()),
            from_header: config.from_header(),
            api_url: RESEND_API_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Overrides the API URL (for testing against a local stub).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !message.to.contains('@') {
            return Err(EmailError::InvalidRecipient(message.to));
        }

        let body = SendEmailRequest {
            from: &self.from_header,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html_body,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                recipient = %message.to,
                error = %error_text,
                "Resend send failed"
            );
            return Err(EmailError::Provider(format!(
                "Resend returned {}: {}",
                status, error_text
            )));
        }

        tracing::debug!(recipient = %message.to, subject = %message.subject, "Email sent");
        Ok(())
    }
}
