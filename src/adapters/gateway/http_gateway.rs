//! HTTP payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the gateway's REST API.
//!
//! # Behavior
//!
//! - Access tokens are re-issued on every call; the gateway's tokens are
//!   short-lived and there is no caching layer
//! - Any non-2xx response maps to `GatewayError`; there is no retry or
//!   backoff here, callers decide at the handler boundary
//!
//! # Configuration
//!
//! ```ignore
//! let settings = GatewaySettings::from_config(&config.gateway);
//! let gateway = HttpPaymentGateway::new(settings);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::GatewayConfig;
use crate::ports::{
    AccessToken, CheckoutRequest, CheckoutSession, GatewayError, GatewayTransaction,
    PaymentGateway, TransactionStatus,
};

use super::wire_types::{CheckoutResponse, TokenResponse, TransactionResponse};

/// Connection settings for the gateway API.
#[derive(Clone)]
pub struct GatewaySettings {
    /// Base URL for the gateway API.
    base_url: String,

    /// Merchant account id.
    merchant_id: String,

    /// OAuth client id.
    client_id: String,

    /// OAuth client secret.
    client_secret: SecretString,
}

impl GatewaySettings {
    /// Create settings directly.
    pub fn new(
        base_url: impl Into<String>,
        merchant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            merchant_id: merchant_id.into(),
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }

    /// Create settings from the application configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.merchant_id.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        )
    }
}

/// HTTP implementation of the `PaymentGateway` port.
pub struct HttpPaymentGateway {
    settings: GatewaySettings,
    http_client: reqwest::Client,
}

impl HttpPaymentGateway {
    /// Create a new gateway client with the given settings.
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            settings,
            http_client: reqwest::Client::new(),
        }
    }

    async fn bearer_token(&self) -> Result<String, GatewayError> {
        Ok(self.issue_token().await?.token)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn issue_token(&self) -> Result<AccessToken, GatewayError> {
        let url = format!("{}/oauth/token", self.settings.base_url);

        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.settings.client_id.as_str()),
                (
                    "client_secret",
                    self.settings.client_secret.expose_secret().as_str(),
                ),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Gateway token issuance failed");
            return Err(GatewayError::authentication(format!(
                "Token endpoint returned {}: {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            GatewayError::new(
                crate::ports::GatewayErrorCode::InvalidResponse,
                format!("Failed to parse token response: {}", e),
            )
        })?;

        Ok(AccessToken {
            token: token.access_token,
            expires_in_secs: token.expires_in,
        })
    }

    async fn initiate_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/v1/checkout", self.settings.base_url);

        let body = serde_json::json!({
            "merchantId": self.settings.merchant_id,
            "orderReference": request.order_reference,
            "amount": request.amount_minor,
            "currency": request.currency,
            "customerEmail": request.customer_email,
            "returnUrl": request.return_url,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                order_reference = %request.order_reference,
                error = %error_text,
                "Gateway checkout failed"
            );
            return Err(GatewayError::provider(format!(
                "Checkout endpoint returned {}: {}",
                status, error_text
            )));
        }

        let checkout: CheckoutResponse = response.json().await.map_err(|e| {
            GatewayError::new(
                crate::ports::GatewayErrorCode::InvalidResponse,
                format!("Failed to parse checkout response: {}", e),
            )
        })?;

        Ok(CheckoutSession {
            order_id: checkout.order_id,
            checkout_url: checkout.checkout_url,
        })
    }

    async fn verify_transaction(
        &self,
        order_reference: &str,
    ) -> Result<Option<GatewayTransaction>, GatewayError> {
        let token = self.bearer_token().await?;
        let url = format!(
            "{}/v1/transactions/{}",
            self.settings.base_url, order_reference
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                order_reference = %order_reference,
                error = %error_text,
                "Gateway transaction lookup failed"
            );
            return Err(GatewayError::provider(format!(
                "Transaction endpoint returned {}: {}",
                status, error_text
            )));
        }

        let transaction: TransactionResponse = response.json().await.map_err(|e| {
            GatewayError::new(
                crate::ports::GatewayErrorCode::InvalidResponse,
                format!("Failed to parse transaction response: {}", e),
            )
        })?;

        Ok(Some(map_transaction(transaction)))
    }
}

fn map_transaction(wire: TransactionResponse) -> GatewayTransaction {
    GatewayTransaction {
        order_reference: wire.order_reference,
        transaction_id: wire.transaction_id,
        status: TransactionStatus::from_gateway_str(&wire.status),
        amount_minor: wire.amount,
        currency: wire.currency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> GatewaySettings {
        GatewaySettings::new(
            "https://api.gateway.test",
            "mrc_123",
            "client_abc",
            "secret_xyz",
        )
    }

    #[test]
    fn settings_from_config_copies_fields() {
        let config = GatewayConfig {
            base_url: "https://api.gateway.test".to_string(),
            merchant_id: "mrc_123".to_string(),
            client_id: "client_abc".to_string(),
            client_secret: "secret_xyz".to_string(),
            webhook_secret: "whk".to_string(),
            success_redirect_url: "https://app.test/ok".to_string(),
            failure_redirect_url: "https://app.test/fail".to_string(),
            currency: "USD".to_string(),
        };

        let settings = GatewaySettings::from_config(&config);
        assert_eq!(settings.base_url, "https://api.gateway.test");
        assert_eq!(settings.merchant_id, "mrc_123");
        assert_eq!(settings.client_id, "client_abc");
    }

    #[test]
    fn map_transaction_parses_status() {
        let wire = TransactionResponse {
            order_reference: "SUB-x-1".to_string(),
            transaction_id: "txn_9".to_string(),
            status: "approved".to_string(),
            amount: 60_000,
            currency: "USD".to_string(),
        };

        let txn = map_transaction(wire);
        assert_eq!(txn.status, TransactionStatus::Approved);
        assert_eq!(txn.amount_minor, 60_000);
    }

    #[test]
    fn map_transaction_defaults_unknown_status() {
        let wire = TransactionResponse {
            order_reference: "SUB-x-1".to_string(),
            transaction_id: "txn_9".to_string(),
            status: "weird".to_string(),
            amount: 2_500,
            currency: "USD".to_string(),
        };

        assert_eq!(map_transaction(wire).status, TransactionStatus::Unknown);
    }

    #[test]
    fn gateway_can_be_constructed() {
        let _gateway = HttpPaymentGateway::new(test_settings());
    }
}
