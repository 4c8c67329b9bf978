//! Payment gateway port for external payment processing.
//!
//! Defines the contract the billing flows need from the gateway: token
//! issuance, checkout initiation, and transaction verification by order
//! reference.
//!
//! # Design
//!
//! - **No token caching**: the gateway's tokens are cheap and short-lived;
//!   implementations re-issue on every call
//! - **No retry/backoff**: a failed call surfaces as `GatewayError` and the
//!   caller decides (the handler boundary redirects to the failure page)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for the payment gateway integration.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Issues a fresh access token from client credentials.
    ///
    /// Re-issued on every call; implementations do not cache.
    async fn issue_token(&self) -> Result<AccessToken, GatewayError>;

    /// Starts a hosted checkout for an order reference.
    ///
    /// Returns the URL the customer is redirected to.
    async fn initiate_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Looks up a transaction by its order reference.
    ///
    /// Returns `None` when the gateway has no transaction for the
    /// reference (gateway 404).
    async fn verify_transaction(
        &self,
        order_reference: &str,
    ) -> Result<Option<GatewayTransaction>, GatewayError>;
}

/// Short-lived bearer token for gateway API calls.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    /// The bearer token value.
    pub token: String,

    /// Seconds until the token expires.
    pub expires_in_secs: u64,
}

/// Request to start a hosted checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Merchant-side correlation string (`SUB-<userId>-<timestamp>`).
    pub order_reference: String,

    /// Amount in minor units.
    pub amount_minor: i64,

    /// ISO currency code.
    pub currency: String,

    /// Customer email for receipt and pre-fill.
    pub customer_email: String,

    /// URL the gateway redirects the browser back to.
    pub return_url: String,
}

/// Hosted checkout session created by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Gateway's order id for this checkout.
    pub order_id: String,

    /// URL for the customer to complete payment.
    pub checkout_url: String,
}

/// Transaction looked up by order reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayTransaction {
    /// Merchant-side order reference echoed back.
    pub order_reference: String,

    /// Gateway transaction id.
    pub transaction_id: String,

    /// Settlement status.
    pub status: TransactionStatus,

    /// Paid amount in minor units.
    pub amount_minor: i64,

    /// ISO currency code.
    pub currency: String,
}

/// Transaction status from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Payment settled.
    Approved,

    /// Payment rejected terminally.
    Declined,

    /// Payment still in flight.
    Pending,

    /// Unknown status from the gateway.
    Unknown,
}

impl TransactionStatus {
    /// Returns true when the payment settled and the plan may be upgraded.
    pub fn has_succeeded(&self) -> bool {
        matches!(self, TransactionStatus::Approved)
    }

    /// Parses the gateway's status string.
    pub fn from_gateway_str(s: &str) -> Self {
        match s {
            "approved" | "successful" => TransactionStatus::Approved,
            "declined" | "failed" => TransactionStatus::Declined,
            "pending" | "processing" => TransactionStatus::Pending,
            _ => TransactionStatus::Unknown,
        }
    }
}

/// Errors from gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation could be retried. Informational only; no
    /// caller currently retries.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    /// Create a provider error (non-2xx gateway response).
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Token issuance or API authentication failed.
    AuthenticationError,

    /// Gateway returned a non-2xx response.
    ProviderError,

    /// Gateway response could not be parsed.
    InvalidResponse,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayErrorCode::NetworkError)
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::ProviderError => "provider_error",
            GatewayErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn transaction_status_success_checks() {
        assert!(TransactionStatus::Approved.has_succeeded());
        assert!(!TransactionStatus::Declined.has_succeeded());
        assert!(!TransactionStatus::Pending.has_succeeded());
        assert!(!TransactionStatus::Unknown.has_succeeded());
    }

    #[test]
    fn transaction_status_parses_gateway_aliases() {
        assert_eq!(
            TransactionStatus::from_gateway_str("approved"),
            TransactionStatus::Approved
        );
        assert_eq!(
            TransactionStatus::from_gateway_str("successful"),
            TransactionStatus::Approved
        );
        assert_eq!(
            TransactionStatus::from_gateway_str("failed"),
            TransactionStatus::Declined
        );
        assert_eq!(
            TransactionStatus::from_gateway_str("processing"),
            TransactionStatus::Pending
        );
        assert_eq!(
            TransactionStatus::from_gateway_str("whatever"),
            TransactionStatus::Unknown
        );
    }

    #[test]
    fn gateway_error_retryable_only_for_network() {
        assert!(GatewayError::network("timeout").retryable);
        assert!(!GatewayError::authentication("bad credentials").retryable);
        assert!(!GatewayError::provider("500").retryable);
    }

    #[test]
    fn gateway_error_display_includes_code_and_message() {
        let err = GatewayError::provider("upstream 502");
        assert!(err.to_string().contains("provider_error"));
        assert!(err.to_string().contains("upstream 502"));
    }
}
