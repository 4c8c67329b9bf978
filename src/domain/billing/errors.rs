//! Billing-specific error types.
//!
//! `BillingError` covers plan operations driven by API and callback
//! traffic; `WebhookError` covers server-to-server deliveries, with HTTP
//! status code mapping and retryability semantics that control the
//! gateway's redelivery behavior.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

use super::OrderReferenceError;

/// Errors from plan operations (checkout, callback, admin, queries).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// No plan record exists for this user.
    PlanNotFound(UserId),

    /// Order reference could not be parsed.
    InvalidOrderReference {
        reference: String,
        reason: String,
    },

    /// The gateway has no transaction for this reference.
    TransactionNotFound(String),

    /// The gateway reported the transaction as not successful.
    PaymentNotCompleted {
        reference: String,
        status: String,
    },

    /// Gateway call failed (network, auth, non-2xx).
    GatewayFailure(String),

    /// Invalid state for the requested operation.
    InvalidState {
        current: String,
        attempted: String,
    },

    /// Validation failed.
    ValidationFailed {
        field: String,
        message: String,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl BillingError {
    pub fn plan_not_found(user_id: UserId) -> Self {
        BillingError::PlanNotFound(user_id)
    }

    pub fn invalid_order_reference(reference: impl Into<String>, err: &OrderReferenceError) -> Self {
        BillingError::InvalidOrderReference {
            reference: reference.into(),
            reason: err.to_string(),
        }
    }

    pub fn transaction_not_found(reference: impl Into<String>) -> Self {
        BillingError::TransactionNotFound(reference.into())
    }

    pub fn payment_not_completed(reference: impl Into<String>, status: impl Into<String>) -> Self {
        BillingError::PaymentNotCompleted {
            reference: reference.into(),
            status: status.into(),
        }
    }

    pub fn gateway_failure(message: impl Into<String>) -> Self {
        BillingError::GatewayFailure(message.into())
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        BillingError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            BillingError::InvalidOrderReference { .. } => ErrorCode::InvalidFormat,
            BillingError::TransactionNotFound(_) => ErrorCode::PaymentFailed,
            BillingError::PaymentNotCompleted { .. } => ErrorCode::PaymentFailed,
            BillingError::GatewayFailure(_) => ErrorCode::ExternalServiceError,
            BillingError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            BillingError::PlanNotFound(user_id) => {
                format!("No plan found for user: {}", user_id)
            }
            BillingError::InvalidOrderReference { reference, reason } => {
                format!("Order reference '{}' is invalid: {}", reference, reason)
            }
            BillingError::TransactionNotFound(reference) => {
                format!("No transaction found for reference: {}", reference)
            }
            BillingError::PaymentNotCompleted { reference, status } => {
                format!(
                    "Transaction for reference '{}' is not successful (status: {})",
                    reference, status
                )
            }
            BillingError::GatewayFailure(message) => {
                format!("Payment gateway error: {}", message)
            }
            BillingError::InvalidState { current, attempted } => {
                format!("Cannot {} plan in {} state", attempted, current)
            }
            BillingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BillingError::Infrastructure(message) => message.clone(),
        }
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        BillingError::Infrastructure(err.message)
    }
}

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Failed to parse the webhook payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from the webhook payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// The embedded order reference could not be parsed.
    #[error("Malformed order reference: {0}")]
    MalformedOrderReference(String),

    /// Referenced user has no plan record.
    #[error("Plan not found")]
    PlanNotFound,

    /// Attempted plan transition is not valid.
    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the gateway should retry delivering this webhook.
    ///
    /// Retryable errors indicate temporary failures that may succeed
    /// on subsequent attempts.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_)
                | WebhookError::PlanNotFound // Might be eventual consistency
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// Status codes determine the gateway's retry behavior:
    /// - 2xx: Event acknowledged, no retry
    /// - 4xx: Client error, no retry
    /// - 5xx: Server error, will retry
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Auth failure - rejected without processing, no retry
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,

            // Bad request - no retry
            WebhookError::ParseError(_)
            | WebhookError::MissingField(_)
            | WebhookError::MalformedOrderReference(_) => StatusCode::BAD_REQUEST,

            // Server errors - will retry
            WebhookError::PlanNotFound
            | WebhookError::InvalidTransition(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PlanNotFound => WebhookError::PlanNotFound,
            ErrorCode::InvalidStateTransition => WebhookError::InvalidTransition(err.message),
            _ => WebhookError::Database(err.message),
        }
    }
}
