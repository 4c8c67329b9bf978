//! StartCheckoutHandler - Command handler for initiating a subscription checkout.

use std::sync::Arc;

use crate::domain::billing::{BillingError, OrderReference};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{CheckoutRequest, PaymentGateway};

/// Command to start a subscription checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutCommand {
    /// User starting the checkout.
    pub user_id: UserId,
    /// Email for the gateway receipt.
    pub email: String,
    /// Amount in minor units; also drives the billing-cycle heuristic
    /// once the payment comes back.
    pub amount_minor: i64,
    /// ISO currency code.
    pub currency: String,
    /// URL the gateway redirects the browser back to.
    pub return_url: String,
}

/// Result of starting a checkout.
#[derive(Debug, Clone)]
pub struct StartCheckoutResult {
    /// Order reference to correlate the callback and webhook with.
    pub order_reference: String,
    /// Hosted checkout URL for the customer.
    pub checkout_url: String,
}

/// Handler for starting a subscription checkout.
///
/// Builds the `SUB-<userId>-<timestamp>` order reference and hands it to
/// the gateway. Does not touch the plan record; only verified payments
/// mutate it.
pub struct StartCheckoutHandler {
    gateway: Arc<dyn PaymentGateway>,
}

impl StartCheckoutHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    pub async fn handle(
        &self,
        cmd: StartCheckoutCommand,
    ) -> Result<StartCheckoutResult, BillingError> {
        if cmd.amount_minor <= 0 {
            return Err(BillingError::validation(
                "amount",
                "Amount must be positive",
            ));
        }

        let order_reference = OrderReference::new(cmd.user_id, Timestamp::now()).to_string();

        let session = self
            .gateway
            .initiate_checkout(CheckoutRequest {
                order_reference: order_reference.clone(),
                amount_minor: cmd.amount_minor,
                currency: cmd.currency,
                customer_email: cmd.email,
                return_url: cmd.return_url,
            })
            .await
            .map_err(|e| BillingError::gateway_failure(e.to_string()))?;

        tracing::info!(
            user_id = %cmd.user_id,
            order_reference = %order_reference,
            order_id = %session.order_id,
            "Checkout initiated"
        );

        Ok(StartCheckoutResult {
            order_reference,
            checkout_url: session.checkout_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{
        AccessToken, CheckoutSession, GatewayError, GatewayTransaction, PaymentGateway,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockGateway {
        requests: Mutex<Vec<CheckoutRequest>>,
        fail: bool,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn requests(&self) -> Vec<CheckoutRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn issue_token(&self) -> Result<AccessToken, GatewayError> {
            Ok(AccessToken {
                token: "tok_test".to_string(),
                expires_in_secs: 3600,
            })
        }

        async fn initiate_checkout(
            &self,
            request: CheckoutRequest,
        ) -> Result<CheckoutSession, GatewayError> {
            if self.fail {
                return Err(GatewayError::provider("gateway unavailable"));
            }
            self.requests.lock().unwrap().push(request.clone());
            Ok(CheckoutSession {
                order_id: "ord_123".to_string(),
                checkout_url: format!("https://pay.example.com/{}", request.order_reference),
            })
        }

        async fn verify_transaction(
            &self,
            _order_reference: &str,
        ) -> Result<Option<GatewayTransaction>, GatewayError> {
            Ok(None)
        }
    }

    fn command(amount: i64) -> StartCheckoutCommand {
        StartCheckoutCommand {
            user_id: UserId::new(),
            email: "user@example.com".to_string(),
            amount_minor: amount,
            currency: "USD".to_string(),
            return_url: "https://app.example.com/billing/return".to_string(),
        }
    }

    #[tokio::test]
    async fn checkout_builds_reference_for_user() {
        let gateway = Arc::new(MockGateway::new());
        let handler = StartCheckoutHandler::new(gateway.clone());
        let cmd = command(2_500);
        let user_id = cmd.user_id;

        let result = handler.handle(cmd).await.unwrap();

        let parsed = OrderReference::parse(&result.order_reference).unwrap();
        assert_eq!(parsed.user_id(), user_id);
        assert!(result.checkout_url.contains(&result.order_reference));

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].order_reference, result.order_reference);
    }

    #[tokio::test]
    async fn checkout_rejects_non_positive_amount() {
        let handler = StartCheckoutHandler::new(Arc::new(MockGateway::new()));

        let result = handler.handle(command(0)).await;

        assert!(matches!(
            result,
            Err(BillingError::ValidationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_as_billing_error() {
        let handler = StartCheckoutHandler::new(Arc::new(MockGateway::failing()));

        let result = handler.handle(command(2_500)).await;

        assert!(matches!(result, Err(BillingError::GatewayFailure(_))));
    }
}
