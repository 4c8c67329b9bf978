//! HandleGatewayWebhookHandler - Command handler for gateway webhook deliveries.
//!
//! Server-to-server counterpart of the browser callback. The signature is
//! checked before anything else; a delivery that fails verification is
//! rejected with 401 and never processed. Success events upgrade the plan
//! identified by the embedded order reference. Duplicate deliveries both
//! succeed and re-write the same target state.

use std::sync::Arc;

use crate::domain::billing::{
    GatewayEventEnvelope, GatewayEventType, OrderReference, WebhookError,
    WebhookSignatureVerifier,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::UserPlanRepository;

/// Command carrying the raw delivery.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Raw request body.
    pub payload: Vec<u8>,
    /// Value of the X-Gateway-Signature header.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleGatewayWebhookResult {
    /// Success event processed; plan upgraded.
    PlanUpgraded { user_id: UserId },
    /// Known event acknowledged without plan mutation.
    Acknowledged,
    /// Unknown event type, ignored.
    Ignored,
}

/// Handler for gateway webhook deliveries.
pub struct HandleGatewayWebhookHandler {
    verifier: WebhookSignatureVerifier,
    plans: Arc<dyn UserPlanRepository>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(verifier: WebhookSignatureVerifier, plans: Arc<dyn UserPlanRepository>) -> Self {
        Self { verifier, plans }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, WebhookError> {
        // 1. Parse the envelope.
        let envelope: GatewayEventEnvelope = serde_json::from_slice(&cmd.payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        // 2. Verify the signature before any processing.
        if !self.verifier.verify(&envelope, &cmd.signature) {
            tracing::warn!(
                event = envelope.event.as_deref().unwrap_or("-"),
                request_id = envelope.request_id.as_deref().unwrap_or("-"),
                "Webhook signature verification failed"
            );
            return Err(WebhookError::InvalidSignature);
        }

        // 3. Dispatch by event type.
        match envelope.parsed_event() {
            GatewayEventType::TransactionSuccessful => self.handle_success(&envelope).await,
            GatewayEventType::TransactionFailed | GatewayEventType::TransactionPending => {
                tracing::debug!(
                    event = envelope.event.as_deref().unwrap_or("-"),
                    "Non-success event acknowledged"
                );
                Ok(HandleGatewayWebhookResult::Acknowledged)
            }
            GatewayEventType::Unknown => {
                tracing::debug!(
                    event = envelope.event.as_deref().unwrap_or("-"),
                    "Unknown event type ignored"
                );
                Ok(HandleGatewayWebhookResult::Ignored)
            }
        }
    }

    async fn handle_success(
        &self,
        envelope: &GatewayEventEnvelope,
    ) -> Result<HandleGatewayWebhookResult, WebhookError> {
        let data = envelope
            .data
            .as_ref()
            .ok_or(WebhookError::MissingField("data"))?;

        let raw_reference = data
            .order_reference
            .as_deref()
            .ok_or(WebhookError::MissingField("orderReference"))?;

        let amount = data.amount.ok_or(WebhookError::MissingField("amount"))?;

        // A malformed reference never identifies a user; stop here.
        let reference = OrderReference::parse(raw_reference)
            .map_err(|e| WebhookError::MalformedOrderReference(e.to_string()))?;

        let user_id = reference.user_id();
        let mut plan = self
            .plans
            .find_by_user_id(&user_id)
            .await?
            .ok_or(WebhookError::PlanNotFound)?;

        let now = Timestamp::now();
        plan.upgrade(amount, now)
            .map_err(|e| WebhookError::InvalidTransition(e.message))?;

        self.plans.update(&plan).await?;

        tracing::info!(
            user_id = %user_id,
            order_reference = %raw_reference,
            transaction_id = envelope.transaction_id.as_deref().unwrap_or("-"),
            amount_minor = amount,
            "Plan upgraded from gateway webhook"
        );

        Ok(HandleGatewayWebhookResult::PlanUpgraded { user_id })
    }
}
