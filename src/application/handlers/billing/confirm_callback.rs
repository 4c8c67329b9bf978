//! ConfirmCallbackHandler - Command handler for the browser payment callback.
//!
//! The gateway redirects the customer's browser back with the order
//! reference it was given at checkout. The target user is re-derived from
//! the `SUB-<userId>-<timestamp>` convention, the transaction is verified
//! against the gateway, and only then is the plan upgraded. A reference
//! that fails to parse never touches any user record.

use std::sync::Arc;

use crate::domain::billing::{BillingCycle, BillingError, OrderReference, PlanType};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{PaymentGateway, UserPlanRepository};

/// Command carrying the callback query parameters.
#[derive(Debug, Clone)]
pub struct ConfirmCallbackCommand {
    /// Order reference echoed back by the gateway.
    pub order_reference: String,
    /// Gateway's own order id, logged for correlation only.
    pub order_id: Option<String>,
}

/// Result of a confirmed callback.
#[derive(Debug, Clone)]
pub struct ConfirmCallbackResult {
    /// User whose plan was upgraded.
    pub user_id: UserId,
    /// Tier after the upgrade.
    pub plan_type: PlanType,
    /// Cycle derived from the paid amount.
    pub billing_cycle: BillingCycle,
    /// New end of the paid period.
    pub subscription_ends_at: Timestamp,
}

/// Handler for the payment callback redirect.
pub struct ConfirmCallbackHandler {
    gateway: Arc<dyn PaymentGateway>,
    plans: Arc<dyn UserPlanRepository>,
}

impl ConfirmCallbackHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, plans: Arc<dyn UserPlanRepository>) -> Self {
        Self { gateway, plans }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmCallbackCommand,
    ) -> Result<ConfirmCallbackResult, BillingError> {
        // 1. Re-derive the target user from the reference convention.
        //    Parse failures stop here; no record is read or written.
        let reference = OrderReference::parse(&cmd.order_reference).map_err(|e| {
            tracing::warn!(
                order_reference = %cmd.order_reference,
                error = %e,
                "Callback carried malformed order reference"
            );
            BillingError::invalid_order_reference(&cmd.order_reference, &e)
        })?;

        // 2. Verify the transaction against the gateway.
        let transaction = self
            .gateway
            .verify_transaction(&cmd.order_reference)
            .await
            .map_err(|e| BillingError::gateway_failure(e.to_string()))?
            .ok_or_else(|| BillingError::transaction_not_found(&cmd.order_reference))?;

        if !transaction.status.has_succeeded() {
            return Err(BillingError::payment_not_completed(
                &cmd.order_reference,
                format!("{:?}", transaction.status),
            ));
        }

        // 3. Upgrade the plan. A duplicate callback re-applies the same
        //    target state through the Pro -> Pro renewal transition.
        let user_id = reference.user_id();
        let mut plan = self
            .plans
            .find_by_user_id(&user_id)
            .await?
            .ok_or_else(|| BillingError::plan_not_found(user_id))?;

        let now = Timestamp::now();
        plan.upgrade(transaction.amount_minor, now)
            .map_err(|e| BillingError::invalid_state(plan.plan_type.as_str(), e.message))?;

        self.plans.update(&plan).await?;

        tracing::info!(
            user_id = %user_id,
            order_reference = %cmd.order_reference,
            order_id = cmd.order_id.as_deref().unwrap_or("-"),
            transaction_id = %transaction.transaction_id,
            amount_minor = transaction.amount_minor,
            "Plan upgraded from payment callback"
        );

        let (billing_cycle, subscription_ends_at) =
            match (plan.billing_cycle, plan.subscription_ends_at) {
                (Some(cycle), Some(ends_at)) => (cycle, ends_at),
                _ => {
                    return Err(BillingError::infrastructure(
                        "Upgrade did not record a paid period",
                    ))
                }
            };

        Ok(ConfirmCallbackResult {
            user_id,
            plan_type: plan.plan_type,
            billing_cycle,
            subscription_ends_at,
        })
    }
}
