//! OverridePlanHandler - Command handler for admin plan overrides.
//!
//! Back-office support action. Admin writes are authoritative: they set
//! tier, cycle, and end date directly, bypassing the transition rules the
//! payment-driven paths follow. Creates the plan record when the user has
//! none yet.

use std::sync::Arc;

use crate::domain::billing::{BillingCycle, BillingError, PlanType, UserPlan};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::UserPlanRepository;

/// Command to override a user's plan.
#[derive(Debug, Clone)]
pub struct OverridePlanCommand {
    /// Target user.
    pub user_id: UserId,
    /// Email used when the record has to be created.
    pub email: String,
    /// Tier to set.
    pub plan_type: PlanType,
    /// Billing cycle to set, if any.
    pub billing_cycle: Option<BillingCycle>,
    /// Paid period end to set, if any.
    pub subscription_ends_at: Option<Timestamp>,
}

/// Handler for admin plan overrides.
pub struct OverridePlanHandler {
    plans: Arc<dyn UserPlanRepository>,
}

impl OverridePlanHandler {
    pub fn new(plans: Arc<dyn UserPlanRepository>) -> Self {
        Self { plans }
    }

    pub async fn handle(&self, cmd: OverridePlanCommand) -> Result<UserPlan, BillingError> {
        let now = Timestamp::now();

        let existing = self.plans.find_by_user_id(&cmd.user_id).await?;
        let created = existing.is_none();

        let mut plan =
            existing.unwrap_or_else(|| UserPlan::basic(cmd.user_id, cmd.email.clone()));
        plan.apply_override(
            cmd.plan_type,
            cmd.billing_cycle,
            cmd.subscription_ends_at,
            now,
        );

        if created {
            self.plans.save(&plan).await?;
        } else {
            self.plans.update(&plan).await?;
        }

        tracing::info!(
            user_id = %cmd.user_id,
            plan_type = plan.plan_type.as_str(),
            created = created,
            "Plan overridden by admin"
        );

        Ok(plan)
    }
}
