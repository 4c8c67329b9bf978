//! UserPlan aggregate entity.
//!
//! The per-user plan record mutated by the payment callback, the gateway
//! webhook, the expiry sweep, and admin overrides. No other component
//! writes it.
//!
//! # Design Decisions
//!
//! - **One per user**: `user_id` is the primary key at the database level
//! - **No stored grace state**: whether a plan is in its grace window is
//!   recomputed from `subscription_ends_at` on every sweep
//! - **Intended invariant, unenforced**: `plan_type == Pro` implies
//!   `subscription_ends_at` is in the future or within the grace window.
//!   Nothing enforces this transactionally; a write path that fails partway
//!   can leave it drifted.

use crate::domain::foundation::{DomainError, ErrorCode, StateMachine, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use super::{BillingCycle, PlanType};

/// Days after `subscription_ends_at` during which a Pro plan keeps its tier
/// and the sweep sends reminders instead of downgrading.
pub const GRACE_PERIOD_DAYS: i64 = 3;

/// Where a paid plan stands relative to its end date.
///
/// Recomputed on every sweep run; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryState {
    /// Nothing to expire: free tier, or no end date recorded.
    NotApplicable,

    /// Paid period still running.
    Current,

    /// Past the end date but inside the grace window.
    InGrace,

    /// Past the end date and the grace window. Due for downgrade.
    Lapsed,
}

/// Per-user subscription plan record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPlan {
    /// User who owns this plan. One plan per user.
    pub user_id: UserId,

    /// Email address reminder and downgrade notices are sent to.
    pub email: String,

    /// Current plan tier.
    pub plan_type: PlanType,

    /// Billing cycle derived from the last paid amount. None for free tier.
    pub billing_cycle: Option<BillingCycle>,

    /// End of the paid period. None for free tier.
    pub subscription_ends_at: Option<Timestamp>,

    /// When the record was created.
    pub created_at: Timestamp,

    /// When the record was last updated.
    pub updated_at: Timestamp,
}

impl UserPlan {
    /// Creates a new free-tier plan record.
    pub fn basic(user_id: UserId, email: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            user_id,
            email: email.into(),
            plan_type: PlanType::Basic,
            billing_cycle: None,
            subscription_ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a verified payment: moves the plan to Pro and extends the
    /// paid period from `now` by the cycle derived from `amount_minor`.
    ///
    /// A repeat payment on an already-Pro plan re-applies the same target
    /// state (the Pro -> Pro renewal transition).
    ///
    /// # Errors
    ///
    /// Returns error if the tier transition is not allowed.
    pub fn upgrade(&mut self, amount_minor: i64, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(PlanType::Pro)?;
        let cycle = BillingCycle::from_amount(amount_minor);
        self.billing_cycle = Some(cycle);
        self.subscription_ends_at = Some(now.add_days(cycle.period_days()));
        self.updated_at = now;
        Ok(())
    }

    /// Forces the plan back to the free tier after the grace period.
    ///
    /// Clears the billing cycle and end date so the next sweep does not
    /// pick the record up again.
    ///
    /// # Errors
    ///
    /// Returns error if the tier transition is not allowed.
    pub fn downgrade(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(PlanType::Basic)?;
        self.billing_cycle = None;
        self.subscription_ends_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Applies an admin override, setting tier and period directly.
    ///
    /// Admin writes are authoritative and bypass the transition rules.
    pub fn apply_override(
        &mut self,
        plan_type: PlanType,
        billing_cycle: Option<BillingCycle>,
        subscription_ends_at: Option<Timestamp>,
        now: Timestamp,
    ) {
        self.plan_type = plan_type;
        self.billing_cycle = billing_cycle;
        self.subscription_ends_at = subscription_ends_at;
        self.updated_at = now;
    }

    /// Where this plan stands relative to its end date at `now`.
    pub fn expiry_state(&self, now: Timestamp) -> ExpiryState {
        if !self.plan_type.is_paid() {
            return ExpiryState::NotApplicable;
        }
        let Some(ends_at) = self.subscription_ends_at else {
            return ExpiryState::NotApplicable;
        };

        if now <= ends_at {
            ExpiryState::Current
        } else if now <= ends_at.add_days(GRACE_PERIOD_DAYS) {
            ExpiryState::InGrace
        } else {
            ExpiryState::Lapsed
        }
    }

    /// Whether the plan currently grants paid-tier access.
    ///
    /// Pro grants access while the period runs and through the grace window.
    pub fn has_pro_access(&self, now: Timestamp) -> bool {
        matches!(
            self.expiry_state(now),
            ExpiryState::Current | ExpiryState::InGrace
        )
    }

    /// Days remaining in the grace window, zero outside of it.
    pub fn grace_days_remaining(&self, now: Timestamp) -> i64 {
        let Some(ends_at) = self.subscription_ends_at else {
            return 0;
        };
        let grace_end = ends_at.add_days(GRACE_PERIOD_DAYS);
        if now > ends_at && now <= grace_end {
            grace_end.duration_since(&now).num_days().max(0)
        } else {
            0
        }
    }

    fn transition_to(&mut self, target: PlanType) -> Result<(), DomainError> {
        self.plan_type = self.plan_type.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition plan from {:?} to {:?}",
                    self.plan_type, target
                ),
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::YEARLY_AMOUNT_THRESHOLD;

    fn basic_plan() -> UserPlan {
        UserPlan::basic(UserId::new(), "user@example.com")
    }

    fn pro_plan_ending(ends_at: Timestamp) -> UserPlan {
        let mut plan = basic_plan();
        plan.upgrade(2_500, Timestamp::now()).unwrap();
        plan.subscription_ends_at = Some(ends_at);
        plan
    }

    // Construction

    #[test]
    fn basic_starts_on_free_tier() {
        let plan = basic_plan();
        assert_eq!(plan.plan_type, PlanType::Basic);
        assert!(plan.billing_cycle.is_none());
        assert!(plan.subscription_ends_at.is_none());
    }

    // Upgrade

    #[test]
    fn upgrade_with_small_amount_sets_monthly_period() {
        let mut plan = basic_plan();
        let now = Timestamp::now();

        plan.upgrade(2_500, now).unwrap();

        assert_eq!(plan.plan_type, PlanType::Pro);
        assert_eq!(plan.billing_cycle, Some(BillingCycle::Monthly));
        let ends_at = plan.subscription_ends_at.unwrap();
        assert_eq!(ends_at.duration_since(&now).num_days(), 30);
    }

    #[test]
    fn upgrade_with_large_amount_sets_yearly_period() {
        let mut plan = basic_plan();
        let now = Timestamp::now();

        plan.upgrade(YEARLY_AMOUNT_THRESHOLD + 1, now).unwrap();

        assert_eq!(plan.plan_type, PlanType::Pro);
        assert_eq!(plan.billing_cycle, Some(BillingCycle::Yearly));
        let ends_at = plan.subscription_ends_at.unwrap();
        assert_eq!(ends_at.duration_since(&now).num_days(), 365);
    }

    #[test]
    fn repeat_upgrade_rewrites_same_state() {
        // A duplicate webhook or callback simply extends the period again.
        let mut plan = basic_plan();
        let now = Timestamp::now();
        plan.upgrade(2_500, now).unwrap();

        let later = now.add_days(1);
        plan.upgrade(2_500, later).unwrap();

        assert_eq!(plan.plan_type, PlanType::Pro);
        let ends_at = plan.subscription_ends_at.unwrap();
        assert_eq!(ends_at.duration_since(&later).num_days(), 30);
    }

    // Downgrade

    #[test]
    fn downgrade_clears_paid_fields() {
        let now = Timestamp::now();
        let mut plan = pro_plan_ending(now.minus_days(10));

        plan.downgrade(now).unwrap();

        assert_eq!(plan.plan_type, PlanType::Basic);
        assert!(plan.billing_cycle.is_none());
        assert!(plan.subscription_ends_at.is_none());
    }

    #[test]
    fn downgrade_of_basic_plan_fails() {
        let mut plan = basic_plan();
        assert!(plan.downgrade(Timestamp::now()).is_err());
        assert_eq!(plan.plan_type, PlanType::Basic);
    }

    // Expiry state

    #[test]
    fn basic_plan_has_no_expiry_state() {
        let plan = basic_plan();
        assert_eq!(
            plan.expiry_state(Timestamp::now()),
            ExpiryState::NotApplicable
        );
    }

    #[test]
    fn pro_plan_with_future_end_is_current() {
        let now = Timestamp::now();
        let plan = pro_plan_ending(now.add_days(10));
        assert_eq!(plan.expiry_state(now), ExpiryState::Current);
        assert!(plan.has_pro_access(now));
    }

    #[test]
    fn pro_plan_one_day_past_end_is_in_grace() {
        let now = Timestamp::now();
        let plan = pro_plan_ending(now.minus_days(1));
        assert_eq!(plan.expiry_state(now), ExpiryState::InGrace);
        assert!(plan.has_pro_access(now));
    }

    #[test]
    fn pro_plan_exactly_at_grace_boundary_is_in_grace() {
        let now = Timestamp::now();
        let plan = pro_plan_ending(now.minus_days(GRACE_PERIOD_DAYS));
        assert_eq!(plan.expiry_state(now), ExpiryState::InGrace);
    }

    #[test]
    fn pro_plan_beyond_grace_is_lapsed() {
        let now = Timestamp::now();
        let plan = pro_plan_ending(now.minus_days(GRACE_PERIOD_DAYS + 1));
        assert_eq!(plan.expiry_state(now), ExpiryState::Lapsed);
        assert!(!plan.has_pro_access(now));
    }

    #[test]
    fn grace_days_remaining_counts_down() {
        let now = Timestamp::now();
        let plan = pro_plan_ending(now.minus_days(1));
        assert_eq!(plan.grace_days_remaining(now), GRACE_PERIOD_DAYS - 1);

        let current = pro_plan_ending(now.add_days(5));
        assert_eq!(current.grace_days_remaining(now), 0);
    }

    // Admin override

    #[test]
    fn override_sets_fields_directly() {
        let mut plan = basic_plan();
        let now = Timestamp::now();
        let ends_at = now.add_days(90);

        plan.apply_override(
            PlanType::Pro,
            Some(BillingCycle::Yearly),
            Some(ends_at),
            now,
        );

        assert_eq!(plan.plan_type, PlanType::Pro);
        assert_eq!(plan.billing_cycle, Some(BillingCycle::Yearly));
        assert_eq!(plan.subscription_ends_at, Some(ends_at));
    }

    #[test]
    fn override_can_force_basic_on_basic() {
        // Admin writes bypass the state machine, so a no-op override works.
        let mut plan = basic_plan();
        plan.apply_override(PlanType::Basic, None, None, Timestamp::now());
        assert_eq!(plan.plan_type, PlanType::Basic);
    }
}
