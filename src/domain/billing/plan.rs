//! Plan tier and billing cycle value objects.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Minor-unit amount above which a payment is treated as a yearly
/// subscription. A heuristic inherited from the pricing page, not an
/// authoritative plan lookup.
pub const YEARLY_AMOUNT_THRESHOLD: i64 = 50_000;

/// Subscription plan tier.
///
/// Every user is on exactly one tier. Basic is the free default; Pro is
/// granted by a verified payment and revoked by the expiry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Free tier with limited feature access.
    Basic,

    /// Paid tier with full feature access.
    Pro,
}

impl PlanType {
    /// Returns true if this tier is granted by payment.
    pub fn is_paid(&self) -> bool {
        matches!(self, PlanType::Pro)
    }

    /// Stable string form used in persistence and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Basic => "basic",
            PlanType::Pro => "pro",
        }
    }
}

impl StateMachine for PlanType {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PlanType::*;
        matches!(
            (self, target),
            // Upgrade after a verified payment
            (Basic, Pro)
            // Renewal: a repeat payment re-applies the same target state
                | (Pro, Pro)
            // Downgrade once the grace period has elapsed
                | (Pro, Basic)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PlanType::*;
        match self {
            Basic => vec![Pro],
            Pro => vec![Pro, Basic],
        }
    }
}

/// Billing cycle, derived from the paid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// Derives the cycle from a paid amount in minor units.
    ///
    /// Amounts above [`YEARLY_AMOUNT_THRESHOLD`] are treated as yearly.
    pub fn from_amount(amount_minor: i64) -> Self {
        if amount_minor > YEARLY_AMOUNT_THRESHOLD {
            BillingCycle::Yearly
        } else {
            BillingCycle::Monthly
        }
    }

    /// Length of one paid period in days.
    pub fn period_days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 30,
            BillingCycle::Yearly => 365,
        }
    }

    /// Stable string form used in persistence and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }
}
