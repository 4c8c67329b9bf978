//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing
//! API. They serve as the boundary between HTTP and the application layer.
//! The callback query parameters follow the gateway's camelCase naming;
//! everything else is our own snake_case contract.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::SweepSummary;
use crate::domain::billing::{BillingCycle, PlanType, UserPlan};
use crate::domain::foundation::{Timestamp, UserId};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a subscription checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct StartCheckoutRequest {
    /// Email for the gateway receipt.
    pub email: String,
    /// Amount in minor units.
    pub amount: i64,
    /// URL the gateway redirects the browser back to.
    pub return_url: String,
}

/// Query parameters the gateway appends to the callback redirect.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Order reference echoed back by the gateway.
    #[serde(rename = "orderReference")]
    pub order_reference: String,
    /// Gateway's own order id.
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// Request to override a user's plan (admin).
#[derive(Debug, Clone, Deserialize)]
pub struct OverridePlanRequest {
    /// Target user.
    pub user_id: UserId,
    /// Email used when the record has to be created.
    pub email: String,
    /// Tier to set.
    pub plan_type: PlanType,
    /// Billing cycle to set, if any.
    #[serde(default)]
    pub billing_cycle: Option<BillingCycle>,
    /// Paid period end to set, if any.
    #[serde(default)]
    pub subscription_ends_at: Option<Timestamp>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response wrapping a plan view, null when the user has no record yet.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub plan: Option<PlanViewResponse>,
}

/// Detailed plan view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PlanViewResponse {
    /// User ID.
    pub user_id: String,
    /// Current plan tier.
    pub plan_type: PlanType,
    /// Billing cycle, null for free tier.
    pub billing_cycle: Option<BillingCycle>,
    /// End of the paid period (ISO 8601), null for free tier.
    pub subscription_ends_at: Option<String>,
    /// Whether the plan currently grants paid-tier access.
    pub has_pro_access: bool,
    /// When the record was created (ISO 8601).
    pub created_at: String,
}

impl From<UserPlan> for PlanViewResponse {
    fn from(plan: UserPlan) -> Self {
        let now = Timestamp::now();
        Self {
            user_id: plan.user_id.to_string(),
            plan_type: plan.plan_type,
            billing_cycle: plan.billing_cycle,
            subscription_ends_at: plan
                .subscription_ends_at
                .map(|t| t.as_datetime().to_rfc3339()),
            has_pro_access: plan.has_pro_access(now),
            created_at: plan.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for a started checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    /// Order reference to correlate the callback and webhook with.
    pub order_reference: String,
    /// Hosted checkout URL for the customer.
    pub checkout_url: String,
}

/// Counts returned to the external scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResponse {
    pub scanned: u32,
    pub reminded: u32,
    pub downgraded: u32,
}

impl From<SweepSummary> for SweepResponse {
    fn from(summary: SweepSummary) -> Self {
        Self {
            scanned: summary.scanned,
            reminded: summary.reminded,
            downgraded: summary.downgraded,
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_view_maps_free_tier() {
        let plan = UserPlan::basic(UserId::new(), "user@example.com");
        let view = PlanViewResponse::from(plan.clone());

        assert_eq!(view.user_id, plan.user_id.to_string());
        assert_eq!(view.plan_type, PlanType::Basic);
        assert!(view.billing_cycle.is_none());
        assert!(view.subscription_ends_at.is_none());
        assert!(!view.has_pro_access);
    }

    #[test]
    fn plan_view_maps_paid_tier() {
        let mut plan = UserPlan::basic(UserId::new(), "user@example.com");
        plan.upgrade(60_000, Timestamp::now()).unwrap();

        let view = PlanViewResponse::from(plan);

        assert_eq!(view.plan_type, PlanType::Pro);
        assert_eq!(view.billing_cycle, Some(BillingCycle::Yearly));
        assert!(view.subscription_ends_at.is_some());
        assert!(view.has_pro_access);
    }

    #[test]
    fn callback_query_parses_gateway_naming() {
        let query: CallbackQuery =
            serde_json::from_str(r#"{"orderReference": "SUB-x-1", "orderId": "ord_9"}"#).unwrap();
        assert_eq!(query.order_reference, "SUB-x-1");
        assert_eq!(query.order_id.as_deref(), Some("ord_9"));
    }

    #[test]
    fn callback_query_tolerates_missing_order_id() {
        let query: CallbackQuery =
            serde_json::from_str(r#"{"orderReference": "SUB-x-1"}"#).unwrap();
        assert!(query.order_id.is_none());
    }

    #[test]
    fn sweep_response_copies_counts() {
        let response = SweepResponse::from(SweepSummary {
            scanned: 5,
            reminded: 2,
            downgraded: 3,
        });
        assert_eq!(response.scanned, 5);
        assert_eq!(response.reminded, 2);
        assert_eq!(response.downgraded, 3);
    }

    #[test]
    fn override_request_parses_optional_fields() {
        let json = format!(
            r#"{{"user_id": "{}", "email": "a@b.c", "plan_type": "pro"}}"#,
            uuid::Uuid::new_v4()
        );
        let request: OverridePlanRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.plan_type, PlanType::Pro);
        assert!(request.billing_cycle.is_none());
        assert!(request.subscription_ends_at.is_none());
    }
}
