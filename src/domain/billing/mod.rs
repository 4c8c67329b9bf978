//! Billing domain - subscription plans and the payment gateway contract.
//!
//! Contains the plan lifecycle (upgrade, grace period, downgrade), the
//! order-reference convention that correlates gateway transactions with
//! users, and webhook envelope parsing plus signature verification.

mod errors;
mod gateway_event;
mod order_reference;
mod plan;
mod signature;
mod user_plan;

pub use errors::{BillingError, WebhookError};
pub use gateway_event::{GatewayEventData, GatewayEventEnvelope, GatewayEventType};
pub use order_reference::{OrderReference, OrderReferenceError, ORDER_REFERENCE_PREFIX};
pub use plan::{BillingCycle, PlanType, YEARLY_AMOUNT_THRESHOLD};
pub use signature::WebhookSignatureVerifier;
pub use user_plan::{ExpiryState, UserPlan, GRACE_PERIOD_DAYS};
