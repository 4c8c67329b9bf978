//! Billing command and query handlers.
//!
//! Each handler owns one operation of the billing lifecycle and depends
//! only on ports, so the HTTP layer stays thin and the handlers are
//! testable with in-memory fakes.

mod confirm_callback;
mod expire_subscriptions;
mod get_plan;
mod handle_gateway_webhook;
mod override_plan;
mod start_checkout;

pub use confirm_callback::{ConfirmCallbackCommand, ConfirmCallbackHandler, ConfirmCallbackResult};
pub use expire_subscriptions::{ExpireSubscriptionsHandler, SweepSummary};
pub use get_plan::{GetPlanHandler, GetPlanQuery};
pub use handle_gateway_webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
};
pub use override_plan::{OverridePlanCommand, OverridePlanHandler};
pub use start_checkout::{StartCheckoutCommand, StartCheckoutHandler, StartCheckoutResult};
