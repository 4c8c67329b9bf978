//! Axum router configuration for billing endpoints.
//!
//! This module defines the route structure for billing-related endpoints
//! and wires them to their corresponding handlers.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_checkout, gateway_webhook, get_plan, override_admin_plan, payment_callback,
    run_expiry_sweep, BillingAppState,
};

/// Create the billing API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `GET /plan` - Get the current user's plan
/// - `POST /checkout` - Start a subscription checkout
///
/// ## Gateway-Facing Endpoints (no auth)
/// - `GET /callback` - Browser redirect after payment; always redirects
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/plan", get(get_plan))
        .route("/checkout", post(create_checkout))
        .route("/callback", get(payment_callback))
}

/// Create the gateway webhook router.
///
/// Separate from the billing routes because webhooks don't require user
/// authentication (they're verified via signature).
///
/// # Routes
/// - `POST /gateway` - Handle gateway webhooks
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/gateway", post(gateway_webhook))
}

/// Create the internal cron router.
///
/// Intended for invocation by an external scheduler.
///
/// # Routes
/// - `GET /subscriptions` - Run the subscription expiry sweep
pub fn cron_routes() -> Router<BillingAppState> {
    Router::new().route("/subscriptions", get(run_expiry_sweep))
}

/// Create the admin router.
///
/// # Routes
/// - `POST /plan` - Override a user's plan
pub fn admin_routes() -> Router<BillingAppState> {
    Router::new().route("/plan", post(override_admin_plan))
}

/// Create the complete billing module router.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use ledgerly::adapters::http::billing::{billing_router, BillingAppState};
///
/// let app_state = BillingAppState { /* ... */ };
/// let app = billing_router().with_state(app_state);
/// ```
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/api/billing", billing_routes())
        .nest("/api/webhooks", webhook_routes())
        .nest("/api/admin", admin_routes())
        .nest("/internal/cron", cron_routes())
}
