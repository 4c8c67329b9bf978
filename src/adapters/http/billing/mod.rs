//! HTTP adapter for the billing feature.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::BillingAppState;
pub use routes::billing_router;
