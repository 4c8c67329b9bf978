//! Ports - trait interfaces for external dependencies.
//!
//! Adapters implement these traits; application handlers depend on them
//! as `Arc<dyn …>` so infrastructure can be swapped in tests.

mod email_sender;
mod payment_gateway;
mod user_plan_repository;

pub use email_sender::{EmailError, EmailMessage, EmailSender};
pub use payment_gateway::{
    AccessToken, CheckoutRequest, CheckoutSession, GatewayError, GatewayErrorCode,
    GatewayTransaction, PaymentGateway, TransactionStatus,
};
pub use user_plan_repository::UserPlanRepository;
