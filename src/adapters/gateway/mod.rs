//! Payment gateway adapter.

mod http_gateway;
mod wire_types;

pub use http_gateway::{GatewaySettings, HttpPaymentGateway};
