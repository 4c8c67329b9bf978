//! HTTP adapters - axum routers, handlers, and DTOs per feature.

pub mod billing;
