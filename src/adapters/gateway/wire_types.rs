//! Wire types for the gateway's HTTP API.
//!
//! Mirrors the gateway's JSON shapes; conversion into port types happens
//! in the adapter.

use serde::Deserialize;

/// Response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub token_type: Option<String>,

    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Response from the checkout endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order_id: String,
    pub checkout_url: String,
}

/// Response from the transaction lookup endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub order_reference: String,
    pub transaction_id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
}
