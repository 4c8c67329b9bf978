//! Gateway webhook event envelope.
//!
//! Defines the structures for parsing inbound gateway webhook payloads.
//! Only fields relevant to our processing are captured; the envelope's
//! header fields double as the signature base (see
//! [`super::WebhookSignatureVerifier`]).

use serde::{Deserialize, Serialize};

/// Separator used when joining envelope fields into the signature base.
pub(crate) const SIGNATURE_FIELD_SEPARATOR: &str = "|";

/// Inbound gateway webhook envelope.
///
/// All header fields are optional at the parsing layer; the signature
/// check fails closed when any of them is absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEventEnvelope {
    /// Event name (e.g. "transaction.successful").
    pub event: Option<String>,

    /// Gateway-assigned request id for this delivery.
    pub request_id: Option<String>,

    /// Merchant account the event belongs to.
    pub merchant_id: Option<String>,

    /// Wallet the funds settled into.
    pub wallet_id: Option<String>,

    /// Gateway transaction id.
    pub transaction_id: Option<String>,

    /// Transaction kind (e.g. "PAYMENT").
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Gateway-formatted event time.
    pub time: Option<String>,

    /// Gateway response code ("00" on success).
    pub response_code: Option<String>,

    /// Unix timestamp the signature was generated at.
    pub timestamp: Option<i64>,

    /// Event-specific payload.
    pub data: Option<GatewayEventData>,
}

/// Event-specific payload fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEventData {
    /// Order reference the merchant supplied at checkout.
    pub order_reference: Option<String>,

    /// Paid amount in minor units.
    pub amount: Option<i64>,

    /// ISO currency code.
    pub currency: Option<String>,

    /// Gateway-native transaction status.
    pub status: Option<String>,
}

impl GatewayEventEnvelope {
    /// Joins the signed header fields into the documented signature base:
    /// `event|requestId|merchantId|walletId|transactionId|type|time|responseCode|timestamp`.
    ///
    /// Returns None when any field is missing, so signature verification
    /// fails closed on incomplete envelopes.
    pub fn signature_base(&self) -> Option<String> {
        let parts = [
            self.event.as_deref()?,
            self.request_id.as_deref()?,
            self.merchant_id.as_deref()?,
            self.wallet_id.as_deref()?,
            self.transaction_id.as_deref()?,
            self.kind.as_deref()?,
            self.time.as_deref()?,
            self.response_code.as_deref()?,
        ];
        let timestamp = self.timestamp?;

        let mut base = parts.join(SIGNATURE_FIELD_SEPARATOR);
        base.push_str(SIGNATURE_FIELD_SEPARATOR);
        base.push_str(&timestamp.to_string());
        Some(base)
    }

    /// Parses the event name into a known variant.
    pub fn parsed_event(&self) -> GatewayEventType {
        self.event
            .as_deref()
            .map(GatewayEventType::from_event_name)
            .unwrap_or(GatewayEventType::Unknown)
    }
}

/// Known gateway event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEventType {
    /// Payment settled; the plan should be upgraded.
    TransactionSuccessful,

    /// Payment failed terminally.
    TransactionFailed,

    /// Payment still in flight.
    TransactionPending,

    /// Unknown or unhandled event type.
    Unknown,
}

impl GatewayEventType {
    /// Parse event type from the gateway's event name.
    pub fn from_event_name(s: &str) -> Self {
        match s {
            "transaction.successful" => Self::TransactionSuccessful,
            "transaction.failed" => Self::TransactionFailed,
            "transaction.pending" => Self::TransactionPending,
            _ => Self::Unknown,
        }
    }

    /// Convert to the gateway's event name string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionSuccessful => "transaction.successful",
            Self::TransactionFailed => "transaction.failed",
            Self::TransactionPending => "transaction.pending",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true for events that should mutate the plan.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::TransactionSuccessful)
    }
}

/// Builder for creating test envelopes with every signed field present.
#[cfg(test)]
pub struct GatewayEventBuilder {
    envelope: GatewayEventEnvelope,
}

#[cfg(test)]
impl GatewayEventBuilder {
    pub fn new() -> Self {
        Self {
            envelope: GatewayEventEnvelope {
                event: Some("transaction.successful".to_string()),
                request_id: Some("req_001".to_string()),
                merchant_id: Some("mrc_123".to_string()),
                wallet_id: Some("wal_456".to_string()),
                transaction_id: Some("txn_789".to_string()),
                kind: Some("PAYMENT".to_string()),
                time: Some("2024-01-01T00:00:00Z".to_string()),
                response_code: Some("00".to_string()),
                timestamp: Some(1_704_067_200),
                data: Some(GatewayEventData {
                    order_reference: None,
                    amount: Some(2_500),
                    currency: Some("USD".to_string()),
                    status: Some("successful".to_string()),
                }),
            },
        }
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.envelope.event = Some(event.into());
        self
    }

    pub fn order_reference(mut self, reference: impl Into<String>) -> Self {
        let data = self.envelope.data.get_or_insert(GatewayEventData {
            order_reference: None,
            amount: None,
            currency: None,
            status: None,
        });
        data.order_reference = Some(reference.into());
        self
    }

    pub fn amount(mut self, amount: i64) -> Self {
        if let Some(data) = self.envelope.data.as_mut() {
            data.amount = Some(amount);
        }
        self
    }

    pub fn without_field(mut self, field: &str) -> Self {
        match field {
            "event" => self.envelope.event = None,
            "request_id" => self.envelope.request_id = None,
            "merchant_id" => self.envelope.merchant_id = None,
            "wallet_id" => self.envelope.wallet_id = None,
            "transaction_id" => self.envelope.transaction_id = None,
            "type" => self.envelope.kind = None,
            "time" => self.envelope.time = None,
            "response_code" => self.envelope.response_code = None,
            "timestamp" => self.envelope.timestamp = None,
            other => panic!("unknown envelope field: {}", other),
        }
        self
    }

    pub fn build(self) -> GatewayEventEnvelope {
        self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_envelope() {
        let json = r#"{
            "event": "transaction.successful",
            "requestId": "req_001",
            "merchantId": "mrc_123",
            "walletId": "wal_456",
            "transactionId": "txn_789",
            "type": "PAYMENT",
            "time": "2024-01-01T00:00:00Z",
            "responseCode": "00",
            "timestamp": 1704067200,
            "data": {
                "orderReference": "SUB-7f8a2f8e-4e2a-4c3b-9d1e-aa52b1c90f10-1704067200",
                "amount": 60000,
                "currency": "USD",
                "status": "successful"
            }
        }"#;

        let envelope: GatewayEventEnvelope = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.event.as_deref(), Some("transaction.successful"));
        assert_eq!(envelope.response_code.as_deref(), Some("00"));
        let data = envelope.data.as_ref().unwrap();
        assert_eq!(data.amount, Some(60_000));
        assert!(data
            .order_reference
            .as_deref()
            .unwrap()
            .starts_with("SUB-"));
    }

    #[test]
    fn deserialize_tolerates_missing_fields() {
        let json = r#"{"event": "transaction.successful"}"#;
        let envelope: GatewayEventEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.request_id.is_none());
        assert!(envelope.data.is_none());
    }

    #[test]
    fn signature_base_joins_documented_fields() {
        let envelope = GatewayEventBuilder::new().build();
        let base = envelope.signature_base().unwrap();
        assert_eq!(
            base,
            "transaction.successful|req_001|mrc_123|wal_456|txn_789|PAYMENT|2024-01-01T00:00:00Z|00|1704067200"
        );
    }

    #[test]
    fn signature_base_is_none_when_any_field_missing() {
        for field in [
            "event",
            "request_id",
            "merchant_id",
            "wallet_id",
            "transaction_id",
            "type",
            "time",
            "response_code",
            "timestamp",
        ] {
            let envelope = GatewayEventBuilder::new().without_field(field).build();
            assert!(
                envelope.signature_base().is_none(),
                "expected missing {} to void the signature base",
                field
            );
        }
    }

    #[test]
    fn parsed_event_maps_known_names() {
        assert_eq!(
            GatewayEventType::from_event_name("transaction.successful"),
            GatewayEventType::TransactionSuccessful
        );
        assert_eq!(
            GatewayEventType::from_event_name("transaction.failed"),
            GatewayEventType::TransactionFailed
        );
        assert_eq!(
            GatewayEventType::from_event_name("transaction.pending"),
            GatewayEventType::TransactionPending
        );
        assert_eq!(
            GatewayEventType::from_event_name("customer.created"),
            GatewayEventType::Unknown
        );
    }

    #[test]
    fn parsed_event_is_unknown_without_event_name() {
        let envelope = GatewayEventBuilder::new().without_field("event").build();
        assert_eq!(envelope.parsed_event(), GatewayEventType::Unknown);
    }

    #[test]
    fn only_successful_event_is_success() {
        assert!(GatewayEventType::TransactionSuccessful.is_success());
        assert!(!GatewayEventType::TransactionFailed.is_success());
        assert!(!GatewayEventType::TransactionPending.is_success());
        assert!(!GatewayEventType::Unknown.is_success());
    }

    #[test]
    fn event_name_roundtrip() {
        for event in [
            GatewayEventType::TransactionSuccessful,
            GatewayEventType::TransactionFailed,
            GatewayEventType::TransactionPending,
        ] {
            assert_eq!(GatewayEventType::from_event_name(event.as_str()), event);
        }
    }
}
