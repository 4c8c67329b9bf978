//! Gateway webhook signature verification.
//!
//! The gateway signs each delivery by HMAC-SHA256 over the `|`-joined
//! envelope header fields and sends the base64-encoded digest in the
//! `X-Gateway-Signature` header. Verification fails closed: a missing
//! field, an unset secret, or an undecodable header all count as invalid.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::gateway_event::GatewayEventEnvelope;

type HmacSha256 = Hmac<Sha256>;

/// Verifier for gateway webhook signatures.
pub struct WebhookSignatureVerifier {
    /// Webhook signing secret issued by the gateway dashboard.
    secret: SecretString,
}

impl WebhookSignatureVerifier {
    /// Creates a new verifier with the given webhook secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    /// Verifies the provided base64 signature against the envelope.
    ///
    /// Returns false (never an error) when:
    /// - the signing secret is unset
    /// - any signed envelope field is missing
    /// - the provided value is not valid base64
    /// - the digests do not match
    pub fn verify(&self, envelope: &GatewayEventEnvelope, provided: &str) -> bool {
        if self.secret.expose_secret().is_empty() {
            tracing::warn!("Webhook secret is unset; rejecting delivery");
            return false;
        }

        let Some(base) = envelope.signature_base() else {
            tracing::warn!("Webhook envelope missing signed fields; rejecting delivery");
            return false;
        };

        let Ok(provided_bytes) = BASE64.decode(provided) else {
            return false;
        };

        let expected = self.digest(&base);
        constant_time_compare(&expected, &provided_bytes)
    }

    /// Computes the base64 signature for an envelope.
    ///
    /// Returns None when the envelope is missing signed fields. Used by
    /// test fixtures and gateway simulators; production deliveries carry
    /// the gateway's own signature.
    pub fn sign(&self, envelope: &GatewayEventEnvelope) -> Option<String> {
        let base = envelope.signature_base()?;
        Some(BASE64.encode(self.digest(&base)))
    }

    fn digest(&self, base: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(base.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// Prevents timing attacks that could leak information about the expected
/// signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::gateway_event::GatewayEventBuilder;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "whk_test_secret_12345";

    fn verifier() -> WebhookSignatureVerifier {
        WebhookSignatureVerifier::new(TEST_SECRET)
    }

    #[test]
    fn valid_signature_is_accepted() {
        let verifier = verifier();
        let envelope = GatewayEventBuilder::new().build();
        let signature = verifier.sign(&envelope).unwrap();

        assert!(verifier.verify(&envelope, &signature));
    }

    #[test]
    fn signature_from_wrong_secret_is_rejected() {
        let envelope = GatewayEventBuilder::new().build();
        let signature = WebhookSignatureVerifier::new("wrong_secret")
            .sign(&envelope)
            .unwrap();

        assert!(!verifier().verify(&envelope, &signature));
    }

    #[test]
    fn tampering_any_single_field_is_rejected() {
        let verifier = verifier();
        let envelope = GatewayEventBuilder::new().build();
        let signature = verifier.sign(&envelope).unwrap();

        let tampered: Vec<GatewayEventEnvelope> = vec![
            GatewayEventBuilder::new().event("transaction.failed").build(),
            {
                let mut e = GatewayEventBuilder::new().build();
                e.request_id = Some("req_002".to_string());
                e
            },
            {
                let mut e = GatewayEventBuilder::new().build();
                e.merchant_id = Some("mrc_999".to_string());
                e
            },
            {
                let mut e = GatewayEventBuilder::new().build();
                e.wallet_id = Some("wal_999".to_string());
                e
            },
            {
                let mut e = GatewayEventBuilder::new().build();
                e.transaction_id = Some("txn_999".to_string());
                e
            },
            {
                let mut e = GatewayEventBuilder::new().build();
                e.kind = Some("REFUND".to_string());
                e
            },
            {
                let mut e = GatewayEventBuilder::new().build();
                e.time = Some("2024-06-01T00:00:00Z".to_string());
                e
            },
            {
                let mut e = GatewayEventBuilder::new().build();
                e.response_code = Some("05".to_string());
                e
            },
            {
                let mut e = GatewayEventBuilder::new().build();
                e.timestamp = Some(1_704_067_201);
                e
            },
        ];

        for (i, envelope) in tampered.iter().enumerate() {
            assert!(
                !verifier.verify(envelope, &signature),
                "tampered field #{} should invalidate the signature",
                i
            );
        }
    }

    #[test]
    fn missing_field_fails_closed() {
        let verifier = verifier();
        let complete = GatewayEventBuilder::new().build();
        let signature = verifier.sign(&complete).unwrap();

        let incomplete = GatewayEventBuilder::new().without_field("wallet_id").build();
        assert!(!verifier.verify(&incomplete, &signature));
        assert!(verifier.sign(&incomplete).is_none());
    }

    #[test]
    fn unset_secret_fails_closed() {
        let verifier = WebhookSignatureVerifier::new("");
        let envelope = GatewayEventBuilder::new().build();

        assert!(!verifier.verify(&envelope, "c2lnbmF0dXJl"));
    }

    #[test]
    fn undecodable_signature_is_rejected() {
        let envelope = GatewayEventBuilder::new().build();
        assert!(!verifier().verify(&envelope, "not base64!!!"));
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let verifier = verifier();
        let envelope = GatewayEventBuilder::new().build();
        let signature = verifier.sign(&envelope).unwrap();
        let truncated = &signature[..signature.len() - 4];

        assert!(!verifier.verify(&envelope, truncated));
    }

    proptest! {
        #[test]
        fn random_signatures_are_rejected(garbage in "[A-Za-z0-9+/]{40,48}") {
            let verifier = verifier();
            let envelope = GatewayEventBuilder::new().build();
            let valid = verifier.sign(&envelope).unwrap();
            prop_assume!(garbage != valid);

            prop_assert!(!verifier.verify(&envelope, &garbage));
        }

        #[test]
        fn random_timestamp_tamper_is_rejected(delta in 1i64..1_000_000) {
            let verifier = verifier();
            let envelope = GatewayEventBuilder::new().build();
            let signature = verifier.sign(&envelope).unwrap();

            let mut tampered = GatewayEventBuilder::new().build();
            tampered.timestamp = tampered.timestamp.map(|t| t + delta);

            prop_assert!(!verifier.verify(&tampered, &signature));
        }
    }
}
