//! Order reference convention for gateway transaction correlation.
//!
//! The gateway only echoes back opaque strings, so the target user id is
//! encoded into the order reference itself: `SUB-<userId>-<timestamp>`.
//! The callback handler re-derives the user from this convention; nothing
//! cryptographically binds the reference to the paying session.

use crate::domain::foundation::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Prefix marking a subscription checkout reference.
pub const ORDER_REFERENCE_PREFIX: &str = "SUB";

/// Errors that occur when parsing an order reference string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderReferenceError {
    /// Reference does not start with the `SUB-` prefix.
    #[error("Order reference missing '{ORDER_REFERENCE_PREFIX}-' prefix")]
    MissingPrefix,

    /// Reference has no trailing timestamp segment.
    #[error("Order reference missing timestamp segment")]
    MissingTimestamp,

    /// The user id segment is not a valid UUID.
    #[error("Order reference has malformed user id: {0}")]
    MalformedUserId(String),

    /// The timestamp segment is not a valid Unix timestamp.
    #[error("Order reference has malformed timestamp: {0}")]
    MalformedTimestamp(String),
}

/// Parsed `SUB-<userId>-<timestamp>` order reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReference {
    user_id: UserId,
    issued_at_unix: i64,
}

impl OrderReference {
    /// Creates a reference for a new checkout issued at `issued_at`.
    pub fn new(user_id: UserId, issued_at: Timestamp) -> Self {
        Self {
            user_id,
            issued_at_unix: issued_at.as_unix_secs(),
        }
    }

    /// Parses a reference string back into its components.
    ///
    /// The user id itself contains hyphens (UUID), so the timestamp is
    /// taken from the rightmost segment rather than a plain split.
    ///
    /// # Errors
    ///
    /// Returns `OrderReferenceError` if the prefix, user id, or timestamp
    /// segment is missing or malformed. Callers must treat a parse failure
    /// as a hard stop: a malformed reference never identifies a user.
    pub fn parse(s: &str) -> Result<Self, OrderReferenceError> {
        let rest = s
            .strip_prefix(ORDER_REFERENCE_PREFIX)
            .and_then(|r| r.strip_prefix('-'))
            .ok_or(OrderReferenceError::MissingPrefix)?;

        let (user_segment, ts_segment) = rest
            .rsplit_once('-')
            .ok_or(OrderReferenceError::MissingTimestamp)?;

        let user_id: UserId = user_segment
            .parse()
            .map_err(|_| OrderReferenceError::MalformedUserId(user_segment.to_string()))?;

        let issued_at_unix: i64 = ts_segment
            .parse()
            .map_err(|_| OrderReferenceError::MalformedTimestamp(ts_segment.to_string()))?;

        Ok(Self {
            user_id,
            issued_at_unix,
        })
    }

    /// The user this reference targets.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Unix timestamp at which the reference was issued.
    pub fn issued_at_unix(&self) -> i64 {
        self.issued_at_unix
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            ORDER_REFERENCE_PREFIX, self.user_id, self.issued_at_unix
        )
    }
}
