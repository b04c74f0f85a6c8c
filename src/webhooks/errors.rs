//! Error type for webhook signature verification.
//!
//! Every failure carries a human-readable reason; none of them include the
//! secret or the expected signature.

use thiserror::Error;

/// Webhook signature verification failed.
///
/// # Example
///
/// ```rust
/// use attio::webhooks::SignatureVerificationError;
///
/// let error = SignatureVerificationError::MissingHeader { header: "X-Attio-Timestamp" };
/// assert_eq!(error.to_string(), "Missing X-Attio-Timestamp header");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureVerificationError {
    /// The request carried no body.
    #[error("Payload cannot be nil")]
    MissingPayload,

    /// The signature was empty.
    #[error("Signature cannot be nil or empty")]
    MissingSignature,

    /// The secret was empty.
    #[error("Secret cannot be nil or empty")]
    MissingSecret,

    /// A required header was absent.
    #[error("Missing {header} header")]
    MissingHeader {
        /// Canonical name of the missing header.
        header: &'static str,
    },

    /// The timestamp was not a whole number of seconds.
    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp {
        /// The value as received.
        value: String,
    },

    /// The timestamp is further in the past than the tolerance allows.
    #[error("Timestamp too old ({age}s old, tolerance {tolerance}s)")]
    TimestampTooOld {
        /// Seconds between the timestamp and now.
        age: i64,
        /// Allowed skew in seconds.
        tolerance: u64,
    },

    /// The timestamp is further in the future than the tolerance allows.
    #[error("Timestamp too far in the future ({skew}s ahead, tolerance {tolerance}s)")]
    TimestampInFuture {
        /// Seconds between now and the timestamp.
        skew: i64,
        /// Allowed skew in seconds.
        tolerance: u64,
    },

    /// The signature does not match the payload.
    #[error("Signature mismatch")]
    SignatureMismatch,

    /// The body was verified but is not valid JSON.
    #[error("Invalid JSON payload: {message}")]
    InvalidJson {
        /// The decoder's message.
        message: String,
    },
}

// Verify error type is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SignatureVerificationError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_field() {
        assert_eq!(
            SignatureVerificationError::MissingPayload.to_string(),
            "Payload cannot be nil"
        );
        assert_eq!(
            SignatureVerificationError::MissingSecret.to_string(),
            "Secret cannot be nil or empty"
        );
        assert_eq!(
            SignatureVerificationError::MissingSignature.to_string(),
            "Signature cannot be nil or empty"
        );
    }

    #[test]
    fn test_timestamp_messages() {
        let old = SignatureVerificationError::TimestampTooOld {
            age: 400,
            tolerance: 300,
        };
        assert!(old.to_string().starts_with("Timestamp too old"));

        let future = SignatureVerificationError::TimestampInFuture {
            skew: 400,
            tolerance: 300,
        };
        assert!(future
            .to_string()
            .starts_with("Timestamp too far in the future"));
    }
}
