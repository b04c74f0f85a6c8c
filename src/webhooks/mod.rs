//! Webhook signature verification.
//!
//! Attio signs every webhook delivery with the subscription's secret. This
//! module verifies those signatures before any payload is trusted:
//!
//! - [`calculate_signature`], [`verify_signature`], [`is_valid_signature`]:
//!   stateless signing and verification primitives
//! - [`extract_from_headers`] and [`SignatureHeader`]: header parsing
//! - [`WebhookHandler`]: request-level verification plus JSON decoding
//! - [`SignatureVerificationError`]: the reason a delivery was rejected
//!
//! # Security
//!
//! Signatures are compared in constant time, and timestamps outside the
//! tolerance window (300 seconds by default, in either direction) are
//! rejected to limit replay. Always verify the raw request body.
//!
//! # Example
//!
//! ```rust
//! use attio::webhooks::{calculate_signature, is_valid_signature, DEFAULT_TOLERANCE};
//!
//! let now = chrono::Utc::now().timestamp();
//! let body = r#"{"event":"record.created"}"#;
//! let signature = calculate_signature(body, now, "s3cr3t");
//!
//! assert!(is_valid_signature(body, &signature, now, "s3cr3t", DEFAULT_TOLERANCE));
//! assert!(!is_valid_signature(body, &signature, now, "wrong", DEFAULT_TOLERANCE));
//! ```

mod errors;
mod handler;
mod signature;

pub use errors::SignatureVerificationError;
pub use handler::{
    WebhookDelivery, WebhookEvent, WebhookHandler, WebhookRequest, WebhookRequestSource,
};
pub use signature::{
    calculate_signature, constant_time_compare, extract_from_headers, is_valid_signature,
    verify_signature, verify_signature_at, SignatureHeader, SignatureHeaders, WebhookPayload,
    DEFAULT_TOLERANCE, SIGNATURE_HEADER, SIGNATURE_SCHEME, TIMESTAMP_HEADER,
};
