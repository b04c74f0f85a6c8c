//! Timestamped HMAC-SHA256 webhook signatures.
//!
//! Attio signs each delivery with `HMAC-SHA256(secret, "{timestamp}.{body}")`
//! and sends the lowercase hex digest as `v1=<hex>` in `X-Attio-Signature`,
//! with the Unix timestamp in `X-Attio-Timestamp`. A delivery is accepted
//! when the digest matches and the timestamp lies within the tolerance window
//! on either side of the verifier's clock.
//!
//! # Example
//!
//! ```rust
//! use attio::webhooks::{calculate_signature, verify_signature_at, DEFAULT_TOLERANCE};
//!
//! let body = br#"{"event":"record.created"}"#;
//! let signature = calculate_signature(&body[..], 1_700_000_000, "s3cr3t");
//! assert!(signature.starts_with("v1="));
//!
//! verify_signature_at(
//!     1_700_000_000,
//!     &body[..],
//!     &signature,
//!     1_700_000_000,
//!     "s3cr3t",
//!     DEFAULT_TOLERANCE,
//! )
//! .unwrap();
//! ```

use std::time::Duration;

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::webhooks::SignatureVerificationError;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature.
pub const SIGNATURE_HEADER: &str = "X-Attio-Signature";

/// Header carrying the Unix timestamp the signature covers.
pub const TIMESTAMP_HEADER: &str = "X-Attio-Timestamp";

/// Scheme prefix of the signature value.
pub const SIGNATURE_SCHEME: &str = "v1";

/// Maximum accepted skew between the signed timestamp and now.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

// ============================================================================
// Payload
// ============================================================================

/// A payload to sign or verify.
///
/// Raw bodies are used byte for byte. JSON values are serialized compactly
/// with keys in sorted order, so equal values always sign identically.
/// Verify incoming requests against the raw body: a re-serialized document
/// need not match the bytes that were signed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WebhookPayload<'a> {
    /// The body exactly as received.
    Raw(&'a [u8]),
    /// A JSON document, serialized deterministically before signing.
    Json(&'a Value),
}

impl WebhookPayload<'_> {
    fn to_bytes(self) -> Vec<u8> {
        match self {
            Self::Raw(bytes) => bytes.to_vec(),
            Self::Json(value) => canonical(value).to_string().into_bytes(),
        }
    }
}

/// Rebuilds `value` with object keys inserted in sorted order, so the
/// serialized form does not depend on how `serde_json` orders maps.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|key| (key.clone(), canonical(&map[key])))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

impl<'a> From<&'a [u8]> for WebhookPayload<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Raw(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for WebhookPayload<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Raw(bytes)
    }
}

impl<'a> From<&'a str> for WebhookPayload<'a> {
    fn from(body: &'a str) -> Self {
        Self::Raw(body.as_bytes())
    }
}

impl<'a> From<&'a String> for WebhookPayload<'a> {
    fn from(body: &'a String) -> Self {
        Self::Raw(body.as_bytes())
    }
}

impl<'a> From<&'a Value> for WebhookPayload<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Json(value)
    }
}

// ============================================================================
// Signing and verification
// ============================================================================

/// Computes the `v1=<hex>` signature of `payload` at `timestamp`.
///
/// # Example
///
/// ```rust
/// use attio::webhooks::calculate_signature;
///
/// let signature = calculate_signature("hello", 100, "secret");
/// assert_eq!(signature.len(), 3 + 64);
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn calculate_signature<'a>(
    payload: impl Into<WebhookPayload<'a>>,
    timestamp: i64,
    secret: &str,
) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(&payload.into().to_bytes());
    format!("{SIGNATURE_SCHEME}={}", hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a signature against the current system clock.
///
/// # Errors
///
/// Returns a [`SignatureVerificationError`] describing the first failed check.
pub fn verify_signature<'a>(
    payload: impl Into<WebhookPayload<'a>>,
    signature: &str,
    timestamp: i64,
    secret: &str,
    tolerance: Duration,
) -> Result<(), SignatureVerificationError> {
    let now = chrono::Utc::now().timestamp();
    verify_signature_at(now, payload, signature, timestamp, secret, tolerance)
}

/// Verifies a signature as of `now` (Unix seconds).
///
/// Checks run in order: non-empty signature and secret, timestamp within
/// `tolerance` of `now` in either direction, then a constant-time comparison
/// of the signatures.
///
/// # Errors
///
/// Returns a [`SignatureVerificationError`] describing the first failed check.
pub fn verify_signature_at<'a>(
    now: i64,
    payload: impl Into<WebhookPayload<'a>>,
    signature: &str,
    timestamp: i64,
    secret: &str,
    tolerance: Duration,
) -> Result<(), SignatureVerificationError> {
    if signature.trim().is_empty() {
        return Err(SignatureVerificationError::MissingSignature);
    }
    if secret.is_empty() {
        return Err(SignatureVerificationError::MissingSecret);
    }

    check_timestamp(now, timestamp, tolerance)?;

    let expected = calculate_signature(payload, timestamp, secret);
    if constant_time_compare(&expected, signature.trim()) {
        Ok(())
    } else {
        Err(SignatureVerificationError::SignatureMismatch)
    }
}

/// Returns `true` if the signature verifies against the current clock.
#[must_use]
pub fn is_valid_signature<'a>(
    payload: impl Into<WebhookPayload<'a>>,
    signature: &str,
    timestamp: i64,
    secret: &str,
    tolerance: Duration,
) -> bool {
    verify_signature(payload, signature, timestamp, secret, tolerance).is_ok()
}

fn check_timestamp(
    now: i64,
    timestamp: i64,
    tolerance: Duration,
) -> Result<(), SignatureVerificationError> {
    let tolerance_secs = tolerance.as_secs();
    let limit = i64::try_from(tolerance_secs).unwrap_or(i64::MAX);
    let age = now.saturating_sub(timestamp);

    if age > limit {
        return Err(SignatureVerificationError::TimestampTooOld {
            age,
            tolerance: tolerance_secs,
        });
    }
    if age < -limit {
        return Err(SignatureVerificationError::TimestampInFuture {
            skew: age.saturating_neg(),
            tolerance: tolerance_secs,
        });
    }
    Ok(())
}

/// Compares two strings in time independent of where they differ.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() != b_bytes.len() {
        return false;
    }
    a_bytes.ct_eq(b_bytes).into()
}

// ============================================================================
// Headers
// ============================================================================

/// The signature and timestamp carried by a delivery's headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    /// The signature, as `v1=<hex>`.
    pub signature: String,
    /// The signed Unix timestamp.
    pub timestamp: i64,
}

/// Reads the signature and timestamp from request headers.
///
/// Header names match case-insensitively, and `-` and `_` are
/// interchangeable, so `X-Attio-Signature`, `x-attio-signature`, and
/// `X_ATTIO_SIGNATURE` are the same header. A signature header in the combined
/// `t=<ts> v1=<hex>` form also supplies the timestamp when the timestamp
/// header is absent.
///
/// # Errors
///
/// Returns [`SignatureVerificationError::MissingHeader`] naming the absent
/// header, or [`SignatureVerificationError::InvalidTimestamp`].
///
/// # Example
///
/// ```rust
/// use attio::webhooks::extract_from_headers;
///
/// let headers = [("X_ATTIO_SIGNATURE", "v1=abc"), ("x-attio-timestamp", "100")];
/// let extracted = extract_from_headers(headers).unwrap();
/// assert_eq!(extracted.signature, "v1=abc");
/// assert_eq!(extracted.timestamp, 100);
/// ```
pub fn extract_from_headers<I, K, V>(headers: I) -> Result<SignatureHeaders, SignatureVerificationError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let signature_key = normalize_header_name(SIGNATURE_HEADER);
    let timestamp_key = normalize_header_name(TIMESTAMP_HEADER);

    let mut signature = None;
    let mut timestamp = None;
    for (name, value) in headers {
        let name = normalize_header_name(name.as_ref());
        if name == signature_key {
            signature = Some(value.as_ref().trim().to_string());
        } else if name == timestamp_key {
            timestamp = Some(value.as_ref().trim().to_string());
        }
    }

    let signature = signature
        .filter(|s| !s.is_empty())
        .ok_or(SignatureVerificationError::MissingHeader {
            header: SIGNATURE_HEADER,
        })?;
    let timestamp = timestamp.filter(|t| !t.is_empty());

    if !signature.contains("t=") {
        let timestamp = timestamp.ok_or(SignatureVerificationError::MissingHeader {
            header: TIMESTAMP_HEADER,
        })?;
        return Ok(SignatureHeaders {
            signature,
            timestamp: parse_timestamp(&timestamp)?,
        });
    }

    let combined = SignatureHeader::parse(&signature)?;
    let timestamp = match timestamp {
        Some(value) => parse_timestamp(&value)?,
        None => combined
            .timestamp
            .ok_or(SignatureVerificationError::MissingHeader {
                header: TIMESTAMP_HEADER,
            })?,
    };
    let signature = combined
        .signatures
        .first()
        .map(|hex| format!("{SIGNATURE_SCHEME}={hex}"))
        .ok_or(SignatureVerificationError::MissingSignature)?;

    Ok(SignatureHeaders {
        signature,
        timestamp,
    })
}

fn normalize_header_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

fn parse_timestamp(value: &str) -> Result<i64, SignatureVerificationError> {
    value
        .trim()
        .parse()
        .map_err(|_| SignatureVerificationError::InvalidTimestamp {
            value: value.to_string(),
        })
}

/// A parsed `t=<unix-seconds> v1=<hex>` signature header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureHeader {
    /// The `t` value, if present.
    pub timestamp: Option<i64>,
    /// Every `v1` digest, in header order.
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    /// Parses a header of space- or comma-separated `key=value` pairs.
    ///
    /// Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureVerificationError::InvalidTimestamp`] for a
    /// non-numeric `t`, or [`SignatureVerificationError::MissingSignature`]
    /// if no `v1` pair is present.
    ///
    /// # Example
    ///
    /// ```rust
    /// use attio::webhooks::SignatureHeader;
    ///
    /// let header = SignatureHeader::parse("t=1700000000, v1=abc123").unwrap();
    /// assert_eq!(header.timestamp, Some(1_700_000_000));
    /// assert_eq!(header.signatures, vec!["abc123".to_string()]);
    /// ```
    pub fn parse(header: &str) -> Result<Self, SignatureVerificationError> {
        let mut parsed = Self::default();

        let pairs = header
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .filter_map(|part| part.split_once('='));
        for (key, value) in pairs {
            match key {
                "t" => parsed.timestamp = Some(parse_timestamp(value)?),
                SIGNATURE_SCHEME if !value.is_empty() => parsed.signatures.push(value.to_string()),
                _ => {}
            }
        }

        if parsed.signatures.is_empty() {
            return Err(SignatureVerificationError::MissingSignature);
        }
        Ok(parsed)
    }
}

// Lowercase hex encoding
mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut result = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}
