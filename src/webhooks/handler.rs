//! Request-level webhook verification.
//!
//! [`WebhookHandler`] holds the signing secret and tolerance and verifies any
//! request exposing its headers and raw body through
//! [`WebhookRequestSource`]. Implement that trait for your web framework's
//! request type, or build a [`WebhookRequest`] from its parts.
//!
//! # Example
//!
//! ```rust
//! use attio::webhooks::{calculate_signature, WebhookHandler, WebhookRequest};
//! use attio::WebhookSecret;
//!
//! let secret = WebhookSecret::new("s3cr3t").unwrap();
//! let handler = WebhookHandler::new(secret);
//!
//! let body = r#"{"webhook_id":"wh_1","events":[{"event_type":"record.created","id":{}}]}"#;
//! let now = chrono::Utc::now().timestamp();
//! let request = WebhookRequest::new(body)
//!     .with_header("X-Attio-Signature", calculate_signature(body, now, "s3cr3t"))
//!     .with_header("X-Attio-Timestamp", now.to_string());
//!
//! let delivery = handler.parse_events(&request).unwrap();
//! assert_eq!(delivery.events[0].event_type, "record.created");
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::WebhookSecret;
use crate::webhooks::{
    extract_from_headers, verify_signature_at, SignatureVerificationError, DEFAULT_TOLERANCE,
};

// ============================================================================
// Request adapter
// ============================================================================

/// Access to the parts of an incoming request needed for verification.
pub trait WebhookRequestSource {
    /// Returns every header as a `(name, value)` pair.
    fn header_pairs(&self) -> Vec<(&str, &str)>;

    /// Returns the raw body, `None` if the request carried none.
    fn raw_body(&self) -> Option<&[u8]>;
}

/// A framework-independent webhook request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookRequest {
    headers: HashMap<String, String>,
    body: Option<Vec<u8>>,
}

impl WebhookRequest {
    /// Creates a request with the given raw body and no headers.
    #[must_use]
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: HashMap::new(),
            body: Some(body.into()),
        }
    }

    /// Creates a request from a header map and raw body.
    #[must_use]
    pub fn from_parts(headers: HashMap<String, String>, body: Option<Vec<u8>>) -> Self {
        Self { headers, body }
    }

    /// Creates a request from `http`-style headers, skipping non-UTF-8 values.
    #[must_use]
    pub fn from_header_map(headers: &reqwest::header::HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        Self {
            headers,
            body: Some(body.into()),
        }
    }

    /// Adds a header, returning the updated request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

impl WebhookRequestSource for WebhookRequest {
    fn header_pairs(&self) -> Vec<(&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }

    fn raw_body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

// ============================================================================
// Event payloads
// ============================================================================

/// The body of a webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookDelivery {
    /// The subscription that produced the delivery.
    pub webhook_id: String,
    /// Events in the order they occurred.
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One event within a delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. `"record.created"`.
    pub event_type: String,
    /// Structured id of the affected resource.
    #[serde(default)]
    pub id: Value,
    /// Who triggered the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<Value>,
    /// Event-specific fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Handler
// ============================================================================

/// Verifies webhook requests with a shared secret.
#[derive(Debug, Clone)]
pub struct WebhookHandler {
    secret: WebhookSecret,
    tolerance: Duration,
}

impl WebhookHandler {
    /// Creates a handler with the default 300 second tolerance.
    #[must_use]
    pub const fn new(secret: WebhookSecret) -> Self {
        Self {
            secret,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Sets the allowed clock skew, returning the updated handler.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns the configured tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// Verifies a request's signature against its raw body.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureVerificationError`] for a missing body or header,
    /// a stale or future timestamp, or a signature mismatch.
    pub fn verify_request<R>(&self, request: &R) -> Result<(), SignatureVerificationError>
    where
        R: WebhookRequestSource + ?Sized,
    {
        let now = chrono::Utc::now().timestamp();
        self.verify_request_at(now, request)
    }

    /// Verifies a request as of `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// See [`verify_request`](Self::verify_request).
    pub fn verify_request_at<R>(&self, now: i64, request: &R) -> Result<(), SignatureVerificationError>
    where
        R: WebhookRequestSource + ?Sized,
    {
        let result = Self::verify_parts(now, request, self.secret.as_ref(), self.tolerance);
        if let Err(ref error) = result {
            tracing::debug!(reason = %error, "webhook signature verification failed");
        }
        result
    }

    fn verify_parts<R>(
        now: i64,
        request: &R,
        secret: &str,
        tolerance: Duration,
    ) -> Result<(), SignatureVerificationError>
    where
        R: WebhookRequestSource + ?Sized,
    {
        let body = request
            .raw_body()
            .ok_or(SignatureVerificationError::MissingPayload)?;
        let headers = extract_from_headers(request.header_pairs())?;
        verify_signature_at(
            now,
            body,
            &headers.signature,
            headers.timestamp,
            secret,
            tolerance,
        )
    }

    /// Verifies a request, then decodes its body as JSON.
    ///
    /// The body is only decoded after the signature checks out.
    ///
    /// # Errors
    ///
    /// Returns the verification error, or
    /// [`SignatureVerificationError::InvalidJson`] if the verified body is
    /// not valid JSON.
    pub fn parse_and_verify<R>(&self, request: &R) -> Result<Value, SignatureVerificationError>
    where
        R: WebhookRequestSource + ?Sized,
    {
        self.verify_request(request)?;
        decode_body(request)
    }

    /// Verifies a request, then decodes it as a [`WebhookDelivery`].
    ///
    /// # Errors
    ///
    /// As [`parse_and_verify`](Self::parse_and_verify).
    pub fn parse_events<R>(&self, request: &R) -> Result<WebhookDelivery, SignatureVerificationError>
    where
        R: WebhookRequestSource + ?Sized,
    {
        self.verify_request(request)?;
        decode_body(request)
    }
}

fn decode_body<T, R>(request: &R) -> Result<T, SignatureVerificationError>
where
    T: serde::de::DeserializeOwned,
    R: WebhookRequestSource + ?Sized,
{
    let body = request
        .raw_body()
        .ok_or(SignatureVerificationError::MissingPayload)?;
    serde_json::from_slice(body).map_err(|e| SignatureVerificationError::InvalidJson {
        message: e.to_string(),
    })
}
