//! HTTP response types.
//!
//! This module provides the [`HttpResponse`] type for accessing the status,
//! headers, and decoded body of an Attio API response.

use std::collections::HashMap;

/// An HTTP response from the Attio API.
///
/// Header names are stored lowercase; a header may carry several values.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The decoded response body. Empty bodies decode to `{}`.
    pub body: serde_json::Value,
    /// Seconds to wait before retrying (from the `Retry-After` header).
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing the `Retry-After` header.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let retry_request_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.trim().parse::<f64>().ok());

        Self {
            code,
            headers,
            body,
            retry_request_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of the named header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header value, if present.
    ///
    /// Include this ID when reporting errors to Attio support.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns a deprecation notice if the endpoint is marked deprecated.
    ///
    /// Looks at the `Deprecation` header, adding the `Sunset` date when the
    /// API provides one.
    #[must_use]
    pub fn deprecation_notice(&self) -> Option<String> {
        let deprecation = self.header("deprecation")?;
        Some(match self.header("sunset") {
            Some(sunset) => format!("{deprecation} (sunset: {sunset})"),
            None => deprecation.to_string(),
        })
    }

    /// Extracts a human-readable error message from the body.
    ///
    /// Attio error bodies look like
    /// `{"status_code": 404, "type": "invalid_request_error", "code": "not_found", "message": "..."}`.
    /// The `message` field wins, then `code`, then `type`, then `error`.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        if let Some(raw) = self.body.get("raw_body").and_then(|v| v.as_str()) {
            return Some(raw.to_string());
        }
        ["message", "code", "type", "error"]
            .iter()
            .find_map(|key| self.body.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
    }
}
