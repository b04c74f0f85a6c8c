//! Resource-level error types.
//!
//! Transport failures are mapped onto semantic variants so callers can
//! match on what went wrong rather than on status codes:
//!
//! | Status | Variant |
//! |---|---|
//! | 400 | [`ResourceError::InvalidRequest`] |
//! | 401 | [`ResourceError::Authentication`] |
//! | 403 | [`ResourceError::Forbidden`] |
//! | 404 | [`ResourceError::NotFound`] |
//! | 409 | [`ResourceError::Conflict`] |
//! | 422 | [`ResourceError::Unprocessable`] |
//! | 429 | [`ResourceError::RateLimited`] |
//! | 5xx | [`ResourceError::ServerError`] |
//!
//! Network failures become [`ResourceError::Timeout`] or
//! [`ResourceError::Connection`].
//!
//! # Example
//!
//! ```rust,ignore
//! use attio::rest::{ResourceError, Retrievable};
//! use attio::rest::resources::Person;
//!
//! match Person::retrieve(&client, &PathIds::new(), "missing").await {
//!     Ok(person) => println!("Found: {:?}", person.id()),
//!     Err(ResourceError::NotFound { resource, id, .. }) => {
//!         println!("{resource} {id:?} not found");
//!     }
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use std::collections::HashMap;

use crate::clients::{HttpError, RestError};
use thiserror::Error;

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The caller passed a bad value (empty id, non-object params, ...).
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the input.
        message: String,
    },

    /// The operation is not allowed in the resource's current lifecycle state.
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Why the operation was refused.
        message: String,
    },

    /// The resource was not found (HTTP 404).
    #[error("{resource} not found{}: {message}", id_suffix(.id))]
    NotFound {
        /// The type name of the resource.
        resource: &'static str,
        /// The id that was requested, if known.
        id: Option<String>,
        /// The API message.
        message: String,
        /// The request ID for debugging.
        request_id: Option<String>,
    },

    /// The API key or token was rejected (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// The API message.
        message: String,
        /// The request ID for debugging.
        request_id: Option<String>,
    },

    /// The token lacks the scopes needed (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// The API message.
        message: String,
        /// The request ID for debugging.
        request_id: Option<String>,
    },

    /// The request conflicts with existing state (HTTP 409).
    #[error("Conflict: {message}")]
    Conflict {
        /// The API message.
        message: String,
        /// The request ID for debugging.
        request_id: Option<String>,
    },

    /// The API rejected the request (HTTP 400).
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// The API message.
        message: String,
        /// The request ID for debugging.
        request_id: Option<String>,
    },

    /// The API could not process the payload (HTTP 422).
    #[error("Unprocessable entity: {message}")]
    Unprocessable {
        /// The API message.
        message: String,
        /// A map of field names to error messages.
        errors: HashMap<String, Vec<String>>,
        /// The request ID for debugging.
        request_id: Option<String>,
    },

    /// Too many requests (HTTP 429).
    #[error("Rate limited: {message}")]
    RateLimited {
        /// The API message.
        message: String,
        /// Seconds to wait before retrying, from `Retry-After`.
        retry_after: Option<f64>,
        /// The request ID for debugging.
        request_id: Option<String>,
    },

    /// The API failed (HTTP 5xx).
    #[error("Server error ({status}): {message}")]
    ServerError {
        /// The HTTP status code.
        status: u16,
        /// The API message.
        message: String,
        /// The request ID for debugging.
        request_id: Option<String>,
    },

    /// The connection could not be established or was interrupted.
    #[error("Connection error: {0}")]
    Connection(#[source] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// No path template matches the provided ids.
    #[error("Cannot resolve path for {resource}::{operation} with provided IDs")]
    PathResolutionFailed {
        /// The type name of the resource.
        resource: &'static str,
        /// The operation being attempted.
        operation: &'static str,
    },

    /// A response could not be decoded into the expected shape.
    #[error("Unexpected response for {resource}: {message}")]
    Serialization {
        /// The type name of the resource.
        resource: &'static str,
        /// What was wrong with the response.
        message: String,
    },

    /// An HTTP-level error that does not map to a semantic variant.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ResourceError {
    /// Creates an [`InvalidArgument`](Self::InvalidArgument) error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an [`InvalidOperation`](Self::InvalidOperation) error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a `ResourceError` from an HTTP response status code.
    ///
    /// # Example
    ///
    /// ```rust
    /// use attio::rest::ResourceError;
    /// use serde_json::json;
    ///
    /// let error = ResourceError::from_http_response(
    ///     404,
    ///     &json!({"message": "Record not found"}),
    ///     "Record",
    ///     Some("rec_123"),
    ///     Some("req-123"),
    /// );
    /// assert!(matches!(error, ResourceError::NotFound { .. }));
    /// ```
    #[must_use]
    pub fn from_http_response(
        code: u16,
        body: &serde_json::Value,
        resource: &'static str,
        id: Option<&str>,
        request_id: Option<&str>,
    ) -> Self {
        let message = body_message(body).unwrap_or_else(|| format!("HTTP {code}"));
        Self::from_status(
            code,
            message,
            body,
            None,
            resource,
            id,
            request_id.map(ToString::to_string),
        )
    }

    fn from_status(
        code: u16,
        message: String,
        body: &serde_json::Value,
        retry_after: Option<f64>,
        resource: &'static str,
        id: Option<&str>,
        request_id: Option<String>,
    ) -> Self {
        match code {
            400 => Self::InvalidRequest {
                message,
                request_id,
            },
            401 => Self::Authentication {
                message,
                request_id,
            },
            403 => Self::Forbidden {
                message,
                request_id,
            },
            404 => Self::NotFound {
                resource,
                id: id.map(ToString::to_string),
                message,
                request_id,
            },
            409 => Self::Conflict {
                message,
                request_id,
            },
            422 => Self::Unprocessable {
                errors: parse_validation_errors(body),
                message,
                request_id,
            },
            429 => Self::RateLimited {
                message,
                retry_after,
                request_id,
            },
            status if status >= 500 => Self::ServerError {
                status,
                message,
                request_id,
            },
            _ => Self::InvalidRequest {
                message,
                request_id,
            },
        }
    }

    /// Maps a transport error onto the taxonomy, naming the resource involved.
    pub(crate) fn from_rest(error: RestError, resource: &'static str, id: Option<&str>) -> Self {
        match error {
            RestError::InvalidPath { path } => Self::invalid_argument(format!(
                "invalid request path '{path}' for {resource}"
            )),
            RestError::Http(http) => Self::from_http(http, resource, id),
        }
    }

    fn from_http(error: HttpError, resource: &'static str, id: Option<&str>) -> Self {
        match error {
            HttpError::Response(e) if e.code >= 400 => Self::from_status(
                e.code,
                e.message,
                &e.body,
                e.retry_after,
                resource,
                id,
                e.error_reference,
            ),
            HttpError::MaxRetries(e) => Self::from_status(
                e.code,
                e.message,
                &serde_json::Value::Null,
                e.retry_after,
                resource,
                id,
                e.error_reference,
            ),
            HttpError::Network(e) if e.is_timeout() => Self::Timeout(e),
            HttpError::Network(e) => Self::Connection(e),
            other => Self::Http(other),
        }
    }

    /// Returns the request ID if available.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::NotFound { request_id, .. }
            | Self::Authentication { request_id, .. }
            | Self::Forbidden { request_id, .. }
            | Self::Conflict { request_id, .. }
            | Self::InvalidRequest { request_id, .. }
            | Self::Unprocessable { request_id, .. }
            | Self::RateLimited { request_id, .. }
            | Self::ServerError { request_id, .. } => request_id.as_deref(),
            Self::Http(HttpError::Response(e)) => e.error_reference.as_deref(),
            Self::Http(HttpError::MaxRetries(e)) => e.error_reference.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` for errors a caller may reasonably retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ServerError { .. }
                | Self::Connection(_)
                | Self::Timeout(_)
        )
    }
}

impl From<RestError> for ResourceError {
    fn from(error: RestError) -> Self {
        Self::from_rest(error, "Resource", None)
    }
}

fn id_suffix(id: &Option<String>) -> String {
    id.as_ref()
        .map(|id| format!(" (id {id})"))
        .unwrap_or_default()
}

fn body_message(body: &serde_json::Value) -> Option<String> {
    ["message", "code", "type", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(ToString::to_string)
}

/// Parses field-level errors from a 422 body.
///
/// Accepts `{"errors": {"field": ["msg"]}}`, `{"errors": ["msg"]}`, and the
/// Attio shape `{"path": ["values", "email"], "message": "..."}`.
fn parse_validation_errors(body: &serde_json::Value) -> HashMap<String, Vec<String>> {
    let mut result = HashMap::new();

    if let Some(errors) = body.get("errors") {
        match errors {
            serde_json::Value::Object(map) => {
                for (field, messages) in map {
                    let msgs: Vec<String> = match messages {
                        serde_json::Value::Array(arr) => arr
                            .iter()
                            .filter_map(|v| v.as_str().map(ToString::to_string))
                            .collect(),
                        serde_json::Value::String(s) => vec![s.clone()],
                        _ => vec![messages.to_string()],
                    };
                    result.insert(field.clone(), msgs);
                }
            }
            serde_json::Value::Array(arr) => {
                let msgs: Vec<String> = arr
                    .iter()
                    .filter_map(|v| v.as_str().map(ToString::to_string))
                    .collect();
                if !msgs.is_empty() {
                    result.insert("base".to_string(), msgs);
                }
            }
            serde_json::Value::String(s) => {
                result.insert("base".to_string(), vec![s.clone()]);
            }
            _ => {}
        }
    } else if let (Some(path), Some(message)) = (
        body.get("path").and_then(|p| p.as_array()),
        body.get("message").and_then(|m| m.as_str()),
    ) {
        let field = path
            .iter()
            .filter_map(|segment| segment.as_str())
            .collect::<Vec<_>>()
            .join(".");
        let field = if field.is_empty() {
            "base".to_string()
        } else {
            field
        };
        result.insert(field, vec![message.to_string()]);
    }

    result
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{HttpResponseError, MaxHttpRetriesExceededError};
    use serde_json::json;

    fn response_error(code: u16, body: serde_json::Value) -> RestError {
        RestError::Http(HttpError::Response(HttpResponseError {
            code,
            message: body_message(&body).unwrap_or_default(),
            body,
            error_reference: Some("req-1".to_string()),
            retry_after: None,
        }))
    }

    #[test]
    fn test_status_codes_map_to_semantic_variants() {
        let cases: [(u16, fn(&ResourceError) -> bool); 8] = [
            (400, |e| matches!(e, ResourceError::InvalidRequest { .. })),
            (401, |e| matches!(e, ResourceError::Authentication { .. })),
            (403, |e| matches!(e, ResourceError::Forbidden { .. })),
            (404, |e| matches!(e, ResourceError::NotFound { .. })),
            (409, |e| matches!(e, ResourceError::Conflict { .. })),
            (422, |e| matches!(e, ResourceError::Unprocessable { .. })),
            (429, |e| matches!(e, ResourceError::RateLimited { .. })),
            (503, |e| matches!(e, ResourceError::ServerError { status: 503, .. })),
        ];

        for (code, check) in cases {
            let error = ResourceError::from_rest(
                response_error(code, json!({"message": "boom"})),
                "Record",
                Some("rec_1"),
            );
            assert!(check(&error), "status {code} mapped to {error:?}");
            assert_eq!(error.request_id(), Some("req-1"));
        }
    }

    #[test]
    fn test_not_found_names_resource_and_id() {
        let error = ResourceError::from_http_response(
            404,
            &json!({"message": "Record not found"}),
            "Record",
            Some("rec_123"),
            None,
        );
        let message = error.to_string();
        assert!(message.contains("Record"));
        assert!(message.contains("rec_123"));
        assert!(message.contains("Record not found"));
    }

    #[test]
    fn test_rate_limited_keeps_retry_after() {
        let error = ResourceError::from_rest(
            RestError::Http(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                code: 429,
                tries: 3,
                message: "slow down".to_string(),
                error_reference: None,
                retry_after: Some(4.0),
            })),
            "Note",
            None,
        );
        assert!(matches!(
            error,
            ResourceError::RateLimited {
                retry_after: Some(r),
                ..
            } if (r - 4.0).abs() < f64::EPSILON
        ));
        assert!(error.is_retryable());
    }

    #[test]
    fn test_parse_validation_errors_object_format() {
        let body = json!({"errors": {"name": ["can't be blank"], "email": "is invalid"}});
        let errors = parse_validation_errors(&body);
        assert_eq!(errors.get("name"), Some(&vec!["can't be blank".to_string()]));
        assert_eq!(errors.get("email"), Some(&vec!["is invalid".to_string()]));
    }

    #[test]
    fn test_parse_validation_errors_attio_path_format() {
        let body = json!({
            "status_code": 422,
            "type": "invalid_request_error",
            "code": "validation_type",
            "message": "Invalid email address",
            "path": ["values", "email_addresses"]
        });
        let errors = parse_validation_errors(&body);
        assert_eq!(
            errors.get("values.email_addresses"),
            Some(&vec!["Invalid email address".to_string()])
        );
    }

    #[test]
    fn test_invalid_path_maps_to_invalid_argument() {
        let error: ResourceError = RestError::InvalidPath {
            path: String::new(),
        }
        .into();
        assert!(matches!(error, ResourceError::InvalidArgument { .. }));
        assert!(!error.is_retryable());
    }
}
