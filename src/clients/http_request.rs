//! Outgoing requests.
//!
//! Attio speaks JSON only, so a request is a method, a path below `/v2`,
//! an optional JSON body, query pairs, and any extra headers.

use std::fmt;

use serde_json::Value;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the Attio REST API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Fetch a resource or a page of resources.
    Get,
    /// Create a resource or run a query endpoint.
    Post,
    /// Assert (upsert) a resource.
    Put,
    /// Partially update a resource.
    Patch,
    /// Delete a resource.
    Delete,
}

impl HttpMethod {
    /// Lowercase method name, as used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    /// Returns `true` if requests with this method must carry a body.
    #[must_use]
    pub const fn requires_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to the Attio API, ready for [`HttpClient::request`](crate::clients::HttpClient::request).
///
/// ```rust
/// use attio::clients::{HttpMethod, HttpRequest};
/// use serde_json::json;
///
/// let request = HttpRequest::builder(HttpMethod::Post, "objects/people/records/query")
///     .json(json!({"limit": 50}))
///     .query_param("dry_run", "false")
///     .tries(3)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.method, HttpMethod::Post);
/// assert_eq!(request.query, vec![("dry_run".to_string(), "false".to_string())]);
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// Path relative to the API version prefix, e.g. `objects/people/records`.
    pub path: String,
    /// JSON body, sent with `Content-Type: application/json`.
    pub body: Option<Value>,
    /// Query string pairs in insertion order.
    pub query: Vec<(String, String)>,
    /// Headers added on top of the client defaults.
    pub headers: Vec<(String, String)>,
    /// Attempts allowed for this request; the client default applies when larger.
    pub tries: u32,
}

impl HttpRequest {
    /// Starts building a request.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder {
            request: Self {
                method,
                path: path.into(),
                body: None,
                query: Vec::new(),
                headers: Vec::new(),
                tries: 1,
            },
        }
    }

    /// Checks the request can be sent.
    ///
    /// # Errors
    ///
    /// - [`InvalidHttpRequestError::MissingBody`] for POST, PUT or PATCH without a body
    /// - [`InvalidHttpRequestError::UnexpectedBody`] for GET or DELETE with a body
    /// - [`InvalidHttpRequestError::ZeroTries`] when `tries` is zero
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        match (self.method.requires_body(), self.body.is_some()) {
            (true, false) => {
                return Err(InvalidHttpRequestError::MissingBody {
                    method: self.method.to_string(),
                })
            }
            (false, true) => {
                return Err(InvalidHttpRequestError::UnexpectedBody {
                    method: self.method.to_string(),
                })
            }
            _ => {}
        }
        if self.tries == 0 {
            return Err(InvalidHttpRequestError::ZeroTries);
        }
        Ok(())
    }
}

/// Builder returned by [`HttpRequest::builder`].
#[derive(Debug)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl HttpRequestBuilder {
    /// Sets the JSON body.
    #[must_use]
    pub fn json(mut self, body: impl Into<Value>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Appends one query pair.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.push((key.into(), value.into()));
        self
    }

    /// Appends every pair from `pairs`.
    #[must_use]
    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.request
            .query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds a header, overriding a client default of the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.push((name.into(), value.into()));
        self
    }

    /// Sets how many attempts a 429 or 5xx answer may consume.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.request.tries = tries;
        self
    }

    /// Verifies and returns the request.
    ///
    /// # Errors
    ///
    /// See [`HttpRequest::verify`].
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        self.request.verify()?;
        Ok(self.request)
    }
}
