//! Path-oriented REST client.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::clients::rest::RestError;
use crate::clients::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use crate::config::AttioConfig;

/// Query parameters for a REST call.
pub type Query = Option<HashMap<String, String>>;

/// REST client for Attio.
///
/// Thin verb helpers over [`HttpClient`]. Resource types take a
/// `&RestClient` for every call, so one client serves any number of
/// resources and tasks.
///
/// ```rust,ignore
/// use attio::{AttioConfig, ApiKey, RestClient};
/// use serde_json::json;
///
/// let config = AttioConfig::builder()
///     .api_key(ApiKey::new("my-key")?)
///     .build()?;
/// let client = RestClient::new(&config)?;
///
/// let objects = client.get("objects", None).await?;
/// let people = client
///     .post("objects/people/records/query", json!({"limit": 10}), None)
///     .await?;
/// ```
#[derive(Debug)]
pub struct RestClient {
    http_client: HttpClient,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient>();
};

impl RestClient {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Http`] if the underlying HTTP client cannot be built.
    pub fn new(config: &AttioConfig) -> Result<Self, RestError> {
        let http_client = HttpClient::new(config)?;
        tracing::debug!(
            base_uri = http_client.base_uri(),
            base_path = http_client.base_path(),
            "created Attio REST client"
        );
        Ok(Self { http_client })
    }

    /// The transport this client sends through.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// `GET {path}`.
    ///
    /// # Errors
    ///
    /// See [`RestClient::request`].
    pub async fn get(&self, path: &str, query: Query) -> Result<HttpResponse, RestError> {
        self.request(HttpMethod::Get, path, None, query).await
    }

    /// `POST {path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::request`].
    pub async fn post(&self, path: &str, body: Value, query: Query) -> Result<HttpResponse, RestError> {
        self.request(HttpMethod::Post, path, Some(body), query).await
    }

    /// `PUT {path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::request`].
    pub async fn put(&self, path: &str, body: Value, query: Query) -> Result<HttpResponse, RestError> {
        self.request(HttpMethod::Put, path, Some(body), query).await
    }

    /// `PATCH {path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::request`].
    pub async fn patch(&self, path: &str, body: Value, query: Query) -> Result<HttpResponse, RestError> {
        self.request(HttpMethod::Patch, path, Some(body), query).await
    }

    /// `DELETE {path}`.
    ///
    /// # Errors
    ///
    /// See [`RestClient::request`].
    pub async fn delete(&self, path: &str, query: Query) -> Result<HttpResponse, RestError> {
        self.request(HttpMethod::Delete, path, None, query).await
    }

    /// Sends a request whose method is only known at runtime, such as the
    /// follow-up request for the next page of a listing.
    ///
    /// POST, PUT and PATCH without a body send `{}`; GET and DELETE never
    /// send one.
    ///
    /// # Errors
    ///
    /// - [`RestError::InvalidPath`] if `path` is empty once slashes are trimmed
    /// - [`RestError::Http`] for anything the transport reports
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        query: Query,
    ) -> Result<HttpResponse, RestError> {
        let mut builder = HttpRequest::builder(method, normalize_path(path)?);

        if method.requires_body() {
            builder = builder.json(body.unwrap_or_else(|| json!({})));
        }
        if let Some(query) = query {
            builder = builder.query(query);
        }

        let request = builder.build().map_err(|e| RestError::Http(e.into()))?;
        Ok(self.http_client.request(request).await?)
    }
}

fn normalize_path(path: &str) -> Result<String, RestError> {
    match path.trim().trim_matches('/') {
        "" => Err(RestError::InvalidPath {
            path: path.to_string(),
        }),
        trimmed => Ok(trimmed.to_string()),
    }
}
