//! Authenticated transport for the Attio API.
//!
//! [`HttpClient`] owns a `reqwest` client plus the headers every call needs,
//! and retries answers that Attio marks as transient.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::{json, Value};

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::HttpRequest;
use crate::clients::http_response::HttpResponse;
use crate::config::AttioConfig;

/// Delay between attempts when the server gives no `Retry-After`.
pub const RETRY_WAIT_TIME: Duration = Duration::from_secs(1);

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for the Attio API.
///
/// URLs are built as `{base_url}/v2/{path}`. Every request carries the
/// Bearer token, `Accept: application/json` and an `attio-rs` User-Agent.
///
/// `HttpClient` is `Send + Sync`; share it across tasks behind an `Arc` or
/// by reference.
///
/// ```rust,ignore
/// use attio::{AttioConfig, ApiKey};
/// use attio::clients::{HttpClient, HttpRequest, HttpMethod};
///
/// let config = AttioConfig::builder()
///     .api_key(ApiKey::new("my-key")?)
///     .max_tries(3)
///     .build()?;
/// let client = HttpClient::new(&config)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "self").build()?;
/// let response = client.request(request).await?;
/// println!("{}", response.body["workspace_name"]);
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_uri: String,
    base_path: String,
    default_headers: HashMap<String, String>,
    default_tries: u32,
}

const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

/// What to do with a non-2xx answer.
#[derive(Debug, PartialEq)]
enum Outcome {
    Retry(Duration),
    Fail,
}

impl HttpClient {
    /// Creates a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the reqwest client cannot be built
    /// (for example when TLS initialisation fails).
    pub fn new(config: &AttioConfig) -> Result<Self, HttpError> {
        let user_agent = match config.user_agent_prefix() {
            Some(prefix) => format!("{prefix} | attio-rs v{SDK_VERSION} | Rust"),
            None => format!("attio-rs v{SDK_VERSION} | Rust"),
        };

        let default_headers = HashMap::from([
            ("User-Agent".to_string(), user_agent),
            ("Accept".to_string(), "application/json".to_string()),
            (
                "Authorization".to_string(),
                format!("Bearer {}", config.api_key().as_ref()),
            ),
        ]);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_uri: config.base_url().as_ref().to_string(),
            base_path: config.api_version_path().to_string(),
            default_headers,
            default_tries: config.max_tries(),
        })
    }

    /// Scheme and host, e.g. `https://api.attio.com`.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Version prefix, always `/v2`.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Attempts per request unless the request asks for more.
    #[must_use]
    pub const fn default_tries(&self) -> u32 {
        self.default_tries
    }

    /// Full URL for a path below the version prefix.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_uri,
            self.base_path,
            path.trim_start_matches('/')
        )
    }

    /// Sends `request`, retrying 429 and 5xx answers.
    ///
    /// Up to `max(request.tries, config.max_tries)` attempts are made. A 429
    /// waits for its `Retry-After` seconds; anything else waits
    /// [`RETRY_WAIT_TIME`].
    ///
    /// # Errors
    ///
    /// - [`HttpError::InvalidRequest`] if the request fails validation
    /// - [`HttpError::Network`] on connection failures and timeouts
    /// - [`HttpError::Response`] for a non-2xx answer that is final
    /// - [`HttpError::MaxRetries`] when retries were allowed and all were used
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.endpoint(&request.path);
        let max_tries = request.tries.max(self.default_tries);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self.send_once(&url, &request, attempt).await?;

            if let Some(notice) = response.deprecation_notice() {
                tracing::warn!(path = %request.path, notice = %notice, "deprecated Attio API endpoint");
            }
            if response.is_ok() {
                return Ok(response);
            }

            match Self::outcome(&response, attempt, max_tries) {
                Outcome::Retry(delay) => {
                    tracing::warn!(
                        status = response.code,
                        attempt,
                        max_tries,
                        delay_secs = delay.as_secs_f64(),
                        "retrying Attio request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Outcome::Fail => return Err(Self::failure(response, max_tries)),
            }
        }
    }

    async fn send_once(
        &self,
        url: &str,
        request: &HttpRequest,
        attempt: u32,
    ) -> Result<HttpResponse, HttpError> {
        let mut headers = self.default_headers.clone();
        if request.body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        headers.extend(request.headers.iter().cloned());

        let mut builder = self.client.request(request.method.to_reqwest(), url);
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            attempt,
            "sending request to Attio"
        );

        let res = builder.send().await?;
        let code = res.status().as_u16();
        let mut response_headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in res.headers() {
            response_headers
                .entry(name.as_str().to_ascii_lowercase())
                .or_default()
                .push(value.to_str().unwrap_or_default().to_string());
        }
        let text = res.text().await.unwrap_or_default();

        Ok(HttpResponse::new(code, response_headers, decode_body(code, &text)))
    }

    fn outcome(response: &HttpResponse, attempt: u32, max_tries: u32) -> Outcome {
        let transient = response.code == 429 || response.code >= 500;
        if !transient || attempt >= max_tries {
            return Outcome::Fail;
        }
        Outcome::Retry(Self::calculate_retry_delay(response))
    }

    /// 429 honours `Retry-After`; everything else uses the fixed delay.
    fn calculate_retry_delay(response: &HttpResponse) -> Duration {
        response
            .retry_request_after
            .filter(|secs| response.code == 429 && secs.is_finite() && *secs >= 0.0)
            .map_or(RETRY_WAIT_TIME, Duration::from_secs_f64)
    }

    /// A single-attempt client reports the answer itself; a retrying client
    /// reports that it ran out of attempts on a transient answer.
    fn failure(response: HttpResponse, max_tries: u32) -> HttpError {
        let message = response.error_message().unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(response.code)
                .ok()
                .and_then(|status| status.canonical_reason())
                .unwrap_or("Unknown error")
                .to_string()
        });
        let error_reference = response.request_id().map(String::from);
        let transient = response.code == 429 || response.code >= 500;

        if transient && max_tries > 1 {
            return HttpError::MaxRetries(MaxHttpRetriesExceededError {
                code: response.code,
                tries: max_tries,
                message,
                error_reference,
                retry_after: response.retry_request_after,
            });
        }
        HttpError::Response(HttpResponseError {
            code: response.code,
            message,
            retry_after: response.retry_request_after,
            body: response.body,
            error_reference,
        })
    }
}

/// Empty bodies become `{}`; unparseable 5xx bodies are kept as `raw_body`.
fn decode_body(code: u16, text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(text).unwrap_or_else(|_| {
        if code >= 500 {
            json!({ "raw_body": text })
        } else {
            json!({})
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;

    fn client() -> HttpClient {
        let config = AttioConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .build()
            .unwrap();
        HttpClient::new(&config).unwrap()
    }

    fn response(code: u16, retry_after: Option<&str>) -> HttpResponse {
        let headers = retry_after
            .map(|value| HashMap::from([("retry-after".to_string(), vec![value.to_string()])]))
            .unwrap_or_default();
        HttpResponse::new(code, headers, json!({}))
    }

    #[test]
    fn test_defaults_point_at_attio_v2() {
        let client = client();
        assert_eq!(client.base_uri(), "https://api.attio.com");
        assert_eq!(client.base_path(), "/v2");
        assert_eq!(client.default_tries(), 1);
        assert_eq!(
            client.endpoint("/objects/people"),
            "https://api.attio.com/v2/objects/people"
        );
    }

    #[test]
    fn test_default_headers() {
        let client = client();
        let headers = client.default_headers();

        assert_eq!(headers["Authorization"], "Bearer test-api-key");
        assert_eq!(headers["Accept"], "application/json");
        assert!(headers["User-Agent"].starts_with("attio-rs v"));
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = AttioConfig::builder()
            .api_key(ApiKey::new("test-key").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();
        let client = HttpClient::new(&config).unwrap();

        assert!(client.default_headers()["User-Agent"].starts_with("MyApp/1.0 | attio-rs"));
    }

    #[test]
    fn test_retry_delay_honours_retry_after_for_429_only() {
        assert_eq!(
            HttpClient::calculate_retry_delay(&response(429, Some("3"))),
            Duration::from_secs(3)
        );
        assert_eq!(
            HttpClient::calculate_retry_delay(&response(503, Some("3"))),
            RETRY_WAIT_TIME
        );
        assert_eq!(
            HttpClient::calculate_retry_delay(&response(429, None)),
            RETRY_WAIT_TIME
        );
    }

    #[test]
    fn test_only_transient_answers_are_retried() {
        assert_eq!(
            HttpClient::outcome(&response(503, None), 1, 3),
            Outcome::Retry(RETRY_WAIT_TIME)
        );
        assert_eq!(HttpClient::outcome(&response(503, None), 3, 3), Outcome::Fail);
        assert_eq!(HttpClient::outcome(&response(404, None), 1, 3), Outcome::Fail);
    }

    #[test]
    fn test_single_attempt_failure_is_a_response_error() {
        let error = HttpClient::failure(response(429, Some("2")), 1);
        assert!(matches!(
            error,
            HttpError::Response(HttpResponseError { code: 429, retry_after: Some(r), .. }) if r == 2.0
        ));

        let error = HttpClient::failure(response(502, None), 2);
        assert!(matches!(error, HttpError::MaxRetries(e) if e.tries == 2 && e.message == "Bad Gateway"));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(204, ""), json!({}));
        assert_eq!(decode_body(502, "<html>"), json!({"raw_body": "<html>"}));
        assert_eq!(decode_body(400, "oops"), json!({}));
    }
}
