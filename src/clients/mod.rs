//! Transport layer.
//!
//! [`HttpClient`] sends [`HttpRequest`]s and decodes [`HttpResponse`]s;
//! [`RestClient`] puts path normalisation and verb helpers on top and is
//! what resource types take.
//!
//! Answers with status 429 or 5xx are transient. They are retried when the
//! client or the request allows more than one attempt
//! ([`AttioConfigBuilder::max_tries`](crate::config::AttioConfigBuilder::max_tries),
//! [`HttpRequestBuilder::tries`]). A 429 waits for its `Retry-After`
//! seconds, anything else for [`RETRY_WAIT_TIME`]. Other 4xx answers are
//! returned at once.

mod errors;
mod http_client;
mod http_request;
mod http_response;
pub mod rest;

pub use errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
pub use http_client::{HttpClient, RETRY_WAIT_TIME, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;

pub use rest::{RestClient, RestError};
