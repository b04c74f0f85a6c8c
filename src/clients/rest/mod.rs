//! REST verbs over [`HttpClient`](crate::clients::HttpClient).
//!
//! Paths are relative to `/v2` with surrounding slashes ignored, so
//! `/objects/` and `objects` address the same endpoint.

mod client;
mod errors;

pub use client::{Query, RestClient};
pub use errors::RestError;
