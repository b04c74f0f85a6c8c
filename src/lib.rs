//! # Attio Rust SDK
//!
//! A Rust client for the [Attio](https://attio.com) CRM REST API.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`AttioConfig`] and [`AttioConfigBuilder`]
//! - Validated newtypes for credentials and base URLs
//! - An async HTTP client with optional retry on rate limits and server errors
//! - A resource framework ([`rest`]) with create, retrieve, update, delete, and
//!   list operations, local change tracking, and cursor auto-pagination
//! - Typed resources for records, objects, lists, entries, notes, tasks,
//!   comments, webhooks, and workspace members
//! - Webhook signature verification via [`webhooks`]
//! - OAuth 2.0 authorization code flow and scope handling via [`auth`]
//!
//! ## Quick Start
//!
//! ```rust
//! use attio::{ApiKey, AttioConfig, RestClient};
//!
//! let config = AttioConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let client = RestClient::new(&config).unwrap();
//! ```
//!
//! ## Working with Resources
//!
//! ```rust,ignore
//! use attio::rest::{Listable, PathIds, Updatable};
//! use attio::rest::resources::{Person, Task};
//! use futures::TryStreamExt;
//! use serde_json::json;
//!
//! // Retrieve, change, and save only what changed
//! let mut person = Person::fetch(&client, "b3c7...").await?;
//! person.set("job_title", json!("Head of Sales"))?;
//! person.save(&client).await?;
//!
//! // Walk every page of a list lazily
//! let tasks: Vec<Task> = Task::each(&client, &PathIds::new(), None)
//!     .try_collect()
//!     .await?;
//! ```
//!
//! ## Verifying Webhooks
//!
//! ```rust
//! use attio::webhooks::{calculate_signature, verify_signature_at};
//! use std::time::Duration;
//!
//! let body = r#"{"event":"record.created"}"#;
//! let signature = calculate_signature(body, 1_700_000_000, "s3cr3t");
//!
//! assert!(verify_signature_at(
//!     1_700_000_000,
//!     body,
//!     &signature,
//!     1_700_000_000,
//!     "s3cr3t",
//!     Duration::from_secs(300),
//! )
//! .is_ok());
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is passed explicitly
//! - **Fail-fast validation**: newtypes validate on construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: built on tokio and reqwest; lists are `futures` streams

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;
pub mod webhooks;

// Re-export public types at crate root for convenience
pub use config::{
    ApiKey, AttioConfig, AttioConfigBuilder, BaseUrl, ClientId, ClientSecret, OAuthConfig,
    OAuthConfigBuilder, WebhookSecret,
};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError, RestClient,
    RestError,
};

// Re-export the resource framework
pub use rest::{
    ApiResource, Creatable, Deletable, ListObject, Listable, PathIds, Resource, ResourceError,
    Retrievable, Updatable,
};

// Re-export OAuth types for convenience
pub use auth::oauth::{OAuthClient, OAuthError, StateParam, Token, TokenInfo};
pub use auth::{ScopeValidator, Scopes};
