//! Resource framework for the Attio REST API.
//!
//! This module provides:
//!
//! - **[`Resource`]**: attributes with change tracking, a structured id, and
//!   a lifecycle that freezes the instance after deletion
//! - **[`ApiResource`]**: how a concrete type maps onto Attio's paths and
//!   payload shapes
//! - **Capability traits**: [`Creatable`], [`Retrievable`], [`Listable`],
//!   [`Updatable`], [`Deletable`]
//! - **[`ListObject`]**: one page of results plus cursor-driven iteration
//! - **Path building**: templates with `{id}` placeholders, most specific wins
//! - **[`ResourceError`]**: semantic errors mapped from HTTP status codes
//!
//! Concrete Attio resources live in [`resources`].
//!
//! # Example
//!
//! ```rust,ignore
//! use attio::{AttioConfig, ApiKey, RestClient};
//! use attio::rest::{Listable, Retrievable, Updatable};
//! use attio::rest::resources::Person;
//! use futures::TryStreamExt;
//! use serde_json::json;
//!
//! let config = AttioConfig::builder()
//!     .api_key(ApiKey::new("your-api-key")?)
//!     .build()?;
//! let client = RestClient::new(&config)?;
//!
//! let mut person = Person::fetch(&client, "rec_123").await?;
//! person.set("job_title", json!("CTO"))?;
//! person.save(&client).await?; // PATCH with only `job_title`
//!
//! let people: Vec<Person> = Person::each(&client, &Person::base_ids(), None)
//!     .try_collect()
//!     .await?;
//! ```

mod attributes;
mod errors;
mod list;
mod operations;
mod path;
mod resource;

pub mod resources;

pub use attributes::AttributeTracker;
pub use errors::ResourceError;
pub use list::{ListObject, ListRequest, Pagination, CURSOR_PARAM};
pub use operations::{Creatable, Deletable, Listable, Retrievable, Updatable};
pub use path::{build_path, get_path, PathIds, ResourceOperation, ResourcePath};
pub use resource::{ApiResource, Lifecycle, Resource, RESERVED_KEYS};
