//! Authentication for the Attio API.
//!
//! API keys are configured directly on [`AttioConfig`](crate::AttioConfig).
//! This module covers the OAuth side: the [`oauth`] flow itself and the
//! [`Scopes`] an application requests and is granted.
//!
//! # Example
//!
//! ```rust
//! use attio::auth::ScopeValidator;
//!
//! let scopes = ScopeValidator::validate("note:read-write task:read").unwrap();
//! assert!(scopes.contains("note:read"));
//! assert!(ScopeValidator::validate("orders:read").is_err());
//! ```

pub mod oauth;
mod scopes;

pub use scopes::{ScopeValidator, Scopes, KNOWN_SCOPES};
