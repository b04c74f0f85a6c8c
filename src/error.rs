//! Configuration errors.
//!
//! Every validated newtype and both config builders report problems as a
//! [`ConfigError`] before any request is made.
//!
//!
//! ```rust
//! use attio::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// A configuration value was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Attio API key or access token.")]
    EmptyApiKey,

    /// OAuth client ID cannot be empty.
    #[error("OAuth client ID cannot be empty.")]
    EmptyClientId,

    /// OAuth client secret cannot be empty.
    #[error("OAuth client secret cannot be empty.")]
    EmptyClientSecret,

    /// Webhook signing secret cannot be empty.
    #[error("Webhook secret cannot be empty.")]
    EmptyWebhookSecret,

    /// Base URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide a URL with scheme (e.g., 'https://api.attio.com').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// OAuth redirect URI is invalid.
    #[error("Invalid redirect URI '{uri}'. Expected an absolute http(s) URL.")]
    InvalidRedirectUri {
        /// The invalid URI that was provided.
        uri: String,
    },

    /// The number of request attempts must be at least one.
    #[error("Invalid number of tries {tries}. At least one attempt is required.")]
    InvalidTries {
        /// The invalid value that was provided.
        tries: u32,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
