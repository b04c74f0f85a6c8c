//! OAuth 2.0 for Attio applications.
//!
//! Public integrations authenticate with the authorization code grant:
//!
//! 1. Build a consent URL with [`OAuthClient::authorization_url`], passing a
//!    fresh [`StateParam`] that you keep in the user's session.
//! 2. On the redirect, [`OAuthClient::validate_callback`] checks the state
//!    and returns the authorization code.
//! 3. [`OAuthClient::exchange_code`] trades the code for a [`Token`].
//!
//! Tokens can be refreshed, revoked, and introspected. A token converts into
//! an [`ApiKey`](crate::ApiKey) for use with the REST client.
//!
//! # Example
//!
//! ```rust,ignore
//! use attio::auth::oauth::{OAuthClient, StateParam};
//! use attio::{AttioConfig, RestClient};
//!
//! let oauth = OAuthClient::new(oauth_config);
//! let state = StateParam::new();
//! let url = oauth.authorization_url(&"record_permission:read".parse()?, &state);
//!
//! // ...after the redirect:
//! let code = oauth.validate_callback(&query, &state)?;
//! let token = oauth.exchange_code(&code).await?;
//!
//! let config = AttioConfig::builder().api_key(token.to_api_key()?).build()?;
//! let client = RestClient::new(&config)?;
//! ```

mod client;
mod error;
mod state;
mod token;

pub use client::OAuthClient;
pub use error::OAuthError;
pub use state::StateParam;
pub use token::{Token, TokenInfo};
