//! Configuration types for the Attio SDK.
//!
//! Configuration is instance-based: build an [`AttioConfig`] and pass it to
//! the client that needs it. There is no process-wide state.
//!
//! - [`AttioConfig`] / [`AttioConfigBuilder`]: API credentials and transport settings
//! - [`OAuthConfig`] / [`OAuthConfigBuilder`]: OAuth application credentials
//! - [`ApiKey`], [`ClientId`], [`ClientSecret`], [`WebhookSecret`], [`BaseUrl`]:
//!   validated newtypes
//!
//! # Example
//!
//! ```rust
//! use attio::{AttioConfig, ApiKey};
//! use std::time::Duration;
//!
//! let config = AttioConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .timeout(Duration::from_secs(10))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://api.attio.com");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, BaseUrl, ClientId, ClientSecret, WebhookSecret};

use std::time::Duration;

use crate::error::ConfigError;

/// The API version prefix every REST path is resolved against.
pub const API_VERSION_PATH: &str = "/v2";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Attio REST client.
///
/// `AttioConfig` is `Clone`, `Send`, and `Sync`; share it freely between
/// clients and tasks.
#[derive(Clone, Debug)]
pub struct AttioConfig {
    api_key: ApiKey,
    base_url: BaseUrl,
    timeout: Duration,
    max_tries: u32,
    user_agent_prefix: Option<String>,
}

impl AttioConfig {
    /// Creates a new builder for constructing an `AttioConfig`.
    #[must_use]
    pub fn builder() -> AttioConfigBuilder {
        AttioConfigBuilder::new()
    }

    /// Returns the API key used as the Bearer token.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the API version path prefix.
    #[must_use]
    pub const fn api_version_path(&self) -> &'static str {
        API_VERSION_PATH
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns how many times a request is attempted on 429/5xx responses.
    #[must_use]
    pub const fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns a copy of this configuration authenticating with a different key.
    ///
    /// Useful when acting on behalf of an OAuth-connected workspace.
    #[must_use]
    pub fn with_api_key(&self, api_key: ApiKey) -> Self {
        Self {
            api_key,
            ..self.clone()
        }
    }
}

// Verify AttioConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AttioConfig>();
};

/// Builder for constructing [`AttioConfig`] instances.
///
/// `api_key` is required. Defaults:
///
/// - `base_url`: `https://api.attio.com`
/// - `timeout`: 30 seconds
/// - `max_tries`: 1 (no automatic retries)
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct AttioConfigBuilder {
    api_key: Option<ApiKey>,
    base_url: Option<BaseUrl>,
    timeout: Option<Duration>,
    max_tries: Option<u32>,
    user_agent_prefix: Option<String>,
}

impl AttioConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Overrides the base URL (proxies, mock servers).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets how many attempts are made for rate-limited or failed (5xx) requests.
    #[must_use]
    pub const fn max_tries(mut self, tries: u32) -> Self {
        self.max_tries = Some(tries);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`AttioConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `api_key` is not set,
    /// or [`ConfigError::InvalidTries`] if `max_tries` is zero.
    pub fn build(self) -> Result<AttioConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;

        let max_tries = self.max_tries.unwrap_or(1);
        if max_tries == 0 {
            return Err(ConfigError::InvalidTries { tries: max_tries });
        }

        Ok(AttioConfig {
            api_key,
            base_url: self.base_url.unwrap_or_default(),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_tries,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

/// Credentials of an Attio OAuth application.
#[derive(Clone, Debug)]
pub struct OAuthConfig {
    client_id: ClientId,
    client_secret: ClientSecret,
    redirect_uri: String,
    auth_base_url: BaseUrl,
    api_base_url: BaseUrl,
}

impl OAuthConfig {
    /// Creates a new builder for constructing an `OAuthConfig`.
    #[must_use]
    pub fn builder() -> OAuthConfigBuilder {
        OAuthConfigBuilder::default()
    }

    /// Returns the OAuth client ID.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the OAuth client secret.
    #[must_use]
    pub const fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    /// Returns the registered redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns the host serving the consent screen (`/authorize`).
    #[must_use]
    pub const fn auth_base_url(&self) -> &BaseUrl {
        &self.auth_base_url
    }

    /// Returns the host serving the token endpoints.
    #[must_use]
    pub const fn api_base_url(&self) -> &BaseUrl {
        &self.api_base_url
    }
}

/// Builder for constructing [`OAuthConfig`] instances.
///
/// `client_id`, `client_secret`, and `redirect_uri` are required. Both base
/// URLs default to the public Attio hosts.
#[derive(Debug, Default)]
pub struct OAuthConfigBuilder {
    client_id: Option<ClientId>,
    client_secret: Option<ClientSecret>,
    redirect_uri: Option<String>,
    auth_base_url: Option<BaseUrl>,
    api_base_url: Option<BaseUrl>,
}

impl OAuthConfigBuilder {
    /// Sets the OAuth client ID (required).
    #[must_use]
    pub fn client_id(mut self, id: ClientId) -> Self {
        self.client_id = Some(id);
        self
    }

    /// Sets the OAuth client secret (required).
    #[must_use]
    pub fn client_secret(mut self, secret: ClientSecret) -> Self {
        self.client_secret = Some(secret);
        self
    }

    /// Sets the redirect URI registered for the application (required).
    #[must_use]
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Overrides the consent screen host.
    #[must_use]
    pub fn auth_base_url(mut self, url: BaseUrl) -> Self {
        self.auth_base_url = Some(url);
        self
    }

    /// Overrides the token endpoint host.
    #[must_use]
    pub fn api_base_url(mut self, url: BaseUrl) -> Self {
        self.api_base_url = Some(url);
        self
    }

    /// Builds the [`OAuthConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] for unset required fields
    /// and [`ConfigError::InvalidRedirectUri`] if the redirect URI is not an
    /// absolute http(s) URL.
    pub fn build(self) -> Result<OAuthConfig, ConfigError> {
        let client_id = self
            .client_id
            .ok_or(ConfigError::MissingRequiredField { field: "client_id" })?;
        let client_secret = self
            .client_secret
            .ok_or(ConfigError::MissingRequiredField {
                field: "client_secret",
            })?;
        let redirect_uri = self
            .redirect_uri
            .ok_or(ConfigError::MissingRequiredField {
                field: "redirect_uri",
            })?;
        if BaseUrl::new(redirect_uri.as_str()).is_err() {
            return Err(ConfigError::InvalidRedirectUri { uri: redirect_uri });
        }

        let app_host = || BaseUrl::new(BaseUrl::ATTIO_APP).unwrap_or_default();

        Ok(OAuthConfig {
            client_id,
            client_secret,
            redirect_uri,
            auth_base_url: self.auth_base_url.unwrap_or_else(app_host),
            api_base_url: self.api_base_url.unwrap_or_else(app_host),
        })
    }
}
