//! OAuth token values.
//!
//! A [`Token`] is what the token endpoint returns for an authorization code
//! or refresh token. It serializes with serde so it can be stored and loaded
//! again, and converts into an [`ApiKey`] for use with
//! [`AttioConfig`](crate::AttioConfig).
//!
//! # Example
//!
//! ```rust
//! use attio::auth::oauth::Token;
//!
//! let token: Token = serde_json::from_str(
//!     r#"{"access_token":"at_123","token_type":"Bearer","expires_in":3600}"#,
//! ).unwrap();
//!
//! assert!(!token.is_expired());
//! assert_eq!(token.to_api_key().unwrap().as_ref(), "at_123");
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::oauth::OAuthError;
use crate::auth::Scopes;
use crate::config::ApiKey;
use crate::error::ConfigError;

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// An access token issued by Attio.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The bearer token sent on API requests.
    pub access_token: String,
    /// Token used to obtain a new access token, if one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type, `"Bearer"` unless the server says otherwise.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds from `created_at`. `None` means the token does not expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Space-separated granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// When the token was received.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Token {
    /// Creates a non-expiring bearer token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: default_token_type(),
            expires_in: None,
            scope: None,
            created_at: Utc::now(),
        }
    }

    /// Returns when the token expires, if it does.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|seconds| self.created_at + Duration::seconds(seconds))
    }

    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns `true` if the token had expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }

    /// Returns `true` if the token expires within `window` from now.
    ///
    /// Useful to refresh ahead of expiry.
    #[must_use]
    pub fn expires_within(&self, window: Duration) -> bool {
        self.is_expired_at(Utc::now() + window)
    }

    /// Returns `true` if a refresh token is available.
    #[must_use]
    pub fn is_refreshable(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Parses the granted scopes.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidScopes`] for malformed scope entries.
    pub fn scopes(&self) -> Result<Scopes, OAuthError> {
        self.scope.as_deref().unwrap_or_default().parse()
    }

    /// Converts the access token into an [`ApiKey`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the access token is blank.
    pub fn to_api_key(&self) -> Result<ApiKey, ConfigError> {
        ApiKey::new(self.access_token.as_str())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"*****")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "*****"),
            )
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// The result of introspecting a token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Whether the token is currently valid.
    pub active: bool,
    /// Space-separated scopes of the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// The application the token was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Token type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Id of the workspace that granted the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
    /// Name of the workspace that granted the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    /// Slug of the workspace that granted the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_slug: Option<String>,
    /// Workspace member who authorized the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_by_workspace_member_id: Option<String>,
}

impl TokenInfo {
    /// Parses the token's scopes.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidScopes`] for malformed scope entries.
    pub fn scopes(&self) -> Result<Scopes, OAuthError> {
        self.scope.as_deref().unwrap_or_default().parse()
    }
}

// Verify token types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Token>();
    assert_send_sync::<TokenInfo>();
};
