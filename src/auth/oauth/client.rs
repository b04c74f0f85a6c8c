//! The OAuth client.

use std::collections::HashMap;

use serde::Deserialize;

use crate::auth::oauth::{OAuthError, StateParam, Token, TokenInfo};
use crate::auth::Scopes;
use crate::config::OAuthConfig;

const AUTHORIZE_PATH: &str = "authorize";
const TOKEN_PATH: &str = "oauth/token";
const REVOKE_PATH: &str = "oauth/revoke";
const INTROSPECT_PATH: &str = "oauth/introspect";

/// Error body returned by the OAuth endpoints.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn describe(&self, raw: &str) -> String {
        self.error_description
            .clone()
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| raw.to_string())
    }

    fn is_invalid_token(&self, raw: &str) -> bool {
        self.error.as_deref() == Some("invalid_token")
            || raw.contains("invalid_token")
            || raw.to_ascii_lowercase().contains("already revoked")
    }
}

/// Runs the OAuth 2.0 authorization code flow against Attio.
///
/// # Example
///
/// ```rust,ignore
/// use attio::auth::oauth::{OAuthClient, StateParam};
/// use attio::auth::Scopes;
///
/// let oauth = OAuthClient::new(config);
/// let state = StateParam::new();
/// let scopes: Scopes = "record_permission:read-write".parse()?;
/// let url = oauth.authorization_url(&scopes, &state);
/// // redirect the user to `url`, then on the callback:
/// let code = oauth.validate_callback(&query, &state)?;
/// let token = oauth.exchange_code(&code).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OAuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl OAuthClient {
    /// Creates a client for the given application credentials.
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client that sends requests through `http`.
    #[must_use]
    pub const fn with_http_client(config: OAuthConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Returns the application configuration.
    #[must_use]
    pub const fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Builds the consent screen URL to redirect the user to.
    ///
    /// # Example
    ///
    /// ```rust
    /// use attio::auth::oauth::{OAuthClient, StateParam};
    /// use attio::{ClientId, ClientSecret, OAuthConfig};
    ///
    /// let config = OAuthConfig::builder()
    ///     .client_id(ClientId::new("client_1").unwrap())
    ///     .client_secret(ClientSecret::new("secret").unwrap())
    ///     .redirect_uri("https://example.com/callback")
    ///     .build()
    ///     .unwrap();
    /// let oauth = OAuthClient::new(config);
    ///
    /// let url = oauth.authorization_url(&"note:read".parse().unwrap(), &StateParam::from_raw("xyz"));
    /// assert!(url.starts_with("https://app.attio.com/authorize?client_id=client_1"));
    /// assert!(url.contains("&state=xyz"));
    /// ```
    #[must_use]
    pub fn authorization_url(&self, scopes: &Scopes, state: &StateParam) -> String {
        let mut url = format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&state={}",
            self.config.auth_base_url().join(AUTHORIZE_PATH),
            urlencoding::encode(self.config.client_id().as_ref()),
            urlencoding::encode(self.config.redirect_uri()),
            urlencoding::encode(state.as_ref()),
        );
        if !scopes.is_empty() {
            url.push_str("&scope=");
            url.push_str(&urlencoding::encode(&scopes.to_string()));
        }
        url
    }

    /// Checks the callback query and returns the authorization code.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::StateMismatch`] if `state` is missing or differs,
    /// [`OAuthError::AuthorizationDenied`] if the user declined, and
    /// [`OAuthError::InvalidResponse`] if no code was sent.
    pub fn validate_callback(
        &self,
        params: &HashMap<String, String>,
        expected_state: &StateParam,
    ) -> Result<String, OAuthError> {
        let state = params.get("state").ok_or(OAuthError::StateMismatch)?;
        expected_state.verify(state)?;

        if let Some(error) = params.get("error") {
            return Err(OAuthError::AuthorizationDenied {
                error: error.clone(),
            });
        }

        params
            .get("code")
            .filter(|code| !code.is_empty())
            .cloned()
            .ok_or_else(|| OAuthError::InvalidResponse {
                message: "callback is missing the code parameter".to_string(),
            })
    }

    /// Exchanges an authorization code for a token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenRequestFailed`] for a non-2xx response.
    pub async fn exchange_code(&self, code: &str) -> Result<Token, OAuthError> {
        tracing::debug!("exchanging OAuth authorization code");
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.config.client_id().as_ref()),
            ("client_secret", self.config.client_secret().as_ref()),
            ("redirect_uri", self.config.redirect_uri()),
        ];
        self.request_token(&form).await
    }

    /// Obtains a new token with a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingRefreshToken`] for a blank refresh token
    /// and [`OAuthError::TokenRequestFailed`] for a non-2xx response.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Token, OAuthError> {
        if refresh_token.trim().is_empty() {
            return Err(OAuthError::MissingRefreshToken);
        }
        tracing::debug!("refreshing OAuth access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id().as_ref()),
            ("client_secret", self.config.client_secret().as_ref()),
        ];
        let mut token = self.request_token(&form).await?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token)
    }

    /// Refreshes `token` using its own refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingRefreshToken`] if `token` has none,
    /// otherwise the errors of [`refresh_token`](Self::refresh_token).
    pub async fn refresh(&self, token: &Token) -> Result<Token, OAuthError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or(OAuthError::MissingRefreshToken)?;
        self.refresh_token(refresh_token).await
    }

    /// Revokes a token.
    ///
    /// Returns `Ok(false)` when the server reports the token as already
    /// invalid or revoked.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::RevocationFailed`] for any other non-2xx response.
    pub async fn revoke_token(&self, token: &str) -> Result<bool, OAuthError> {
        tracing::debug!("revoking OAuth token");
        let response = self
            .http
            .post(self.config.api_base_url().join(REVOKE_PATH))
            .basic_auth(
                self.config.client_id().as_ref(),
                Some(self.config.client_secret().as_ref()),
            )
            .form(&[("token", token)])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ErrorBody::parse(&body);
        if status == reqwest::StatusCode::BAD_REQUEST && error.is_invalid_token(&body) {
            tracing::debug!("token was already invalid");
            return Ok(false);
        }

        Err(OAuthError::RevocationFailed {
            status: status.as_u16(),
            message: error.describe(&body),
        })
    }

    /// Looks up whether a token is active and what it grants.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::IntrospectionFailed`] for a non-2xx response and
    /// [`OAuthError::InvalidResponse`] if the body cannot be decoded.
    pub async fn introspect_token(&self, token: &str) -> Result<TokenInfo, OAuthError> {
        tracing::debug!("introspecting OAuth token");
        let response = self
            .http
            .post(self.config.api_base_url().join(INTROSPECT_PATH))
            .basic_auth(
                self.config.client_id().as_ref(),
                Some(self.config.client_secret().as_ref()),
            )
            .form(&[("token", token)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OAuthError::IntrospectionFailed {
                status: status.as_u16(),
                message: ErrorBody::parse(&body).describe(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| OAuthError::InvalidResponse {
            message: e.to_string(),
        })
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<Token, OAuthError> {
        let response = self
            .http
            .post(self.config.api_base_url().join(TOKEN_PATH))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(OAuthError::TokenRequestFailed {
                status: status.as_u16(),
                message: ErrorBody::parse(&body).describe(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| OAuthError::InvalidResponse {
            message: format!("Failed to parse token response: {e}"),
        })
    }
}

// Verify OAuthClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthClient>();
};
