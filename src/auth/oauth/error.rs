//! OAuth error types.
//!
//! # Example
//!
//! ```rust
//! use attio::auth::oauth::OAuthError;
//!
//! let error = OAuthError::StateMismatch;
//! assert_eq!(error.to_string(), "OAuth state parameter does not match the expected value");
//! ```

use thiserror::Error;

/// Errors returned by [`OAuthClient`](crate::auth::oauth::OAuthClient) and
/// the scope and state helpers.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The token endpoint rejected an authorization code or refresh token.
    #[error("Token request failed (status {status}): {message}")]
    TokenRequestFailed {
        /// HTTP status code returned by the server.
        status: u16,
        /// Error description from the server.
        message: String,
    },

    /// Revocation failed for a reason other than an already invalid token.
    #[error("Token revocation failed (status {status}): {message}")]
    RevocationFailed {
        /// HTTP status code returned by the server.
        status: u16,
        /// Error description from the server.
        message: String,
    },

    /// Token introspection failed.
    #[error("Token introspection failed (status {status}): {message}")]
    IntrospectionFailed {
        /// HTTP status code returned by the server.
        status: u16,
        /// Error description from the server.
        message: String,
    },

    /// A response could not be decoded.
    #[error("Invalid OAuth response: {message}")]
    InvalidResponse {
        /// Decoder message.
        message: String,
    },

    /// One or more scopes are not Attio scopes.
    #[error("Unknown OAuth scopes: {}", scopes.join(", "))]
    InvalidScopes {
        /// The unrecognised scopes.
        scopes: Vec<String>,
    },

    /// The callback `state` differs from the one sent with the authorization URL.
    #[error("OAuth state parameter does not match the expected value")]
    StateMismatch,

    /// The callback carried an `error` instead of a code.
    #[error("Authorization denied: {error}")]
    AuthorizationDenied {
        /// The `error` query parameter.
        error: String,
    },

    /// A refresh was requested for a token without a refresh token.
    #[error("Token has no refresh token")]
    MissingRefreshToken,

    /// The request never completed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_scopes_lists_every_scope() {
        let error = OAuthError::InvalidScopes {
            scopes: vec!["foo:read".to_string(), "bar".to_string()],
        };
        assert_eq!(error.to_string(), "Unknown OAuth scopes: foo:read, bar");
    }

    #[test]
    fn test_token_request_failed_includes_status() {
        let error = OAuthError::TokenRequestFailed {
            status: 400,
            message: "invalid_grant".to_string(),
        };
        assert!(error.to_string().contains("400"));
        assert!(error.to_string().contains("invalid_grant"));
    }
}
