//! The OAuth `state` parameter.
//!
//! A [`StateParam`] is generated before redirecting to the consent screen,
//! stored in the user's session, and compared with the `state` returned to
//! the redirect URI. It can optionally carry data through the flow (for
//! example the page to return to), base64-encoded alongside the nonce.
//!
//! # Example
//!
//! ```rust
//! use attio::auth::oauth::StateParam;
//!
//! let state = StateParam::new();
//! assert_eq!(state.nonce().len(), 15);
//!
//! // On the callback:
//! assert!(state.verify(state.as_ref()).is_ok());
//! assert!(state.verify("forged").is_err());
//! ```

use std::fmt;

use base64::prelude::*;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::auth::oauth::OAuthError;
use crate::webhooks::constant_time_compare;

const NONCE_LENGTH: usize = 15;

/// A CSRF-protection nonce, optionally carrying serialized data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateParam {
    value: String,
    nonce: String,
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    nonce: String,
    data: T,
}

fn random_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

impl StateParam {
    /// Generates a fresh 15-character alphanumeric nonce.
    #[must_use]
    pub fn new() -> Self {
        let nonce = random_nonce();
        Self {
            value: nonce.clone(),
            nonce,
        }
    }

    /// Generates a nonce and embeds `data` with it.
    ///
    /// # Example
    ///
    /// ```rust
    /// use attio::auth::oauth::StateParam;
    ///
    /// let state = StateParam::with_data(&"/settings");
    /// let returned = StateParam::from_raw(state.as_ref());
    /// assert_eq!(returned.data::<String>().as_deref(), Some("/settings"));
    /// ```
    #[must_use]
    pub fn with_data<T: Serialize>(data: &T) -> Self {
        let nonce = random_nonce();
        let envelope = Envelope {
            nonce: nonce.clone(),
            data,
        };
        let json = serde_json::to_vec(&envelope).unwrap_or_default();
        Self {
            value: BASE64_URL_SAFE_NO_PAD.encode(json),
            nonce,
        }
    }

    /// Wraps a state value received on the callback.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let value = raw.into();
        let nonce = decode::<Envelope<serde_json::Value>>(&value)
            .map_or_else(|| value.clone(), |envelope| envelope.nonce);
        Self { value, nonce }
    }

    /// Returns the random nonce.
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// Returns the embedded data, if the state carries data of type `T`.
    #[must_use]
    pub fn data<T: DeserializeOwned>(&self) -> Option<T> {
        decode::<Envelope<T>>(&self.value).map(|envelope| envelope.data)
    }

    /// Checks the state returned on the callback in constant time.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::StateMismatch`] if `received` differs.
    pub fn verify(&self, received: &str) -> Result<(), OAuthError> {
        if constant_time_compare(&self.value, received) {
            Ok(())
        } else {
            Err(OAuthError::StateMismatch)
        }
    }
}

fn decode<T: DeserializeOwned>(value: &str) -> Option<T> {
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(value.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};
