use thiserror::Error;

use crate::clients::HttpError;

/// Failure of a [`RestClient`](crate::clients::RestClient) call.
///
/// ```rust
/// use attio::clients::rest::RestError;
///
/// let error = RestError::InvalidPath { path: "/".to_string() };
/// assert_eq!(error.to_string(), "Invalid REST API path: /");
/// ```
#[derive(Debug, Error)]
pub enum RestError {
    /// The path was empty once surrounding slashes were removed.
    #[error("Invalid REST API path: {path}")]
    InvalidPath {
        /// The path as given.
        path: String,
    },

    /// The transport failed or Attio answered with an error.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl RestError {
    /// HTTP status of the answer, when there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidPath { .. } => None,
            Self::Http(error) => error.status(),
        }
    }
}
