//! OAuth scope handling for Attio.
//!
//! Attio scopes have the form `<area>:read` or `<area>:read-write`. A
//! `read-write` grant implies the matching `read` scope.
//!
//! # Example
//!
//! ```rust
//! use attio::auth::{ScopeValidator, Scopes};
//!
//! let granted: Scopes = "record_permission:read-write object_configuration:read".parse().unwrap();
//! let validator = ScopeValidator::new(granted);
//!
//! assert!(validator.includes("record_permission:read"));
//! assert!(!validator.includes("note:read"));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::auth::oauth::OAuthError;

const READ_SUFFIX: &str = ":read";
const READ_WRITE_SUFFIX: &str = ":read-write";

/// Every scope an Attio OAuth application can request.
pub const KNOWN_SCOPES: &[&str] = &[
    "user_management:read",
    "user_management:read-write",
    "record_permission:read",
    "record_permission:read-write",
    "object_configuration:read",
    "object_configuration:read-write",
    "list_entry:read",
    "list_entry:read-write",
    "list_configuration:read",
    "list_configuration:read-write",
    "public_collection:read",
    "public_collection:read-write",
    "private_collection:read",
    "private_collection:read-write",
    "comment:read",
    "comment:read-write",
    "task:read",
    "task:read-write",
    "note:read",
    "note:read-write",
    "meeting:read",
    "meeting:read-write",
    "call_recording:read",
    "call_recording:read-write",
    "webhook:read",
    "webhook:read-write",
];

/// A deduplicated set of OAuth scopes, with implied `read` scopes expanded.
///
/// Serializes to and from the space-separated form used in token responses.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Scopes {
    scopes: BTreeSet<String>,
}

impl Scopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns `true` if `scope` is in the set, directly or implied.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Returns `true` if every scope of `other` is in this set.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.scopes.iter().all(|s| self.scopes.contains(s))
    }

    /// Iterates over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn insert(&mut self, scope: &str) {
        if let Some(area) = scope.strip_suffix(READ_WRITE_SUFFIX) {
            self.scopes.insert(format!("{area}{READ_SUFFIX}"));
        }
        self.scopes.insert(scope.to_string());
    }
}

impl FromStr for Scopes {
    type Err = OAuthError;

    /// Parses space- or comma-separated scopes. Format is not checked here;
    /// use [`ScopeValidator::validate`] to reject unknown scopes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = Self::new();
        let mut malformed = Vec::new();

        for scope in s.split(|c: char| c == ',' || c.is_whitespace()) {
            if scope.is_empty() {
                continue;
            }
            if scope.contains(':') {
                scopes.insert(scope);
            } else {
                malformed.push(scope.to_string());
            }
        }

        if malformed.is_empty() {
            Ok(scopes)
        } else {
            Err(OAuthError::InvalidScopes { scopes: malformed })
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for Scopes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut scopes = Self::new();
        for scope in iter {
            let scope = scope.as_ref().trim();
            if !scope.is_empty() {
                scopes.insert(scope);
            }
        }
        scopes
    }
}

impl fmt::Display for Scopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scopes: Vec<&str> = self.iter().collect();
        write!(f, "{}", scopes.join(" "))
    }
}

impl Serialize for Scopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Scopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Checks scopes against the Attio scope list and a set of granted scopes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeValidator {
    granted: Scopes,
}

impl ScopeValidator {
    /// Creates a validator for the given granted scopes.
    #[must_use]
    pub const fn new(granted: Scopes) -> Self {
        Self { granted }
    }

    /// Returns `true` if `scope` is an Attio scope.
    #[must_use]
    pub fn is_known(scope: &str) -> bool {
        KNOWN_SCOPES.contains(&scope)
    }

    /// Parses `scopes` and rejects any that Attio does not define.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidScopes`] listing every unknown scope.
    pub fn validate(scopes: &str) -> Result<Scopes, OAuthError> {
        let parsed: Scopes = scopes.parse()?;
        let unknown: Vec<String> = parsed
            .iter()
            .filter(|scope| !Self::is_known(scope))
            .map(String::from)
            .collect();
        if unknown.is_empty() {
            Ok(parsed)
        } else {
            Err(OAuthError::InvalidScopes { scopes: unknown })
        }
    }

    /// Returns the granted scopes.
    #[must_use]
    pub const fn granted(&self) -> &Scopes {
        &self.granted
    }

    /// Returns `true` if `scope` is granted, directly or through `read-write`.
    #[must_use]
    pub fn includes(&self, scope: &str) -> bool {
        self.granted.contains(scope)
    }

    /// Returns `true` if every scope of `required` is granted.
    #[must_use]
    pub fn covers(&self, required: &Scopes) -> bool {
        self.granted.covers(required)
    }

    /// Returns the scopes of `required` that are not granted.
    #[must_use]
    pub fn missing<'a>(&self, required: &'a Scopes) -> Vec<&'a str> {
        required.iter().filter(|s| !self.includes(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_space_and_comma_separated() {
        let scopes: Scopes = "note:read, task:read-write  webhook:read".parse().unwrap();
        assert!(scopes.contains("note:read"));
        assert!(scopes.contains("task:read-write"));
        assert!(scopes.contains("webhook:read"));
    }

    #[test]
    fn test_read_write_implies_read() {
        let scopes: Scopes = "record_permission:read-write".parse().unwrap();
        assert!(scopes.contains("record_permission:read"));
        assert!(!scopes.contains("note:read"));
    }

    #[test]
    fn test_read_does_not_imply_read_write() {
        let validator = ScopeValidator::new("note:read".parse().unwrap());
        assert!(!validator.includes("note:read-write"));
    }

    #[test]
    fn test_validate_rejects_unknown_scopes() {
        let error = ScopeValidator::validate("note:read widgets:read").unwrap_err();
        match error {
            OAuthError::InvalidScopes { scopes } => assert_eq!(scopes, vec!["widgets:read"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_scope_is_invalid() {
        assert!(matches!(
            "read_products".parse::<Scopes>(),
            Err(OAuthError::InvalidScopes { .. })
        ));
    }

    #[test]
    fn test_covers_and_missing() {
        let validator = ScopeValidator::new("task:read-write note:read".parse().unwrap());
        let required: Scopes = "task:read note:read".parse().unwrap();
        assert!(validator.covers(&required));

        let more: Scopes = "task:read comment:read".parse().unwrap();
        assert!(!validator.covers(&more));
        assert_eq!(validator.missing(&more), vec!["comment:read"]);
    }

    #[test]
    fn test_serde_round_trip_uses_space_separated_string() {
        let scopes: Scopes = "note:read task:read".parse().unwrap();
        let json = serde_json::to_string(&scopes).unwrap();
        assert_eq!(json, "\"note:read task:read\"");
        let back: Scopes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scopes);
    }

    #[test]
    fn test_every_read_write_scope_has_a_read_counterpart() {
        for scope in KNOWN_SCOPES {
            if let Some(area) = scope.strip_suffix(READ_WRITE_SUFFIX) {
                assert!(ScopeValidator::is_known(&format!("{area}{READ_SUFFIX}")));
            }
        }
    }
}
