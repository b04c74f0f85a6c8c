//! Change tracking for resource attributes.
//!
//! [`AttributeTracker`] keeps the current attribute map next to an
//! independent snapshot of the values last synchronised with the server.
//! Only attributes whose current value differs from the snapshot are sent
//! in update requests.
//!
//! # Example
//!
//! ```rust
//! use attio::rest::AttributeTracker;
//! use serde_json::json;
//!
//! let mut tracker = AttributeTracker::from_synced(
//!     json!({"name": "Acme", "domain": "acme.com"}).as_object().unwrap().clone(),
//! );
//! assert!(!tracker.is_changed());
//!
//! tracker.set("name", json!("Acme Inc"));
//! assert!(tracker.is_changed());
//! assert_eq!(tracker.changed_attributes().len(), 1);
//!
//! // Writing the original value back clears the change.
//! tracker.set("name", json!("Acme"));
//! assert!(!tracker.is_changed());
//! ```

use serde_json::{Map, Value};

/// Current attributes plus the snapshot they are diffed against.
///
/// `serde_json::Value` clones are deep, so the snapshot never shares
/// nested structures with the live attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeTracker {
    attributes: Map<String, Value>,
    original: Map<String, Value>,
}

impl AttributeTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker whose attributes are all considered synced.
    #[must_use]
    pub fn from_synced(attributes: Map<String, Value>) -> Self {
        let original = attributes.clone();
        Self {
            attributes,
            original,
        }
    }

    /// Returns the current value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Writes `value` under `key` without touching the snapshot.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Returns the current attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Returns the snapshot taken at the last synchronisation.
    #[must_use]
    pub const fn original_attributes(&self) -> &Map<String, Value> {
        &self.original
    }

    /// Returns `true` if any attribute differs from the snapshot or is new.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.attributes
            .iter()
            .any(|(key, value)| self.original.get(key) != Some(value))
    }

    /// Returns the attributes that differ from the snapshot, with their current values.
    #[must_use]
    pub fn changed_attributes(&self) -> Map<String, Value> {
        self.attributes
            .iter()
            .filter(|(key, value)| self.original.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Replaces both maps with `attributes`, clearing all changes.
    pub fn sync(&mut self, attributes: Map<String, Value>) {
        self.original = attributes.clone();
        self.attributes = attributes;
    }

    /// Discards local changes by restoring the snapshot.
    pub fn revert(&mut self) {
        self.attributes = self.original.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn synced(value: Value) -> AttributeTracker {
        AttributeTracker::from_synced(value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_synced_tracker_is_clean() {
        let tracker = synced(json!({"name": "Acme", "employees": 10}));
        assert!(!tracker.is_changed());
        assert!(tracker.changed_attributes().is_empty());
    }

    #[test]
    fn test_changed_attributes_contains_only_differing_keys() {
        let mut tracker = synced(json!({"name": "Acme", "employees": 10}));
        tracker.set("employees", json!(12));

        let changes = tracker.changed_attributes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.get("employees"), Some(&json!(12)));
    }

    #[test]
    fn test_new_keys_count_as_changes() {
        let mut tracker = synced(json!({"name": "Acme"}));
        tracker.set("domain", json!("acme.com"));
        assert!(tracker.is_changed());
        assert_eq!(tracker.changed_attributes().get("domain"), Some(&json!("acme.com")));
    }

    #[test]
    fn test_restoring_original_value_clears_change() {
        let mut tracker = synced(json!({"name": "Acme"}));
        tracker.set("name", json!("Other"));
        tracker.set("name", json!("Acme"));
        assert!(!tracker.is_changed());
    }

    #[test]
    fn test_change_detection_compares_by_value() {
        let mut tracker = synced(json!({"tags": ["a", "b"]}));
        tracker.set("tags", json!(["a", "b"]));
        assert!(!tracker.is_changed());
    }

    #[test]
    fn test_snapshot_is_independent_of_nested_mutation() {
        let mut tracker = synced(json!({"address": {"city": "London"}}));
        let mut address = tracker.get("address").cloned().unwrap();
        address["city"] = json!("Paris");
        tracker.set("address", address);

        assert_eq!(
            tracker.original_attributes().get("address"),
            Some(&json!({"city": "London"}))
        );
        assert!(tracker.is_changed());
    }

    #[test]
    fn test_sync_and_revert() {
        let mut tracker = synced(json!({"name": "Acme"}));
        tracker.set("name", json!("Changed"));
        tracker.revert();
        assert_eq!(tracker.get("name"), Some(&json!("Acme")));

        tracker.set("name", json!("Changed"));
        tracker.sync(json!({"name": "Server"}).as_object().cloned().unwrap());
        assert!(!tracker.is_changed());
        assert_eq!(tracker.get("name"), Some(&json!("Server")));
    }
}
