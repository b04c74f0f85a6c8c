//! Path building infrastructure for REST resources.
//!
//! Each resource type declares a table of [`ResourcePath`]s: the HTTP method,
//! the operation, the ids a path needs, and a template with `{id_name}`
//! placeholders. At call time the most specific template whose ids are all
//! available is chosen and interpolated.
//!
//! # Example
//!
//! ```rust
//! use attio::rest::{build_path, get_path, PathIds, ResourceOperation, ResourcePath};
//! use attio::clients::HttpMethod;
//!
//! const PATHS: &[ResourcePath] = &[
//!     ResourcePath::new(
//!         HttpMethod::Get,
//!         ResourceOperation::Retrieve,
//!         &["object_id", "record_id"],
//!         "objects/{object_id}/records/{record_id}",
//!     ),
//!     ResourcePath::new(
//!         HttpMethod::Post,
//!         ResourceOperation::List,
//!         &["object_id"],
//!         "objects/{object_id}/records/query",
//!     ),
//! ];
//!
//! let ids = PathIds::object("people").with("record_id", "rec_1");
//! let path = get_path(PATHS, ResourceOperation::Retrieve, &ids.keys()).unwrap();
//! assert_eq!(build_path(path.template, &ids), "objects/people/records/rec_1");
//! ```

use std::collections::BTreeMap;

use crate::clients::HttpMethod;

/// Operations that can be performed on a REST resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// Fetch a single resource by id.
    Retrieve,
    /// Fetch a page of resources.
    List,
    /// Create a new resource.
    Create,
    /// Partially update an existing resource.
    Update,
    /// Delete a resource.
    Delete,
}

impl ResourceOperation {
    /// Returns the operation name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A path configuration for a REST resource operation.
///
/// List operations may use `POST` (Attio's `.../query` endpoints); the
/// pagination engine re-issues the same method with the next cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    /// The HTTP method for this path.
    pub http_method: HttpMethod,
    /// The operation this path is used for.
    pub operation: ResourceOperation,
    /// Required id parameters (e.g., `["object_id", "record_id"]`).
    pub ids: &'static [&'static str],
    /// The URL template with `{id}` placeholders.
    pub template: &'static str,
}

impl ResourcePath {
    /// Creates a new `ResourcePath`.
    #[must_use]
    pub const fn new(
        http_method: HttpMethod,
        operation: ResourceOperation,
        ids: &'static [&'static str],
        template: &'static str,
    ) -> Self {
        Self {
            http_method,
            operation,
            ids,
            template,
        }
    }

    /// Returns the number of required ids for this path.
    #[must_use]
    pub const fn id_count(&self) -> usize {
        self.ids.len()
    }

    /// Checks if all required ids are available.
    #[must_use]
    pub fn matches_ids(&self, available_ids: &[&str]) -> bool {
        self.ids.iter().all(|id| available_ids.contains(id))
    }
}

/// Selects the most specific path for an operation whose ids are all available.
#[must_use]
pub fn get_path<'a>(
    paths: &'a [ResourcePath],
    operation: ResourceOperation,
    available_ids: &[&str],
) -> Option<&'a ResourcePath> {
    paths
        .iter()
        .filter(|p| p.operation == operation)
        .filter(|p| p.matches_ids(available_ids))
        .max_by_key(|p| p.id_count())
}

/// Interpolates `{name}` placeholders from `ids`, percent-encoding each value.
///
/// Placeholders without a value are left in place.
#[must_use]
pub fn build_path(template: &str, ids: &PathIds) -> String {
    let mut result = template.to_string();

    for (key, value) in ids.iter() {
        let placeholder = format!("{{{key}}}");
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, &urlencoding::encode(value));
        }
    }

    result
}

/// Named identifiers used to scope a resource path.
///
/// Attio nests many resources under a parent (`objects/{object_id}/records`,
/// `lists/{list_id}/entries`); `PathIds` carries those parent ids, and the
/// resource's own id once it is known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathIds(BTreeMap<String, String>);

impl PathIds {
    /// Creates an empty set of path ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scopes a path to an object (`object_id`), by slug or id.
    #[must_use]
    pub fn object(object: impl Into<String>) -> Self {
        Self::new().with("object_id", object)
    }

    /// Scopes a path to a list (`list_id`), by slug or id.
    #[must_use]
    pub fn list(list: impl Into<String>) -> Self {
        Self::new().with("list_id", list)
    }

    /// Adds (or replaces) an id, returning the updated set.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds (or replaces) an id. Empty values are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.0.insert(key.into(), value);
        }
    }

    /// Returns the id stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the names of the available ids.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if no ids are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges `other` into `self`; `other` wins on conflicts.
    #[must_use]
    pub fn merged(mut self, other: &Self) -> Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceOperation>();
    assert_send_sync::<ResourcePath>();
    assert_send_sync::<PathIds>();
};

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD_PATHS: &[ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["object_id", "record_id"],
            "objects/{object_id}/records/{record_id}",
        ),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["record_id"],
            "records/{record_id}",
        ),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::List,
            &["object_id"],
            "objects/{object_id}/records/query",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["object_id", "record_id"],
            "objects/{object_id}/records/{record_id}",
        ),
    ];

    #[test]
    fn test_path_template_interpolation_multiple_ids() {
        let ids = PathIds::object("people").with("record_id", "rec_1");
        let result = build_path("objects/{object_id}/records/{record_id}", &ids);
        assert_eq!(result, "objects/people/records/rec_1");
    }

    #[test]
    fn test_get_path_selects_most_specific_path() {
        let path = get_path(
            RECORD_PATHS,
            ResourceOperation::Retrieve,
            &["object_id", "record_id"],
        );
        assert_eq!(
            path.unwrap().template,
            "objects/{object_id}/records/{record_id}"
        );
    }

    #[test]
    fn test_get_path_falls_back_to_less_specific() {
        let path = get_path(RECORD_PATHS, ResourceOperation::Retrieve, &["record_id"]);
        assert_eq!(path.unwrap().template, "records/{record_id}");
    }

    #[test]
    fn test_get_path_returns_none_when_no_match() {
        assert!(get_path(RECORD_PATHS, ResourceOperation::Update, &["record_id"]).is_none());
        assert!(get_path(RECORD_PATHS, ResourceOperation::List, &[]).is_none());
    }

    #[test]
    fn test_list_path_can_use_post() {
        let path = get_path(RECORD_PATHS, ResourceOperation::List, &["object_id"]).unwrap();
        assert_eq!(path.http_method, HttpMethod::Post);
        assert_eq!(path.template, "objects/{object_id}/records/query");
    }

    #[test]
    fn test_build_path_percent_encodes_values() {
        let ids = PathIds::new().with("note_id", "a/b c");
        assert_eq!(build_path("notes/{note_id}", &ids), "notes/a%2Fb%20c");
    }

    #[test]
    fn test_build_path_leaves_missing_placeholders() {
        let result = build_path("notes/{note_id}", &PathIds::new());
        assert_eq!(result, "notes/{note_id}");
    }

    #[test]
    fn test_path_ids_ignore_empty_values_and_merge() {
        let ids = PathIds::object("").with("list_id", "sales");
        assert_eq!(ids.keys(), vec!["list_id"]);

        let merged = PathIds::object("people").merged(&PathIds::object("companies"));
        assert_eq!(merged.get("object_id"), Some("companies"));
    }
}
