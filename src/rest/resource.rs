//! The resource base shared by every Attio entity.
//!
//! A [`Resource`] holds the server-assigned structured `id`, `created_at`,
//! free-form metadata, and the tracked attributes. Concrete types (records,
//! notes, tasks, ...) wrap a `Resource` and implement [`ApiResource`] to say
//! where they live and how their wire payloads are shaped. CRUD behaviour is
//! layered on through the capability traits in
//! [`operations`](crate::rest::operations).
//!
//! # Example
//!
//! ```rust
//! use attio::rest::Resource;
//! use serde_json::json;
//!
//! let mut resource = Resource::from_server(json!({
//!     "id": {"workspace_id": "ws_1", "task_id": "task_1"},
//!     "created_at": "2024-01-01T00:00:00.000000000Z",
//!     "content_plaintext": "Call Acme",
//!     "is_completed": false,
//! }))
//! .unwrap();
//!
//! assert!(!resource.is_changed());
//! // The bracket accessor never exposes the structured id.
//! assert!(resource.get("id").is_none());
//! assert_eq!(resource.id_str("task_id").as_deref(), Some("task_1"));
//!
//! resource.set("is_completed", json!(true)).unwrap();
//! assert!(resource.is_changed());
//! ```

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::clients::{HttpMethod, HttpResponse, RestClient};
use crate::rest::{
    build_path, get_path, AttributeTracker, PathIds, ResourceError, ResourceOperation,
    ResourcePath,
};

/// Keys that are lifted out of the attribute map on synchronisation.
pub const RESERVED_KEYS: &[&str] = &["id", "created_at", "_metadata"];

/// Lifecycle state of a resource instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// The resource can be read and mutated.
    #[default]
    Active,
    /// The resource was deleted on the server; mutations are refused.
    Deleted,
}

/// A client-side model of one server entity, with change tracking.
///
/// A `Resource` is plain in-memory state. Share it between tasks only behind
/// your own synchronisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resource {
    id: Option<Value>,
    created_at: Option<DateTime<Utc>>,
    metadata: Map<String, Value>,
    tracker: AttributeTracker,
    lifecycle: Lifecycle,
    scope: PathIds,
}

impl Resource {
    /// Creates an empty, unsaved resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unsaved resource whose attributes are all pending changes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] if `attributes` is not a JSON
    /// object or contains a reserved key (`id`, `created_at`, `_metadata`).
    pub fn with_attributes(attributes: Value) -> Result<Self, ResourceError> {
        let Value::Object(map) = attributes else {
            return Err(ResourceError::invalid_argument(
                "attributes must be a key-value mapping",
            ));
        };
        let mut resource = Self::new();
        for (key, value) in map {
            resource.set(key, value)?;
        }
        Ok(resource)
    }

    /// Creates a resource from a server payload; it starts out unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] if `data` is not a JSON object.
    pub fn from_server(data: Value) -> Result<Self, ResourceError> {
        let mut resource = Self::new();
        resource.update_from(data)?;
        Ok(resource)
    }

    /// Returns the current value of an attribute.
    ///
    /// `get("id")` always returns `None`: the identifier is structured and is
    /// only available through [`id`](Self::id).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.tracker.get(key)
    }

    /// Returns the attribute as a string slice, if it is a JSON string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Sets an attribute. The change is sent on the next save.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidOperation`] if the resource was deleted,
    /// or [`ResourceError::InvalidArgument`] for reserved keys.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<(), ResourceError> {
        self.ensure_active("modify")?;
        let key = key.into();
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(ResourceError::invalid_argument(format!(
                "'{key}' is managed by the server and cannot be set"
            )));
        }
        self.tracker.set(key, value);
        Ok(())
    }

    /// Returns `true` if any attribute differs from the last synced state.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.tracker.is_changed()
    }

    /// Returns the attributes that differ from the last synced state.
    #[must_use]
    pub fn changed_attributes(&self) -> Map<String, Value> {
        self.tracker.changed_attributes()
    }

    /// Returns all current attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        self.tracker.attributes()
    }

    /// Returns the attributes as last synced with the server.
    #[must_use]
    pub const fn original_attributes(&self) -> &Map<String, Value> {
        self.tracker.original_attributes()
    }

    /// Returns the attribute names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tracker.attributes().keys().map(String::as_str)
    }

    /// Returns `true` if the attribute is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.tracker.attributes().contains_key(key)
    }

    /// Synchronises with a server payload.
    ///
    /// Clears all attributes and changes, then repopulates attributes and the
    /// snapshot from `data`. `id`, `created_at`, and `_metadata` are stored on
    /// the resource itself rather than as attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] if `data` is not a JSON
    /// object, or [`ResourceError::InvalidOperation`] if the resource was
    /// deleted.
    pub fn update_from(&mut self, data: Value) -> Result<(), ResourceError> {
        self.ensure_active("update")?;
        let Value::Object(mut map) = data else {
            return Err(ResourceError::invalid_argument(
                "server attributes must be a key-value mapping",
            ));
        };

        if let Some(id) = map.remove("id").filter(|id| !id.is_null()) {
            self.id = Some(id);
        }
        if let Some(created_at) = map.remove("created_at") {
            self.created_at = created_at
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc));
        }
        self.metadata = match map.remove("_metadata") {
            Some(Value::Object(metadata)) => metadata,
            _ => Map::new(),
        };

        self.tracker.sync(map);
        Ok(())
    }

    /// Discards local changes, restoring the last synced attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidOperation`] if the resource was deleted.
    pub fn revert(&mut self) -> Result<(), ResourceError> {
        self.ensure_active("revert")?;
        self.tracker.revert();
        Ok(())
    }

    /// Returns the structured identifier, `None` for unsaved resources.
    #[must_use]
    pub const fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Returns the identifier stored under `key` in the structured id.
    ///
    /// A plain string id is returned as-is regardless of `key`.
    #[must_use]
    pub fn id_str(&self, key: &str) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Object(map) => map.get(key).and_then(Value::as_str).map(String::from),
            _ => None,
        }
    }

    /// Returns `true` if the resource has never been persisted.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Returns the creation timestamp, if the server sent a parsable one.
    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns free-form metadata carried alongside the attributes.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Returns `true` once the resource has been deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.lifecycle == Lifecycle::Deleted
    }

    /// Returns the parent ids this resource was created or fetched under.
    #[must_use]
    pub const fn scope(&self) -> &PathIds {
        &self.scope
    }

    /// Sets the parent ids used to build paths for this resource.
    pub fn set_scope(&mut self, scope: PathIds) {
        self.scope = scope;
    }

    /// Renders the resource as a JSON object (`id`, `created_at`, attributes).
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = self.tracker.attributes().clone();
        if let Some(id) = &self.id {
            map.insert("id".to_string(), id.clone());
        }
        if let Some(created_at) = self.created_at {
            map.insert(
                "created_at".to_string(),
                Value::String(created_at.to_rfc3339()),
            );
        }
        Value::Object(map)
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.lifecycle = Lifecycle::Deleted;
    }

    fn ensure_active(&self, action: &str) -> Result<(), ResourceError> {
        if self.is_deleted() {
            return Err(ResourceError::invalid_operation(format!(
                "cannot {action} a deleted resource"
            )));
        }
        Ok(())
    }
}

/// Describes where an Attio resource lives and how its payloads look.
///
/// Implementors wrap a [`Resource`]; the capability traits
/// ([`Creatable`](crate::rest::Creatable), [`Retrievable`](crate::rest::Retrievable),
/// [`Listable`](crate::rest::Listable), [`Updatable`](crate::rest::Updatable),
/// [`Deletable`](crate::rest::Deletable)) build on these hooks.
pub trait ApiResource: Sized + Send + Sync + 'static {
    /// The resource name used in errors and logs (e.g., `"Record"`).
    const NAME: &'static str;

    /// The key naming this resource's own id, both inside the structured id
    /// and in path templates (e.g., `"record_id"`).
    const ID_KEY: &'static str;

    /// Available paths for this resource.
    const PATHS: &'static [ResourcePath];

    /// Wraps a resource.
    fn from_resource(resource: Resource) -> Self;

    /// Returns the wrapped resource.
    fn resource(&self) -> &Resource;

    /// Returns the wrapped resource mutably.
    fn resource_mut(&mut self) -> &mut Resource;

    /// Ids every path of this type is scoped by.
    #[must_use]
    fn base_ids() -> PathIds {
        PathIds::new()
    }

    /// Reshapes a server payload into the local attribute layout.
    #[must_use]
    fn normalize(data: Value) -> Value {
        data
    }

    /// Builds the create request body.
    #[must_use]
    fn create_body(params: Map<String, Value>) -> Value {
        serde_json::json!({ "data": params })
    }

    /// Builds the update request body.
    #[must_use]
    fn update_body(changes: Map<String, Value>) -> Value {
        serde_json::json!({ "data": changes })
    }

    /// Returns this resource's own id out of the structured id.
    #[must_use]
    fn own_id(&self) -> Option<String> {
        self.resource().id_str(Self::ID_KEY)
    }

    /// Ids available to build paths for this instance.
    ///
    /// Combines [`base_ids`](Self::base_ids), the resource scope, every string
    /// field of the structured id, and the own id under [`ID_KEY`](Self::ID_KEY).
    #[must_use]
    fn path_ids(&self) -> PathIds {
        let resource = self.resource();
        let mut ids = Self::base_ids().merged(resource.scope());
        if let Some(Value::Object(id)) = resource.id() {
            for (key, value) in id {
                if let Some(value) = value.as_str() {
                    ids.insert(key.clone(), value);
                }
            }
        }
        if let Some(own) = self.own_id() {
            ids.insert(Self::ID_KEY, own);
        }
        ids
    }

    /// Builds an instance from a decoded single-resource response body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Serialization`] if the body carries no object.
    fn from_response(body: Value, scope: &PathIds) -> Result<Self, ResourceError> {
        let data = unwrap_data::<Self>(body)?;
        Self::from_data(data, scope)
    }

    /// Builds an instance from one `data` element.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Serialization`] if `data` is not an object.
    fn from_data(data: Value, scope: &PathIds) -> Result<Self, ResourceError> {
        if !data.is_object() {
            return Err(ResourceError::Serialization {
                resource: Self::NAME,
                message: format!("expected an object, got {data}"),
            });
        }
        let mut resource = Resource::from_server(Self::normalize(data))?;
        resource.set_scope(scope.clone());
        Ok(Self::from_resource(resource))
    }
}

/// Picks the path for `operation` and interpolates it.
pub(crate) fn resolve_path<T: ApiResource>(
    operation: ResourceOperation,
    ids: &PathIds,
) -> Result<(HttpMethod, String), ResourceError> {
    let path = get_path(T::PATHS, operation, &ids.keys()).ok_or(
        ResourceError::PathResolutionFailed {
            resource: T::NAME,
            operation: operation.as_str(),
        },
    )?;
    Ok((path.http_method, build_path(path.template, ids)))
}

/// Sends a request on behalf of `T`, mapping failures onto [`ResourceError`].
pub(crate) async fn send<T: ApiResource>(
    client: &RestClient,
    method: HttpMethod,
    path: &str,
    body: Option<Value>,
    query: Option<std::collections::HashMap<String, String>>,
    id: Option<&str>,
) -> Result<HttpResponse, ResourceError> {
    client
        .request(method, path, body, query)
        .await
        .map_err(|e| ResourceError::from_rest(e, T::NAME, id))
}

/// Extracts the `data` object of a single-resource response.
pub(crate) fn unwrap_data<T: ApiResource>(body: Value) -> Result<Value, ResourceError> {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data @ Value::Object(_)) => Ok(data),
            Some(other) => Err(ResourceError::Serialization {
                resource: T::NAME,
                message: format!("expected 'data' to be an object, got {other}"),
            }),
            None if map.contains_key("id") => Ok(Value::Object(map)),
            None => Err(ResourceError::Serialization {
                resource: T::NAME,
                message: "response has no 'data' object".to_string(),
            }),
        },
        other => Err(ResourceError::Serialization {
            resource: T::NAME,
            message: format!("expected a JSON object, got {other}"),
        }),
    }
}

// Verify Resource is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Resource>();
};
