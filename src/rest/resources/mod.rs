//! Attio resource types.
//!
//! Every type wraps a [`Resource`](crate::rest::Resource) (reachable through
//! `Deref`) and opts into the capability traits its endpoint supports:
//!
//! | Resource | Capabilities |
//! |---|---|
//! | [`Object`] | create, retrieve, list, update |
//! | [`Record`], [`Person`], [`Company`], [`Deal`] | create, retrieve, list, update, delete |
//! | [`List`] | create, retrieve, list, update |
//! | [`Entry`] | create, retrieve, list, update, delete |
//! | [`Note`] | create, retrieve, list, delete |
//! | [`Task`] | create, retrieve, list, update, delete |
//! | [`Webhook`] | create, retrieve, list, update, delete |
//! | [`WorkspaceMember`] | retrieve, list |
//! | [`Comment`] | create, retrieve, delete |
//!
//! # Example
//!
//! ```rust,ignore
//! use attio::rest::{Creatable, Listable, PathIds};
//! use attio::rest::resources::{Company, Record};
//! use serde_json::json;
//!
//! // A typed record is already scoped to its object.
//! let acme = Company::create(&client, &PathIds::new(), json!({
//!     "name": "Acme",
//!     "domains": ["acme.com"],
//! })).await?;
//!
//! // A generic record needs the object in its scope.
//! let page = Record::list(&client, &PathIds::object("deals"), Some(json!({"limit": 25}))).await?;
//! ```

use serde_json::{Map, Value};

use crate::rest::RESERVED_KEYS;

/// Declares a resource wrapper type.
///
/// Generates the newtype over [`Resource`](crate::rest::Resource), its
/// constructors, and `Deref`/`DerefMut` to the wrapped resource.
macro_rules! resource_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name($crate::rest::Resource);

        impl $name {
            /// Creates an empty, unsaved instance.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Creates an unsaved instance; every attribute is a pending change.
            ///
            /// # Errors
            ///
            /// Returns [`ResourceError::InvalidArgument`](crate::rest::ResourceError::InvalidArgument)
            /// if `attributes` is not a JSON object or contains a reserved key.
            pub fn with_attributes(
                attributes: serde_json::Value,
            ) -> Result<Self, $crate::rest::ResourceError> {
                $crate::rest::Resource::with_attributes(attributes).map(Self)
            }

            /// Unwraps the underlying resource.
            #[must_use]
            pub fn into_resource(self) -> $crate::rest::Resource {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::rest::Resource;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

/// Expands to the `ApiResource` accessors of a `resource_type!` wrapper.
macro_rules! resource_accessors {
    () => {
        fn from_resource(resource: $crate::rest::Resource) -> Self {
            Self(resource)
        }

        fn resource(&self) -> &$crate::rest::Resource {
            &self.0
        }

        fn resource_mut(&mut self) -> &mut $crate::rest::Resource {
            &mut self.0
        }
    };
}

mod comment;
mod entry;
mod list;
mod note;
mod object;
mod record;
mod task;
mod webhook;
mod workspace_member;

pub use comment::Comment;
pub use entry::Entry;
pub use list::List;
pub use note::Note;
pub use object::Object;
pub use record::{Company, Deal, Person, Record};
pub use task::Task;
pub use webhook::Webhook;
pub use workspace_member::WorkspaceMember;

/// Lifts the entries of the `nested` object to the top level.
///
/// Reserved keys stay where they are; every other top-level key is moved into
/// `_metadata` so it does not mix with tracked attribute values. Nested
/// entries named like a reserved key (records carry a `created_at` value)
/// are kept under `_metadata.{nested}` instead of replacing it.
pub(crate) fn flatten_nested(data: Value, nested: &str) -> Value {
    let Value::Object(mut map) = data else {
        return data;
    };

    let mut metadata = match map.remove("_metadata") {
        Some(Value::Object(existing)) => existing,
        _ => Map::new(),
    };
    let values = match map.remove(nested) {
        Some(Value::Object(values)) => values,
        _ => Map::new(),
    };

    let mut flattened = Map::new();
    let mut shadowed = Map::new();
    for (key, value) in values {
        if RESERVED_KEYS.contains(&key.as_str()) {
            shadowed.insert(key, value);
        } else {
            flattened.insert(key, value);
        }
    }
    for (key, value) in map {
        if RESERVED_KEYS.contains(&key.as_str()) {
            flattened.insert(key, value);
        } else {
            metadata.insert(key, value);
        }
    }
    if !shadowed.is_empty() {
        metadata.insert(nested.to_string(), Value::Object(shadowed));
    }
    if !metadata.is_empty() {
        flattened.insert("_metadata".to_string(), Value::Object(metadata));
    }

    Value::Object(flattened)
}

/// Builds `{"data": {..passthrough, nested: values}}` from flat params.
///
/// Params that already carry an explicit `nested` object use it as-is.
pub(crate) fn nest_params(mut params: Map<String, Value>, nested: &str, passthrough: &[&str]) -> Value {
    let mut data = Map::new();
    for key in passthrough {
        if let Some(value) = params.remove(*key) {
            data.insert((*key).to_string(), value);
        }
    }

    let values = match params.remove(nested) {
        Some(Value::Object(explicit)) => {
            let mut values = explicit;
            values.extend(params);
            values
        }
        Some(other) => {
            params.insert(nested.to_string(), other);
            params
        }
        None => params,
    };
    data.insert(nested.to_string(), Value::Object(values));

    serde_json::json!({ "data": data })
}

/// Wraps attribute changes as `{"data": {nested: changes}}`.
pub(crate) fn nest_changes(changes: Map<String, Value>, nested: &str) -> Value {
    let mut data = Map::new();
    data.insert(nested.to_string(), Value::Object(changes));
    serde_json::json!({ "data": data })
}
