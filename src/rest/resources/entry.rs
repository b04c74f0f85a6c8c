//! List entry resources.
//!
//! An entry places a parent record on a list. Its list-specific attribute
//! values travel under `entry_values` and are flattened to top-level
//! attributes like record values.

use serde_json::{Map, Value};

use crate::clients::HttpMethod;
use crate::rest::{
    ApiResource, Creatable, Deletable, Listable, ResourceOperation, ResourcePath, Retrievable,
    Updatable,
};

use super::{flatten_nested, nest_changes, nest_params};

const ENTRY_VALUES_KEY: &str = "entry_values";
const PARENT_KEYS: &[&str] = &["parent_record_id", "parent_object"];

resource_type!(
    /// An entry on an Attio list. Scope calls with [`PathIds::list`](crate::rest::PathIds::list).
    Entry
);

impl ApiResource for Entry {
    const NAME: &'static str = "Entry";
    const ID_KEY: &'static str = "entry_id";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::Create,
            &["list_id"],
            "lists/{list_id}/entries",
        ),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["list_id", "entry_id"],
            "lists/{list_id}/entries/{entry_id}",
        ),
        ResourcePath::new(
            HttpMethod::Post,
            ResourceOperation::List,
            &["list_id"],
            "lists/{list_id}/entries/query",
        ),
        ResourcePath::new(
            HttpMethod::Patch,
            ResourceOperation::Update,
            &["list_id", "entry_id"],
            "lists/{list_id}/entries/{entry_id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["list_id", "entry_id"],
            "lists/{list_id}/entries/{entry_id}",
        ),
    ];

    resource_accessors!();

    fn normalize(data: Value) -> Value {
        flatten_nested(data, ENTRY_VALUES_KEY)
    }

    fn create_body(params: Map<String, Value>) -> Value {
        nest_params(params, ENTRY_VALUES_KEY, PARENT_KEYS)
    }

    fn update_body(changes: Map<String, Value>) -> Value {
        nest_changes(changes, ENTRY_VALUES_KEY)
    }
}

impl Creatable for Entry {}
impl Retrievable for Entry {}
impl Listable for Entry {}
impl Updatable for Entry {}
impl Deletable for Entry {}

impl Entry {
    /// Returns the id of the record this entry belongs to.
    #[must_use]
    pub fn parent_record_id(&self) -> Option<&str> {
        self.metadata()
            .get("parent_record_id")
            .and_then(Value::as_str)
    }

    /// Returns the object of the parent record.
    #[must_use]
    pub fn parent_object(&self) -> Option<&str> {
        self.metadata().get("parent_object").and_then(Value::as_str)
    }
}
