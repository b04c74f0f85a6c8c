//! Record resources.
//!
//! A record is one row of an Attio object (people, companies, deals, or a
//! custom object). On the wire its attribute values live under `values`;
//! locally each attribute slug is a top-level tracked attribute, so
//! `record.get("name")` returns the raw value array Attio sent.
//!
//! [`Record`] works with any object given its slug in the scope. [`Person`],
//! [`Company`], and [`Deal`] are records bound to the standard objects.
//!
//! # Example
//!
//! ```rust,ignore
//! use attio::rest::{Creatable, PathIds, Updatable};
//! use attio::rest::resources::{Person, Record};
//! use serde_json::json;
//!
//! let mut person = Person::fetch(&client, "b3c7...").await?;
//! person.set("job_title", json!("Head of Sales"))?;
//! person.save(&client).await?;
//!
//! let invoice = Record::create(&client, &PathIds::object("invoices"), json!({
//!     "amount": 1200,
//! })).await?;
//! ```

use serde_json::{Map, Value};

use crate::clients::{HttpMethod, RestClient};
use crate::rest::{
    ApiResource, Creatable, Deletable, Listable, PathIds, ResourceError, ResourceOperation,
    ResourcePath, Retrievable, Updatable,
};

use super::{flatten_nested, nest_changes, nest_params};

const VALUES_KEY: &str = "values";

const RECORD_PATHS: &[ResourcePath] = &[
    ResourcePath::new(
        HttpMethod::Post,
        ResourceOperation::Create,
        &["object_id"],
        "objects/{object_id}/records",
    ),
    ResourcePath::new(
        HttpMethod::Get,
        ResourceOperation::Retrieve,
        &["object_id", "record_id"],
        "objects/{object_id}/records/{record_id}",
    ),
    ResourcePath::new(
        HttpMethod::Post,
        ResourceOperation::List,
        &["object_id"],
        "objects/{object_id}/records/query",
    ),
    ResourcePath::new(
        HttpMethod::Patch,
        ResourceOperation::Update,
        &["object_id", "record_id"],
        "objects/{object_id}/records/{record_id}",
    ),
    ResourcePath::new(
        HttpMethod::Delete,
        ResourceOperation::Delete,
        &["object_id", "record_id"],
        "objects/{object_id}/records/{record_id}",
    ),
];

resource_type!(
    /// A record of any Attio object.
    ///
    /// Scope calls with [`PathIds::object`]; the object slug or id is required
    /// by every record path.
    Record
);

impl ApiResource for Record {
    const NAME: &'static str = "Record";
    const ID_KEY: &'static str = "record_id";
    const PATHS: &'static [ResourcePath] = RECORD_PATHS;

    resource_accessors!();

    fn normalize(data: Value) -> Value {
        flatten_nested(data, VALUES_KEY)
    }

    fn create_body(params: Map<String, Value>) -> Value {
        nest_params(params, VALUES_KEY, &[])
    }

    fn update_body(changes: Map<String, Value>) -> Value {
        nest_changes(changes, VALUES_KEY)
    }
}

impl Creatable for Record {}
impl Retrievable for Record {}
impl Listable for Record {}
impl Updatable for Record {}
impl Deletable for Record {}

impl Record {
    /// Returns the object this record belongs to, as a slug or id.
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.scope().get("object_id")
    }

    /// Returns the Attio web URL, if the server sent one.
    #[must_use]
    pub fn web_url(&self) -> Option<&str> {
        self.metadata().get("web_url").and_then(Value::as_str)
    }
}

/// Declares a record type bound to one standard object.
macro_rules! typed_record {
    ($(#[$meta:meta])* $name:ident, $object:literal) => {
        resource_type!($(#[$meta])* $name);

        impl ApiResource for $name {
            const NAME: &'static str = stringify!($name);
            const ID_KEY: &'static str = "record_id";
            const PATHS: &'static [ResourcePath] = RECORD_PATHS;

            resource_accessors!();

            fn base_ids() -> PathIds {
                PathIds::object($object)
            }

            fn normalize(data: Value) -> Value {
                flatten_nested(data, VALUES_KEY)
            }

            fn create_body(params: Map<String, Value>) -> Value {
                nest_params(params, VALUES_KEY, &[])
            }

            fn update_body(changes: Map<String, Value>) -> Value {
                nest_changes(changes, VALUES_KEY)
            }
        }

        impl Creatable for $name {}
        impl Retrievable for $name {}
        impl Listable for $name {}
        impl Updatable for $name {}
        impl Deletable for $name {}

        impl $name {
            /// The object slug this type is bound to.
            pub const OBJECT: &'static str = $object;

            /// Retrieves a record of this object by id.
            ///
            /// # Errors
            ///
            /// Returns the errors of [`Retrievable::retrieve`].
            pub async fn fetch(client: &RestClient, id: &str) -> Result<Self, ResourceError> {
                Self::retrieve(client, &PathIds::new(), id).await
            }

            /// Returns the Attio web URL, if the server sent one.
            #[must_use]
            pub fn web_url(&self) -> Option<&str> {
                self.metadata().get("web_url").and_then(Value::as_str)
            }
        }
    };
}

typed_record!(
    /// A record of the standard `people` object.
    Person,
    "people"
);

typed_record!(
    /// A record of the standard `companies` object.
    Company,
    "companies"
);

typed_record!(
    /// A record of the standard `deals` object.
    Deal,
    "deals"
);

impl Person {
    /// Returns the email addresses stored in `email_addresses`.
    #[must_use]
    pub fn email_addresses(&self) -> Vec<&str> {
        value_fields(self.get("email_addresses"), "email_address")
    }

    /// Returns the full name from the active `name` value.
    #[must_use]
    pub fn full_name(&self) -> Option<&str> {
        first_value(self.get("name"))
            .and_then(|name| name.get("full_name"))
            .and_then(Value::as_str)
    }
}

impl Company {
    /// Returns the domains stored in `domains`.
    #[must_use]
    pub fn domains(&self) -> Vec<&str> {
        value_fields(self.get("domains"), "domain")
    }

    /// Returns the company name from the active `name` value.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        first_value(self.get("name"))
            .and_then(|name| name.get("value"))
            .and_then(Value::as_str)
    }
}

/// Returns the first element of an attribute value array.
fn first_value(attribute: Option<&Value>) -> Option<&Value> {
    attribute.and_then(Value::as_array).and_then(|values| values.first())
}

/// Collects `field` from every element of an attribute value array.
fn value_fields<'a>(attribute: Option<&'a Value>, field: &str) -> Vec<&'a str> {
    attribute
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|value| value.get(field).and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}
