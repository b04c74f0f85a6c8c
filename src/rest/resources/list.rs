//! List resources.

use crate::clients::HttpMethod;
use crate::rest::{
    ApiResource, Creatable, Listable, ResourceOperation, ResourcePath, Retrievable, Updatable,
};

resource_type!(
    /// An Attio list, a curated collection of records with its own attributes.
    List
);

impl ApiResource for List {
    const NAME: &'static str = "List";
    const ID_KEY: &'static str = "list_id";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "lists"),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["list_id"],
            "lists/{list_id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::List, &[], "lists"),
        ResourcePath::new(
            HttpMethod::Patch,
            ResourceOperation::Update,
            &["list_id"],
            "lists/{list_id}",
        ),
    ];

    resource_accessors!();
}

impl Creatable for List {}
impl Retrievable for List {}
impl Listable for List {}
impl Updatable for List {}

impl List {
    /// Returns the API slug.
    #[must_use]
    pub fn api_slug(&self) -> Option<&str> {
        self.get_str("api_slug")
    }

    /// Returns the list name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }
}
