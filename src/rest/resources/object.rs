//! Object resources: the schemas records belong to (people, companies, custom objects).

use crate::clients::HttpMethod;
use crate::rest::{
    ApiResource, Creatable, Listable, ResourceOperation, ResourcePath, Retrievable, Updatable,
};

resource_type!(
    /// An Attio object definition.
    Object
);

impl ApiResource for Object {
    const NAME: &'static str = "Object";
    const ID_KEY: &'static str = "object_id";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "objects"),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["object_id"],
            "objects/{object_id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::List, &[], "objects"),
        ResourcePath::new(
            HttpMethod::Patch,
            ResourceOperation::Update,
            &["object_id"],
            "objects/{object_id}",
        ),
    ];

    resource_accessors!();
}

impl Creatable for Object {}
impl Retrievable for Object {}
impl Listable for Object {}
impl Updatable for Object {}

impl Object {
    /// Returns the API slug (e.g., `"people"`).
    #[must_use]
    pub fn api_slug(&self) -> Option<&str> {
        self.get_str("api_slug")
    }
}
