//! Comment resources, posted on threads attached to records and entries.

use crate::clients::HttpMethod;
use crate::rest::{
    ApiResource, Creatable, Deletable, ResourceOperation, ResourcePath, Retrievable,
};

resource_type!(
    /// A comment in a thread.
    Comment
);

impl ApiResource for Comment {
    const NAME: &'static str = "Comment";
    const ID_KEY: &'static str = "comment_id";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "comments"),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["comment_id"],
            "comments/{comment_id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["comment_id"],
            "comments/{comment_id}",
        ),
    ];

    resource_accessors!();
}

impl Creatable for Comment {}
impl Retrievable for Comment {}
impl Deletable for Comment {}
