//! Task resources.

use crate::clients::HttpMethod;
use crate::rest::{
    ApiResource, Creatable, Deletable, Listable, ResourceOperation, ResourcePath, Retrievable,
    Updatable,
};

resource_type!(
    /// A task, optionally linked to records and assigned to workspace members.
    Task
);

impl ApiResource for Task {
    const NAME: &'static str = "Task";
    const ID_KEY: &'static str = "task_id";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "tasks"),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["task_id"],
            "tasks/{task_id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::List, &[], "tasks"),
        ResourcePath::new(
            HttpMethod::Patch,
            ResourceOperation::Update,
            &["task_id"],
            "tasks/{task_id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["task_id"],
            "tasks/{task_id}",
        ),
    ];

    resource_accessors!();
}

impl Creatable for Task {}
impl Retrievable for Task {}
impl Listable for Task {}
impl Updatable for Task {}
impl Deletable for Task {}

impl Task {
    /// Returns `true` if the task is marked completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.get("is_completed"), Some(serde_json::Value::Bool(true)))
    }
}
