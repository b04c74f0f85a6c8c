//! Workspace member resources (read-only).

use crate::clients::HttpMethod;
use crate::rest::{ApiResource, Listable, ResourceOperation, ResourcePath, Retrievable};

resource_type!(
    /// A member of the Attio workspace.
    WorkspaceMember
);

impl ApiResource for WorkspaceMember {
    const NAME: &'static str = "WorkspaceMember";
    const ID_KEY: &'static str = "workspace_member_id";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["workspace_member_id"],
            "workspace_members/{workspace_member_id}",
        ),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::List,
            &[],
            "workspace_members",
        ),
    ];

    resource_accessors!();
}

impl Retrievable for WorkspaceMember {}
impl Listable for WorkspaceMember {}

impl WorkspaceMember {
    /// Returns the member's email address.
    #[must_use]
    pub fn email_address(&self) -> Option<&str> {
        self.get_str("email_address")
    }
}
