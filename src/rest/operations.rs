//! CRUD capabilities layered onto [`ApiResource`] types.
//!
//! Each resource opts into the operations its endpoint supports by
//! implementing the matching marker trait; the behaviour itself lives in the
//! default methods here. Every operation resolves its path from the
//! resource's path table, sends the request through a [`RestClient`], and
//! maps failures onto [`ResourceError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use attio::rest::{Creatable, Deletable, PathIds, Updatable};
//! use attio::rest::resources::Task;
//! use serde_json::json;
//!
//! let mut task = Task::create(&client, &PathIds::new(), json!({
//!     "content": "Follow up with Acme",
//!     "format": "plaintext",
//! })).await?;
//!
//! task.set("is_completed", json!(true))?;
//! task.save(&client).await?; // PATCH with only `is_completed`
//!
//! task.destroy(&client).await?;
//! assert!(task.is_deleted());
//! ```

#![allow(async_fn_in_trait)]

use futures::stream::Stream;
use serde_json::{Map, Value};

use crate::clients::RestClient;
use crate::rest::list::{flatten_pages, page_stream};
use crate::rest::resource::{resolve_path, send, unwrap_data};
use crate::rest::{ApiResource, ListObject, ListRequest, PathIds, ResourceError, ResourceOperation};

// ============================================================================
// Create
// ============================================================================

/// Resources that can be created with `POST`.
pub trait Creatable: ApiResource {
    /// Creates a resource on the server and returns it fully populated.
    ///
    /// `scope` supplies parent ids (e.g., [`PathIds::object`]); `params` is
    /// the attribute mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] if `params` is not a JSON
    /// object, or the mapped API error.
    async fn create(
        client: &RestClient,
        scope: &PathIds,
        params: Value,
    ) -> Result<Self, ResourceError> {
        let Value::Object(params) = params else {
            return Err(ResourceError::invalid_argument(
                "params must be a key-value mapping",
            ));
        };

        let ids = Self::base_ids().merged(scope);
        let (method, path) = resolve_path::<Self>(ResourceOperation::Create, &ids)?;
        tracing::debug!(resource = Self::NAME, %path, "creating resource");

        let response = send::<Self>(
            client,
            method,
            &path,
            Some(Self::create_body(params)),
            None,
            None,
        )
        .await?;
        Self::from_response(response.body, &ids)
    }
}

// ============================================================================
// Retrieve
// ============================================================================

/// Resources that can be fetched by id.
pub trait Retrievable: ApiResource {
    /// Fetches a single resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] for a blank `id`,
    /// [`ResourceError::NotFound`] if it does not exist, or another mapped
    /// API error.
    async fn retrieve(
        client: &RestClient,
        scope: &PathIds,
        id: &str,
    ) -> Result<Self, ResourceError> {
        let id = require_id(id)?;
        let scope = Self::base_ids().merged(scope);
        let ids = scope.clone().with(Self::ID_KEY, id);
        let (method, path) = resolve_path::<Self>(ResourceOperation::Retrieve, &ids)?;

        let response = send::<Self>(client, method, &path, None, None, Some(id)).await?;
        Self::from_response(response.body, &scope)
    }

    /// Re-fetches this resource, discarding local changes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidOperation`] if the resource has no id
    /// or was deleted, or the mapped API error.
    async fn refresh(&mut self, client: &RestClient) -> Result<(), ResourceError> {
        if self.resource().is_deleted() {
            return Err(ResourceError::invalid_operation(
                "cannot refresh a deleted resource",
            ));
        }
        let id = self.own_id().ok_or_else(|| {
            ResourceError::invalid_operation("cannot refresh a resource without an id")
        })?;
        let (method, path) = resolve_path::<Self>(ResourceOperation::Retrieve, &self.path_ids())?;

        let response = send::<Self>(client, method, &path, None, None, Some(&id)).await?;
        let data = unwrap_data::<Self>(response.body)?;
        self.resource_mut().update_from(Self::normalize(data))
    }
}

// ============================================================================
// List
// ============================================================================

/// Resources that can be listed page by page.
pub trait Listable: ApiResource {
    /// Fetches the first page.
    ///
    /// `params` (filters, `limit`, sorts) are sent as query parameters for
    /// `GET` endpoints and as the JSON body for `POST .../query` endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] if `params` is not a JSON
    /// object, or the mapped API error.
    async fn list(
        client: &RestClient,
        scope: &PathIds,
        params: Option<Value>,
    ) -> Result<ListObject<Self>, ResourceError> {
        list_request::<Self>(scope, params)?.fetch(client).await
    }

    /// Streams every page, starting from the first.
    ///
    /// Each call starts a fresh traversal. Pages are fetched lazily; dropping
    /// the stream stops further requests. Invalid `params` surface as the
    /// first item.
    fn each_page<'a>(
        client: &'a RestClient,
        scope: &PathIds,
        params: Option<Value>,
    ) -> impl Stream<Item = Result<ListObject<Self>, ResourceError>> + 'a {
        page_stream::<Self>(client, Some(list_request::<Self>(scope, params)))
    }

    /// Streams every item across all pages, in server order.
    fn each<'a>(
        client: &'a RestClient,
        scope: &PathIds,
        params: Option<Value>,
    ) -> impl Stream<Item = Result<Self, ResourceError>> + 'a {
        flatten_pages(Self::each_page(client, scope, params))
    }
}

// ============================================================================
// Update
// ============================================================================

/// Resources that can be partially updated with `PATCH`.
///
/// Requires [`Creatable`] so [`save`](Self::save) can persist new instances.
pub trait Updatable: Creatable {
    /// Updates a resource by id without fetching it first.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] for a blank `id` or
    /// non-object `params`, or the mapped API error.
    async fn update(
        client: &RestClient,
        scope: &PathIds,
        id: &str,
        params: Value,
    ) -> Result<Self, ResourceError> {
        let id = require_id(id)?;
        let Value::Object(params) = params else {
            return Err(ResourceError::invalid_argument(
                "params must be a key-value mapping",
            ));
        };
        let scope = Self::base_ids().merged(scope);
        let ids = scope.clone().with(Self::ID_KEY, id);
        let (method, path) = resolve_path::<Self>(ResourceOperation::Update, &ids)?;

        let response = send::<Self>(
            client,
            method,
            &path,
            Some(Self::update_body(params)),
            None,
            Some(id),
        )
        .await?;
        Self::from_response(response.body, &scope)
    }

    /// Sends local changes of an existing resource.
    ///
    /// Only changed attributes are sent. With no changes, every attribute is
    /// sent. On success the resource is re-synced from the response.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidOperation`] if the resource has no id
    /// or was deleted, or the mapped API error.
    async fn persist(&mut self, client: &RestClient) -> Result<(), ResourceError> {
        if self.resource().is_deleted() {
            return Err(ResourceError::invalid_operation(
                "cannot update a deleted resource",
            ));
        }
        let id = self.own_id().ok_or_else(|| {
            ResourceError::invalid_operation("cannot update a resource without an id")
        })?;
        let (method, path) = resolve_path::<Self>(ResourceOperation::Update, &self.path_ids())?;

        let mut changes = self.resource().changed_attributes();
        if changes.is_empty() {
            changes = self.resource().attributes().clone();
        }
        tracing::debug!(
            resource = Self::NAME,
            id = %id,
            changed = changes.len(),
            "updating resource"
        );

        let response = send::<Self>(
            client,
            method,
            &path,
            Some(Self::update_body(changes)),
            None,
            Some(&id),
        )
        .await?;
        let data = unwrap_data::<Self>(response.body)?;
        self.resource_mut().update_from(Self::normalize(data))
    }

    /// Creates the resource if it is new, otherwise persists its changes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidOperation`] for deleted resources, or
    /// the mapped API error.
    async fn save(&mut self, client: &RestClient) -> Result<(), ResourceError> {
        if self.resource().is_deleted() {
            return Err(ResourceError::invalid_operation(
                "cannot save a deleted resource",
            ));
        }
        if !self.resource().is_new() {
            return self.persist(client).await;
        }

        let attributes = Value::Object(self.resource().attributes().clone());
        let created = Self::create(client, &self.path_ids(), attributes).await?;
        *self = created;
        Ok(())
    }
}

// ============================================================================
// Delete
// ============================================================================

/// Resources that can be deleted.
pub trait Deletable: ApiResource {
    /// Deletes a resource by id.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] for a blank `id`, or the
    /// mapped API error.
    async fn delete(client: &RestClient, scope: &PathIds, id: &str) -> Result<bool, ResourceError> {
        let id = require_id(id)?;
        let ids = Self::base_ids().merged(scope).with(Self::ID_KEY, id);
        let (method, path) = resolve_path::<Self>(ResourceOperation::Delete, &ids)?;

        send::<Self>(client, method, &path, None, None, Some(id)).await?;
        Ok(true)
    }

    /// Deletes this resource and freezes the instance.
    ///
    /// After success every mutation on the instance returns
    /// [`ResourceError::InvalidOperation`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidOperation`] if the resource has no id
    /// or was already deleted, or the mapped API error.
    async fn destroy(&mut self, client: &RestClient) -> Result<bool, ResourceError> {
        if self.resource().is_deleted() {
            return Err(ResourceError::invalid_operation(
                "resource has already been deleted",
            ));
        }
        let id = self.own_id().ok_or_else(|| {
            ResourceError::invalid_operation("cannot delete a resource without an id")
        })?;
        let (method, path) = resolve_path::<Self>(ResourceOperation::Delete, &self.path_ids())?;

        send::<Self>(client, method, &path, None, None, Some(&id)).await?;
        tracing::debug!(resource = Self::NAME, id = %id, "resource deleted");
        self.resource_mut().mark_deleted();
        Ok(true)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn require_id(id: &str) -> Result<&str, ResourceError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ResourceError::invalid_argument("id must not be empty"));
    }
    Ok(trimmed)
}

/// Builds the first-page request for a list call.
pub(crate) fn list_request<T: ApiResource>(
    scope: &PathIds,
    params: Option<Value>,
) -> Result<ListRequest, ResourceError> {
    let params = match params {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(ResourceError::invalid_argument(
                "params must be a key-value mapping",
            ))
        }
    };
    let ids = T::base_ids().merged(scope);
    let (method, path) = resolve_path::<T>(ResourceOperation::List, &ids)?;
    Ok(ListRequest::new(method, path, params, ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::HttpMethod;
    use crate::rest::{Resource, ResourcePath};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget(Resource);

    impl ApiResource for Widget {
        const NAME: &'static str = "Widget";
        const ID_KEY: &'static str = "widget_id";
        const PATHS: &'static [ResourcePath] = &[
            ResourcePath::new(
                HttpMethod::Get,
                ResourceOperation::List,
                &["shelf_id"],
                "shelves/{shelf_id}/widgets",
            ),
            ResourcePath::new(
                HttpMethod::Post,
                ResourceOperation::List,
                &["shelf_id", "filter"],
                "shelves/{shelf_id}/widgets/query",
            ),
        ];

        fn from_resource(resource: Resource) -> Self {
            Self(resource)
        }
        fn resource(&self) -> &Resource {
            &self.0
        }
        fn resource_mut(&mut self) -> &mut Resource {
            &mut self.0
        }
    }

    #[test]
    fn test_require_id_rejects_blank() {
        assert!(matches!(
            require_id("  "),
            Err(ResourceError::InvalidArgument { .. })
        ));
        assert_eq!(require_id(" w_1 ").unwrap(), "w_1");
    }

    #[test]
    fn test_list_request_resolves_scope_and_params() {
        let request =
            list_request::<Widget>(&PathIds::new().with("shelf_id", "s1"), Some(json!({"limit": 5})))
                .unwrap();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.path(), "shelves/s1/widgets");
        assert_eq!(request.params().get("limit"), Some(&json!(5)));
    }

    #[test]
    fn test_list_request_rejects_non_mapping_params() {
        let result = list_request::<Widget>(&PathIds::new().with("shelf_id", "s1"), Some(json!([1])));
        assert!(matches!(result, Err(ResourceError::InvalidArgument { .. })));
    }

    #[test]
    fn test_list_request_without_scope_fails_path_resolution() {
        let result = list_request::<Widget>(&PathIds::new(), None);
        assert!(matches!(
            result,
            Err(ResourceError::PathResolutionFailed { operation: "list", .. })
        ));
    }
}
