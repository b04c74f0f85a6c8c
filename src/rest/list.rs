//! Cursor-driven pagination.
//!
//! A list call returns one [`ListObject`]: the page's items, its
//! [`Pagination`] metadata, and the [`ListRequest`] that produced it. The
//! next page is the same request with `cursor` set to `next_cursor`.
//!
//! # Iteration
//!
//! ```rust,ignore
//! use attio::rest::{Listable, PathIds};
//! use attio::rest::resources::Note;
//! use futures::TryStreamExt;
//!
//! // Callback style, strictly sequential.
//! let page = Note::list(&client, &PathIds::new(), None).await?;
//! page.auto_paging_each(&client, |note| println!("{:?}", note.get("title"))).await?;
//!
//! // Stream style; dropping the stream stops fetching.
//! let notes: Vec<Note> = Note::each(&client, &PathIds::new(), None).try_collect().await?;
//! ```

use std::collections::HashMap;

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde_json::{Map, Value};

use crate::clients::{HttpMethod, RestClient};
use crate::rest::resource::send;
use crate::rest::{ApiResource, PathIds, ResourceError};

/// The query parameter (GET) or body field (POST) carrying the cursor.
pub const CURSOR_PARAM: &str = "cursor";

/// Pagination metadata of one page.
///
/// Missing keys default to `false` / `None`; the boolean flags are only true
/// for a literal JSON `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Whether the server reports a following page.
    pub has_next_page: bool,
    /// Whether the server reports a preceding page.
    pub has_previous_page: bool,
    /// Cursor for the following page.
    pub next_cursor: Option<String>,
    /// Cursor for the preceding page.
    pub previous_cursor: Option<String>,
    /// Total number of matching items, if reported.
    pub total_count: Option<u64>,
    /// Page size, if reported.
    pub page_size: Option<u64>,
}

impl Pagination {
    /// Parses the `pagination` object of a list response.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = value else {
            return Self::default();
        };
        let flag = |key: &str| matches!(map.get(key), Some(Value::Bool(true)));
        let cursor = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        Self {
            has_next_page: flag("has_next_page"),
            has_previous_page: flag("has_previous_page"),
            next_cursor: cursor("next_cursor"),
            previous_cursor: cursor("previous_cursor"),
            total_count: map.get("total_count").and_then(Value::as_u64),
            page_size: map.get("page_size").and_then(Value::as_u64),
        }
    }
}

/// The request that produced a page, replayable with another cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    method: HttpMethod,
    path: String,
    params: Map<String, Value>,
    scope: PathIds,
}

impl ListRequest {
    pub(crate) const fn new(
        method: HttpMethod,
        path: String,
        params: Map<String, Value>,
        scope: PathIds,
    ) -> Self {
        Self {
            method,
            path,
            params,
            scope,
        }
    }

    /// Returns the HTTP method (`GET`, or `POST` for query endpoints).
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the resolved request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the parameters, including the cursor once paging has started.
    #[must_use]
    pub const fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Returns the same request positioned at `cursor`.
    #[must_use]
    pub fn with_cursor(&self, cursor: &str) -> Self {
        let mut next = self.clone();
        next.params
            .insert(CURSOR_PARAM.to_string(), Value::String(cursor.to_string()));
        next
    }

    /// Fetches the page this request describes.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ResourceError`] for transport failures, or
    /// [`ResourceError::Serialization`] if `data` is not an array.
    pub async fn fetch<T: ApiResource>(
        &self,
        client: &RestClient,
    ) -> Result<ListObject<T>, ResourceError> {
        let cursor = self.params.get(CURSOR_PARAM).and_then(serde_json::Value::as_str);
        tracing::debug!(
            resource = T::NAME,
            path = %self.path,
            cursor,
            "fetching list page"
        );

        let (body, query) = if self.method.requires_body() {
            (Some(Value::Object(self.params.clone())), None)
        } else {
            (None, Some(to_query(&self.params)))
        };
        let response = send::<T>(client, self.method, &self.path, body, query, None).await?;

        ListObject::from_body(response.body, self.clone())
    }
}

/// One page of a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct ListObject<T> {
    data: Vec<T>,
    pagination: Pagination,
    request: ListRequest,
}

impl<T: ApiResource> ListObject<T> {
    /// Builds a page from a decoded list response.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Serialization`] if `data` is present but not
    /// an array of objects.
    pub fn from_body(body: Value, request: ListRequest) -> Result<Self, ResourceError> {
        let pagination = Pagination::from_value(body.get("pagination"));
        let items = match body {
            Value::Object(mut map) => map.remove("data"),
            _ => None,
        };
        let data = match items {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| T::from_data(item, &request.scope))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ResourceError::Serialization {
                    resource: T::NAME,
                    message: format!("expected 'data' to be an array, got {other}"),
                })
            }
        };

        Ok(Self {
            data,
            pagination,
            request,
        })
    }

    /// Returns the items of this page, in server order.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the page, returning its items.
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Iterates over the items of this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the first item of this page.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.data.first()
    }

    /// Returns the last item of this page.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }

    /// Returns the pagination metadata.
    #[must_use]
    pub const fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Returns the request that produced this page.
    #[must_use]
    pub const fn request(&self) -> &ListRequest {
        &self.request
    }

    /// Returns `true` if the server reports a following page.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.pagination.has_next_page
    }

    /// Returns `true` if the server reports a preceding page.
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.pagination.has_previous_page
    }

    /// Returns the cursor of the following page.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.pagination.next_cursor.as_deref()
    }

    /// Returns the request for the following page, `None` once exhausted.
    ///
    /// A page flagged `has_next_page` without a cursor is treated as the last.
    #[must_use]
    pub fn next_request(&self) -> Option<ListRequest> {
        if !self.pagination.has_next_page {
            return None;
        }
        if let Some(cursor) = self.next_cursor() {
            Some(self.request.with_cursor(cursor))
        } else {
            tracing::warn!(
                resource = T::NAME,
                path = %self.request.path,
                "has_next_page is true but no next_cursor was returned; stopping"
            );
            None
        }
    }

    fn previous_request(&self) -> Option<ListRequest> {
        if !self.pagination.has_previous_page {
            return None;
        }
        self.pagination
            .previous_cursor
            .as_deref()
            .map(|cursor| self.request.with_cursor(cursor))
    }

    /// Fetches the following page.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ResourceError`] if the fetch fails.
    pub async fn next_page(&self, client: &RestClient) -> Result<Option<Self>, ResourceError> {
        match self.next_request() {
            Some(request) => request.fetch(client).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fetches the preceding page.
    ///
    /// # Errors
    ///
    /// Returns the mapped [`ResourceError`] if the fetch fails.
    pub async fn previous_page(
        &self,
        client: &RestClient,
    ) -> Result<Option<Self>, ResourceError> {
        match self.previous_request() {
            Some(request) => request.fetch(client).await.map(Some),
            None => Ok(None),
        }
    }

    /// Passes every item of this and all following pages to `consumer`.
    ///
    /// Pages are fetched one at a time, each only after every item of the
    /// previous page has been handed over. Over `k` pages this issues `k - 1`
    /// requests.
    ///
    /// # Errors
    ///
    /// Returns the first fetch error; items already passed stay consumed.
    pub async fn auto_paging_each<F>(
        self,
        client: &RestClient,
        mut consumer: F,
    ) -> Result<(), ResourceError>
    where
        F: FnMut(T),
    {
        let mut page = self;
        loop {
            let next = page.next_request();
            page.data.into_iter().for_each(&mut consumer);
            match next {
                Some(request) => page = request.fetch(client).await?,
                None => return Ok(()),
            }
        }
    }

    /// Streams this page followed by every following page.
    pub fn pages(
        self,
        client: &RestClient,
    ) -> impl Stream<Item = Result<Self, ResourceError>> + '_ {
        let next = self.next_request().map(Ok);
        stream::once(futures::future::ready(Ok(self))).chain(page_stream::<T>(client, next))
    }

    /// Streams every item of this and all following pages.
    pub fn items(self, client: &RestClient) -> impl Stream<Item = Result<T, ResourceError>> + '_ {
        flatten_pages(self.pages(client))
    }
}

impl<'a, T> IntoIterator for &'a ListObject<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

/// Streams pages starting from `start`, following `next_cursor`.
pub(crate) fn page_stream<T: ApiResource>(
    client: &RestClient,
    start: Option<Result<ListRequest, ResourceError>>,
) -> impl Stream<Item = Result<ListObject<T>, ResourceError>> + '_ {
    stream::try_unfold(start, move |state| async move {
        let Some(request) = state else {
            return Ok::<_, ResourceError>(None);
        };
        let page = request?.fetch::<T>(client).await?;
        let following = page.next_request().map(Ok);
        Ok::<_, ResourceError>(Some((page, following)))
    })
}

/// Flattens a page stream into an item stream.
pub(crate) fn flatten_pages<T, S>(pages: S) -> impl Stream<Item = Result<T, ResourceError>>
where
    T: ApiResource,
    S: Stream<Item = Result<ListObject<T>, ResourceError>>,
{
    pages
        .map_ok(|page| stream::iter(page.into_data().into_iter().map(Ok)))
        .try_flatten()
}

/// Converts list parameters into query-string pairs.
fn to_query(params: &Map<String, Value>) -> HashMap<String, String> {
    let mut query = HashMap::new();

    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::String(s) => {
                query.insert(key.clone(), s.clone());
            }
            Value::Number(n) => {
                query.insert(key.clone(), n.to_string());
            }
            Value::Bool(b) => {
                query.insert(key.clone(), b.to_string());
            }
            Value::Array(arr) => {
                let values: Vec<String> = arr
                    .iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect();
                if !values.is_empty() {
                    query.insert(key.clone(), values.join(","));
                }
            }
            Value::Object(_) => {
                query.insert(key.clone(), value.to_string());
            }
        }
    }

    query
}
