//! Integration tests for cursor pagination.
//!
//! Covers the page-following state machine across GET list endpoints
//! (cursor in the query string) and POST query endpoints (cursor in the
//! JSON body), in both callback and stream form.

use attio::rest::resources::{Note, Person, Task};
use attio::rest::{Listable, PathIds, ResourceError};
use attio::{ApiKey, AttioConfig, BaseUrl, RestClient};
use futures::{StreamExt, TryStreamExt};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a REST client pointed at the mock server.
fn client_for(server: &MockServer) -> RestClient {
    let config = AttioConfig::builder()
        .api_key(ApiKey::new("test-key").unwrap())
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .build()
        .unwrap();
    RestClient::new(&config).unwrap()
}

fn task(id: &str) -> Value {
    json!({
        "id": {"workspace_id": "ws_1", "task_id": id},
        "content_plaintext": format!("Task {id}"),
        "is_completed": false
    })
}

fn page(ids: &[&str], next_cursor: Option<&str>) -> Value {
    let data: Vec<Value> = ids.iter().map(|id| task(id)).collect();
    json!({
        "data": data,
        "pagination": {
            "has_next_page": next_cursor.is_some(),
            "next_cursor": next_cursor
        }
    })
}

/// Mounts three task pages: t1,t2 -> t3,t4 -> t5.
///
/// Cursor-specific mocks are mounted first so the first-page mock only
/// answers requests without a cursor.
async fn mount_three_task_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["t3", "t4"], Some("c3"))))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .and(query_param("cursor", "c3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["t5"], None)))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["t1", "t2"], Some("c2"))))
        .expect(1)
        .mount(server)
        .await;
}

fn task_ids<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<String> {
    tasks
        .into_iter()
        .filter_map(|task| task.id_str("task_id"))
        .collect()
}

#[tokio::test]
async fn test_auto_paging_each_fetches_each_following_page_once() {
    let server = MockServer::start().await;
    mount_three_task_pages(&server).await;
    let client = client_for(&server);

    let first = Task::list(&client, &PathIds::new(), Some(json!({"limit": 2})))
        .await
        .unwrap();
    assert_eq!(first.len(), 2);
    assert!(first.has_next_page());
    assert_eq!(first.next_cursor(), Some("c2"));

    let mut seen = Vec::new();
    first
        .auto_paging_each(&client, |task| seen.push(task.id_str("task_id").unwrap()))
        .await
        .unwrap();

    assert_eq!(seen, vec!["t1", "t2", "t3", "t4", "t5"]);
}

#[tokio::test]
async fn test_each_streams_items_in_server_order() {
    let server = MockServer::start().await;
    mount_three_task_pages(&server).await;
    let client = client_for(&server);

    let tasks: Vec<Task> = Task::each(&client, &PathIds::new(), Some(json!({"limit": 2})))
        .try_collect()
        .await
        .unwrap();

    assert_eq!(task_ids(&tasks), vec!["t1", "t2", "t3", "t4", "t5"]);
}

#[tokio::test]
async fn test_each_page_yields_every_page() {
    let server = MockServer::start().await;
    mount_three_task_pages(&server).await;
    let client = client_for(&server);

    let sizes: Vec<usize> = Task::each_page(&client, &PathIds::new(), Some(json!({"limit": 2})))
        .map_ok(|page| page.len())
        .try_collect()
        .await
        .unwrap();

    assert_eq!(sizes, vec![2, 2, 1]);
}

#[tokio::test]
async fn test_dropping_the_stream_stops_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["t3"], None)))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["t1", "t2"], Some("c2"))))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let first_two: Vec<Task> = Task::each(&client, &PathIds::new(), None)
        .take(2)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(task_ids(&first_two), vec!["t1", "t2"]);
}

#[tokio::test]
async fn test_missing_pagination_means_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": {"workspace_id": "ws_1", "note_id": "n1"}, "title": "Kickoff"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let notes = Note::list(&client, &PathIds::new(), None).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert!(!notes.has_next_page());
    assert!(!notes.has_previous_page());
    assert!(notes.next_page(&client).await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_page_terminates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "pagination": {"has_next_page": false}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let tasks: Vec<Task> = Task::each(&client, &PathIds::new(), None)
        .try_collect()
        .await
        .unwrap();
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn test_has_next_page_without_cursor_is_treated_as_last() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [task("t1")],
            "pagination": {"has_next_page": true}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let first = Task::list(&client, &PathIds::new(), None).await.unwrap();
    assert!(first.has_next_page());
    assert!(first.next_request().is_none());

    let mut count = 0;
    first
        .auto_paging_each(&client, |_| count += 1)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_query_endpoint_sends_cursor_in_body() {
    let server = MockServer::start().await;
    let person = |id: &str| {
        json!({
            "id": {"workspace_id": "ws_1", "object_id": "obj_people", "record_id": id},
            "values": {}
        })
    };
    Mock::given(method("POST"))
        .and(path("/v2/objects/people/records/query"))
        .and(body_string_contains(r#""cursor":"p2""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [person("r3")],
            "pagination": {"has_next_page": false}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/objects/people/records/query"))
        .and(body_string_contains(r#""limit":2"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [person("r1"), person("r2")],
            "pagination": {"has_next_page": true, "next_cursor": "p2"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let people: Vec<Person> = Person::each(&client, &PathIds::new(), Some(json!({"limit": 2})))
        .try_collect()
        .await
        .unwrap();

    let ids: Vec<String> = people
        .iter()
        .filter_map(|person| person.id_str("record_id"))
        .collect();
    assert_eq!(ids, vec!["r1", "r2", "r3"]);
}

#[tokio::test]
async fn test_error_mid_stream_surfaces_after_earlier_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .and(query_param("cursor", "c2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(&["t1"], Some("c2"))))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let results: Vec<Result<Task, ResourceError>> =
        Task::each(&client, &PathIds::new(), None).collect().await;

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(
        results[1],
        Err(ResourceError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_invalid_params_surface_as_first_item() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let results: Vec<Result<Task, ResourceError>> =
        Task::each(&client, &PathIds::new(), Some(json!("limit=2")))
            .collect()
            .await;

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(ResourceError::InvalidArgument { .. })));
}
