//! Integration tests for the resource CRUD operations.
//!
//! Every test runs against a local mock of the Attio API and checks both
//! the request that goes out and the state of the resource afterwards.

use attio::rest::resources::{Note, Person, Task};
use attio::rest::{
    ApiResource, Creatable, Deletable, Lifecycle, PathIds, ResourceError, Retrievable, Updatable,
};
use attio::{ApiKey, AttioConfig, BaseUrl, RestClient};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
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

fn person_data(job_title: &str) -> Value {
    json!({
        "id": {"workspace_id": "ws_1", "object_id": "obj_people", "record_id": "rec_1"},
        "created_at": "2024-05-01T10:00:00.000000000Z",
        "web_url": "https://app.attio.com/acme/person/rec_1",
        "values": {
            "name": [{"full_name": "Ada Lovelace"}],
            "job_title": [{"value": job_title}]
        }
    })
}

fn task_data(is_completed: bool) -> Value {
    json!({
        "id": {"workspace_id": "ws_1", "task_id": "task_1"},
        "created_at": "2024-05-01T10:00:00.000000000Z",
        "content_plaintext": "Call Acme",
        "is_completed": is_completed,
        "deadline_at": null
    })
}

// ============================================================================
// Create / retrieve
// ============================================================================

#[tokio::test]
async fn test_create_wraps_values_and_returns_synced_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/objects/people/records"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_json(json!({
            "data": {"values": {"email_addresses": ["ada@example.com"]}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": person_data("Engineer")})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let person = Person::create(
        &client,
        &PathIds::new(),
        json!({"email_addresses": ["ada@example.com"]}),
    )
    .await
    .unwrap();

    assert_eq!(person.id_str("record_id").as_deref(), Some("rec_1"));
    assert_eq!(person.full_name(), Some("Ada Lovelace"));
    assert!(!person.is_new());
    assert!(!person.is_changed());
    assert!(person.created_at().is_some());
}

#[tokio::test]
async fn test_create_rejects_non_object_params_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = Task::create(&client, &PathIds::new(), json!(["not", "a", "map"])).await;
    assert!(matches!(result, Err(ResourceError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_retrieve_with_blank_id_is_invalid_argument() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let result = Person::retrieve(&client, &PathIds::new(), "   ").await;
    assert!(matches!(result, Err(ResourceError::InvalidArgument { .. })));
}

#[tokio::test]
async fn test_retrieve_missing_record_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/objects/people/records/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status_code": 404,
            "type": "invalid_request_error",
            "code": "not_found",
            "message": "Record with ID \"missing\" not found."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    match Person::fetch(&client, "missing").await {
        Err(ResourceError::NotFound { resource, id, .. }) => {
            assert_eq!(resource, "Person");
            assert_eq!(id.as_deref(), Some("missing"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_save_sends_only_changed_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/objects/people/records/rec_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": person_data("Engineer")})))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v2/objects/obj_people/records/rec_1"))
        .and(body_json(json!({"data": {"values": {"job_title": "CTO"}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": person_data("CTO")})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut person = Person::fetch(&client, "rec_1").await.unwrap();
    person.set("job_title", json!("CTO")).unwrap();
    assert!(person.is_changed());

    person.save(&client).await.unwrap();

    assert!(!person.is_changed());
    assert_eq!(person.get("job_title"), Some(&json!([{"value": "CTO"}])));
    assert_eq!(person.full_name(), Some("Ada Lovelace"));
}

#[tokio::test]
async fn test_update_by_id_without_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v2/tasks/task_1"))
        .and(body_json(json!({"data": {"is_completed": true}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": task_data(true)})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let task = Task::update(&client, &PathIds::new(), "task_1", json!({"is_completed": true}))
        .await
        .unwrap();
    assert!(task.is_completed());
}

#[tokio::test]
async fn test_save_new_resource_creates_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/tasks"))
        .and(body_json(json!({"data": {"content": "Call Acme", "format": "plaintext"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": task_data(false)})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut task = Task::with_attributes(json!({"content": "Call Acme", "format": "plaintext"})).unwrap();
    assert!(task.is_new());

    task.save(&client).await.unwrap();

    assert!(!task.is_new());
    assert_eq!(task.id_str("task_id").as_deref(), Some("task_1"));
    assert!(!task.is_changed());
}

#[tokio::test]
async fn test_persist_without_id_is_invalid_operation() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let mut task = Task::new();
    task.set("is_completed", json!(true)).unwrap();
    assert!(matches!(
        task.persist(&client).await,
        Err(ResourceError::InvalidOperation { .. })
    ));
}

#[tokio::test]
async fn test_unprocessable_update_keeps_local_changes() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v2/tasks/task_1"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status_code": 422,
            "type": "invalid_request_error",
            "code": "validation_type",
            "message": "Deadline must be an ISO 8601 timestamp"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut task = Task::from_data(task_data(false), &PathIds::new()).unwrap();
    task.set("deadline_at", json!("tomorrow")).unwrap();

    let error = task.save(&client).await.unwrap_err();
    assert!(matches!(error, ResourceError::Unprocessable { .. }));
    assert!(task.is_changed());
    assert_eq!(task.get("deadline_at"), Some(&json!("tomorrow")));
}

#[tokio::test]
async fn test_rate_limited_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks/task_1"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "2")
                .set_body_json(json!({"message": "Rate limit exceeded"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = Task::retrieve(&client, &PathIds::new(), "task_1")
        .await
        .unwrap_err();
    match error {
        ResourceError::RateLimited { retry_after, .. } => assert_eq!(retry_after, Some(2.0)),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_destroy_freezes_the_instance() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/tasks/task_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut task = Task::from_data(task_data(false), &PathIds::new()).unwrap();

    assert!(task.destroy(&client).await.unwrap());
    assert_eq!(task.lifecycle(), Lifecycle::Deleted);

    assert!(matches!(
        task.set("is_completed", json!(true)),
        Err(ResourceError::InvalidOperation { .. })
    ));
    assert!(matches!(
        task.save(&client).await,
        Err(ResourceError::InvalidOperation { .. })
    ));
    assert!(matches!(
        task.destroy(&client).await,
        Err(ResourceError::InvalidOperation { .. })
    ));
}

#[tokio::test]
async fn test_destroy_without_id_is_invalid_operation() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut task = Task::new();

    assert!(matches!(
        task.destroy(&client).await,
        Err(ResourceError::InvalidOperation { .. })
    ));
    assert!(task.is_new());
    assert_eq!(task.lifecycle(), Lifecycle::Active);
}

#[tokio::test]
async fn test_delete_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v2/notes/note_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(Note::delete(&client, &PathIds::new(), "note_1").await.unwrap());
}

#[tokio::test]
async fn test_refresh_discards_local_changes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/tasks/task_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": task_data(true)})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut task = Task::from_data(task_data(false), &PathIds::new()).unwrap();
    task.set("content_plaintext", json!("Local edit")).unwrap();

    task.refresh(&client).await.unwrap();

    assert!(!task.is_changed());
    assert!(task.is_completed());
    assert_eq!(task.get_str("content_plaintext"), Some("Call Acme"));
}
