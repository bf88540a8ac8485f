//! Submit-and-wait flows: a mutating call followed by task polling

mod common;

use clouddb_core::api::AllowlistEntry;
use clouddb_core::workflows;
use clouddb_core::{CoreError, PollPolicy, TaskCompletion};
use common::{DEPLOYMENT_ID, MockDatabasesServer, accepted_body};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const ALLOWLIST_PATH: &str = "/deployments/test-deployment/allowlists/ip_addresses";

fn policy() -> PollPolicy {
    PollPolicy::new(30, Duration::from_millis(5))
}

#[tokio::test]
async fn add_allowlist_entry_then_wait_for_completion() {
    let server = MockDatabasesServer::start().await;
    Mock::given(method("POST"))
        .and(path(ALLOWLIST_PATH))
        .and(body_json(json!({
            "ip_address": {"address": "172.16.0.0/16", "description": "Dev IP space 3"}
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(accepted_body("task-add")))
        .expect(1)
        .mount(&server.server)
        .await;
    server
        .mock_task_statuses("task-add", &["queued", "running", "completed"])
        .await;

    let completion = workflows::add_allowlist_entry_and_wait(
        &server.client(),
        DEPLOYMENT_ID,
        &AllowlistEntry::new("172.16.0.0/16", "Dev IP space 3"),
        policy(),
        None,
    )
    .await
    .unwrap();

    let task = completion.task().expect("completed task");
    assert_eq!(task.id, "task-add");
    assert_eq!(server.request_count("/tasks/").await, 3);
}

#[tokio::test]
async fn delete_entry_whose_task_is_purged() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_json(
            "DELETE",
            &format!("{ALLOWLIST_PATH}/172.16.0.0%2F16"),
            202,
            accepted_body("task-del"),
        )
        .await;
    server
        .mock_json("GET", "/tasks/task-del", 200, json!({"task": null}))
        .await;

    let completion = workflows::delete_allowlist_entry_and_wait(
        &server.client(),
        DEPLOYMENT_ID,
        "172.16.0.0/16",
        policy(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(completion, TaskCompletion::NotFound);
}

#[tokio::test]
async fn missing_task_id_fails_without_polling() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_json("POST", ALLOWLIST_PATH, 202, json!({"task": {"id": ""}}))
        .await;

    let err = workflows::add_allowlist_entry_and_wait(
        &server.client(),
        DEPLOYMENT_ID,
        &AllowlistEntry::new("10.0.0.1", "single host"),
        policy(),
        None,
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, CoreError::TaskFailed { ref message, .. } if message == "No task ID returned")
    );
    assert_eq!(server.request_count("/tasks/").await, 0);
}

#[tokio::test]
async fn rejected_submission_is_not_polled() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_json(
            "POST",
            ALLOWLIST_PATH,
            400,
            json!({"errors": "invalid CIDR"}),
        )
        .await;

    let err = workflows::add_allowlist_entry_and_wait(
        &server.client(),
        DEPLOYMENT_ID,
        &AllowlistEntry::new("not-an-ip", ""),
        policy(),
        None,
    )
    .await
    .unwrap_err();

    assert!(err.is_bad_request());
    assert_eq!(server.request_count("/tasks/").await, 0);
}

#[tokio::test]
async fn empty_scaling_request_is_rejected_locally() {
    let server = MockDatabasesServer::start().await;

    let err = workflows::set_scaling_group_and_wait(
        &server.client(),
        DEPLOYMENT_ID,
        "member",
        &Default::default(),
        policy(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(server.request_count("/").await, 0);
}

#[tokio::test]
async fn user_creation_failure_surfaces_task_error() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_json(
            "POST",
            "/deployments/test-deployment/users/database",
            202,
            accepted_body("task-user"),
        )
        .await;
    server
        .mock_task_statuses("task-user", &["running", "failed"])
        .await;

    let err = workflows::create_user_and_wait(
        &server.client(),
        DEPLOYMENT_ID,
        clouddb_core::api::UserType::Database,
        &clouddb_core::api::CreateUserRequest::new("app", "long-enough-pass"),
        policy(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::TaskFailed { ref task_id, .. } if task_id == "task-user"));
}

#[tokio::test]
async fn backup_accepted_without_task_needs_no_polling() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_json("POST", "/deployments/test-deployment/backups", 200, json!({}))
        .await;

    let completion =
        workflows::start_backup_and_wait(&server.client(), DEPLOYMENT_ID, policy(), None)
            .await
            .unwrap();

    assert_eq!(completion, TaskCompletion::NoTask);
    assert!(completion.task().is_none());
    assert_eq!(server.request_count("/tasks/").await, 0);
}

#[tokio::test]
async fn backup_with_task_is_polled() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_json(
            "POST",
            "/deployments/test-deployment/backups",
            200,
            accepted_body("task-backup"),
        )
        .await;
    server
        .mock_task_statuses("task-backup", &["running", "completed"])
        .await;

    let completion =
        workflows::start_backup_and_wait(&server.client(), DEPLOYMENT_ID, policy(), None)
            .await
            .unwrap();

    assert_eq!(completion.task().map(|t| t.id.as_str()), Some("task-backup"));
    assert_eq!(server.request_count("/tasks/").await, 2);
}
