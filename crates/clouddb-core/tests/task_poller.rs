//! Behaviour of the bounded task poller against a mock service

mod common;

use clouddb_core::{CoreError, PollPolicy, ProgressEvent, TaskCompletion, poll_task};
use common::MockDatabasesServer;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy::new(max_attempts, Duration::from_millis(5))
}

#[tokio::test]
async fn queued_then_running_then_completed() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_task_statuses("task-1", &["queued", "running", "completed"])
        .await;

    let completion = poll_task(&server.client(), "task-1", fast_policy(30), None)
        .await
        .unwrap();

    match completion {
        TaskCompletion::Completed(task) => assert_eq!(task.id, "task-1"),
        other => panic!("expected completion, got {other:?}"),
    }
    assert_eq!(server.request_count("/tasks/").await, 3);
}

#[tokio::test]
async fn already_completed_needs_one_query() {
    let server = MockDatabasesServer::start().await;
    server.mock_task_statuses("task-2", &["completed"]).await;

    let completion = poll_task(&server.client(), "task-2", fast_policy(30), None)
        .await
        .unwrap();

    assert!(matches!(completion, TaskCompletion::Completed(_)));
    assert_eq!(server.request_count("/tasks/").await, 1);
}

#[tokio::test]
async fn failed_task_is_an_error() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_task_statuses("task-3", &["running", "failed"])
        .await;

    let err = poll_task(&server.client(), "task-3", fast_policy(30), None)
        .await
        .unwrap_err();

    match err {
        CoreError::TaskFailed { task_id, message } => {
            assert_eq!(task_id, "task-3");
            assert!(message.contains("Updating allowlist"), "{message}");
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    assert_eq!(server.request_count("/tasks/").await, 2);
}

#[tokio::test]
async fn status_matching_ignores_case() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_task_statuses("task-4", &["Running", "COMPLETED"])
        .await;

    let completion = poll_task(&server.client(), "task-4", fast_policy(30), None)
        .await
        .unwrap();
    assert!(matches!(completion, TaskCompletion::Completed(_)));
}

#[tokio::test]
async fn never_finishing_task_uses_whole_budget() {
    let server = MockDatabasesServer::start().await;
    server.mock_task_statuses("task-5", &["running"]).await;

    let err = poll_task(&server.client(), "task-5", fast_policy(30), None)
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::TaskTimeout { ref task_id, attempts: 30 } if task_id == "task-5"),
        "{err:?}"
    );
    assert!(err.is_timeout());
    assert_eq!(server.request_count("/tasks/").await, 30);
}

#[tokio::test]
async fn null_task_counts_as_finished() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_json("GET", "/tasks/task-6", 200, json!({ "task": null }))
        .await;

    let completion = poll_task(&server.client(), "task-6", fast_policy(30), None)
        .await
        .unwrap();

    assert_eq!(completion, TaskCompletion::NotFound);
    assert_eq!(server.request_count("/tasks/").await, 1);
}

#[tokio::test]
async fn missing_task_counts_as_finished() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_json(
            "GET",
            "/tasks/task-7",
            404,
            json!({ "errors": "Task not found" }),
        )
        .await;

    let completion = poll_task(&server.client(), "task-7", fast_policy(30), None)
        .await
        .unwrap();
    assert_eq!(completion, TaskCompletion::NotFound);
}

#[tokio::test]
async fn unknown_status_keeps_polling() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_task_statuses("task-8", &["paused", "rebalancing", "completed"])
        .await;

    let completion = poll_task(&server.client(), "task-8", fast_policy(30), None)
        .await
        .unwrap();

    assert!(matches!(completion, TaskCompletion::Completed(_)));
    assert_eq!(server.request_count("/tasks/").await, 3);
}

#[tokio::test]
async fn empty_task_id_issues_no_request() {
    let server = MockDatabasesServer::start().await;

    let err = poll_task(&server.client(), "", fast_policy(30), None)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(server.request_count("/").await, 0);
}

#[tokio::test]
async fn server_error_propagates_immediately() {
    let server = MockDatabasesServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-9"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server.server)
        .await;

    let err = poll_task(&server.client(), "task-9", fast_policy(30), None)
        .await
        .unwrap_err();

    assert!(err.is_server_error(), "{err:?}");
    assert_eq!(server.request_count("/tasks/").await, 1);
}

#[tokio::test]
async fn no_sleep_after_last_attempt() {
    let server = MockDatabasesServer::start().await;
    server.mock_task_statuses("task-10", &["running"]).await;

    let policy = PollPolicy::new(1, Duration::from_secs(30));
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        poll_task(&server.client(), "task-10", policy, None),
    )
    .await
    .expect("single attempt must not sleep");

    assert!(matches!(result, Err(CoreError::TaskTimeout { attempts: 1, .. })));
}

#[tokio::test]
async fn progress_events_are_reported_in_order() {
    let server = MockDatabasesServer::start().await;
    server
        .mock_task_statuses("task-11", &["queued", "completed"])
        .await;

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    poll_task(
        &server.client(),
        "task-11",
        fast_policy(30),
        Some(Box::new(move |event| sink.lock().unwrap().push(event))),
    )
    .await
    .unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], ProgressEvent::Started { .. }));
    assert!(matches!(events[1], ProgressEvent::Polling { attempt: 1, .. }));
    assert!(matches!(events[2], ProgressEvent::Polling { attempt: 2, .. }));
    assert!(matches!(events[3], ProgressEvent::Completed { .. }));
}

#[tokio::test]
async fn timeout_reports_timed_out_event() {
    let server = MockDatabasesServer::start().await;
    server.mock_task_statuses("task-12", &["queued"]).await;

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _ = poll_task(
        &server.client(),
        "task-12",
        fast_policy(3),
        Some(Box::new(move |event| sink.lock().unwrap().push(event))),
    )
    .await;

    let events = events.lock().unwrap();
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::TimedOut { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn null_status_keeps_polling() {
    let server = MockDatabasesServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-null"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"task": {"id": "task-null", "status": null}})),
        )
        .up_to_n_times(2)
        .mount(&server.server)
        .await;
    server.mock_task_statuses("task-null", &["completed"]).await;

    let completion = poll_task(&server.client(), "task-null", fast_policy(30), None)
        .await
        .unwrap();

    assert!(matches!(completion, TaskCompletion::Completed(_)));
    assert_eq!(server.request_count("/tasks/").await, 3);
}
