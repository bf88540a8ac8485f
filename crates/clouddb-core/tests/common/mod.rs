//! Shared mock-server helpers for integration tests

#![allow(dead_code)]

use clouddb_core::api::{Authenticator, CloudDatabasesClient};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DEPLOYMENT_ID: &str = "test-deployment";

/// Wrapper around a wiremock server speaking the control-plane API
pub struct MockDatabasesServer {
    pub server: MockServer,
}

impl MockDatabasesServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client pointed at the mock server, without authentication
    pub fn client(&self) -> CloudDatabasesClient {
        CloudDatabasesClient::builder()
            .service_url(self.uri())
            .authenticator(Authenticator::NoAuth)
            .build()
            .expect("mock client")
    }

    /// Answer successive `GET /tasks/{id}` calls with `statuses` in order;
    /// the last status repeats forever
    pub async fn mock_task_statuses(&self, task_id: &str, statuses: &[&str]) {
        let (last, head) = statuses.split_last().expect("at least one status");
        for status in head {
            Mock::given(method("GET"))
                .and(path(format!("/tasks/{task_id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(task_body(task_id, status)))
                .up_to_n_times(1)
                .mount(&self.server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path(format!("/tasks/{task_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_body(task_id, last)))
            .mount(&self.server)
            .await;
    }

    /// Mount a fixed response for one method and path
    pub async fn mock_json(&self, http_method: &str, url_path: &str, status: u16, body: Value) {
        Mock::given(method(http_method))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Number of requests received whose path starts with `prefix`
    pub async fn request_count(&self, prefix: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path().starts_with(prefix))
            .count()
    }
}

pub fn task_body(task_id: &str, status: &str) -> Value {
    json!({
        "task": {
            "id": task_id,
            "description": "Updating allowlist",
            "status": status,
            "deployment_id": DEPLOYMENT_ID,
            "progress_percent": 50,
            "created_at": "2024-05-01T12:00:00Z"
        }
    })
}

/// Body of a 202 response for a newly created task
pub fn accepted_body(task_id: &str) -> Value {
    task_body(task_id, "queued")
}
