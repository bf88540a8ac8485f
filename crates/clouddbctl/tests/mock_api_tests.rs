//! End-to-end runs of the binary against a mock control-plane API

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEPLOYMENT_ID: &str = "dep-1";

/// Temp config with a single no-auth profile pointed at `server`
fn config_for(server: &MockServer) -> TempDir {
    let dir = TempDir::new().unwrap();
    let content = format!(
        r#"
default_profile = "mock"

[profiles.mock]
auth_type = "noauth"
service_url = "{}"
deployment_id = "{}"
replica_id = "replica-1"
"#,
        server.uri(),
        DEPLOYMENT_ID
    );
    std::fs::write(dir.path().join("config.toml"), content).unwrap();
    dir
}

/// Run the binary on a blocking thread so the mock server keeps serving
async fn run(dir: &TempDir, args: &[&str]) -> assert_cmd::assert::Assert {
    let config = dir.path().join("config.toml");
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        Command::cargo_bin("clouddbctl")
            .unwrap()
            .env_remove("CLOUDDBCTL_PROFILE")
            .env_remove("DEPLOYMENT_ID")
            .arg("--config-file")
            .arg(config)
            .args(args)
            .assert()
    })
    .await
    .unwrap()
}

fn task_body(task_id: &str, status: &str) -> Value {
    json!({
        "task": {
            "id": task_id,
            "description": "Updating allowlist",
            "status": status,
            "deployment_id": DEPLOYMENT_ID,
            "progress_percent": 50,
            "created_at": "2026-01-01T00:00:00Z"
        }
    })
}

async fn mount_task(server: &MockServer, task_id: &str, status: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/tasks/{task_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_body(task_id, status)))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn allowlist_get_prints_entries_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/deployments/{DEPLOYMENT_ID}/allowlists/ip_addresses"
        )))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(json!({
                    "ip_addresses": [
                        {"address": "172.16.0.0/16", "description": "Dev IP space 3"}
                    ]
                })),
        )
        .mount(&server)
        .await;
    let dir = config_for(&server);

    run(&dir, &["allowlist", "get", "-o", "json"])
        .await
        .success()
        .stdout(predicate::str::contains("172.16.0.0/16"))
        .stdout(predicate::str::contains("Dev IP space 3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn allowlist_get_applies_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!(
            "/deployments/{DEPLOYMENT_ID}/allowlists/ip_addresses"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip_addresses": [
                {"address": "10.0.0.1", "description": "a"},
                {"address": "10.0.0.2", "description": "b"}
            ]
        })))
        .mount(&server)
        .await;
    let dir = config_for(&server);

    run(&dir, &["allowlist", "get", "-o", "json", "-q", "length(ip_addresses)"])
        .await
        .success()
        .stdout(predicate::str::diff("2\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn allowlist_add_without_wait_prints_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/deployments/{DEPLOYMENT_ID}/allowlists/ip_addresses"
        )))
        .and(body_json(json!({
            "ip_address": {"address": "172.16.0.0/16", "description": "Dev IP space 3"}
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(task_body("task-1", "queued")))
        .expect(1)
        .mount(&server)
        .await;
    let dir = config_for(&server);

    run(
        &dir,
        &[
            "allowlist",
            "add",
            "172.16.0.0/16",
            "--description",
            "Dev IP space 3",
        ],
    )
    .await
    .success()
    .stdout(predicate::str::contains("Task ID: task-1"))
    .stdout(predicate::str::contains("clouddbctl task wait task-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn allowlist_add_with_wait_polls_until_completed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/deployments/{DEPLOYMENT_ID}/allowlists/ip_addresses"
        )))
        .respond_with(ResponseTemplate::new(202).set_body_json(task_body("task-2", "queued")))
        .mount(&server)
        .await;
    mount_task(&server, "task-2", "completed").await;
    let dir = config_for(&server);

    run(
        &dir,
        &[
            "allowlist",
            "add",
            "172.16.0.0/16",
            "--wait",
            "--wait-interval",
            "0",
        ],
    )
    .await
    .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn task_wait_reports_failure() {
    let server = MockServer::start().await;
    mount_task(&server, "task-3", "failed").await;
    let dir = config_for(&server);

    run(&dir, &["task", "wait", "task-3", "--interval", "0"])
        .await
        .failure()
        .code(1)
        .stderr(predicate::str::contains("task-3"))
        .stderr(predicate::str::contains("failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn task_wait_gives_up_after_attempts() {
    let server = MockServer::start().await;
    mount_task(&server, "task-4", "running").await;
    let dir = config_for(&server);

    run(
        &dir,
        &["task", "wait", "task-4", "--attempts", "3", "--interval", "0"],
    )
    .await
    .failure()
    .code(1)
    .stderr(predicate::str::contains("3 status checks"));

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn task_wait_treats_unknown_task_as_finished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks/task-5"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"errors": "Not found"})))
        .mount(&server)
        .await;
    let dir = config_for(&server);

    run(&dir, &["task", "wait", "task-5", "--interval", "0"])
        .await
        .success()
        .stdout(predicate::str::contains("no longer tracked"));
}

#[tokio::test(flavor = "multi_thread")]
async fn api_get_passes_path_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deployables"))
        .and(header("user-agent", concat!("clouddbctl/", env!("CARGO_PKG_VERSION"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deployables": [{"type": "postgresql", "versions": []}]
        })))
        .mount(&server)
        .await;
    let dir = config_for(&server);

    run(&dir, &["api", "get", "deployables"])
        .await
        .success()
        .stdout(predicate::str::contains("postgresql"));
}

#[tokio::test(flavor = "multi_thread")]
async fn api_error_exits_with_code_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deployments/nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"errors": "Deployment not found"})),
        )
        .mount(&server)
        .await;
    let dir = config_for(&server);

    run(&dir, &["api", "get", "/deployments/nope"])
        .await
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Deployment not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn environment_and_credentials_file_configure_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/deployments/env-dep/allowlists/ip_addresses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip_addresses": [{"address": "192.168.0.1", "description": "from env"}]
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("cloud_databases_v5.env"),
        format!(
            "CLOUD_DATABASES_URL={}\nCLOUD_DATABASES_AUTH_TYPE=noauth\n",
            server.uri()
        ),
    )
    .unwrap();
    let home_path = home.path().to_path_buf();

    let assert = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("clouddbctl")
            .unwrap()
            .current_dir(&home_path)
            .env("HOME", &home_path)
            .env("XDG_CONFIG_HOME", home_path.join(".config"))
            .env("DEPLOYMENT_ID", "env-dep")
            .env_remove("CLOUDDBCTL_PROFILE")
            .env_remove("CLOUDDBCTL_CONFIG_FILE")
            .env_remove("IBM_CREDENTIALS_FILE")
            .env_remove("CLOUD_DATABASES_URL")
            .env_remove("CLOUD_DATABASES_AUTH_TYPE")
            .args(["allowlist", "get", "-o", "json"])
            .assert()
    })
    .await
    .unwrap();

    assert
        .success()
        .stdout(predicate::str::contains("192.168.0.1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn backup_start_wait_accepts_response_without_task() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/deployments/{DEPLOYMENT_ID}/backups")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let dir = config_for(&server);

    run(&dir, &["backup", "start", "--wait", "--wait-interval", "0"])
        .await
        .success()
        .stdout(predicate::str::contains("On-demand backup started"))
        .stdout(predicate::str::contains("nothing to wait for"));

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/tasks/")));
}
