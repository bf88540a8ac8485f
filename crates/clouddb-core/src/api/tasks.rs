//! Asynchronous tasks
//!
//! Every mutating call returns a task that must be polled until it reaches
//! a terminal state. See [`crate::progress::poll_task`].

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a server-side task
///
/// Values outside the documented four are preserved verbatim in `Other`.
/// A `null` status reads as `Queued`, the same as a missing one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum TaskStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl TaskStatus {
    /// `completed` or `failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Other(s) => s,
        }
    }
}

impl From<Option<String>> for TaskStatus {
    fn from(s: Option<String>) -> Self {
        s.map(TaskStatus::from).unwrap_or_default()
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "queued" => TaskStatus::Queued,
            "running" => TaskStatus::Running,
            "completed" => TaskStatus::Completed,
            "failed" => TaskStatus::Failed,
            _ => TaskStatus::Other(s),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        TaskStatus::from(s.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server-side asynchronous operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// `{"task": {...}}`, returned by every mutating call and by `GET /tasks/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResponse {
    #[serde(default)]
    pub task: Option<Task>,
}

impl TaskResponse {
    /// Non-empty task id, if the service returned one
    pub fn task_id(&self) -> Option<&str> {
        self.task
            .as_ref()
            .map(|t| t.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// `{"tasks": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tasks {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Task lookups
pub struct TaskHandler {
    client: CloudDatabasesClient,
}

impl TaskHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    /// `GET /tasks/{task_id}`
    ///
    /// The service answers with a null `task` (or 404) once a finished
    /// task has been purged; both surface as `Ok(None)`.
    pub async fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        let path = format!("/tasks/{}", encode_segment(task_id));
        match self.client.get::<TaskResponse>(&path).await {
            Ok(response) => Ok(response.task),
            Err(CloudError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
