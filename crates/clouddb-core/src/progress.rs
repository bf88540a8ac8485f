//! Task polling for asynchronous operations
//!
//! Mutating calls return a task which must be polled until it reaches a
//! terminal state. [`poll_task`] does that under an attempt budget, with an
//! optional progress callback for UI updates.

use crate::api::{CloudDatabasesClient, Task, TaskHandler, TaskStatus};
use crate::error::{CoreError, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of status checks before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Default pause between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long to keep polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of status queries; at least one is always made
    pub max_attempts: u32,
    /// Sleep between consecutive queries
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Upper bound on time spent sleeping
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// How a polled task ended
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCompletion {
    /// Task reported `completed`
    Completed(Task),
    /// The service no longer knows the task; it finished and was purged
    NotFound,
    /// The call was accepted without starting a task, so there was nothing to poll
    NoTask,
}

impl TaskCompletion {
    pub fn task(&self) -> Option<&Task> {
        match self {
            TaskCompletion::Completed(task) => Some(task),
            TaskCompletion::NotFound | TaskCompletion::NoTask => None,
        }
    }
}

/// Progress events emitted while polling
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Polling is about to begin
    Started { task_id: String },
    /// One status query answered
    Polling {
        task_id: String,
        attempt: u32,
        status: TaskStatus,
        progress_percent: Option<i64>,
    },
    /// Task finished (or disappeared)
    Completed { task_id: String },
    /// Task reported `failed`
    Failed { task_id: String, error: String },
    /// Attempt budget exhausted
    TimedOut { task_id: String, attempts: u32 },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive a spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Poll a task until it completes, fails, disappears or the budget runs out
///
/// Each attempt issues one `GET /tasks/{id}`. Statuses other than the four
/// documented ones are logged and polling continues. The interval is only
/// slept between attempts.
///
/// # Example
///
/// ```rust,ignore
/// use clouddb_core::{PollPolicy, ProgressEvent, poll_task};
///
/// let response = handler.add_allowlist_entry(&deployment_id, &entry).await?;
/// let task_id = response.task_id().unwrap_or_default();
///
/// poll_task(
///     &client,
///     task_id,
///     PollPolicy::default(),
///     Some(Box::new(|event| {
///         if let ProgressEvent::Polling { attempt, status, .. } = event {
///             println!("#{attempt}: {status}");
///         }
///     })),
/// )
/// .await?;
/// ```
pub async fn poll_task(
    client: &CloudDatabasesClient,
    task_id: &str,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    if task_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "task id must not be empty".to_string(),
        ));
    }

    let handler = TaskHandler::new(client.clone());
    let max_attempts = policy.max_attempts.max(1);

    emit(
        &on_progress,
        ProgressEvent::Started {
            task_id: task_id.to_string(),
        },
    );

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            tokio::time::sleep(policy.interval).await;
        }

        let Some(task) = handler.get_task(task_id).await? else {
            info!(task_id, attempt, "Task no longer present, treating as completed");
            emit(
                &on_progress,
                ProgressEvent::Completed {
                    task_id: task_id.to_string(),
                },
            );
            return Ok(TaskCompletion::NotFound);
        };

        debug!(task_id, attempt, status = %task.status, "Polled task");
        emit(
            &on_progress,
            ProgressEvent::Polling {
                task_id: task_id.to_string(),
                attempt,
                status: task.status.clone(),
                progress_percent: task.progress_percent,
            },
        );

        match &task.status {
            TaskStatus::Completed => {
                info!(task_id, attempt, "Task completed");
                emit(
                    &on_progress,
                    ProgressEvent::Completed {
                        task_id: task_id.to_string(),
                    },
                );
                return Ok(TaskCompletion::Completed(task));
            }
            TaskStatus::Failed => {
                let error = task
                    .description
                    .clone()
                    .filter(|d| !d.is_empty())
                    .map(|d| format!("{d} (task {task_id})"))
                    .unwrap_or_else(|| format!("task {task_id} reported status failed"));
                emit(
                    &on_progress,
                    ProgressEvent::Failed {
                        task_id: task_id.to_string(),
                        error: error.clone(),
                    },
                );
                return Err(CoreError::TaskFailed {
                    task_id: task_id.to_string(),
                    message: error,
                });
            }
            TaskStatus::Queued | TaskStatus::Running => {}
            TaskStatus::Other(status) => {
                warn!(task_id, attempt, status = %status, "Unexpected task status, continuing to poll");
            }
        }
    }

    emit(
        &on_progress,
        ProgressEvent::TimedOut {
            task_id: task_id.to_string(),
            attempts: max_attempts,
        },
    );
    Err(CoreError::TaskTimeout {
        task_id: task_id.to_string(),
        attempts: max_attempts,
    })
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_wait(), Duration::from_secs(58));
    }

    #[test]
    fn test_max_wait_with_zero_attempts() {
        assert_eq!(
            PollPolicy::new(0, Duration::from_secs(5)).max_wait(),
            Duration::ZERO
        );
    }

    #[tokio::test]
    async fn test_empty_task_id_rejected() {
        let client = CloudDatabasesClient::builder()
            .service_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let err = poll_task(&client, "", PollPolicy::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
