//! `--wait` handling for mutating commands
//!
//! Wraps the core task poller with a spinner and CLI output.

use std::time::Duration;

use clouddb_core::api::{Task, TaskResponse, TaskStatus};
use clouddb_core::{
    CloudDatabasesClient, PollPolicy, ProgressCallback, ProgressEvent, TaskCompletion,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::cli::{OutputFormat, WaitArgs};
use crate::error::Result as CliResult;
use crate::output;

use super::utils::print_result;

/// Print the task a mutating call returned, or wait for it when `--wait` is set
pub async fn handle_task_response(
    client: &CloudDatabasesClient,
    response: TaskResponse,
    wait: &WaitArgs,
    output_format: OutputFormat,
    query: Option<&str>,
    success_message: &str,
) -> CliResult<()> {
    if wait.wait {
        let completion = clouddb_core::workflows::wait_for_response(
            client,
            &response,
            wait.policy(),
            response.task_id().map(spinner_callback),
        )
        .await?;
        return print_completion(&completion, output_format, query, success_message);
    }

    match output_format {
        OutputFormat::Auto | OutputFormat::Table => {
            println!("{}", success_message);
            if let Some(task_id) = response.task_id() {
                println!("Task ID: {}", task_id);
                println!("To wait for completion, run: clouddbctl task wait {}", task_id);
            }
            Ok(())
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            print_result(&response, output_format, output::OutputFormat::Json, query)
        }
    }
}

/// Like [`handle_task_response`] for calls the service may accept without a task
pub async fn handle_optional_task_response(
    client: &CloudDatabasesClient,
    response: TaskResponse,
    wait: &WaitArgs,
    output_format: OutputFormat,
    query: Option<&str>,
    success_message: &str,
) -> CliResult<()> {
    if response.task_id().is_some() {
        return handle_task_response(client, response, wait, output_format, query, success_message)
            .await;
    }

    debug!("No task returned; nothing to wait for");
    print_completion(&TaskCompletion::NoTask, output_format, query, success_message)
}

/// Poll a task by id until it finishes
pub async fn wait_for_task(
    client: &CloudDatabasesClient,
    task_id: &str,
    policy: PollPolicy,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    debug!(task_id, attempts = policy.max_attempts, "Waiting for task");
    let completion =
        clouddb_core::poll_task(client, task_id, policy, Some(spinner_callback(task_id))).await?;
    print_completion(
        &completion,
        output_format,
        query,
        &format!("Task {} finished", task_id),
    )
}

fn spinner_callback(task_id: &str) -> ProgressCallback {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Waiting for task {}", task_id));

    Box::new(move |event: ProgressEvent| match &event {
        ProgressEvent::Started { task_id } => {
            pb.set_message(format!("Task {} started", task_id));
        }
        ProgressEvent::Polling {
            task_id,
            status,
            progress_percent,
            ..
        } => {
            let progress = progress_percent
                .map(|p| format!(" ({}%)", p))
                .unwrap_or_default();
            pb.set_message(format!(
                "Task {}: {}{}",
                task_id,
                format_task_state(status),
                progress
            ));
        }
        ProgressEvent::Completed { task_id } => {
            pb.finish_with_message(format!(
                "Task {}: {}",
                task_id,
                format_task_state(&TaskStatus::Completed)
            ));
        }
        ProgressEvent::Failed { task_id, error } => {
            pb.finish_with_message(format!("Task {} failed: {}", task_id, error));
        }
        ProgressEvent::TimedOut { task_id, attempts } => {
            pb.abandon_with_message(format!(
                "Task {} still running after {} checks",
                task_id, attempts
            ));
        }
    })
}

fn print_completion(
    completion: &TaskCompletion,
    output_format: OutputFormat,
    query: Option<&str>,
    success_message: &str,
) -> CliResult<()> {
    match (completion, output_format) {
        (TaskCompletion::Completed(task), OutputFormat::Auto | OutputFormat::Table) => {
            println!("{}", success_message);
            print_task_details(task);
            Ok(())
        }
        (TaskCompletion::NotFound, OutputFormat::Auto | OutputFormat::Table) => {
            println!("{}", success_message);
            println!("Task is no longer tracked by the service; it has finished.");
            Ok(())
        }
        (TaskCompletion::NoTask, OutputFormat::Auto | OutputFormat::Table) => {
            println!("{}", success_message);
            println!("No task was started; nothing to wait for.");
            Ok(())
        }
        (TaskCompletion::Completed(task), _) => {
            print_result(task, output_format, output::OutputFormat::Json, query)
        }
        (TaskCompletion::NotFound, _) => print_result(
            serde_json::json!({ "task": null, "status": "not_found" }),
            output_format,
            output::OutputFormat::Json,
            query,
        ),
        (TaskCompletion::NoTask, _) => print_result(
            serde_json::json!({ "task": null, "status": "accepted" }),
            output_format,
            output::OutputFormat::Json,
            query,
        ),
    }
}

/// Format task state for display with status icons
pub fn format_task_state(status: &TaskStatus) -> String {
    match status {
        TaskStatus::Completed => format!("\u{2713} {}", status),
        TaskStatus::Failed => format!("\u{2717} {}", status),
        TaskStatus::Running => format!("\u{21bb} {}", status),
        TaskStatus::Queued => format!("\u{2026} {}", status),
        TaskStatus::Other(_) => status.to_string(),
    }
}

fn print_task_details(task: &Task) {
    println!("\nTask Details:");
    println!("-------------");
    println!("ID: {}", task.id);
    println!("Status: {}", format_task_state(&task.status));
    if let Some(description) = &task.description {
        println!("Description: {}", description);
    }
    if let Some(progress) = task.progress_percent {
        println!("Progress: {}%", progress);
    }
    if let Some(created) = &task.created_at {
        println!("Created: {}", super::utils::format_timestamp(created));
    }
}
