use crate::cli::{OutputFormat, TaskCommands};
use crate::connection::ConnectionManager;
use crate::error::{CtlError, Result as CliResult};
use crate::output;
use clouddb_core::PollPolicy;
use clouddb_core::api::TaskHandler;
use std::time::Duration;

use super::utils::print_result;
use super::wait::wait_for_task;

pub async fn handle_task_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &TaskCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;

    match command {
        TaskCommands::Get { task_id } => {
            let task = TaskHandler::new(client).get_task(task_id).await?;
            match task {
                Some(task) => {
                    print_result(&task, output_format, output::OutputFormat::Table, query)
                }
                None => Err(CtlError::NotFound {
                    message: format!(
                        "Task {} is not known to the service (finished tasks are purged)",
                        task_id
                    ),
                }),
            }
        }
        TaskCommands::Wait {
            task_id,
            attempts,
            interval,
        } => {
            let policy = PollPolicy::new(*attempts, Duration::from_secs(*interval));
            wait_for_task(&client, task_id, policy, output_format, query).await
        }
    }
}
