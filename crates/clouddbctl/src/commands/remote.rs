use crate::cli::{OutputFormat, RemoteCommands};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output;
use clouddb_core::api::RemoteHandler;

use super::utils::{ensure_confirmed, print_result};
use super::wait::handle_task_response;

pub async fn handle_remote_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &RemoteCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = RemoteHandler::new(client.clone());

    match command {
        RemoteCommands::List { target } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let remotes = handler.list_remotes(&ctx.deployment_id).await?;
            print_result(
                &remotes.remotes,
                output_format,
                output::OutputFormat::Table,
                query,
            )
        }
        RemoteCommands::Resync { replica, wait } => {
            let replica_id = conn_mgr.replica_id(replica.as_deref(), profile_name)?;
            let response = handler.resync_replica(&replica_id).await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Resyncing replica {}", replica_id),
            )
            .await
        }
        RemoteCommands::Promote {
            replica,
            skip_initial_backup,
            force,
            wait,
        } => {
            let replica_id = conn_mgr.replica_id(replica.as_deref(), profile_name)?;
            ensure_confirmed(
                *force,
                &format!(
                    "Promote {} to a standalone deployment? This cannot be undone.",
                    replica_id
                ),
            )?;
            let response = handler
                .promote_read_only_replica(&replica_id, *skip_initial_backup)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Promoting replica {}", replica_id),
            )
            .await
        }
    }
}
