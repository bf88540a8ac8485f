//! Deployment command implementations

use crate::cli::{DeploymentCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output;
use clouddb_core::api::DeploymentHandler;
use serde_json::json;
use tracing::debug;

use super::utils::{ensure_confirmed, format_timestamp, print_result, read_json_data};
use super::wait::handle_task_response;

pub async fn handle_deployment_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &DeploymentCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = DeploymentHandler::new(client.clone());

    match command {
        DeploymentCommands::Get { target } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let deployment = handler.get_deployment_info(&ctx.deployment_id).await?;
            print_result(&deployment, output_format, output::OutputFormat::Table, query)
        }
        DeploymentCommands::Tasks { target } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let tasks = handler.list_deployment_tasks(&ctx.deployment_id).await?;
            if output_format == OutputFormat::Auto && query.is_none() {
                let rows: Vec<_> = tasks
                    .tasks
                    .iter()
                    .map(|t| {
                        json!({
                            "id": t.id,
                            "status": t.status,
                            "progress": t.progress_percent,
                            "description": t.description,
                            "created": t.created_at.as_deref().map(format_timestamp),
                        })
                    })
                    .collect();
                return print_result(rows, output_format, output::OutputFormat::Table, None);
            }
            print_result(&tasks, output_format, output::OutputFormat::Table, query)
        }
        DeploymentCommands::Configure { data, target, wait } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let configuration = read_json_data(data)?;
            debug!("Updating configuration: {}", configuration);
            let response = handler
                .update_database_configuration(&ctx.deployment_id, &configuration)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                "Configuration update requested",
            )
            .await
        }
        DeploymentCommands::KillConnections {
            force,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            ensure_confirmed(
                *force,
                &format!("Terminate all connections to {}?", ctx.deployment_id),
            )?;
            let response = handler.kill_connections(&ctx.deployment_id).await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                "Connection termination requested",
            )
            .await
        }
        DeploymentCommands::Pitr { target } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let pitr = handler.get_pitr_data(&ctx.deployment_id).await?;
            print_result(&pitr, output_format, output::OutputFormat::Json, query)
        }
    }
}
