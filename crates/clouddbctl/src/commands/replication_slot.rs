use crate::cli::{OutputFormat, ReplicationSlotCommands};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use clouddb_core::api::{LogicalReplicationSlot, ReplicationSlotHandler};

use super::wait::handle_task_response;

pub async fn handle_replication_slot_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &ReplicationSlotCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = ReplicationSlotHandler::new(client.clone());

    match command {
        ReplicationSlotCommands::Create {
            name,
            database,
            plugin_type,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let slot = LogicalReplicationSlot {
                plugin_type: plugin_type.clone(),
                ..LogicalReplicationSlot::new(name.as_str(), database.as_str())
            };
            let response = handler
                .create_logical_replication_slot(&ctx.deployment_id, &slot)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Creating replication slot {} on {}", name, database),
            )
            .await
        }
        ReplicationSlotCommands::Delete { name, target, wait } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let response = handler
                .delete_logical_replication_slot(&ctx.deployment_id, name)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Deleting replication slot {}", name),
            )
            .await
        }
    }
}
