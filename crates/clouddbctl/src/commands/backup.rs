use crate::cli::{BackupCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output;
use clouddb_core::api::BackupHandler;
use serde_json::json;

use super::utils::{format_timestamp, print_result};
use super::wait::handle_optional_task_response;

pub async fn handle_backup_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &BackupCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = BackupHandler::new(client.clone());

    match command {
        BackupCommands::List { target } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let backups = handler.list_deployment_backups(&ctx.deployment_id).await?;
            if output_format == OutputFormat::Auto && query.is_none() {
                let rows: Vec<_> = backups
                    .backups
                    .iter()
                    .map(|b| {
                        json!({
                            "id": b.id,
                            "type": b.backup_type,
                            "status": b.status,
                            "restorable": b.is_restorable,
                            "created": b.created_at.as_deref().map(format_timestamp),
                        })
                    })
                    .collect();
                return print_result(rows, output_format, output::OutputFormat::Table, None);
            }
            print_result(&backups, output_format, output::OutputFormat::Json, query)
        }
        BackupCommands::Get { backup_id } => {
            let backup = handler.get_backup_info(backup_id).await?;
            print_result(&backup, output_format, output::OutputFormat::Table, query)
        }
        BackupCommands::Start { target, wait } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let response = handler.start_ondemand_backup(&ctx.deployment_id).await?;
            handle_optional_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                "On-demand backup started",
            )
            .await
        }
    }
}
