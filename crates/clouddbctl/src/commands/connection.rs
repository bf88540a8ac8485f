use crate::cli::{ConnectionCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output;
use clouddb_core::api::{CompleteConnectionRequest, ConnectionHandler};

use super::utils::print_result;

pub async fn handle_connection_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &ConnectionCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let handler = ConnectionHandler::new(conn_mgr.create_client(profile_name)?);

    // Connection documents are nested per engine; JSON reads better than a table.
    match command {
        ConnectionCommands::Get {
            user_id,
            user_type,
            endpoint,
            certificate_root,
            target,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let response = handler
                .get_connection(
                    &ctx.deployment_id,
                    *user_type,
                    user_id,
                    *endpoint,
                    certificate_root.as_deref(),
                )
                .await?;
            print_result(
                &response.connection,
                output_format,
                output::OutputFormat::Json,
                query,
            )
        }
        ConnectionCommands::Complete {
            user_id,
            user_type,
            endpoint,
            password,
            certificate_root,
            target,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let request = CompleteConnectionRequest {
                password: password.clone(),
                certificate_root: certificate_root.clone(),
            };
            let response = handler
                .complete_connection(&ctx.deployment_id, *user_type, user_id, *endpoint, &request)
                .await?;
            print_result(
                &response.connection,
                output_format,
                output::OutputFormat::Json,
                query,
            )
        }
    }
}
