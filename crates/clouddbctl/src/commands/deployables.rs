use crate::cli::{DeployablesCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output;
use clouddb_core::api::DeployablesHandler;
use serde_json::json;

use super::utils::print_result;

pub async fn handle_deployables_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &DeployablesCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let handler = DeployablesHandler::new(conn_mgr.create_client(profile_name)?);

    match command {
        DeployablesCommands::List => {
            let deployables = handler.list_deployables().await?;
            if output_format == OutputFormat::Auto && query.is_none() {
                let rows: Vec<_> = deployables
                    .deployables
                    .iter()
                    .flat_map(|d| {
                        d.versions.iter().map(move |v| {
                            json!({
                                "type": d.deployable_type,
                                "version": v.version,
                                "status": v.status,
                                "preferred": v.is_preferred,
                            })
                        })
                    })
                    .collect();
                return print_result(rows, output_format, output::OutputFormat::Table, None);
            }
            print_result(&deployables, output_format, output::OutputFormat::Json, query)
        }
        DeployablesCommands::Regions => {
            let regions = handler.list_regions().await?;
            if output_format == OutputFormat::Auto && query.is_none() {
                return print_result(
                    &regions.regions,
                    output_format,
                    output::OutputFormat::Table,
                    None,
                );
            }
            print_result(&regions, output_format, output::OutputFormat::Json, query)
        }
        DeployablesCommands::Groups {
            deployable_type,
            host_flavor,
        } => {
            let groups = handler
                .get_default_scaling_groups(deployable_type, host_flavor.as_deref())
                .await?;
            print_result(&groups, output_format, output::OutputFormat::Json, query)
        }
    }
}
