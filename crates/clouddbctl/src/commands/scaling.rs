use crate::cli::{OutputFormat, ScalingCommands};
use crate::connection::ConnectionManager;
use crate::error::{CtlError, Result as CliResult};
use crate::output;
use clouddb_core::api::scaling::GroupResource;
use clouddb_core::api::{ScalingHandler, ScalingRequest};
use serde_json::{Value, json};

use super::utils::print_result;
use super::wait::handle_task_response;

pub async fn handle_scaling_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &ScalingCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = ScalingHandler::new(client.clone());

    match command {
        ScalingCommands::List { target } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let groups = handler
                .list_deployment_scaling_groups(&ctx.deployment_id)
                .await?;
            if output_format == OutputFormat::Auto && query.is_none() {
                let rows: Vec<_> = groups
                    .groups
                    .iter()
                    .map(|g| {
                        json!({
                            "group": g.id,
                            "members": summarize(g.members.as_ref(), false),
                            "memory": summarize(g.memory.as_ref(), true),
                            "cpu": summarize(g.cpu.as_ref(), false),
                            "disk": summarize(g.disk.as_ref(), true),
                            "host_flavor": g.host_flavor.as_ref().map(|f| f.id.clone()),
                        })
                    })
                    .collect();
                return print_result(rows, output_format, output::OutputFormat::Table, None);
            }
            print_result(&groups, output_format, output::OutputFormat::Json, query)
        }
        ScalingCommands::Set {
            group_id,
            members,
            memory_mb,
            cpu_count,
            disk_mb,
            host_flavor,
            target,
            wait,
        } => {
            let request = ScalingRequest {
                members: *members,
                memory_mb: *memory_mb,
                cpu_count: *cpu_count,
                disk_mb: *disk_mb,
                host_flavor: host_flavor.clone(),
            };
            if request.is_empty() {
                return Err(CtlError::InvalidInput {
                    message: "Specify at least one of --members, --memory-mb, --cpu-count, --disk-mb or --host-flavor".to_string(),
                });
            }
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let response = handler
                .set_deployment_scaling_group(&ctx.deployment_id, group_id, &request)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Scaling group {}", group_id),
            )
            .await
        }
    }
}

/// `allocation (min-max, step)` for one resource dimension
fn summarize(resource: Option<&GroupResource>, in_mb: bool) -> Value {
    let Some(r) = resource else {
        return Value::Null;
    };
    let (allocation, min, max, step) = if in_mb {
        (r.allocation_mb, r.minimum_mb, r.maximum_mb, r.step_size_mb)
    } else {
        (
            r.allocation_count,
            r.minimum_count,
            r.maximum_count,
            r.step_size_count,
        )
    };
    let Some(allocation) = allocation else {
        return Value::Null;
    };
    let unit = if in_mb { " MB" } else { "" };
    match (min, max, step) {
        (Some(min), Some(max), Some(step)) => json!(format!(
            "{}{} ({}-{}, step {})",
            allocation, unit, min, max, step
        )),
        _ => json!(format!("{}{}", allocation, unit)),
    }
}
