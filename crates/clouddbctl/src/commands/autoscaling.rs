use crate::cli::{AutoscalingCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::{CtlError, Result as CliResult};
use crate::output;
use clouddb_core::api::{AutoscalingGroup, AutoscalingHandler};
use serde_json::Value;

use super::utils::{print_result, read_json_data};
use super::wait::handle_task_response;

pub async fn handle_autoscaling_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &AutoscalingCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = AutoscalingHandler::new(client.clone());

    match command {
        AutoscalingCommands::Get { group_id, target } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let rules = handler
                .get_autoscaling_conditions(&ctx.deployment_id, group_id)
                .await?;
            print_result(&rules, output_format, output::OutputFormat::Json, query)
        }
        AutoscalingCommands::Set {
            group_id,
            data,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let rules = parse_rules(read_json_data(data)?)?;
            let response = handler
                .set_autoscaling_conditions(&ctx.deployment_id, group_id, &rules)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Updating autoscaling rules for group {}", group_id),
            )
            .await
        }
    }
}

/// Accept the rules bare or wrapped in `{"autoscaling": ...}`
fn parse_rules(value: Value) -> CliResult<AutoscalingGroup> {
    let rules = match value {
        Value::Object(mut obj) if obj.contains_key("autoscaling") => {
            obj.remove("autoscaling").unwrap_or(Value::Null)
        }
        other => other,
    };
    let rules: AutoscalingGroup =
        serde_json::from_value(rules).map_err(|e| CtlError::InvalidInput {
            message: format!("Invalid autoscaling rules: {}", e),
        })?;
    if rules == AutoscalingGroup::default() {
        return Err(CtlError::InvalidInput {
            message: "Autoscaling rules must set at least one of disk, memory or cpu".to_string(),
        });
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rules_wrapped_and_bare() {
        let bare = json!({
            "disk": {"scalers": {"capacity": {"enabled": true, "free_space_less_than_percent": 15}}}
        });
        let wrapped = json!({ "autoscaling": bare.clone() });
        assert_eq!(parse_rules(bare).unwrap(), parse_rules(wrapped).unwrap());
    }

    #[test]
    fn test_parse_rules_rejects_empty() {
        assert!(parse_rules(json!({})).is_err());
    }
}
