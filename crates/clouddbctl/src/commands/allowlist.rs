//! Allowlist command implementations

use crate::cli::{AllowlistCommands, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::{CtlError, Result as CliResult};
use crate::output;
use clouddb_core::api::{AllowlistEntry, AllowlistHandler};
use serde_json::{Value, json};

use super::utils::{print_result, read_json_data};
use super::wait::handle_task_response;

pub async fn handle_allowlist_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &AllowlistCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = AllowlistHandler::new(client.clone());

    match command {
        AllowlistCommands::Get { target } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let allowlist = handler.get_allowlist(&ctx.deployment_id).await?;

            if output_format == OutputFormat::Auto && query.is_none() {
                print_result(
                    &allowlist.ip_addresses,
                    output_format,
                    output::OutputFormat::Table,
                    None,
                )?;
                if let Some(etag) = &allowlist.etag {
                    println!("ETag: {}", etag);
                }
                return Ok(());
            }

            let data = json!({
                "ip_addresses": allowlist.ip_addresses,
                "etag": allowlist.etag,
            });
            print_result(data, output_format, output::OutputFormat::Json, query)
        }
        AllowlistCommands::Add {
            address,
            description,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let entry = AllowlistEntry::new(address.as_str(), description.as_str());
            let response = handler
                .add_allowlist_entry(&ctx.deployment_id, &entry)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Adding {} to the allowlist", address),
            )
            .await
        }
        AllowlistCommands::Delete {
            address,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let response = handler
                .delete_allowlist_entry(&ctx.deployment_id, address)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Removing {} from the allowlist", address),
            )
            .await
        }
        AllowlistCommands::Set {
            data,
            if_match,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let entries = parse_entries(read_json_data(data)?)?;
            let response = handler
                .set_allowlist(&ctx.deployment_id, &entries, if_match.as_deref())
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Replacing the allowlist with {} entries", entries.len()),
            )
            .await
        }
    }
}

/// Accept either a bare array of entries or `{"ip_addresses": [...]}`
fn parse_entries(value: Value) -> CliResult<Vec<AllowlistEntry>> {
    let list = match value {
        Value::Object(mut obj) => obj.remove("ip_addresses").unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(list).map_err(|e| CtlError::InvalidInput {
        message: format!(
            "Expected a list of {{\"address\": ..., \"description\": ...}} entries: {}",
            e
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_array() {
        let entries = parse_entries(json!([
            {"address": "195.212.0.0/16", "description": "Dev IP space 1"},
            {"address": "10.0.0.1"}
        ]))
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description, "Dev IP space 1");
        assert_eq!(entries[1].description, "");
    }

    #[test]
    fn test_parse_entries_wrapped() {
        let entries = parse_entries(json!({
            "ip_addresses": [{"address": "172.16.0.0/16", "description": "Dev IP space 3"}]
        }))
        .unwrap();
        assert_eq!(entries, vec![AllowlistEntry::new("172.16.0.0/16", "Dev IP space 3")]);
    }

    #[test]
    fn test_parse_entries_empty_list_allowed() {
        assert!(parse_entries(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_parse_entries_rejects_garbage() {
        assert!(parse_entries(json!({"addresses": 1})).is_err());
        assert!(parse_entries(json!("10.0.0.1")).is_err());
    }
}
