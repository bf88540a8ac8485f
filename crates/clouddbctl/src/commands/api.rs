//! Raw API access commands for direct REST endpoint calls

use crate::cli::{HttpMethod, OutputFormat};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use crate::output;
use serde_json::Value;
use tracing::debug;

use super::utils::{print_result, read_json_data};

/// Parameters for API command execution
pub struct ApiCommandParams<'a> {
    pub profile_name: Option<&'a str>,
    pub method: HttpMethod,
    pub path: &'a str,
    pub data: Option<&'a str>,
    pub query: Option<&'a str>,
    pub output_format: OutputFormat,
}

pub async fn handle_api_command(
    conn_mgr: &ConnectionManager,
    params: ApiCommandParams<'_>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(params.profile_name)?;
    let path = normalize_path(params.path);

    let body: Option<Value> = params.data.map(read_json_data).transpose()?;
    debug!("{} {}", params.method, path);

    let response = match params.method {
        HttpMethod::Get => client.get_raw(&path).await?,
        HttpMethod::Post => {
            client
                .post_raw(&path, body.unwrap_or_else(|| serde_json::json!({})))
                .await?
        }
        HttpMethod::Put => {
            client
                .put_raw(&path, body.unwrap_or_else(|| serde_json::json!({})))
                .await?
        }
        HttpMethod::Patch => {
            client
                .patch_raw(&path, body.unwrap_or_else(|| serde_json::json!({})))
                .await?
        }
        HttpMethod::Delete => client.delete_raw(&path).await?,
    };

    print_result(
        response,
        params.output_format,
        output::OutputFormat::Json,
        params.query,
    )
}

/// Ensure the path starts with `/`
fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("deployables"), "/deployables");
        assert_eq!(normalize_path("/tasks/abc"), "/tasks/abc");
    }
}
