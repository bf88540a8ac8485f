//! Deployment details, configuration and maintenance

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::Result;
use super::tasks::{TaskResponse, Tasks};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Read-only view of a deployment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_usernames: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_private_endpoints: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_public_endpoints: Option<bool>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentResponse {
    #[serde(default)]
    pub deployment: Deployment,
}

/// `{"point_in_time_recovery_data": {"earliest_point_in_time_recovery_time": ...}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PitrData {
    #[serde(default)]
    pub point_in_time_recovery_data: PitrWindow,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PitrWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earliest_point_in_time_recovery_time: Option<String>,
}

pub struct DeploymentHandler {
    client: CloudDatabasesClient,
}

impl DeploymentHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    fn path(deployment_id: &str, suffix: &str) -> String {
        format!("/deployments/{}{}", encode_segment(deployment_id), suffix)
    }

    pub async fn get_deployment_info(&self, deployment_id: &str) -> Result<Deployment> {
        let response: DeploymentResponse = self.client.get(&Self::path(deployment_id, "")).await?;
        Ok(response.deployment)
    }

    /// Apply engine-specific configuration (e.g. `{"max_connections": 200}`)
    pub async fn update_database_configuration(
        &self,
        deployment_id: &str,
        configuration: &Value,
    ) -> Result<TaskResponse> {
        self.client
            .patch(
                &Self::path(deployment_id, "/configuration"),
                &json!({ "configuration": configuration }),
            )
            .await
    }

    /// Terminate all open client connections
    pub async fn kill_connections(&self, deployment_id: &str) -> Result<TaskResponse> {
        self.client
            .delete(&Self::path(
                deployment_id,
                "/management/database_connections",
            ))
            .await
    }

    pub async fn list_deployment_tasks(&self, deployment_id: &str) -> Result<Tasks> {
        self.client.get(&Self::path(deployment_id, "/tasks")).await
    }

    pub async fn get_pitr_data(&self, deployment_id: &str) -> Result<PitrData> {
        self.client
            .get(&Self::path(deployment_id, "/point_in_time_recovery_data"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_keeps_unknown_fields() {
        let response: DeploymentResponse = serde_json::from_value(json!({
            "deployment": {
                "id": "crn:1",
                "name": "pg",
                "type": "postgresql",
                "version": "15",
                "ha": true
            }
        }))
        .unwrap();
        let deployment = response.deployment;
        assert_eq!(deployment.deployment_type.as_deref(), Some("postgresql"));
        assert_eq!(deployment.extra["ha"], true);
    }
}
