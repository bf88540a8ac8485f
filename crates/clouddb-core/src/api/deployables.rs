//! Deployable database types and regions

use super::client::{CloudDatabasesClient, encode_segment, with_query};
use super::error::Result;
use super::scaling::Groups;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployableVersion {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_preferred: Option<bool>,
    /// Versions this one can be upgraded to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<VersionTransition>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionTransition {
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub from_version: String,
    #[serde(default)]
    pub to_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployable {
    #[serde(rename = "type", default)]
    pub deployable_type: String,
    #[serde(default)]
    pub versions: Vec<DeployableVersion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deployables {
    #[serde(default)]
    pub deployables: Vec<Deployable>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Regions {
    #[serde(default)]
    pub regions: Vec<String>,
}

/// Account-level catalog lookups, not bound to a deployment
pub struct DeployablesHandler {
    client: CloudDatabasesClient,
}

impl DeployablesHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    pub async fn list_deployables(&self) -> Result<Deployables> {
        self.client.get("/deployables").await
    }

    pub async fn list_regions(&self) -> Result<Regions> {
        self.client.get("/regions").await
    }

    /// Default scaling groups for a database type, optionally for one host flavor
    pub async fn get_default_scaling_groups(
        &self,
        deployable_type: &str,
        host_flavor: Option<&str>,
    ) -> Result<Groups> {
        let path = with_query(
            &format!("/deployables/{}/groups", encode_segment(deployable_type)),
            &[("host_flavor", host_flavor)],
        );
        self.client.get(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deployables_payload() {
        let d: Deployables = serde_json::from_value(json!({
            "deployables": [
                {"type": "postgresql", "versions": [{"version": "15", "status": "stable", "is_preferred": true}]}
            ]
        }))
        .unwrap();
        assert_eq!(d.deployables[0].deployable_type, "postgresql");
        assert_eq!(d.deployables[0].versions[0].is_preferred, Some(true));
    }
}
