//! Backups

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::Result;
use super::tasks::TaskResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Backup {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    /// `scheduled` or `on_demand`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub backup_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_downloadable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_restorable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Backups {
    #[serde(default)]
    pub backups: Vec<Backup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupResponse {
    #[serde(default)]
    pub backup: Backup,
}

pub struct BackupHandler {
    client: CloudDatabasesClient,
}

impl BackupHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    pub async fn list_deployment_backups(&self, deployment_id: &str) -> Result<Backups> {
        self.client
            .get(&format!(
                "/deployments/{}/backups",
                encode_segment(deployment_id)
            ))
            .await
    }

    /// Backups are addressed globally by id
    pub async fn get_backup_info(&self, backup_id: &str) -> Result<Backup> {
        let response: BackupResponse = self
            .client
            .get(&format!("/backups/{}", encode_segment(backup_id)))
            .await?;
        Ok(response.backup)
    }

    pub async fn start_ondemand_backup(&self, deployment_id: &str) -> Result<TaskResponse> {
        self.client
            .post_empty(&format!(
                "/deployments/{}/backups",
                encode_segment(deployment_id)
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backup_type_renamed() {
        let b: BackupResponse = serde_json::from_value(json!({
            "backup": {"id": "b1", "type": "on_demand", "status": "completed"}
        }))
        .unwrap();
        assert_eq!(b.backup.backup_type.as_deref(), Some("on_demand"));
    }
}
