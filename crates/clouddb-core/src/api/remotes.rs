//! Read-only replicas and their leader

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::Result;
use super::tasks::TaskResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Remotes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    #[serde(default)]
    pub replicas: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemotesResponse {
    #[serde(default)]
    pub remotes: Remotes,
}

pub struct RemoteHandler {
    client: CloudDatabasesClient,
}

impl RemoteHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    fn path(deployment_id: &str, suffix: &str) -> String {
        format!(
            "/deployments/{}/remotes{}",
            encode_segment(deployment_id),
            suffix
        )
    }

    pub async fn list_remotes(&self, deployment_id: &str) -> Result<RemotesResponse> {
        self.client.get(&Self::path(deployment_id, "")).await
    }

    /// Re-seed a read-only replica from its leader
    pub async fn resync_replica(&self, deployment_id: &str) -> Result<TaskResponse> {
        self.client
            .post_empty(&Self::path(deployment_id, "/resync"))
            .await
    }

    /// Promote a read-only replica to a standalone deployment
    pub async fn promote_read_only_replica(
        &self,
        deployment_id: &str,
        skip_initial_backup: bool,
    ) -> Result<TaskResponse> {
        let promotion = if skip_initial_backup {
            json!({ "promotion": { "skip_initial_backup": true } })
        } else {
            json!({ "promotion": {} })
        };
        self.client
            .post(&Self::path(deployment_id, "/promotion"), &promotion)
            .await
    }
}
