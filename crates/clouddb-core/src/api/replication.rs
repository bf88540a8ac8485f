//! PostgreSQL logical replication slots

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::Result;
use super::tasks::TaskResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Output plugin used by the default slot type
pub const DEFAULT_PLUGIN_TYPE: &str = "wal2json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalReplicationSlot {
    pub name: String,
    pub database_name: String,
    pub plugin_type: String,
}

impl LogicalReplicationSlot {
    pub fn new(name: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database_name: database_name.into(),
            plugin_type: DEFAULT_PLUGIN_TYPE.to_string(),
        }
    }
}

pub struct ReplicationSlotHandler {
    client: CloudDatabasesClient,
}

impl ReplicationSlotHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    fn path(deployment_id: &str) -> String {
        format!(
            "/deployments/{}/postgresql/logical_replication_slots",
            encode_segment(deployment_id)
        )
    }

    pub async fn create_logical_replication_slot(
        &self,
        deployment_id: &str,
        slot: &LogicalReplicationSlot,
    ) -> Result<TaskResponse> {
        self.client
            .post(
                &Self::path(deployment_id),
                &json!({ "logical_replication_slot": slot }),
            )
            .await
    }

    pub async fn delete_logical_replication_slot(
        &self,
        deployment_id: &str,
        name: &str,
    ) -> Result<TaskResponse> {
        let path = format!("{}/{}", Self::path(deployment_id), encode_segment(name));
        self.client.delete(&path).await
    }
}
