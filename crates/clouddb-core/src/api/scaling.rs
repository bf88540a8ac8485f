//! Scaling groups
//!
//! A deployment's resources are organised into groups (usually just
//! `member`); each group exposes members, memory, CPU and disk dimensions.

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::Result;
use super::tasks::TaskResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One resizable dimension of a group
///
/// Count-based dimensions (members, CPU) fill the `*_count` fields;
/// size-based ones (memory, disk) fill the `*_mb` fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_mb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_mb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_mb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size_mb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_adjustable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_scale_down: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostFlavor {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosting_size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<GroupResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<GroupResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<GroupResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<GroupResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_flavor: Option<HostFlavor>,
}

/// `{"groups": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Groups {
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// Target allocation for a group; unset dimensions are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalingRequest {
    pub members: Option<i64>,
    pub memory_mb: Option<i64>,
    pub cpu_count: Option<i64>,
    pub disk_mb: Option<i64>,
    pub host_flavor: Option<String>,
}

impl ScalingRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn to_body(&self) -> serde_json::Value {
        let mut group = serde_json::Map::new();
        if let Some(count) = self.members {
            group.insert("members".into(), json!({ "allocation_count": count }));
        }
        if let Some(mb) = self.memory_mb {
            group.insert("memory".into(), json!({ "allocation_mb": mb }));
        }
        if let Some(count) = self.cpu_count {
            group.insert("cpu".into(), json!({ "allocation_count": count }));
        }
        if let Some(mb) = self.disk_mb {
            group.insert("disk".into(), json!({ "allocation_mb": mb }));
        }
        if let Some(flavor) = &self.host_flavor {
            group.insert("host_flavor".into(), json!({ "id": flavor }));
        }
        json!({ "group": group })
    }
}

pub struct ScalingHandler {
    client: CloudDatabasesClient,
}

impl ScalingHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    pub async fn list_deployment_scaling_groups(&self, deployment_id: &str) -> Result<Groups> {
        self.client
            .get(&format!(
                "/deployments/{}/groups",
                encode_segment(deployment_id)
            ))
            .await
    }

    pub async fn set_deployment_scaling_group(
        &self,
        deployment_id: &str,
        group_id: &str,
        request: &ScalingRequest,
    ) -> Result<TaskResponse> {
        let path = format!(
            "/deployments/{}/groups/{}",
            encode_segment(deployment_id),
            encode_segment(group_id)
        );
        self.client.patch(&path, &request.to_body()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_body_only_contains_set_dimensions() {
        let request = ScalingRequest {
            memory_mb: Some(8192),
            host_flavor: Some("multitenant".into()),
            ..Default::default()
        };
        assert_eq!(
            request.to_body(),
            json!({"group": {"memory": {"allocation_mb": 8192}, "host_flavor": {"id": "multitenant"}}})
        );
        assert!(ScalingRequest::default().is_empty());
        assert!(!request.is_empty());
    }

    #[test]
    fn test_group_payload() {
        let groups: Groups = serde_json::from_value(json!({
            "groups": [{
                "id": "member",
                "count": 2,
                "memory": {"units": "mb", "allocation_mb": 8192, "minimum_mb": 2048, "step_size_mb": 256, "is_adjustable": true},
                "cpu": {"units": "count", "allocation_count": 6}
            }]
        }))
        .unwrap();
        let group = &groups.groups[0];
        assert_eq!(group.count, Some(2));
        assert_eq!(group.memory.as_ref().unwrap().allocation_mb, Some(8192));
        assert_eq!(group.cpu.as_ref().unwrap().allocation_count, Some(6));
        assert!(group.disk.is_none());
    }
}
