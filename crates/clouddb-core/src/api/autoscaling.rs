//! Autoscaling conditions for a scaling group

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::Result;
use super::tasks::TaskResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityScaler {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_space_less_than_percent: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IoUtilizationScaler {
    #[serde(default)]
    pub enabled: bool,
    /// Duration string such as `30m`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above_percent: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scalers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<CapacityScaler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_utilization: Option<IoUtilizationScaler>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingRate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increase_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_mb_per_member: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_count_per_member: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingDimension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalers: Option<Scalers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<ScalingRate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoscalingGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk: Option<AutoscalingDimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<AutoscalingDimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<AutoscalingDimension>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoscalingResponse {
    #[serde(default)]
    pub autoscaling: AutoscalingGroup,
}

pub struct AutoscalingHandler {
    client: CloudDatabasesClient,
}

impl AutoscalingHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    fn path(deployment_id: &str, group_id: &str) -> String {
        format!(
            "/deployments/{}/groups/{}/autoscaling",
            encode_segment(deployment_id),
            encode_segment(group_id)
        )
    }

    pub async fn get_autoscaling_conditions(
        &self,
        deployment_id: &str,
        group_id: &str,
    ) -> Result<AutoscalingGroup> {
        let response: AutoscalingResponse =
            self.client.get(&Self::path(deployment_id, group_id)).await?;
        Ok(response.autoscaling)
    }

    pub async fn set_autoscaling_conditions(
        &self,
        deployment_id: &str,
        group_id: &str,
        autoscaling: &AutoscalingGroup,
    ) -> Result<TaskResponse> {
        self.client
            .patch(
                &Self::path(deployment_id, group_id),
                &json!({ "autoscaling": autoscaling }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_capacity_payload() {
        let group = AutoscalingGroup {
            disk: Some(AutoscalingDimension {
                scalers: Some(Scalers {
                    capacity: Some(CapacityScaler {
                        enabled: true,
                        free_space_less_than_percent: Some(10),
                    }),
                    io_utilization: None,
                }),
                rate: Some(ScalingRate {
                    increase_percent: Some(20.0),
                    period_seconds: Some(900),
                    limit_mb_per_member: Some(3_670_016.0),
                    units: Some("mb".into()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        };
        let value = json!({ "autoscaling": group });
        assert_eq!(
            value["autoscaling"]["disk"]["scalers"]["capacity"]["free_space_less_than_percent"],
            10
        );
        assert!(value["autoscaling"].get("memory").is_none());
    }
}
