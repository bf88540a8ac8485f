//! Database users and credentials

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::Result;
use super::tasks::TaskResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Kind of user; selects which endpoint family handles the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Regular database user
    #[default]
    Database,
    /// Ops Manager user (MongoDB Enterprise)
    OpsManager,
    /// User on a read-only replica
    ReadOnlyReplica,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Database => "database",
            UserType::OpsManager => "ops_manager",
            UserType::ReadOnlyReplica => "read_only_replica",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a user-creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    /// Only meaningful for Ops Manager users (`group_read_only`, `group_data_access_admin`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl CreateUserRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// User operations for a deployment
pub struct UserHandler {
    client: CloudDatabasesClient,
}

impl UserHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    fn users_path(deployment_id: &str, user_type: UserType) -> String {
        format!(
            "/deployments/{}/users/{}",
            encode_segment(deployment_id),
            user_type.as_str()
        )
    }

    fn user_path(deployment_id: &str, user_type: UserType, username: &str) -> String {
        format!(
            "{}/{}",
            Self::users_path(deployment_id, user_type),
            encode_segment(username)
        )
    }

    /// `POST /deployments/{id}/users/{type}`
    pub async fn create_database_user(
        &self,
        deployment_id: &str,
        user_type: UserType,
        request: &CreateUserRequest,
    ) -> Result<TaskResponse> {
        self.client
            .post(
                &Self::users_path(deployment_id, user_type),
                &json!({ "user": request }),
            )
            .await
    }

    /// `PATCH /deployments/{id}/users/{type}/{username}` with a new password
    pub async fn change_user_password(
        &self,
        deployment_id: &str,
        user_type: UserType,
        username: &str,
        password: &str,
    ) -> Result<TaskResponse> {
        self.client
            .patch(
                &Self::user_path(deployment_id, user_type, username),
                &json!({ "user": { "password": password } }),
            )
            .await
    }

    /// `DELETE /deployments/{id}/users/{type}/{username}`
    pub async fn delete_database_user(
        &self,
        deployment_id: &str,
        user_type: UserType,
        username: &str,
    ) -> Result<TaskResponse> {
        self.client
            .delete(&Self::user_path(deployment_id, user_type, username))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_wire_names() {
        assert_eq!(
            serde_json::to_value(UserType::ReadOnlyReplica).unwrap(),
            "read_only_replica"
        );
        assert_eq!(UserType::OpsManager.to_string(), "ops_manager");
    }

    #[test]
    fn test_create_request_omits_missing_role() {
        let value = serde_json::to_value(CreateUserRequest::new("alice", "pw")).unwrap();
        assert!(value.get("role").is_none());

        let value =
            serde_json::to_value(CreateUserRequest::new("bob", "pw").with_role("group_read_only"))
                .unwrap();
        assert_eq!(value["role"], "group_read_only");
    }

    #[test]
    fn test_user_path() {
        assert_eq!(
            UserHandler::user_path("dep", UserType::Database, "a b"),
            "/deployments/dep/users/database/a%20b"
        );
    }
}
