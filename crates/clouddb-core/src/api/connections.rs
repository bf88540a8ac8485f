//! Connection strings
//!
//! The shape of a connection document depends on the database engine, so it
//! is carried as untyped JSON.

use super::client::{CloudDatabasesClient, encode_segment, with_query};
use super::error::Result;
use super::users::UserType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which network endpoint the connection targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    #[default]
    Public,
    Private,
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointType::Public => write!(f, "public"),
            EndpointType::Private => write!(f, "private"),
        }
    }
}

/// `{"connection": {...}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionResponse {
    #[serde(default)]
    pub connection: Value,
}

/// Body for [`ConnectionHandler::complete_connection`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteConnectionRequest {
    /// Substituted for the `$PASSWORD` placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Path where the CA certificate will be stored locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_root: Option<String>,
}

pub struct ConnectionHandler {
    client: CloudDatabasesClient,
}

impl ConnectionHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    fn path(
        deployment_id: &str,
        user_type: UserType,
        user_id: &str,
        endpoint_type: EndpointType,
    ) -> String {
        format!(
            "/deployments/{}/users/{}/{}/connections/{}",
            encode_segment(deployment_id),
            user_type.as_str(),
            encode_segment(user_id),
            endpoint_type
        )
    }

    /// Connection strings with placeholders left in
    pub async fn get_connection(
        &self,
        deployment_id: &str,
        user_type: UserType,
        user_id: &str,
        endpoint_type: EndpointType,
        certificate_root: Option<&str>,
    ) -> Result<ConnectionResponse> {
        let path = with_query(
            &Self::path(deployment_id, user_type, user_id, endpoint_type),
            &[("certificate_root", certificate_root)],
        );
        self.client.get(&path).await
    }

    /// Connection strings with the password and certificate path filled in
    pub async fn complete_connection(
        &self,
        deployment_id: &str,
        user_type: UserType,
        user_id: &str,
        endpoint_type: EndpointType,
        request: &CompleteConnectionRequest,
    ) -> Result<ConnectionResponse> {
        self.client
            .post(
                &Self::path(deployment_id, user_type, user_id, endpoint_type),
                request,
            )
            .await
    }
}
