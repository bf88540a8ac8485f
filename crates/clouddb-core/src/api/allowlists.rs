//! IP allowlist management
//!
//! An allowlist is the set of addresses or CIDR ranges permitted to connect
//! to a deployment. Changes are asynchronous and return a task.

use super::client::{CloudDatabasesClient, encode_segment};
use super::error::{CloudError, Result};
use super::tasks::TaskResponse;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One permitted address or CIDR range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowlistEntry {
    pub address: String,
    #[serde(default)]
    pub description: String,
}

impl AllowlistEntry {
    pub fn new(address: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            description: description.into(),
        }
    }
}

/// Current allowlist plus the version tag to use for a conditional replace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Allowlist {
    #[serde(default)]
    pub ip_addresses: Vec<AllowlistEntry>,
    /// Response `ETag`; pass to [`AllowlistHandler::set_allowlist`] as `if_match`
    #[serde(skip)]
    pub etag: Option<String>,
}

#[derive(Debug, Serialize)]
struct SetAllowlistRequest<'a> {
    ip_addresses: &'a [AllowlistEntry],
}

/// Allowlist operations for a deployment
pub struct AllowlistHandler {
    client: CloudDatabasesClient,
}

impl AllowlistHandler {
    pub fn new(client: CloudDatabasesClient) -> Self {
        Self { client }
    }

    fn path(deployment_id: &str) -> String {
        format!(
            "/deployments/{}/allowlists/ip_addresses",
            encode_segment(deployment_id)
        )
    }

    /// `GET /deployments/{id}/allowlists/ip_addresses`
    pub async fn get_allowlist(&self, deployment_id: &str) -> Result<Allowlist> {
        let response = self
            .client
            .send::<Allowlist>(Method::GET, &Self::path(deployment_id), None, None)
            .await?;
        let mut allowlist = response.body;
        allowlist.etag = response.etag;
        Ok(allowlist)
    }

    /// Replace the whole allowlist
    ///
    /// `if_match` makes the replace conditional on the version returned by
    /// [`get_allowlist`](Self::get_allowlist); a stale tag yields a 412.
    pub async fn set_allowlist(
        &self,
        deployment_id: &str,
        entries: &[AllowlistEntry],
        if_match: Option<&str>,
    ) -> Result<TaskResponse> {
        let body = serde_json::to_value(SetAllowlistRequest {
            ip_addresses: entries,
        })
        .map_err(|e| CloudError::ParseError(e.to_string()))?;
        Ok(self
            .client
            .send(Method::PUT, &Self::path(deployment_id), Some(body), if_match)
            .await?
            .body)
    }

    /// Add a single entry
    pub async fn add_allowlist_entry(
        &self,
        deployment_id: &str,
        entry: &AllowlistEntry,
    ) -> Result<TaskResponse> {
        self.client
            .post(&Self::path(deployment_id), &json!({ "ip_address": entry }))
            .await
    }

    /// Remove a single entry by its address (CIDR slashes are encoded)
    pub async fn delete_allowlist_entry(
        &self,
        deployment_id: &str,
        address: &str,
    ) -> Result<TaskResponse> {
        let path = format!(
            "{}/{}",
            Self::path(deployment_id),
            encode_segment(address)
        );
        self.client.delete(&path).await
    }
}
