//! Submit-and-wait workflows
//!
//! Each function issues one mutating call and polls the returned task with
//! [`poll_task`]. A missing task id is an error everywhere except for
//! on-demand backups, which the service may accept without a task.

use crate::api::allowlists::{AllowlistEntry, AllowlistHandler};
use crate::api::autoscaling::{AutoscalingGroup, AutoscalingHandler};
use crate::api::backups::BackupHandler;
use crate::api::deployments::DeploymentHandler;
use crate::api::remotes::RemoteHandler;
use crate::api::replication::{LogicalReplicationSlot, ReplicationSlotHandler};
use crate::api::scaling::{ScalingHandler, ScalingRequest};
use crate::api::users::{CreateUserRequest, UserHandler, UserType};
use crate::api::{CloudDatabasesClient, TaskResponse};
use crate::error::{CoreError, Result};
use crate::progress::{PollPolicy, ProgressCallback, TaskCompletion, poll_task};
use serde_json::Value;
use tracing::debug;

/// Poll the task named in `response`
///
/// A response without a task id is a failure: every call routed here is
/// documented to start a task.
pub async fn wait_for_response(
    client: &CloudDatabasesClient,
    response: &TaskResponse,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let task_id = response.task_id().ok_or_else(CoreError::missing_task_id)?;
    debug!(task_id, "Waiting for task");
    poll_task(client, task_id, policy, on_progress).await
}

/// Poll the task named in `response` when there is one
///
/// For calls that may finish synchronously: a response without a task id is
/// [`TaskCompletion::NoTask`].
pub async fn wait_for_optional_response(
    client: &CloudDatabasesClient,
    response: &TaskResponse,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    match response.task_id() {
        Some(task_id) => {
            debug!(task_id, "Waiting for task");
            poll_task(client, task_id, policy, on_progress).await
        }
        None => {
            debug!("Response carried no task; nothing to wait for");
            Ok(TaskCompletion::NoTask)
        }
    }
}

/// Add an allowlist entry and wait for completion
///
/// # Example
///
/// ```rust,ignore
/// use clouddb_core::api::AllowlistEntry;
/// use clouddb_core::{PollPolicy, workflows};
///
/// workflows::add_allowlist_entry_and_wait(
///     &client,
///     &ctx.deployment_id,
///     &AllowlistEntry::new("172.16.0.0/16", "Dev IP space 3"),
///     PollPolicy::default(),
///     None,
/// )
/// .await?;
/// ```
pub async fn add_allowlist_entry_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    entry: &AllowlistEntry,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = AllowlistHandler::new(client.clone())
        .add_allowlist_entry(deployment_id, entry)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn delete_allowlist_entry_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    address: &str,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = AllowlistHandler::new(client.clone())
        .delete_allowlist_entry(deployment_id, address)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

/// Replace the allowlist and wait; see [`AllowlistHandler::set_allowlist`]
pub async fn set_allowlist_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    entries: &[AllowlistEntry],
    if_match: Option<&str>,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = AllowlistHandler::new(client.clone())
        .set_allowlist(deployment_id, entries, if_match)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn create_user_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    user_type: UserType,
    request: &CreateUserRequest,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = UserHandler::new(client.clone())
        .create_database_user(deployment_id, user_type, request)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn delete_user_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    user_type: UserType,
    username: &str,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = UserHandler::new(client.clone())
        .delete_database_user(deployment_id, user_type, username)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn change_user_password_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    user_type: UserType,
    username: &str,
    password: &str,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = UserHandler::new(client.clone())
        .change_user_password(deployment_id, user_type, username, password)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn create_replication_slot_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    slot: &LogicalReplicationSlot,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = ReplicationSlotHandler::new(client.clone())
        .create_logical_replication_slot(deployment_id, slot)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn delete_replication_slot_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    name: &str,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = ReplicationSlotHandler::new(client.clone())
        .delete_logical_replication_slot(deployment_id, name)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn kill_connections_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = DeploymentHandler::new(client.clone())
        .kill_connections(deployment_id)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn update_configuration_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    configuration: &Value,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = DeploymentHandler::new(client.clone())
        .update_database_configuration(deployment_id, configuration)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn set_autoscaling_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    group_id: &str,
    autoscaling: &AutoscalingGroup,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = AutoscalingHandler::new(client.clone())
        .set_autoscaling_conditions(deployment_id, group_id, autoscaling)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

pub async fn set_scaling_group_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    group_id: &str,
    request: &ScalingRequest,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    if request.is_empty() {
        return Err(CoreError::Validation(
            "scaling request must set at least one dimension".to_string(),
        ));
    }
    let response = ScalingHandler::new(client.clone())
        .set_deployment_scaling_group(deployment_id, group_id, request)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

/// Resync a read-only replica and wait
pub async fn resync_replica_and_wait(
    client: &CloudDatabasesClient,
    replica_id: &str,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = RemoteHandler::new(client.clone())
        .resync_replica(replica_id)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

/// Promote a read-only replica and wait
pub async fn promote_replica_and_wait(
    client: &CloudDatabasesClient,
    replica_id: &str,
    skip_initial_backup: bool,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = RemoteHandler::new(client.clone())
        .promote_read_only_replica(replica_id, skip_initial_backup)
        .await?;
    wait_for_response(client, &response, policy, on_progress).await
}

/// Start an on-demand backup and wait for its task, if the service started one
pub async fn start_backup_and_wait(
    client: &CloudDatabasesClient,
    deployment_id: &str,
    policy: PollPolicy,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskCompletion> {
    let response = BackupHandler::new(client.clone())
        .start_ondemand_backup(deployment_id)
        .await?;
    wait_for_optional_response(client, &response, policy, on_progress).await
}
