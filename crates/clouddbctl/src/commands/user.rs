use crate::cli::{OutputFormat, UserCommands};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use clouddb_core::api::{CreateUserRequest, UserHandler};

use super::utils::{ensure_confirmed, password_or_prompt};
use super::wait::handle_task_response;

pub async fn handle_user_command(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    command: &UserCommands,
    output_format: OutputFormat,
    query: Option<&str>,
) -> CliResult<()> {
    let client = conn_mgr.create_client(profile_name)?;
    let handler = UserHandler::new(client.clone());

    match command {
        UserCommands::Create {
            username,
            password,
            user_type,
            role,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let password = password_or_prompt(password.as_deref(), "Password for new user: ")?;
            let mut request = CreateUserRequest::new(username.as_str(), password);
            if let Some(role) = role {
                request = request.with_role(role.as_str());
            }
            let response = handler
                .create_database_user(&ctx.deployment_id, *user_type, &request)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Creating {} user {}", user_type, username),
            )
            .await
        }
        UserCommands::Delete {
            username,
            user_type,
            force,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            ensure_confirmed(*force, &format!("Delete {} user '{}'?", user_type, username))?;
            let response = handler
                .delete_database_user(&ctx.deployment_id, *user_type, username)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Deleting {} user {}", user_type, username),
            )
            .await
        }
        UserCommands::Password {
            username,
            password,
            user_type,
            target,
            wait,
        } => {
            let ctx = conn_mgr.deployment_context(target.deployment.as_deref(), profile_name)?;
            let password = password_or_prompt(password.as_deref(), "New password: ")?;
            let response = handler
                .change_user_password(&ctx.deployment_id, *user_type, username, &password)
                .await?;
            handle_task_response(
                &client,
                response,
                wait,
                output_format,
                query,
                &format!("Changing password for {}", username),
            )
            .await
        }
    }
}
