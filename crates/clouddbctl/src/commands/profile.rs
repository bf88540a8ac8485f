//! Profile management command implementations

use crate::cli::{OutputFormat, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{CtlError, Result as CliResult};
use crate::output;
use clouddb_core::api::AuthType;
use clouddb_core::{Config, Profile};
use colored::Colorize;
use serde_json::{Value, json};
use tracing::{debug, info, trace};

use super::utils::{ensure_confirmed, password_or_prompt, print_result};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => {
            let name = match name {
                Some(name) => name.clone(),
                None => conn_mgr.config.resolve_profile(profile_name)?,
            };
            handle_show(conn_mgr, &name, output_format)
        }
        Set {
            name,
            service_url,
            auth_type,
            api_key,
            auth_url,
            bearer_token,
            username,
            password,
            deployment,
            replica,
            #[cfg(feature = "secure-storage")]
            use_keyring,
        } => {
            let input = ProfileInput {
                service_url: service_url.clone(),
                auth_type: *auth_type,
                api_key: api_key.clone(),
                auth_url: auth_url.clone(),
                bearer_token: bearer_token.clone(),
                username: username.clone(),
                password: password.clone(),
                deployment: deployment.clone(),
                replica: replica.clone(),
                #[cfg(feature = "secure-storage")]
                use_keyring: *use_keyring,
            };
            handle_set(conn_mgr, name, input)
        }
        Remove { name, force } => handle_remove(conn_mgr, name, *force),
        Default { name } => handle_default(conn_mgr, name),
    }
}

/// Values collected from `profile set`
struct ProfileInput {
    service_url: Option<String>,
    auth_type: AuthType,
    api_key: Option<String>,
    auth_url: Option<String>,
    bearer_token: Option<String>,
    username: Option<String>,
    password: Option<String>,
    deployment: Option<String>,
    replica: Option<String>,
    #[cfg(feature = "secure-storage")]
    use_keyring: bool,
}

fn profile_summary(config: &Config, name: &str, profile: &Profile) -> Value {
    let mut obj = json!({
        "name": name,
        "is_default": config.default_profile.as_deref() == Some(name),
        "service_url": profile.service_url,
        "auth_type": profile.auth_type.to_string(),
    });
    if let Some(deployment_id) = &profile.deployment_id {
        obj["deployment_id"] = json!(deployment_id);
    }
    if let Some(replica_id) = &profile.replica_id {
        obj["replica_id"] = json!(replica_id);
    }
    obj
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());
    let config_path = conn_mgr.effective_config_path().ok();

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let profile_list: Vec<Value> = profiles
                .iter()
                .map(|(name, profile)| profile_summary(&conn_mgr.config, name, profile))
                .collect();

            let output_data = json!({
                "config_path": config_path.map(|p| p.display().to_string()),
                "profiles": profile_list,
                "count": profiles.len()
            });
            print_result(output_data, output_format, output::OutputFormat::Json, None)
        }
        _ => {
            if let Some(path) = config_path {
                println!("Configuration file: {}", path.display());
                println!();
            }

            if profiles.is_empty() {
                info!("No profiles configured");
                println!("No profiles configured.");
                println!("Use 'clouddbctl profile set' to create a profile.");
                return Ok(());
            }

            let default_name = conn_mgr.config.default_profile.as_deref();
            for (name, profile) in &profiles {
                if default_name == Some(name.as_str()) {
                    println!("{} {}", name.bold().cyan(), "(default)".green());
                } else {
                    println!("{}", name.bold().cyan());
                }
                println!("    {}  {}", "URL:".dimmed(), profile.service_url);
                println!("    {} {}", "Auth:".dimmed(), profile.auth_type);
                if let Some(deployment_id) = &profile.deployment_id {
                    println!("    {} {}", "Deployment:".dimmed(), deployment_id);
                }
            }
            Ok(())
        }
    }
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> CliResult<()> {
    let config_path = conn_mgr.effective_config_path()?;

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => print_result(
            json!({ "config_path": config_path.display().to_string() }),
            output_format,
            output::OutputFormat::Json,
            None,
        ),
        _ => {
            println!("{}", config_path.display());
            Ok(())
        }
    }
}

/// Mask a secret, keeping a short prefix for recognition
fn preview(secret: &str) -> String {
    if secret.starts_with("keyring:") || secret.starts_with("${") {
        return secret.to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}...", prefix)
}

fn handle_show(conn_mgr: &ConnectionManager, name: &str, output_format: OutputFormat) -> CliResult<()> {
    let profile = conn_mgr
        .config
        .profiles
        .get(name)
        .ok_or_else(|| CtlError::ProfileNotFound { name: name.into() })?;

    let mut data = profile_summary(&conn_mgr.config, name, profile);
    if let Some(auth_url) = &profile.auth_url {
        data["auth_url"] = json!(auth_url);
    }
    if let Some(api_key) = &profile.api_key {
        data["api_key_preview"] = json!(preview(api_key));
    }
    if let Some(token) = &profile.bearer_token {
        data["bearer_token_preview"] = json!(preview(token));
    }
    if let Some(username) = &profile.username {
        data["username"] = json!(username);
    }
    if matches!(profile.auth_type, AuthType::Basic) {
        data["password_configured"] = json!(profile.password.is_some());
    }

    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            print_result(data, output_format, output::OutputFormat::Json, None)
        }
        _ => print_result(data, output_format, output::OutputFormat::Table, None),
    }
}

fn handle_set(conn_mgr: &ConnectionManager, name: &str, input: ProfileInput) -> CliResult<()> {
    debug!("Setting profile: {}", name);

    let existing = conn_mgr.config.profiles.get(name);

    match input.auth_type {
        AuthType::Iam if input.api_key.is_none() && existing.and_then(|p| p.api_key.as_ref()).is_none() => {
            return Err(CtlError::InvalidInput {
                message: "--api-key is required for IAM profiles".to_string(),
            });
        }
        AuthType::Bearer if input.bearer_token.is_none() => {
            return Err(CtlError::InvalidInput {
                message: "--bearer-token is required for bearer profiles".to_string(),
            });
        }
        AuthType::Basic if input.username.is_none() => {
            return Err(CtlError::InvalidInput {
                message: "--username is required for basic profiles".to_string(),
            });
        }
        _ => {}
    }

    let password = match (input.auth_type, &input.password) {
        (AuthType::Basic, password) => Some(password_or_prompt(
            password.as_deref(),
            "Enter password: ",
        )?),
        (_, password) => password.clone(),
    };

    #[cfg(feature = "secure-storage")]
    let (api_key, bearer_token, password) = if input.use_keyring {
        use clouddb_core::config::CredentialStore;
        let store = CredentialStore::new();
        let stash = |suffix: &str, value: Option<String>| -> CliResult<Option<String>> {
            value
                .map(|v| {
                    store
                        .store_credential(&format!("{}-{}", name, suffix), &v)
                        .map_err(CtlError::from)
                })
                .transpose()
        };
        let refs = (
            stash("api-key", input.api_key.clone())?,
            stash("bearer-token", input.bearer_token.clone())?,
            stash("password", password)?,
        );
        println!("Credentials stored securely in OS keyring");
        refs
    } else {
        (input.api_key.clone(), input.bearer_token.clone(), password)
    };

    #[cfg(not(feature = "secure-storage"))]
    let (api_key, bearer_token) = (input.api_key.clone(), input.bearer_token.clone());

    let base = existing.cloned().unwrap_or_default();
    let profile = Profile {
        service_url: input.service_url.unwrap_or(base.service_url),
        auth_type: input.auth_type,
        api_key: api_key.or(base.api_key),
        auth_url: input.auth_url.or(base.auth_url),
        bearer_token: bearer_token.or(base.bearer_token),
        username: input.username.or(base.username),
        password: password.or(base.password),
        deployment_id: input.deployment.or(base.deployment_id),
        replica_id: input.replica.or(base.replica_id),
    };

    let mut manager = conn_mgr.clone();
    let first_profile = manager.config.profiles.is_empty();
    manager.config.set_profile(name.to_string(), profile);
    if first_profile {
        manager.config.default_profile = Some(name.to_string());
    }
    manager.save_config()?;

    let path = manager.effective_config_path()?;
    println!("Profile '{}' saved successfully to:", name);
    println!("  {}", path.display());
    if first_profile {
        println!("Profile '{}' is now the default.", name);
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str, force: bool) -> CliResult<()> {
    debug!("Removing profile: {}", name);

    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(CtlError::ProfileNotFound { name: name.into() });
    }

    let was_default = conn_mgr.config.default_profile.as_deref() == Some(name);
    if was_default {
        println!("Warning: '{}' is the default profile.", name);
    }

    ensure_confirmed(force, &format!("Remove profile '{}'?", name))?;

    let mut manager = conn_mgr.clone();
    if let Some(removed) = manager.config.remove_profile(name) {
        #[cfg(feature = "secure-storage")]
        forget_keyring_entries(name, &removed);
        #[cfg(not(feature = "secure-storage"))]
        let _ = removed;
    }
    manager.save_config()?;

    if was_default {
        println!("Default profile cleared.");
    }
    println!("Profile '{}' removed successfully.", name);
    Ok(())
}

#[cfg(feature = "secure-storage")]
fn forget_keyring_entries(name: &str, profile: &Profile) {
    use clouddb_core::config::CredentialStore;
    let store = CredentialStore::new();
    for (suffix, value) in [
        ("api-key", &profile.api_key),
        ("bearer-token", &profile.bearer_token),
        ("password", &profile.password),
    ] {
        if value.as_deref().is_some_and(CredentialStore::is_keyring_reference)
            && let Err(e) = store.delete_credential(&format!("{}-{}", name, suffix))
        {
            debug!("Could not delete keyring entry for {}: {}", name, e);
        }
    }
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> CliResult<()> {
    debug!("Setting default profile: {}", name);

    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(CtlError::ProfileNotFound { name: name.into() });
    }

    let mut manager = conn_mgr.clone();
    manager.config.default_profile = Some(name.to_string());
    manager.save_config()?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_masks_secret() {
        assert_eq!(preview("abcdefghijkl"), "abcd...");
        assert_eq!(preview("ab"), "ab...");
    }

    #[test]
    fn test_preview_keeps_references() {
        assert_eq!(preview("keyring:dev-api-key"), "keyring:dev-api-key");
        assert_eq!(preview("${CLOUDDB_APIKEY}"), "${CLOUDDB_APIKEY}");
    }

    #[test]
    fn test_profile_summary_marks_default() {
        let mut config = Config::default();
        config.set_profile("dev".to_string(), Profile::default());
        config.default_profile = Some("dev".to_string());
        let profile = config.profiles["dev"].clone();
        let summary = profile_summary(&config, "dev", &profile);
        assert_eq!(summary["is_default"], true);
        assert_eq!(summary["auth_type"], "iam");
        assert!(summary.get("deployment_id").is_none());
    }
}
