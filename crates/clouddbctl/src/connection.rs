//! Connection management for the Cloud Databases API

use crate::error::Result as CliResult;
use anyhow::Context;
use clouddb_core::{CloudDatabasesClient, Config, DeploymentContext, ServiceSettings};
use std::path::PathBuf;
use tracing::{debug, info, trace};

/// User agent string for clouddbctl HTTP requests
const CLOUDDBCTL_USER_AGENT: &str = concat!("clouddbctl/", env!("CARGO_PKG_VERSION"));

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            self.config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            self.config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Path of the configuration file in use
    pub fn effective_config_path(&self) -> CliResult<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Config::config_path()?),
        }
    }

    /// Environment variables only apply when no explicit --config-file was given
    fn use_environment(&self) -> bool {
        self.config_path.is_none()
    }

    /// Create a client from the active profile, credentials file and environment
    ///
    /// When --config-file is explicitly specified, environment variables and the
    /// credentials file are ignored so the given file is the only input.
    pub fn create_client(&self, profile_name: Option<&str>) -> CliResult<CloudDatabasesClient> {
        trace!("Profile name: {:?}", profile_name);
        let use_environment = self.use_environment();
        if !use_environment {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        let profile = self.config.active_profile(profile_name)?;
        let settings = ServiceSettings::resolve(profile, use_environment)?;
        debug!("Resolved settings: {:?}", settings);

        info!("Connecting to Cloud Databases API: {}", settings.service_url);
        let client = CloudDatabasesClient::builder()
            .service_url(&settings.service_url)
            .authenticator(settings.authenticator()?)
            .user_agent(CLOUDDBCTL_USER_AGENT)
            .build()?;

        debug!("Cloud Databases client created successfully");
        Ok(client)
    }

    /// Resolve the deployment (and replica) a command targets
    pub fn deployment_context(
        &self,
        explicit: Option<&str>,
        profile_name: Option<&str>,
    ) -> CliResult<DeploymentContext> {
        let context = DeploymentContext::resolve_with(
            explicit,
            &self.config,
            profile_name,
            self.use_environment(),
        )?;
        debug!(deployment_id = %context.deployment_id, "Resolved deployment");
        Ok(context)
    }

    /// Like [`deployment_context`](Self::deployment_context) but for commands
    /// that act on a read-only replica
    pub fn replica_id(
        &self,
        explicit: Option<&str>,
        profile_name: Option<&str>,
    ) -> CliResult<String> {
        let replica_id = DeploymentContext::resolve_replica(
            explicit,
            &self.config,
            profile_name,
            self.use_environment(),
        )?;
        debug!(replica_id = %replica_id, "Resolved replica");
        Ok(replica_id)
    }
}
