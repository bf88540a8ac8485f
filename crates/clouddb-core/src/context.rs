//! Identifiers shared by a sequence of operations

use crate::config::{Config, ConfigError};
use std::env;

/// Environment variable holding the target deployment CRN
pub const DEPLOYMENT_ID_ENV: &str = "DEPLOYMENT_ID";
/// Environment variable holding a read-only replica CRN
pub const REPLICA_ID_ENV: &str = "REPLICA_ID";

/// The deployment (and optional replica) a session operates on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentContext {
    pub deployment_id: String,
    pub replica_id: Option<String>,
}

impl DeploymentContext {
    pub fn new(deployment_id: impl Into<String>) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            replica_id: None,
        }
    }

    pub fn with_replica(mut self, replica_id: impl Into<String>) -> Self {
        self.replica_id = Some(replica_id.into());
        self
    }

    /// Build from `DEPLOYMENT_ID` / `REPLICA_ID`
    pub fn from_env() -> Result<Self, ConfigError> {
        let deployment_id = non_empty_env(DEPLOYMENT_ID_ENV).ok_or_else(|| {
            ConfigError::MissingSetting {
                setting: DEPLOYMENT_ID_ENV.to_string(),
            }
        })?;
        Ok(Self {
            deployment_id,
            replica_id: non_empty_env(REPLICA_ID_ENV),
        })
    }

    /// Resolve with precedence: explicit value, environment, then profile
    pub fn resolve(
        explicit: Option<&str>,
        config: &Config,
        profile: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Self::resolve_with(explicit, config, profile, true)
    }

    /// Like [`resolve`](Self::resolve); with `use_environment` false the
    /// `DEPLOYMENT_ID` and `REPLICA_ID` variables are ignored
    ///
    /// An explicitly named profile must exist.
    pub fn resolve_with(
        explicit: Option<&str>,
        config: &Config,
        profile: Option<&str>,
        use_environment: bool,
    ) -> Result<Self, ConfigError> {
        let profile = config.active_profile(profile)?;

        let deployment_id = first_set(
            explicit,
            DEPLOYMENT_ID_ENV,
            use_environment,
            profile.and_then(|p| p.deployment_id.as_deref()),
        )
        .ok_or_else(|| ConfigError::MissingSetting {
            setting: "deployment id (use --deployment, DEPLOYMENT_ID or the profile)".to_string(),
        })?;

        let replica_id = first_set(
            None,
            REPLICA_ID_ENV,
            use_environment,
            profile.and_then(|p| p.replica_id.as_deref()),
        );

        Ok(Self {
            deployment_id,
            replica_id,
        })
    }

    /// Resolve only the replica: explicit value, `REPLICA_ID`, then profile
    pub fn resolve_replica(
        explicit: Option<&str>,
        config: &Config,
        profile: Option<&str>,
        use_environment: bool,
    ) -> Result<String, ConfigError> {
        let profile = config.active_profile(profile)?;
        first_set(
            explicit,
            REPLICA_ID_ENV,
            use_environment,
            profile.and_then(|p| p.replica_id.as_deref()),
        )
        .ok_or_else(|| ConfigError::MissingSetting {
            setting: REPLICA_ID_ENV.to_string(),
        })
    }

    /// Replica id, or an error naming the missing setting
    pub fn require_replica(&self) -> Result<&str, ConfigError> {
        self.replica_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingSetting {
                setting: REPLICA_ID_ENV.to_string(),
            })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Explicit value, then the environment variable, then the profile value
fn first_set(
    explicit: Option<&str>,
    env_name: &str,
    use_environment: bool,
    from_profile: Option<&str>,
) -> Option<String> {
    explicit
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| use_environment.then(|| non_empty_env(env_name)).flatten())
        .or_else(|| from_profile.filter(|s| !s.is_empty()).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Profile;

    fn config_with_profile() -> Config {
        let mut config = Config::default();
        config.set_profile(
            "dev".to_string(),
            Profile {
                deployment_id: Some("crn:profile".to_string()),
                replica_id: Some("crn:profile-replica".to_string()),
                ..Default::default()
            },
        );
        config
    }

    fn clear_env() {
        unsafe {
            env::remove_var(DEPLOYMENT_ID_ENV);
            env::remove_var(REPLICA_ID_ENV);
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_explicit_beats_env_and_profile() {
        clear_env();
        unsafe {
            env::set_var(DEPLOYMENT_ID_ENV, "crn:env");
        }
        let ctx = DeploymentContext::resolve(Some("crn:flag"), &config_with_profile(), None)
            .unwrap();
        assert_eq!(ctx.deployment_id, "crn:flag");
        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_env_beats_profile() {
        clear_env();
        unsafe {
            env::set_var(DEPLOYMENT_ID_ENV, "crn:env");
            env::set_var(REPLICA_ID_ENV, "crn:env-replica");
        }
        let ctx = DeploymentContext::resolve(None, &config_with_profile(), None).unwrap();
        assert_eq!(ctx.deployment_id, "crn:env");
        assert_eq!(ctx.replica_id.as_deref(), Some("crn:env-replica"));
        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_profile_fallback() {
        clear_env();
        let ctx = DeploymentContext::resolve(None, &config_with_profile(), Some("dev")).unwrap();
        assert_eq!(ctx.deployment_id, "crn:profile");
        assert_eq!(ctx.require_replica().unwrap(), "crn:profile-replica");
    }

    #[test]
    #[serial_test::serial]
    fn test_missing_everywhere() {
        clear_env();
        let err = DeploymentContext::resolve(None, &Config::default(), None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { .. }));
        assert!(DeploymentContext::from_env().is_err());
        assert!(DeploymentContext::new("x").require_replica().is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_unknown_explicit_profile_is_an_error() {
        clear_env();
        unsafe {
            env::set_var(DEPLOYMENT_ID_ENV, "crn:env");
        }
        let err = DeploymentContext::resolve(None, &config_with_profile(), Some("typo"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { ref name } if name == "typo"));
        let err = DeploymentContext::resolve_replica(None, &config_with_profile(), Some("typo"), true)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { .. }));
        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_environment_ignored_when_disabled() {
        clear_env();
        unsafe {
            env::set_var(DEPLOYMENT_ID_ENV, "crn:env");
            env::set_var(REPLICA_ID_ENV, "crn:env-replica");
        }
        let config = config_with_profile();
        let ctx = DeploymentContext::resolve_with(None, &config, None, false).unwrap();
        assert_eq!(ctx.deployment_id, "crn:profile");
        assert_eq!(ctx.replica_id.as_deref(), Some("crn:profile-replica"));
        assert_eq!(
            DeploymentContext::resolve_replica(None, &config, None, false).unwrap(),
            "crn:profile-replica"
        );
        assert_eq!(
            DeploymentContext::resolve_replica(None, &config, None, true).unwrap(),
            "crn:env-replica"
        );
        assert_eq!(
            DeploymentContext::resolve_replica(Some("crn:flag"), &config, None, true).unwrap(),
            "crn:flag"
        );
        clear_env();
    }
}
