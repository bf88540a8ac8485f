//! Profile file handling
//!
//! Profiles are stored in TOML, one table per profile:
//!
//! ```toml
//! default_profile = "dev"
//!
//! [profiles.dev]
//! service_url = "https://api.eu-de.databases.cloud.ibm.com/v5/ibm"
//! auth_type = "iam"
//! api_key = "${CLOUDDB_DEV_APIKEY}"
//! deployment_id = "crn:v1:bluemix:public:databases-for-postgresql:eu-de:a/abc::"
//! ```

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use crate::api::AuthType;
use crate::api::client::DEFAULT_SERVICE_URL;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when `--profile` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// One named set of connection settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default)]
    pub auth_type: AuthType,
    /// IAM API key; supports `keyring:` references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    /// Supports `keyring:` references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Supports `keyring:` references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Deployment used when a command omits `--deployment`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica_id: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            auth_type: AuthType::default(),
            api_key: None,
            auth_url: None,
            bearer_token: None,
            username: None,
            password: None,
            deployment_id: None,
            replica_id: None,
        }
    }
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

/// Secrets of a profile after keyring references are resolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSecrets {
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub password: Option<String>,
}

impl Profile {
    /// Check if this profile carries any secret material
    pub fn has_secret(&self) -> bool {
        self.api_key.is_some() || self.bearer_token.is_some() || self.password.is_some()
    }

    /// Resolve `keyring:` references in the secret fields
    pub fn resolve_secrets(&self) -> Result<ResolvedSecrets> {
        let store = CredentialStore::new();
        let resolve = |value: &Option<String>, what: &str| {
            value
                .as_deref()
                .map(|v| {
                    store.get_credential(v, None).map_err(|e| {
                        ConfigError::CredentialError(format!("Failed to resolve {}: {}", what, e))
                    })
                })
                .transpose()
        };

        Ok(ResolvedSecrets {
            api_key: resolve(&self.api_key, "API key")?,
            bearer_token: resolve(&self.bearer_token, "bearer token")?,
            password: resolve(&self.password, "password")?,
        })
    }
}

impl Config {
    /// Resolve the profile name to use
    ///
    /// Order: explicit name, `default_profile`, then the first profile
    /// alphabetically.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        self.list_profiles()
            .first()
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| ConfigError::NoProfiles {
                suggestion: "Use 'clouddbctl profile set' to create a profile.".to_string(),
            })
    }

    /// Look up the active profile, failing if an explicit name does not exist
    pub fn active_profile(&self, explicit_profile: Option<&str>) -> Result<Option<&Profile>> {
        let name = match self.resolve_profile(explicit_profile) {
            Ok(name) => name,
            Err(ConfigError::NoProfiles { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        self.profiles
            .get(&name)
            .map(Some)
            .ok_or(ConfigError::ProfileNotFound { name })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path; a missing file is an empty config
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name, clearing the default if it pointed there
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/clouddbctl/config.toml` is preferred when it (or its
    /// directory) exists, falling back to the platform location.
    ///
    /// On Linux: ~/.config/clouddbctl/config.toml
    /// On Windows: %APPDATA%\clouddb\clouddbctl\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("clouddbctl")
                    .join("config.toml");

                if linux_style_path.exists()
                    || linux_style_path
                        .parent()
                        .map(|p| p.exists())
                        .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "clouddb", "clouddbctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand `${VAR}` and `${VAR:-default}` references
    ///
    /// Unset variables without a default are left as written so that
    /// profiles which are never used do not fail to load.
    pub(crate) fn expand_env_vars(content: &str) -> String {
        shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_deployment(id: &str) -> Profile {
        Profile {
            api_key: Some("key".to_string()),
            deployment_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.set_profile("dev".to_string(), profile_with_deployment("crn:dev"));
        config.default_profile = Some("dev".to_string());

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.default_profile, deserialized.default_profile);
        assert_eq!(deserialized.profiles["dev"], config.profiles["dev"]);
    }

    #[test]
    fn test_profile_defaults() {
        let config: Config = toml::from_str(
            r#"
[profiles.minimal]
api_key = "abc"
"#,
        )
        .unwrap();
        let profile = &config.profiles["minimal"];
        assert_eq!(profile.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(profile.auth_type, AuthType::Iam);
        assert!(profile.deployment_id.is_none());
        assert!(profile.has_secret());
    }

    #[test]
    fn test_auth_type_parsing_in_profile() {
        let config: Config = toml::from_str(
            r#"
[profiles.local]
service_url = "http://localhost:8080"
auth_type = "noauth"

[profiles.token]
auth_type = "bearer"
bearer_token = "tok"
"#,
        )
        .unwrap();
        assert_eq!(config.profiles["local"].auth_type, AuthType::NoAuth);
        assert_eq!(config.profiles["token"].auth_type, AuthType::Bearer);
        assert!(!config.profiles["local"].has_secret());
    }

    #[test]
    fn test_profile_resolution_order() {
        let mut config = Config::default();
        config.set_profile("zeta".to_string(), profile_with_deployment("z"));
        config.set_profile("alpha".to_string(), profile_with_deployment("a"));

        // Explicit wins
        assert_eq!(config.resolve_profile(Some("zeta")).unwrap(), "zeta");
        // First alphabetically without a default
        assert_eq!(config.resolve_profile(None).unwrap(), "alpha");
        // Default beats alphabetical
        config.default_profile = Some("zeta".to_string());
        assert_eq!(config.resolve_profile(None).unwrap(), "zeta");
    }

    #[test]
    fn test_no_profiles_error() {
        let config = Config::default();
        let err = config.resolve_profile(None).unwrap_err();
        assert!(matches!(err, ConfigError::NoProfiles { .. }));
        assert!(config.active_profile(None).unwrap().is_none());
    }

    #[test]
    fn test_active_profile_missing_explicit() {
        let config = Config::default();
        let err = config.active_profile(Some("ghost")).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileNotFound { ref name } if name == "ghost"));
    }

    #[test]
    fn test_remove_profile_clears_default() {
        let mut config = Config::default();
        config.set_profile("dev".to_string(), profile_with_deployment("d"));
        config.default_profile = Some("dev".to_string());

        assert!(config.remove_profile("dev").is_some());
        assert!(config.default_profile.is_none());
        assert!(config.remove_profile("dev").is_none());
    }

    #[test]
    fn test_resolve_plaintext_secrets() {
        let profile = Profile {
            api_key: Some("plain-key".to_string()),
            password: Some("pw".to_string()),
            ..Default::default()
        };
        let secrets = profile.resolve_secrets().unwrap();
        assert_eq!(secrets.api_key.as_deref(), Some("plain-key"));
        assert_eq!(secrets.password.as_deref(), Some("pw"));
        assert!(secrets.bearer_token.is_none());
    }

    #[test]
    #[serial_test::serial]
    fn test_env_var_expansion() {
        unsafe {
            std::env::set_var("CLOUDDB_TEST_APIKEY", "expanded-key");
            std::env::remove_var("CLOUDDB_TEST_URL");
        }

        let content = r#"
default_profile = "dev"

[profiles.dev]
api_key = "${CLOUDDB_TEST_APIKEY}"
service_url = "${CLOUDDB_TEST_URL:-https://api.eu-de.databases.cloud.ibm.com/v5/ibm}"
"#;

        let expanded = Config::expand_env_vars(content);
        let config: Config = toml::from_str(&expanded).unwrap();
        let profile = &config.profiles["dev"];
        assert_eq!(profile.api_key.as_deref(), Some("expanded-key"));
        assert_eq!(
            profile.service_url,
            "https://api.eu-de.databases.cloud.ibm.com/v5/ibm"
        );

        unsafe {
            std::env::remove_var("CLOUDDB_TEST_APIKEY");
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_unset_var_left_unexpanded() {
        unsafe {
            std::env::remove_var("CLOUDDB_NOT_SET");
        }
        let expanded = Config::expand_env_vars("api_key = \"${CLOUDDB_NOT_SET}\"");
        assert!(expanded.contains("${CLOUDDB_NOT_SET}"));
    }
}
