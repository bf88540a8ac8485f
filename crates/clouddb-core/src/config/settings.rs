//! Resolved connection settings
//!
//! [`ServiceSettings`] merges the credentials file, a profile and the
//! process environment into what is needed to build a
//! [`CloudDatabasesClient`].

use super::config::Profile;
use super::error::{ConfigError, Result};
use crate::api::auth::DEFAULT_AUTH_URL;
use crate::api::client::DEFAULT_SERVICE_URL;
use crate::api::{AuthType, Authenticator, CloudDatabasesClient};
use directories::BaseDirs;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const URL_ENV: &str = "CLOUD_DATABASES_URL";
pub const AUTH_TYPE_ENV: &str = "CLOUD_DATABASES_AUTH_TYPE";
pub const APIKEY_ENV: &str = "CLOUD_DATABASES_APIKEY";
pub const AUTH_URL_ENV: &str = "CLOUD_DATABASES_AUTH_URL";
pub const BEARER_TOKEN_ENV: &str = "CLOUD_DATABASES_BEARER_TOKEN";
pub const USERNAME_ENV: &str = "CLOUD_DATABASES_USERNAME";
pub const PASSWORD_ENV: &str = "CLOUD_DATABASES_PASSWORD";

/// Default credentials file name, looked up in the working and home directories
pub const CREDENTIALS_FILE_NAME: &str = "cloud_databases_v5.env";
/// Overrides the credentials file location
pub const CREDENTIALS_FILE_ENV: &str = "IBM_CREDENTIALS_FILE";

/// A parsed `KEY=VALUE` credentials file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialsFile {
    values: HashMap<String, String>,
}

impl CredentialsFile {
    /// Parse file content; blank lines and `#` comments are skipped
    pub fn parse(content: &str) -> Self {
        let values = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| {
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value);
                (key.trim().to_string(), value.to_string())
            })
            .collect();
        Self { values }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::CredentialsFileError {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(Self::parse(&content))
    }

    /// Locate the credentials file
    ///
    /// `IBM_CREDENTIALS_FILE` wins when set; otherwise the working directory
    /// and then the home directory are searched.
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = env::var(CREDENTIALS_FILE_ENV)
            && !path.trim().is_empty()
        {
            return Some(PathBuf::from(path));
        }

        let cwd = env::current_dir().ok().map(|d| d.join(CREDENTIALS_FILE_NAME));
        let home = BaseDirs::new().map(|d| d.home_dir().join(CREDENTIALS_FILE_NAME));
        [cwd, home].into_iter().flatten().find(|p| p.is_file())
    }

    /// Load the located credentials file, if any
    pub fn load() -> Result<Option<Self>> {
        match Self::locate() {
            Some(path) => {
                debug!(path = %path.display(), "Reading credentials file");
                Self::load_from_path(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Everything needed to talk to the service
#[derive(Clone, PartialEq)]
pub struct ServiceSettings {
    pub service_url: String,
    pub auth_type: AuthType,
    pub api_key: Option<String>,
    pub auth_url: Option<String>,
    pub bearer_token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("ServiceSettings")
            .field("service_url", &self.service_url)
            .field("auth_type", &self.auth_type)
            .field("api_key", &redact(&self.api_key))
            .field("auth_url", &self.auth_url)
            .field("bearer_token", &redact(&self.bearer_token))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .finish()
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            auth_type: AuthType::default(),
            api_key: None,
            auth_url: None,
            bearer_token: None,
            username: None,
            password: None,
        }
    }
}

impl ServiceSettings {
    /// Merge all sources
    ///
    /// Precedence, highest first: environment, profile, credentials file,
    /// built-in defaults. With `use_environment = false` only the profile
    /// and defaults are consulted.
    pub fn resolve(profile: Option<&Profile>, use_environment: bool) -> Result<Self> {
        let mut settings = Self::default();

        if use_environment && let Some(file) = CredentialsFile::load()? {
            settings.apply_lookup(|key| file.get(key).map(str::to_string))?;
        }

        if let Some(profile) = profile {
            settings.apply_profile(profile)?;
        }

        if use_environment {
            settings.apply_lookup(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))?;
        }

        debug!(service_url = %settings.service_url, auth_type = %settings.auth_type, "Resolved service settings");
        Ok(settings)
    }

    /// Overlay values from a profile, resolving keyring references
    pub fn apply_profile(&mut self, profile: &Profile) -> Result<()> {
        let secrets = profile.resolve_secrets()?;
        self.service_url = profile.service_url.clone();
        self.auth_type = profile.auth_type;
        overlay(&mut self.api_key, secrets.api_key);
        overlay(&mut self.auth_url, profile.auth_url.clone());
        overlay(&mut self.bearer_token, secrets.bearer_token);
        overlay(&mut self.username, profile.username.clone());
        overlay(&mut self.password, secrets.password);
        Ok(())
    }

    /// Overlay values from a `CLOUD_DATABASES_*` keyed source
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(URL_ENV) {
            self.service_url = url;
        }
        if let Some(auth_type) = lookup(AUTH_TYPE_ENV) {
            self.auth_type =
                auth_type
                    .parse()
                    .map_err(|e: crate::api::CloudError| ConfigError::InvalidSetting {
                        setting: AUTH_TYPE_ENV.to_string(),
                        message: e.to_string(),
                    })?;
        }
        overlay(&mut self.api_key, lookup(APIKEY_ENV));
        overlay(&mut self.auth_url, lookup(AUTH_URL_ENV));
        overlay(&mut self.bearer_token, lookup(BEARER_TOKEN_ENV));
        overlay(&mut self.username, lookup(USERNAME_ENV));
        overlay(&mut self.password, lookup(PASSWORD_ENV));
        Ok(())
    }

    /// Build the authenticator for the configured scheme
    pub fn authenticator(&self) -> Result<Authenticator> {
        match self.auth_type {
            AuthType::NoAuth => Ok(Authenticator::NoAuth),
            AuthType::Iam => {
                let api_key = required(&self.api_key, APIKEY_ENV)?;
                Authenticator::iam(api_key, self.auth_url.clone()).map_err(|e| {
                    ConfigError::InvalidSetting {
                        setting: APIKEY_ENV.to_string(),
                        message: e.to_string(),
                    }
                })
            }
            AuthType::Bearer => Ok(Authenticator::bearer(required(
                &self.bearer_token,
                BEARER_TOKEN_ENV,
            )?)),
            AuthType::Basic => Ok(Authenticator::basic(
                required(&self.username, USERNAME_ENV)?,
                required(&self.password, PASSWORD_ENV)?,
            )),
        }
    }

    /// IAM endpoint that will be used
    pub fn effective_auth_url(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(DEFAULT_AUTH_URL)
    }

    pub fn build_client(&self) -> Result<CloudDatabasesClient> {
        CloudDatabasesClient::builder()
            .service_url(&self.service_url)
            .authenticator(self.authenticator()?)
            .build()
            .map_err(|e| ConfigError::InvalidSetting {
                setting: URL_ENV.to_string(),
                message: e.to_string(),
            })
    }
}

fn overlay(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}

fn required(value: &Option<String>, setting: &str) -> Result<String> {
    value
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingSetting {
            setting: setting.to_string(),
        })
}
