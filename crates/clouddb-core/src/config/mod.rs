//! Configuration and profile management
//!
// Allow nested config module - this is intentional for the config subsystem
#![allow(clippy::module_inception)]
//!
//! Settings for reaching the service come from three places, highest
//! precedence first:
//!
//! - `CLOUD_DATABASES_*` environment variables
//! - a named profile in the TOML config file
//! - a `KEY=VALUE` credentials file (`cloud_databases_v5.env`)
//!
//! Profile values may reference environment variables (`${VAR}`,
//! `${VAR:-default}`) or, with the `secure-storage` feature, the OS keyring
//! (`keyring:<name>`).

pub mod config;
pub mod credential;
pub mod error;
pub mod settings;

pub use config::{Config, Profile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
pub use settings::{CredentialsFile, ServiceSettings};
