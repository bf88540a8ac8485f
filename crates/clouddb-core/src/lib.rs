//! # clouddb-core
//!
//! Client library for the managed-database control-plane REST API.
//!
//! Most mutating calls are asynchronous on the server side: they answer
//! `202 Accepted` with a task, and the caller polls that task until it
//! completes. This crate provides:
//!
//! - **[`api`]** - the REST client, authentication and one handler per
//!   resource family (allowlists, users, backups, scaling, ...)
//! - **[`progress`]** - [`poll_task`], the bounded task poller
//! - **[`workflows`]** - "submit and wait" helpers built on the two above
//! - **[`config`]** - TOML profiles, credentials file and environment
//!   resolution into a ready client
//! - **[`context`]** - the deployment/replica ids a session works against
//!
//! ## Example
//!
//! ```rust,ignore
//! use clouddb_core::api::{AllowlistEntry, AllowlistHandler};
//! use clouddb_core::{Config, DeploymentContext, PollPolicy, ServiceSettings, poll_task};
//!
//! let config = Config::load()?;
//! let profile = config.active_profile(None)?;
//! let client = ServiceSettings::resolve(profile, true)?.build_client()?;
//! let ctx = DeploymentContext::resolve(None, &config, None)?;
//!
//! let response = AllowlistHandler::new(client.clone())
//!     .add_allowlist_entry(&ctx.deployment_id, &AllowlistEntry::new("172.16.0.0/16", "Dev IP space 3"))
//!     .await?;
//! if let Some(task_id) = response.task_id() {
//!     poll_task(&client, task_id, PollPolicy::default(), None).await?;
//! }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod workflows;

pub use api::{Authenticator, AuthType, CloudDatabasesClient, CloudError};
pub use config::{Config, ConfigError, Profile, ServiceSettings};
pub use context::DeploymentContext;
pub use error::{CoreError, Result};
pub use progress::{PollPolicy, ProgressCallback, ProgressEvent, TaskCompletion, poll_task};
