//! REST layer: client, authentication, errors and one handler per resource family

pub mod allowlists;
pub mod auth;
pub mod autoscaling;
pub mod backups;
pub mod client;
pub mod connections;
pub mod deployables;
pub mod deployments;
pub mod error;
pub mod remotes;
pub mod replication;
pub mod scaling;
pub mod tasks;
pub mod users;

pub use allowlists::{Allowlist, AllowlistEntry, AllowlistHandler};
pub use auth::{AuthType, Authenticator, IamAuthenticator};
pub use autoscaling::{AutoscalingGroup, AutoscalingHandler};
pub use backups::{Backup, BackupHandler, Backups};
pub use client::{ApiResponse, CloudDatabasesClient, CloudDatabasesClientBuilder};
pub use connections::{
    CompleteConnectionRequest, ConnectionHandler, ConnectionResponse, EndpointType,
};
pub use deployables::{Deployables, DeployablesHandler, Regions};
pub use deployments::{Deployment, DeploymentHandler, PitrData};
pub use error::{CloudError, Result};
pub use remotes::{RemoteHandler, Remotes, RemotesResponse};
pub use replication::{LogicalReplicationSlot, ReplicationSlotHandler};
pub use scaling::{Group, Groups, ScalingHandler, ScalingRequest};
pub use tasks::{Task, TaskHandler, TaskResponse, TaskStatus, Tasks};
pub use users::{CreateUserRequest, UserHandler, UserType};
