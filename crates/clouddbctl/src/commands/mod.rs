//! Command implementations

pub mod allowlist;
pub mod api;
pub mod autoscaling;
pub mod backup;
pub mod connection;
pub mod deployables;
pub mod deployment;
pub mod profile;
pub mod remote;
pub mod replication_slot;
pub mod scaling;
pub mod task;
pub mod user;
pub mod utils;
pub mod wait;
