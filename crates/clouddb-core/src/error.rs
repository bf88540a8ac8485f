//! Unified error handling for clouddb-core
//!
//! Wraps REST errors and adds the task-level outcomes of polling, with the
//! same classification helpers as [`CloudError`].
//!
//! # Example
//!
//! ```rust
//! use clouddb_core::{CloudError, CoreError};
//!
//! fn handle_error(err: CoreError) {
//!     if err.is_not_found() {
//!         println!("Resource not found");
//!     } else if err.is_retryable() {
//!         println!("Temporary error, can retry");
//!     }
//! }
//!
//! let cloud_err = CloudError::NotFound { message: "no deployment".to_string() };
//! let core_err: CoreError = cloud_err.into();
//! assert!(core_err.is_not_found());
//! ```

use crate::api::CloudError;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error from the REST API or transport
    #[error("Cloud Databases API error: {0}")]
    Cloud(#[from] CloudError),

    /// Attempt budget exhausted before the task reached a terminal state
    #[error("Task {task_id} did not finish after {attempts} status checks")]
    TaskTimeout { task_id: String, attempts: u32 },

    /// Task ended in `failed`, or no task was returned for a mutating call
    #[error("Task failed: {message}")]
    TaskFailed { task_id: String, message: String },

    /// Input rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl From<crate::config::ConfigError> for CoreError {
    fn from(err: crate::config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl CoreError {
    /// Task failure with no associated task id
    pub(crate) fn missing_task_id() -> Self {
        CoreError::TaskFailed {
            task_id: String::new(),
            message: "No task ID returned".to_string(),
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::Cloud(e) if e.is_not_found())
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CoreError::Cloud(e) if e.is_unauthorized())
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, CoreError::Cloud(e) if e.is_server_error())
    }

    /// Returns true if this is a timeout, including an exhausted poll budget
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_timeout(),
            CoreError::TaskTimeout { .. } => true,
            _ => false,
        }
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, CoreError::Cloud(e) if e.is_rate_limited())
    }

    /// Returns true if this is a conflict/precondition error (409/412)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Cloud(e) if e.is_conflict())
    }

    /// Returns true if this is a bad request error (400) or local validation failure
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_bad_request(),
            CoreError::Validation(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Cloud(e) => e.is_retryable(),
            CoreError::TaskTimeout { .. } => true,
            _ => false,
        }
    }
}
