//! Error types for clouddbctl
//!
//! Every failure funnels into [`CtlError`], which knows how to print itself
//! as a cargo-style diagnostic with follow-up suggestions.

use clouddb_core::{CloudError, ConfigError, CoreError};
use colored::Colorize;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Missing required setting: CLOUD_DATABASES_APIKEY
///
///   tip: set the API key for the active profile:
///       clouddbctl profile set <name> --api-key <key>
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the clouddbctl application
#[derive(Error, Debug)]
pub enum CtlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'clouddbctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Missing required setting: {setting}")]
    MissingSetting { setting: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Precondition failed: {message}")]
    PreconditionFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for clouddbctl operations
pub type Result<T> = std::result::Result<T, CtlError>;

impl CtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CtlError::ProfileNotFound { name } => vec![
                "List available profiles: clouddbctl profile list".to_string(),
                format!("Create profile '{}': clouddbctl profile set {}", name, name),
            ],
            CtlError::NoProfileConfigured => vec![
                "Create a profile: clouddbctl profile set dev --api-key <key>".to_string(),
                "Or export CLOUD_DATABASES_APIKEY and DEPLOYMENT_ID".to_string(),
            ],
            CtlError::MissingSetting { setting } if setting.contains("deployment") => vec![
                "Pass --deployment <crn>".to_string(),
                "Or export DEPLOYMENT_ID=<crn>".to_string(),
                "Or store it on the profile: clouddbctl profile set <name> --deployment <crn>"
                    .to_string(),
            ],
            CtlError::MissingSetting { setting } if setting.contains("REPLICA_ID") => vec![
                "Pass --replica <crn> or export REPLICA_ID=<crn>".to_string(),
            ],
            CtlError::MissingSetting { .. } => vec![
                "Check profile details: clouddbctl profile show".to_string(),
                "Verify CLOUD_DATABASES_* environment variables are set correctly".to_string(),
            ],
            CtlError::AuthenticationFailed { .. } => vec![
                "Check your credentials: clouddbctl profile show <profile>".to_string(),
                "For IAM, verify the API key and CLOUD_DATABASES_AUTH_URL".to_string(),
            ],
            CtlError::NotFound { .. } => vec![
                "Verify the deployment CRN or resource id is correct".to_string(),
                "Check that you're using the correct profile and service URL".to_string(),
            ],
            CtlError::PreconditionFailed { .. } => vec![
                "The resource changed since it was read; fetch it again: clouddbctl allowlist get"
                    .to_string(),
            ],
            CtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the service URL: clouddbctl profile show <profile>".to_string(),
            ],
            CtlError::Timeout { .. } => vec![
                "The task may still be running; check it with: clouddbctl task get <task-id>"
                    .to_string(),
                "Allow more checks with --wait-attempts or a longer --wait-interval".to_string(),
            ],
            CtlError::TaskFailed { task_id, .. } if !task_id.is_empty() => vec![format!(
                "Inspect the task: clouddbctl task get {}",
                task_id
            )],
            CtlError::InvalidInput { .. } => vec![
                "Check the command syntax: clouddbctl <command> --help".to_string(),
                "Verify input is valid JSON".to_string(),
            ],
            CtlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify file permissions are correct".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let CtlError::Timeout { .. } = self {
            diag = diag.detail("Waiting stopped; the operation itself was not cancelled.");
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<CloudError> for CtlError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::AuthenticationFailed { message } | CloudError::Forbidden { message } => {
                CtlError::AuthenticationFailed { message }
            }
            CloudError::TokenError(message) => CtlError::AuthenticationFailed { message },
            CloudError::NotFound { message } => CtlError::NotFound { message },
            CloudError::PreconditionFailed { message } => CtlError::PreconditionFailed { message },
            CloudError::BadRequest { message } => CtlError::InvalidInput { message },
            CloudError::ConnectionError(message) => CtlError::ConnectionError { message },
            CloudError::Timeout(message) => CtlError::Timeout { message },
            CloudError::Configuration(message) => CtlError::Config(message),
            _ => CtlError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => CtlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => CtlError::NoProfileConfigured,
            ConfigError::MissingSetting { setting } => CtlError::MissingSetting { setting },
            other => CtlError::Config(other.to_string()),
        }
    }
}

impl From<CoreError> for CtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Cloud(cloud_err) => CtlError::from(cloud_err),
            CoreError::TaskTimeout { task_id, attempts } => CtlError::Timeout {
                message: format!(
                    "Task {} did not finish after {} status checks",
                    task_id, attempts
                ),
            },
            CoreError::TaskFailed { task_id, message } => CtlError::TaskFailed { task_id, message },
            CoreError::Validation(message) => CtlError::InvalidInput { message },
            CoreError::Config(message) => CtlError::Config(message),
        }
    }
}

impl From<serde_json::Error> for CtlError {
    fn from(err: serde_json::Error) -> Self {
        CtlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for CtlError {
    fn from(err: std::io::Error) -> Self {
        CtlError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for CtlError {
    fn from(err: anyhow::Error) -> Self {
        CtlError::Config(format!("{:#}", err))
    }
}
