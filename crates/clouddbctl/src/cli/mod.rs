//! CLI structure and command definitions
//!
//! Two layers share one binary:
//! 1. Raw API access (`api` commands)
//! 2. Resource commands (`deployment`, `allowlist`, `user`, ...) built on the
//!    typed handlers, each mutating command optionally waiting on its task

use clap::{Args, Parser, Subcommand};
use clouddb_core::api::AuthType;
use clouddb_core::progress::DEFAULT_MAX_ATTEMPTS;
use clouddb_core::PollPolicy;
use std::time::Duration;

pub mod resources;

pub use resources::*;

/// Cloud Databases management CLI
#[derive(Parser, Debug)]
#[command(name = "clouddbctl")]
#[command(version, about = "Cloud Databases management CLI")]
#[command(long_about = "
Cloud Databases management CLI

Manage allowlists, users, backups, scaling and more on a provisioned
deployment. Every change is asynchronous; pass --wait to block until the
resulting task finishes.

EXAMPLES:
    # Set up a profile using an IAM API key
    clouddbctl profile set dev --api-key KEY --deployment crn:v1:...

    # Show the deployment
    clouddbctl deployment get

    # Add an allowlist entry and wait for it to apply
    clouddbctl allowlist add 172.16.0.0/16 --description 'Dev IP space 3' --wait

    # Filter output with JMESPath
    clouddbctl backup list -q 'backups[?type==`scheduled`].id'

    # Direct API access
    clouddbctl api get /deployables

For more help on a specific command, run:
    clouddbctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "CLOUDDBCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "CLOUDDBCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// JMESPath query to filter output
    #[arg(long, short = 'q', global = true)]
    pub query: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table for lists, JSON for everything else
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Deployment selector shared by every deployment-scoped command
#[derive(Args, Debug, Clone, Default)]
pub struct DeploymentArg {
    /// Deployment CRN (defaults to $DEPLOYMENT_ID, then the profile's deployment_id)
    #[arg(long, short = 'd')]
    pub deployment: Option<String>,
}

/// `--wait` flags shared by every mutating command
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Wait for the resulting task to finish
    #[arg(long)]
    pub wait: bool,

    /// Maximum number of task status checks
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, requires = "wait")]
    pub wait_attempts: u32,

    /// Seconds between task status checks
    #[arg(long, default_value = "2", requires = "wait")]
    pub wait_interval: u64,
}

impl WaitArgs {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy::new(self.wait_attempts, Duration::from_secs(self.wait_interval))
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Raw API access - direct REST endpoint calls
    #[command(name = "api")]
    #[command(after_help = "EXAMPLES:
    # List deployable database types
    clouddbctl api get /deployables

    # Read a task
    clouddbctl api get /tasks/5abb6a7d11a1a5001479a0b0

    # POST request with JSON data
    clouddbctl api post /deployments/CRN/users/database --data '{\"user\":{\"username\":\"u\",\"password\":\"p\"}}'

    # POST request from file
    clouddbctl api post /deployments/CRN/users/database --data @user.json
")]
    Api {
        /// HTTP method
        #[arg(value_parser = parse_http_method)]
        method: HttpMethod,

        /// API endpoint path relative to the service URL (e.g., /deployables)
        path: String,

        /// Request body (JSON string or @file)
        #[arg(long)]
        data: Option<String>,
    },

    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create an IAM profile
    clouddbctl profile set dev --api-key KEY --deployment crn:v1:...

    # Create a profile that talks to a local mock without auth
    clouddbctl profile set local --service-url http://localhost:8080 --auth-type noauth

    # List all profiles
    clouddbctl profile list

    # Make a profile the default
    clouddbctl profile default dev
")]
    Profile(ProfileCommands),

    /// Deployment information and deployment-wide operations
    #[command(subcommand, visible_alias = "dep")]
    Deployment(DeploymentCommands),

    /// Deployable database types, regions and default scaling groups
    #[command(subcommand)]
    Deployables(DeployablesCommands),

    /// IP allowlist management
    #[command(subcommand, visible_alias = "al")]
    #[command(after_help = "EXAMPLES:
    # Show the allowlist
    clouddbctl allowlist get

    # Add a CIDR range and wait for the change
    clouddbctl allowlist add 172.16.0.0/16 --description 'Dev IP space 3' --wait

    # Replace the whole list from a file, guarded by the current version
    clouddbctl allowlist set --data @allowlist.json --if-match '\"etag\"'
")]
    Allowlist(AllowlistCommands),

    /// Database users
    #[command(subcommand)]
    User(UserCommands),

    /// Connection strings
    #[command(subcommand, visible_alias = "conn")]
    Connection(ConnectionCommands),

    /// Logical replication slots (PostgreSQL)
    #[command(subcommand)]
    ReplicationSlot(ReplicationSlotCommands),

    /// Read-only replicas
    #[command(subcommand)]
    Remote(RemoteCommands),

    /// Backups
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Manual scaling
    #[command(subcommand)]
    Scaling(ScalingCommands),

    /// Autoscaling rules
    #[command(subcommand)]
    Autoscaling(AutoscalingCommands),

    /// Task inspection and waiting
    #[command(subcommand)]
    Task(TaskCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// HTTP methods for raw API access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Parse HTTP method case-insensitively
fn parse_http_method(s: &str) -> Result<HttpMethod, String> {
    match s.to_lowercase().as_str() {
        "get" => Ok(HttpMethod::Get),
        "post" => Ok(HttpMethod::Post),
        "put" => Ok(HttpMethod::Put),
        "patch" => Ok(HttpMethod::Patch),
        "delete" => Ok(HttpMethod::Delete),
        _ => Err(format!(
            "invalid HTTP method: {} (valid: get, post, put, patch, delete)",
            s
        )),
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show (defaults to the active profile)
        name: Option<String>,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    #[command(after_help = "EXAMPLES:
    # IAM API key (the default auth type)
    clouddbctl profile set prod --api-key $IBMCLOUD_API_KEY \\
        --service-url https://api.eu-de.databases.cloud.ibm.com/v5/ibm \\
        --deployment crn:v1:bluemix:public:databases-for-postgresql:eu-de:a/abc::

    # Reference an environment variable instead of storing the key
    clouddbctl profile set ci --api-key '${CLOUDDB_CI_APIKEY}'

    # Pre-issued bearer token
    clouddbctl profile set tmp --auth-type bearer --bearer-token TOKEN

    # Basic auth (password will be prompted)
    clouddbctl profile set lab --auth-type basic --username admin
")]
    Set {
        /// Profile name
        name: String,

        /// Service base URL
        #[arg(long)]
        service_url: Option<String>,

        /// Authentication scheme
        #[arg(long, value_enum, default_value = "iam")]
        auth_type: AuthType,

        /// IAM API key
        #[arg(long)]
        api_key: Option<String>,

        /// IAM token service base URL
        #[arg(long)]
        auth_url: Option<String>,

        /// Bearer token (for --auth-type bearer)
        #[arg(long)]
        bearer_token: Option<String>,

        /// Username (for --auth-type basic)
        #[arg(long)]
        username: Option<String>,

        /// Password (for --auth-type basic; prompted if omitted)
        #[arg(long)]
        password: Option<String>,

        /// Default deployment CRN for this profile
        #[arg(long)]
        deployment: Option<String>,

        /// Default read-only replica CRN for this profile
        #[arg(long)]
        replica: Option<String>,

        /// Store secrets in the OS keyring
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Set the default profile
    #[command(visible_alias = "def")]
    Default {
        /// Profile name
        name: String,
    },
}
