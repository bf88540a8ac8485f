//! Resource command definitions

use super::{DeploymentArg, WaitArgs};
use clap::Subcommand;
use clouddb_core::api::replication::DEFAULT_PLUGIN_TYPE;
use clouddb_core::api::{EndpointType, UserType};
use clouddb_core::progress::DEFAULT_MAX_ATTEMPTS;

/// Deployment commands
#[derive(Subcommand, Debug)]
pub enum DeploymentCommands {
    /// Show deployment details
    #[command(visible_alias = "show")]
    Get {
        #[command(flatten)]
        target: DeploymentArg,
    },

    /// List tasks running on or recently finished by the deployment
    Tasks {
        #[command(flatten)]
        target: DeploymentArg,
    },

    /// Change database configuration parameters
    #[command(after_help = "EXAMPLES:
    # Raise max_connections on PostgreSQL
    clouddbctl deployment configure --data '{\"max_connections\": 200}' --wait

    # From a file
    clouddbctl deployment configure --data @postgres-config.json
")]
    Configure {
        /// Configuration object (JSON string or @file)
        #[arg(long)]
        data: String,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Terminate every open connection to the database
    KillConnections {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Show the earliest point-in-time recovery timestamp
    Pitr {
        #[command(flatten)]
        target: DeploymentArg,
    },
}

/// Deployable catalogue commands
#[derive(Subcommand, Debug)]
pub enum DeployablesCommands {
    /// List deployable database types and versions
    #[command(visible_alias = "ls")]
    List,

    /// List regions where deployments can be provisioned
    Regions,

    /// Show default scaling groups for a database type
    Groups {
        /// Database type (e.g. postgresql, mongodb, redis)
        deployable_type: String,

        /// Restrict to one host flavor (e.g. multitenant, b3c.4x16.encrypted)
        #[arg(long)]
        host_flavor: Option<String>,
    },
}

/// Allowlist commands
#[derive(Subcommand, Debug)]
pub enum AllowlistCommands {
    /// Show the current allowlist and its version tag
    #[command(visible_alias = "list", visible_alias = "ls")]
    Get {
        #[command(flatten)]
        target: DeploymentArg,
    },

    /// Add an address or CIDR range
    Add {
        /// IPv4 address or CIDR range
        address: String,

        /// Free-text description of the entry
        #[arg(long, default_value = "")]
        description: String,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Remove an address or CIDR range
    #[command(visible_alias = "rm")]
    Delete {
        /// Address exactly as it appears in the allowlist
        address: String,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Replace the whole allowlist
    Set {
        /// Entries as a JSON array or {"ip_addresses": [...]} (string or @file)
        #[arg(long)]
        data: String,

        /// Only replace if the list still has this version tag (from `allowlist get`)
        #[arg(long)]
        if_match: Option<String>,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Database user commands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user
    #[command(visible_alias = "add")]
    Create {
        /// Username
        username: String,

        /// Password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,

        /// Kind of user
        #[arg(long = "type", value_enum, default_value = "database")]
        user_type: UserType,

        /// Role, for Ops Manager users (group_read_only, group_data_access_admin)
        #[arg(long)]
        role: Option<String>,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a user
    #[command(visible_alias = "rm")]
    Delete {
        /// Username
        username: String,

        /// Kind of user
        #[arg(long = "type", value_enum, default_value = "database")]
        user_type: UserType,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Change a user's password
    Password {
        /// Username (`admin` for the deployment admin)
        username: String,

        /// New password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,

        /// Kind of user
        #[arg(long = "type", value_enum, default_value = "database")]
        user_type: UserType,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Connection string commands
#[derive(Subcommand, Debug)]
pub enum ConnectionCommands {
    /// Show connection strings with placeholders
    Get {
        /// User the connection strings are for
        user_id: String,

        /// Kind of user
        #[arg(long = "type", value_enum, default_value = "database")]
        user_type: UserType,

        /// Endpoint to connect through
        #[arg(long, value_enum, default_value = "public")]
        endpoint: EndpointType,

        /// Local path where the CA certificate will be stored
        #[arg(long)]
        certificate_root: Option<String>,

        #[command(flatten)]
        target: DeploymentArg,
    },

    /// Show connection strings with the password filled in
    Complete {
        /// User the connection strings are for
        user_id: String,

        /// Kind of user
        #[arg(long = "type", value_enum, default_value = "database")]
        user_type: UserType,

        /// Endpoint to connect through
        #[arg(long, value_enum, default_value = "public")]
        endpoint: EndpointType,

        /// Password to substitute for the placeholder
        #[arg(long)]
        password: Option<String>,

        /// Local path where the CA certificate will be stored
        #[arg(long)]
        certificate_root: Option<String>,

        #[command(flatten)]
        target: DeploymentArg,
    },
}

/// Logical replication slot commands
#[derive(Subcommand, Debug)]
pub enum ReplicationSlotCommands {
    /// Create a logical replication slot
    Create {
        /// Slot name
        name: String,

        /// Database the slot replicates
        #[arg(long)]
        database: String,

        /// Output plugin
        #[arg(long, default_value = DEFAULT_PLUGIN_TYPE)]
        plugin_type: String,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Delete a logical replication slot
    #[command(visible_alias = "rm")]
    Delete {
        /// Slot name
        name: String,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Read-only replica commands
#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// Show the leader and replicas of a deployment
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        target: DeploymentArg,
    },

    /// Re-seed a read-only replica from its leader
    Resync {
        /// Replica CRN (defaults to $REPLICA_ID, then the profile's replica_id)
        #[arg(long)]
        replica: Option<String>,

        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Promote a read-only replica to a standalone deployment
    Promote {
        /// Replica CRN (defaults to $REPLICA_ID, then the profile's replica_id)
        #[arg(long)]
        replica: Option<String>,

        /// Skip the backup normally taken right after promotion
        #[arg(long)]
        skip_initial_backup: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Backup commands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// List backups of a deployment
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        target: DeploymentArg,
    },

    /// Show one backup
    Get {
        /// Backup CRN
        backup_id: String,
    },

    /// Start an on-demand backup
    Start {
        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Manual scaling commands
#[derive(Subcommand, Debug)]
pub enum ScalingCommands {
    /// Show current scaling groups and their limits
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        target: DeploymentArg,
    },

    /// Resize a scaling group
    #[command(after_help = "EXAMPLES:
    # Give each member 8 GiB of memory
    clouddbctl scaling set member --memory-mb 8192 --wait

    # Move to a dedicated host flavor
    clouddbctl scaling set member --host-flavor b3c.4x16.encrypted
")]
    Set {
        /// Group id (usually `member`)
        group_id: String,

        /// Number of members
        #[arg(long)]
        members: Option<i64>,

        /// Total memory in MB
        #[arg(long)]
        memory_mb: Option<i64>,

        /// Total dedicated CPU count
        #[arg(long)]
        cpu_count: Option<i64>,

        /// Total disk in MB
        #[arg(long)]
        disk_mb: Option<i64>,

        /// Host flavor id
        #[arg(long)]
        host_flavor: Option<String>,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Autoscaling commands
#[derive(Subcommand, Debug)]
pub enum AutoscalingCommands {
    /// Show autoscaling rules for a scaling group
    Get {
        /// Group id
        #[arg(default_value = "member")]
        group_id: String,

        #[command(flatten)]
        target: DeploymentArg,
    },

    /// Replace autoscaling rules for a scaling group
    #[command(after_help = "EXAMPLES:
    # Grow disk by 10% when free space drops under 15%
    clouddbctl autoscaling set member --data '{
        \"disk\": {
            \"scalers\": {\"capacity\": {\"enabled\": true, \"free_space_less_than_percent\": 15}},
            \"rate\": {\"increase_percent\": 10.0, \"period_seconds\": 900, \"limit_mb_per_member\": 3670016, \"units\": \"mb\"}
        }
    }'
")]
    Set {
        /// Group id
        #[arg(default_value = "member")]
        group_id: String,

        /// Autoscaling rules (JSON string or @file)
        #[arg(long)]
        data: String,

        #[command(flatten)]
        target: DeploymentArg,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Task commands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Show the current state of a task
    #[command(visible_alias = "show")]
    Get {
        /// Task id
        task_id: String,
    },

    /// Poll a task until it finishes
    Wait {
        /// Task id
        task_id: String,

        /// Maximum number of status checks
        #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        attempts: u32,

        /// Seconds between status checks
        #[arg(long, default_value = "2")]
        interval: u64,
    },
}
