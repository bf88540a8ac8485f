use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use clouddb_core::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::api::ApiCommandParams;
use connection::ConnectionManager;
use error::CtlError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    let conn_mgr = match load_connection_manager(cli.config_file.as_deref()) {
        Ok(conn_mgr) => conn_mgr,
        Err(e) => {
            e.print_diagnostic();
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }
}

/// Load configuration from the specified path or the default location
fn load_connection_manager(config_file: Option<&str>) -> Result<ConnectionManager, CtlError> {
    let (config, config_path) = if let Some(config_file) = config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    debug!(
        "Creating ConnectionManager with config_path: {:?}",
        config_path
    );
    Ok(ConnectionManager::with_config_path(config, config_path))
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "clouddbctl=warn,clouddb_core=warn",
            1 => "clouddbctl=info,clouddb_core=info",
            2 => "clouddbctl=debug,clouddb_core=debug",
            _ => "clouddbctl=trace,clouddb_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), CtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let profile = cli.profile.as_deref();
    let query = cli.query.as_deref();
    let fmt = cli.output;

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match fmt {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    let fmt = output::OutputFormat::resolve(fmt, output::OutputFormat::Json);
                    output::print_output(&output_data, fmt, None).map_err(CtlError::from)
                }
                _ => {
                    println!("clouddbctl {}", env!("CARGO_PKG_VERSION"));
                    Ok(())
                }
            }
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(())
        }
        Commands::Api { method, path, data } => {
            info!(
                "API call: {} {} {}",
                method,
                path,
                if data.is_some() { "with data" } else { "no data" }
            );
            commands::api::handle_api_command(
                conn_mgr,
                ApiCommandParams {
                    profile_name: profile,
                    method: *method,
                    path,
                    data: data.as_deref(),
                    query,
                    output_format: fmt,
                },
            )
            .await
        }
        Commands::Profile(cmd) => {
            commands::profile::handle_profile_command(cmd, conn_mgr, profile, fmt).await
        }
        Commands::Deployment(cmd) => {
            commands::deployment::handle_deployment_command(conn_mgr, profile, cmd, fmt, query)
                .await
        }
        Commands::Deployables(cmd) => {
            commands::deployables::handle_deployables_command(conn_mgr, profile, cmd, fmt, query)
                .await
        }
        Commands::Allowlist(cmd) => {
            commands::allowlist::handle_allowlist_command(conn_mgr, profile, cmd, fmt, query).await
        }
        Commands::User(cmd) => {
            commands::user::handle_user_command(conn_mgr, profile, cmd, fmt, query).await
        }
        Commands::Connection(cmd) => {
            commands::connection::handle_connection_command(conn_mgr, profile, cmd, fmt, query)
                .await
        }
        Commands::ReplicationSlot(cmd) => {
            commands::replication_slot::handle_replication_slot_command(
                conn_mgr, profile, cmd, fmt, query,
            )
            .await
        }
        Commands::Remote(cmd) => {
            commands::remote::handle_remote_command(conn_mgr, profile, cmd, fmt, query).await
        }
        Commands::Backup(cmd) => {
            commands::backup::handle_backup_command(conn_mgr, profile, cmd, fmt, query).await
        }
        Commands::Scaling(cmd) => {
            commands::scaling::handle_scaling_command(conn_mgr, profile, cmd, fmt, query).await
        }
        Commands::Autoscaling(cmd) => {
            commands::autoscaling::handle_autoscaling_command(conn_mgr, profile, cmd, fmt, query)
                .await
        }
        Commands::Task(cmd) => {
            commands::task::handle_task_command(conn_mgr, profile, cmd, fmt, query).await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name.as_deref().unwrap_or("(active)")),
                Set { name, .. } => format!("profile set {} [credentials redacted]", name),
                Remove { name, .. } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
        Commands::Api { method, path, .. } => format!("api {} {}", method, path),
        Commands::User(cli::UserCommands::Create { username, .. }) => {
            format!("user create {} [password redacted]", username)
        }
        Commands::User(cli::UserCommands::Password { username, .. }) => {
            format!("user password {} [password redacted]", username)
        }
        Commands::Connection(cli::ConnectionCommands::Complete { user_id, .. }) => {
            format!("connection complete {} [password redacted]", user_id)
        }
        Commands::Deployment(cmd) => format!("deployment {:?}", cmd),
        Commands::Deployables(cmd) => format!("deployables {:?}", cmd),
        Commands::Allowlist(cmd) => format!("allowlist {:?}", cmd),
        Commands::User(cmd) => format!("user {:?}", cmd),
        Commands::Connection(cmd) => format!("connection {:?}", cmd),
        Commands::ReplicationSlot(cmd) => format!("replication-slot {:?}", cmd),
        Commands::Remote(cmd) => format!("remote {:?}", cmd),
        Commands::Backup(cmd) => format!("backup {:?}", cmd),
        Commands::Scaling(cmd) => format!("scaling {:?}", cmd),
        Commands::Autoscaling(cmd) => format!("autoscaling {:?}", cmd),
        Commands::Task(cmd) => format!("task {:?}", cmd),
    }
}
