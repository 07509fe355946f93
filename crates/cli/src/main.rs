//! PRC Dispatch CLI - paced access to a private server from the command line

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prc_dispatch_core::port::UuidProvider;
use prc_dispatch_core::{DispatchFailure, ManagerConfig, QueueManager, DEFAULT_QUEUE};
use prc_dispatch_infra_http::ReqwestTransport;
use prc_dispatch_sdk::{DeepLinkFormat, PrcClient, ServerInfo};

use crate::config::AppConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "prc-dispatch")]
#[command(about = "Police Roleplay Community private-server CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file (default: ./prc-dispatch.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Private server API key
    #[arg(long, env = "PRC_SERVER_KEY", hide_env_values = true, global = true)]
    server_key: Option<String>,

    /// Application authorization key
    #[arg(long, env = "PRC_AUTHORIZATION_KEY", hide_env_values = true, global = true)]
    authorization: Option<String>,

    /// Queue to send through (default: "main")
    #[arg(short, long, global = true)]
    queue: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server information
    Info,

    /// Run an in-game command (leading ':' optional)
    Command {
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },

    /// Print a join link for the server
    DeepLink {
        /// prcWebsite, viaRobloxWeb or directToApp
        #[arg(short, long, default_value = "prcWebsite", value_parser = parse_format)]
        format: DeepLinkFormat,
    },

    /// Show configured queues
    Queues,
}

fn parse_format(raw: &str) -> std::result::Result<DeepLinkFormat, String> {
    raw.parse().map_err(|e: prc_dispatch_sdk::SdkError| e.to_string())
}

#[derive(Tabled)]
struct InfoRow {
    field: &'static str,
    value: String,
}

#[derive(Tabled)]
struct QueueRow {
    name: String,
    pace_ms: u64,
    capacity: String,
    pending: usize,
    running: bool,
}

fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("PRC_DISPATCH_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("prc_dispatch=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
    Ok(())
}

/// Wire transport and queues from configuration, and start every queue
///
/// `selected` is the `--queue` target; it is created with the default
/// settings when the config file does not list it.
fn build_manager(config: &AppConfig, selected: Option<&str>) -> Result<QueueManager> {
    let transport = ReqwestTransport::new(&config.http).context("Failed to create HTTP transport")?;

    // Settings for "main" also apply to queues created on first use
    let manager_config = ManagerConfig {
        default_queue: config
            .queue(DEFAULT_QUEUE)
            .map(|q| q.queue_config())
            .unwrap_or_default(),
        ..ManagerConfig::default()
    };
    let default_queue = manager_config.default_queue;
    let manager = QueueManager::new(Arc::new(transport), Arc::new(UuidProvider), manager_config);

    for queue in &config.queues {
        manager.ensure_queue(&queue.name, queue.queue_config())?;
    }
    if let Some(name) = selected {
        manager.ensure_queue(name, default_queue)?;
    }
    for name in manager.queue_names() {
        manager.start(&name);
    }

    debug!(queues = ?manager.queue_names(), "Queues started");
    Ok(manager)
}

fn print_info(info: &ServerInfo) {
    let rows = vec![
        InfoRow {
            field: "Name",
            value: info.name.clone(),
        },
        InfoRow {
            field: "Owner",
            value: info.owner_user_id.to_string(),
        },
        InfoRow {
            field: "Co-owners",
            value: info
                .co_owner_user_ids
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        },
        InfoRow {
            field: "Players",
            value: format!("{}/{}", info.player_count, info.max_player_count),
        },
        InfoRow {
            field: "Join code",
            value: info.join_code.clone(),
        },
        InfoRow {
            field: "Verification",
            value: info.account_verification_level_required.to_string(),
        },
        InfoRow {
            field: "Team balance",
            value: info.auto_team_balance_enabled.to_string(),
        },
    ];
    println!("{}", Table::new(rows));
}

fn print_queues(manager: &QueueManager) {
    let rows: Vec<QueueRow> = manager
        .queue_names()
        .iter()
        .filter_map(|name| manager.snapshot(name))
        .map(|snapshot| QueueRow {
            name: snapshot.name,
            pace_ms: snapshot.config.pace_interval.as_millis() as u64,
            capacity: snapshot.config.capacity.to_string(),
            pending: snapshot.pending,
            running: snapshot.running,
        })
        .collect();
    println!("{}", Table::new(rows));
}

/// Report failures broadcast while the command ran
fn report_failures(failures: &mut broadcast::Receiver<DispatchFailure>) {
    while let Ok(failure) = failures.try_recv() {
        eprintln!(
            "  {} [{}] {}",
            "✗".red(),
            failure.queue.yellow(),
            failure.error
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;
    debug!("PRC Dispatch v{}", VERSION);

    let config = AppConfig::load(cli.config.as_deref())?;
    let manager = build_manager(&config, cli.queue.as_deref())?;
    let mut failures = manager.subscribe();

    if let Commands::Queues = cli.command {
        print_queues(&manager);
        return Ok(());
    }

    let server_key = cli
        .server_key
        .context("A server key is required: pass --server-key or set PRC_SERVER_KEY")?;
    let client = PrcClient::new(manager.clone(), cli.authorization);
    let mut server = client.private_server(server_key)?;
    if let Some(queue) = cli.queue {
        server.set_default_queue(queue);
    }

    let outcome = match cli.command {
        Commands::Info => server.get_info(None).await.map(|info| print_info(&info)),

        Commands::Command { text } => {
            let command = text.join(" ");
            info!(command = %command, "Sending command");
            server.send_command(&command, None).await.map(|()| {
                println!("{}", "✓ Command sent".green().bold());
            })
        }

        Commands::DeepLink { format } => server
            .deep_link(format, None)
            .await
            .map(|link| println!("{}", link)),

        Commands::Queues => Ok(()),
    };

    report_failures(&mut failures);
    outcome.context("Request failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prc_dispatch_core::{Capacity, QueueConfig};
    use std::time::Duration;

    #[tokio::test]
    async fn test_build_manager_starts_configured_queues() {
        let config = AppConfig::from_toml(
            r#"
[[queues]]
name = "main"
pace_interval_ms = 100
capacity = 2

[[queues]]
name = "server:abc"
"#,
        )
        .unwrap();
        let manager = build_manager(&config, None).unwrap();

        assert_eq!(manager.queue_names(), vec!["main", "server:abc"]);
        for name in manager.queue_names() {
            assert!(manager.snapshot(&name).unwrap().running);
        }
    }

    #[tokio::test]
    async fn test_build_manager_starts_unconfigured_selected_queue() {
        let config = AppConfig::from_toml(
            r#"
[[queues]]
name = "main"
pace_interval_ms = 100
capacity = 2
"#,
        )
        .unwrap();
        assert!(config.queue("adhoc").is_none());

        let manager = build_manager(&config, Some("adhoc")).unwrap();
        let snapshot = manager.snapshot("adhoc").unwrap();
        assert!(snapshot.running);
        // Takes the settings configured for "main"
        assert_eq!(
            snapshot.config,
            QueueConfig::new(Duration::from_millis(100), Capacity::Bounded(2))
        );
    }

    #[tokio::test]
    async fn test_build_manager_rejects_invalid_selected_queue() {
        let config = AppConfig::default();
        assert!(build_manager(&config, Some("has spaces")).is_err());
    }
}
