// crates/rhem-daemon/src/main.rs
//
// Binary entrypoint for the RHEM platform daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, deploys the
// platform (or restores it from a snapshot), and serves JSON-RPC until
// interrupted. On ctrl-c the server drains and, with snapshots enabled, the
// final state is written to disk.

mod config;
mod shared;
mod snapshot;

use clap::Parser;
use config::{ClockMode, DaemonConfig};
use shared::DaemonSharedState;

use rhem_core::{Clock, SystemClock};
use rhem_economics::{Platform, Rhem};
use rhem_rpc::{RhemRpcServer, RpcConfig};

/// RHEM platform daemon: ledger, staking, trading and registry over JSON-RPC.
#[derive(Parser, Debug)]
#[command(name = "rhem-daemon", version = "0.1.0", about = "RHEM platform node daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.rhem/config.toml")]
    config: String,

    /// Override the configured RPC port.
    #[arg(long)]
    rpc_port: Option<u16>,

    /// Override the configured clock: system or manual.
    #[arg(long)]
    clock: Option<ClockMode>,

    /// Override the configured data directory.
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found. Logged once tracing is up.
    let config_path = expand_tilde(&args.config);
    let loaded = DaemonConfig::load(&config_path);
    let mut daemon_config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => DaemonConfig::default(),
    };

    // CLI flags override the config file values.
    if let Some(port) = args.rpc_port {
        daemon_config.rpc_port = port;
    }
    if let Some(clock) = args.clock {
        daemon_config.clock = clock;
    }
    if let Some(dir) = args.data_dir {
        daemon_config.data_dir = dir;
    }

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match loaded {
        Ok(_) => tracing::info!("Loaded configuration from {}", config_path),
        Err(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path,
            e
        ),
    }

    tracing::info!("RHEM Platform Daemon v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {}", daemon_config.data_dir);
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!("Clock: {:?}", daemon_config.clock);

    // ---------------------------------------------------------------
    // Platform: restore from snapshot or deploy fresh.
    // ---------------------------------------------------------------
    let data_dir = expand_tilde(&daemon_config.data_dir);
    let snapshot_path = snapshot::snapshot_path(&data_dir);

    let restored = if daemon_config.snapshot {
        snapshot::load(&snapshot_path)?
    } else {
        None
    };

    let platform = match restored {
        Some(platform) => platform,
        None => {
            let deployment = daemon_config.deployment()?;
            let now = SystemClock.now();
            let platform = Platform::deploy(&deployment, now)?;
            tracing::info!(
                "Deployed platform at {} with initial supply {}",
                format_timestamp(now),
                Rhem(deployment.initial_supply)
            );
            platform
        }
    };

    tracing::info!("Total supply: {}", Rhem(platform.ledger().total_supply()));
    tracing::info!("Staking engine: {}", platform.staking().address());
    tracing::info!("Reward pool: {}", platform.reward_pool().address());
    tracing::info!("Trading engine: {}", platform.trading().address());
    tracing::info!("Fee collector: {}", platform.fees().collector());

    let shared = DaemonSharedState::new(platform, daemon_config.clock);

    // ---------------------------------------------------------------
    // RPC server, until ctrl-c.
    // ---------------------------------------------------------------
    let rpc_config = RpcConfig {
        host: daemon_config.rpc_host.clone(),
        port: daemon_config.rpc_port,
    };
    let server = RhemRpcServer::new(rpc_config, shared.rpc_service());

    server
        .start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown requested");
        })
        .await?;

    if daemon_config.snapshot {
        let platform = shared.platform.read().await;
        snapshot::save(&snapshot_path, &platform)?;
    }

    tracing::info!("Daemon stopped");
    Ok(())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    path.to_string()
}

fn format_timestamp(ts: u64) -> String {
    chrono::DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
