// crates/rhem-cli/src/main.rs
//
// CLI entrypoint for the RHEM platform developer tools.
//
// Talks JSON-RPC to a running rhem-daemon: token transfers and allowances,
// staking, trading, module registry, administration and node status.

mod commands;
mod output;
mod rpc_client;

use clap::{Parser, Subcommand};
use commands::admin::AdminCmd;
use commands::registry::RegistryCmd;
use commands::stake::StakeCmd;
use commands::token::TokenCmd;
use commands::trade::TradeCmd;
use commands::wallet::WalletCmd;
use commands::Context;
use output::OutputFormat;

/// RHEM CLI: developer tools for the RHEM token platform.
#[derive(Parser, Debug)]
#[command(
    name = "rhem",
    version = "0.1.0",
    about = "RHEM platform CLI: token, staking, trading and module registry"
)]
struct Cli {
    /// RPC endpoint for the rhem-daemon.
    #[arg(long, global = true, default_value = "http://localhost:50061")]
    rpc: String,

    /// Print raw JSON results instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Address helpers.
    #[command(subcommand)]
    Wallet(WalletCmd),

    /// Balances, transfers, allowances, mint, burn and claims.
    #[command(subcommand)]
    Token(TokenCmd),

    /// Staking: stake, unstake, positions, rewards, multipliers.
    #[command(subcommand)]
    Stake(StakeCmd),

    /// Trading: buy, sell, history.
    #[command(subcommand)]
    Trade(TradeCmd),

    /// Module registry: register, get.
    #[command(subcommand)]
    Registry(RegistryCmd),

    /// Pause, freeze, roles, reward pool allowance, platform fees.
    #[command(subcommand)]
    Admin(AdminCmd),

    /// Display node, supply and staking status.
    Status,

    /// Advance a manual-clock node.
    AdvanceTime {
        #[arg(long, default_value_t = 0)]
        days: u64,
        #[arg(long, default_value_t = 0)]
        seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let ctx = Context {
        rpc: cli.rpc.clone(),
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        },
    };

    match &cli.command {
        Commands::Wallet(cmd) => commands::wallet::run(cmd).await?,
        Commands::Token(cmd) => commands::token::run(&ctx, cmd).await?,
        Commands::Stake(cmd) => commands::stake::run(&ctx, cmd).await?,
        Commands::Trade(cmd) => commands::trade::run(&ctx, cmd).await?,
        Commands::Registry(cmd) => commands::registry::run(&ctx, cmd).await?,
        Commands::Admin(cmd) => commands::admin::run(&ctx, cmd).await?,
        Commands::Status => commands::node::status(&ctx).await?,
        Commands::AdvanceTime { days, seconds } => {
            commands::node::advance_time(&ctx, *days, *seconds).await?
        }
    }

    Ok(())
}
