// crates/rhem-cli/src/commands/stake.rs
//
// `rhem stake {stake, unstake, positions, rewards, totals, multipliers,
// set-multiplier}`: staking commands.

use clap::Subcommand;
use serde_json::json;
use tabled::Tabled;

use rhem_core::Address;
use rhem_economics::{Rhem, LOCK_PERIOD_LABELS};

use super::{parse_rhem, units, Context};
use crate::output::{format_json, format_table, print_fields, rhem, text, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum StakeCmd {
    /// Lock RHEM for a period. Approve the staking engine first
    /// (`rhem status` shows its address).
    Stake {
        #[arg(long)]
        caller: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
        /// Lock period selector, 0-7 (see `rhem stake multipliers`).
        #[arg(long)]
        period: usize,
    },
    /// Withdraw a matured position with its reward.
    Unstake {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        index: usize,
    },
    /// List an account's positions.
    Positions { account: Address },
    /// Projected payout of one position at the current time.
    Rewards { account: Address, index: usize },
    /// Platform-wide (and optionally per-account) staked totals.
    Totals {
        #[arg(long)]
        account: Option<Address>,
    },
    /// Lock periods and their reward multipliers.
    Multipliers,
    /// Change a period's multiplier (Governance role).
    SetMultiplier {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        period: usize,
        /// Multiplier in basis points of principal.
        #[arg(long)]
        bp: u32,
    },
}

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Lock")]
    lock: String,
    #[tabled(rename = "Multiplier (bp)")]
    multiplier: String,
    #[tabled(rename = "Unlocks at")]
    unlocks_at: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Reward")]
    reward: String,
}

#[derive(Tabled)]
struct MultiplierRow {
    #[tabled(rename = "Period")]
    selector: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Multiplier (bp)")]
    multiplier: String,
}

pub async fn run(ctx: &Context, cmd: &StakeCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        StakeCmd::Stake {
            caller,
            amount,
            period,
        } => {
            let label = LOCK_PERIOD_LABELS.get(*period).copied().unwrap_or("?");
            let r = ctx
                .call(
                    "staking/stake",
                    json!({ "caller": caller, "amount": units(amount), "selector": period }),
                )
                .await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Position", text(&r["index"])),
                    ("Staked", amount.to_string()),
                    ("Lock", label.to_string()),
                    ("Unlocks at", text(&r["unlocks_at"])),
                    ("Total staked by caller", rhem(&r["total_user_staked"])),
                ],
            );
        }
        StakeCmd::Unstake { caller, index } => {
            let r = ctx
                .call("staking/unstake", json!({ "caller": caller, "index": index }))
                .await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Position", text(&r["index"])),
                    ("Principal", rhem(&r["principal"])),
                    ("Reward", rhem(&r["reward"])),
                    ("Payout", rhem(&r["payout"])),
                ],
            );
        }
        StakeCmd::Positions { account } => {
            let r = ctx
                .call("staking/positions", json!({ "account": account }))
                .await?;
            match ctx.format {
                OutputFormat::Json => println!("{}", format_json(&r)),
                OutputFormat::Table => {
                    let rows: Vec<PositionRow> = r["positions"]
                        .as_array()
                        .map(Vec::as_slice)
                        .unwrap_or(&[])
                        .iter()
                        .map(|p| PositionRow {
                            index: text(&p["index"]),
                            amount: rhem(&p["amount"]),
                            lock: text(&p["lock_label"]),
                            multiplier: text(&p["multiplier_bp"]),
                            unlocks_at: text(&p["unlocks_at"]),
                            state: text(&p["state"]),
                            reward: if p["reward"].is_null() {
                                "-".to_string()
                            } else {
                                rhem(&p["reward"])
                            },
                        })
                        .collect();
                    if rows.is_empty() {
                        println!("No positions for {}", account);
                    } else {
                        println!("{}", format_table(&rows));
                    }
                    println!("Total staked: {}", rhem(&r["total_user_staked"]));
                }
            }
        }
        StakeCmd::Rewards { account, index } => {
            let r = ctx
                .call("staking/rewards", json!({ "account": account, "index": index }))
                .await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Reward", rhem(&r["reward"])),
                    ("Payout", rhem(&r["payout"])),
                    ("Unlocks at", text(&r["unlocks_at"])),
                    ("Now", text(&r["now"])),
                ],
            );
        }
        StakeCmd::Totals { account } => {
            let r = ctx
                .call("staking/totals", json!({ "account": account }))
                .await?;
            let mut fields = vec![
                ("Total staked", rhem(&r["total_staked"])),
                ("Reward pool available", rhem(&r["reward_pool_available"])),
            ];
            if !r["user_staked"].is_null() {
                fields.push(("Account staked", rhem(&r["user_staked"])));
            }
            print_fields(ctx.format, &r, &fields);
        }
        StakeCmd::Multipliers => {
            let r = ctx.call("staking/multiplier", json!({})).await?;
            print_multipliers(ctx, &r);
        }
        StakeCmd::SetMultiplier { caller, period, bp } => {
            let r = ctx
                .call(
                    "staking/set_multiplier",
                    json!({ "caller": caller, "selector": period, "multiplier_bp": bp }),
                )
                .await?;
            print_multipliers(ctx, &json!({ "multipliers": [r] }));
        }
    }
    Ok(())
}

fn print_multipliers(ctx: &Context, r: &serde_json::Value) {
    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(r)),
        OutputFormat::Table => {
            let rows: Vec<MultiplierRow> = r["multipliers"]
                .as_array()
                .map(Vec::as_slice)
                .unwrap_or(&[])
                .iter()
                .map(|m| MultiplierRow {
                    selector: text(&m["selector"]),
                    label: text(&m["label"]),
                    days: text(&m["lock_days"]),
                    multiplier: text(&m["multiplier_bp"]),
                })
                .collect();
            println!("{}", format_table(&rows));
        }
    }
}
