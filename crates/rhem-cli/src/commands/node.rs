// crates/rhem-cli/src/commands/node.rs
//
// `rhem status` and `rhem advance-time`: node information and development
// clock control.

use serde_json::json;

use rhem_core::SECONDS_PER_DAY;

use super::Context;
use crate::output::{format_json, print_fields, rhem, text, OutputFormat};

/// Print node, token and staking summary.
pub async fn status(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let node = ctx.call("node/info", json!({})).await?;
    let ledger = ctx.call("ledger/info", json!({})).await?;
    let totals = ctx.call("staking/totals", json!({})).await?;

    if ctx.format == OutputFormat::Json {
        let combined = json!({ "node": node, "ledger": ledger, "staking": totals });
        println!("{}", format_json(&combined));
        return Ok(());
    }

    let paused: Vec<String> = node["paused"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .map(text)
        .collect();
    let addresses = &node["addresses"];
    print_fields(
        ctx.format,
        &node,
        &[
            ("RPC endpoint", ctx.rpc.clone()),
            ("Version", text(&node["version"])),
            ("Uptime (s)", text(&node["uptime_seconds"])),
            ("Clock", text(&node["clock"])),
            ("Now", text(&node["now"])),
            ("Paused", if paused.is_empty() { "none".to_string() } else { paused.join(", ") }),
            ("Total supply", rhem(&ledger["total_supply"])),
            ("Total staked", rhem(&totals["total_staked"])),
            ("Reward pool available", rhem(&totals["reward_pool_available"])),
            ("Staking engine", text(&addresses["staking"])),
            ("Reward pool", text(&addresses["reward_pool"])),
            ("Trading engine", text(&addresses["trading"])),
            ("Fee collector", text(&addresses["fee_collector"])),
        ],
    );
    Ok(())
}

/// Move a manual-clock node forward.
pub async fn advance_time(
    ctx: &Context,
    days: u64,
    seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let total = days.saturating_mul(SECONDS_PER_DAY).saturating_add(seconds);
    let r = ctx
        .call("node/advance_time", json!({ "seconds": total }))
        .await?;
    print_fields(ctx.format, &r, &[("Now", text(&r["now"]))]);
    Ok(())
}
