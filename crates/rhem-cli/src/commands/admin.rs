// crates/rhem-cli/src/commands/admin.rs
//
// `rhem admin ...` runs owner and governance operations: pause flags,
// account freezes, roles, the reward-pool allowance and platform fees.

use clap::Subcommand;
use serde_json::json;

use rhem_core::Address;
use rhem_economics::Rhem;

use super::{parse_rhem, units, Context};
use crate::output::{print_fields, rhem, text};

#[derive(Debug, Subcommand)]
pub enum AdminCmd {
    /// Pause a component (Owner role).
    Pause {
        #[arg(long)]
        caller: Address,
        /// Ledger, Staking, Trading, Registry, RewardPool or Platform.
        #[arg(long, default_value = "Platform")]
        component: String,
    },
    /// Clear a component's pause flag (Owner role).
    Unpause {
        #[arg(long)]
        caller: Address,
        #[arg(long, default_value = "Platform")]
        component: String,
    },
    /// Freeze an account (Freezer role).
    Freeze {
        #[arg(long)]
        caller: Address,
        account: Address,
    },
    /// Unfreeze an account (Freezer role).
    Unfreeze {
        #[arg(long)]
        caller: Address,
        account: Address,
    },
    /// Grant a role (Owner role). Roles: Owner, Governance, Freezer, Minter.
    GrantRole {
        #[arg(long)]
        caller: Address,
        account: Address,
        role: String,
    },
    /// Revoke a role (Owner role).
    RevokeRole {
        #[arg(long)]
        caller: Address,
        account: Address,
        role: String,
    },
    /// Check whether an account holds a role.
    HasRole { account: Address, role: String },
    /// Set the staking engine's pull allowance on the reward pool (Owner role).
    ApproveForStaking {
        #[arg(long)]
        caller: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
    },
    /// Collect a platform fee from an account that approved the fee
    /// collector (Governance role). Half to the dev wallet, half burned.
    CollectFee {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        from: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
    },
}

pub async fn run(ctx: &Context, cmd: &AdminCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AdminCmd::Pause { caller, component } => {
            let r = ctx
                .call("admin/pause", json!({ "caller": caller, "component": component }))
                .await?;
            print_pause(ctx, &r);
        }
        AdminCmd::Unpause { caller, component } => {
            let r = ctx
                .call("admin/unpause", json!({ "caller": caller, "component": component }))
                .await?;
            print_pause(ctx, &r);
        }
        AdminCmd::Freeze { caller, account } => {
            let r = ctx
                .call("admin/freeze", json!({ "caller": caller, "account": account }))
                .await?;
            print_freeze(ctx, &r);
        }
        AdminCmd::Unfreeze { caller, account } => {
            let r = ctx
                .call("admin/unfreeze", json!({ "caller": caller, "account": account }))
                .await?;
            print_freeze(ctx, &r);
        }
        AdminCmd::GrantRole {
            caller,
            account,
            role,
        } => {
            let r = ctx
                .call(
                    "admin/grant_role",
                    json!({ "caller": caller, "account": account, "role": role }),
                )
                .await?;
            print_role(ctx, &r);
        }
        AdminCmd::RevokeRole {
            caller,
            account,
            role,
        } => {
            let r = ctx
                .call(
                    "admin/revoke_role",
                    json!({ "caller": caller, "account": account, "role": role }),
                )
                .await?;
            print_role(ctx, &r);
        }
        AdminCmd::HasRole { account, role } => {
            let r = ctx
                .call("admin/has_role", json!({ "account": account, "role": role }))
                .await?;
            print_role(ctx, &r);
        }
        AdminCmd::ApproveForStaking { caller, amount } => {
            let r = ctx
                .call(
                    "admin/approve_for_staking",
                    json!({ "caller": caller, "amount": units(amount) }),
                )
                .await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Allowance", rhem(&r["allowance"])),
                    ("Pool balance", rhem(&r["pool_balance"])),
                    ("Available for staking", rhem(&r["available_for_staking"])),
                ],
            );
        }
        AdminCmd::CollectFee {
            caller,
            from,
            amount,
        } => {
            let r = ctx
                .call(
                    "admin/collect_fee",
                    json!({ "caller": caller, "from": from, "amount": units(amount) }),
                )
                .await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Dev wallet", text(&r["dev_wallet"])),
                    ("Dev share", rhem(&r["dev_amount"])),
                    ("Burn address", text(&r["burn_address"])),
                    ("Burn share", rhem(&r["burn_amount"])),
                ],
            );
        }
    }
    Ok(())
}

fn print_pause(ctx: &Context, r: &serde_json::Value) {
    let paused: Vec<String> = r["paused_components"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
        .iter()
        .map(text)
        .collect();
    print_fields(
        ctx.format,
        r,
        &[
            ("Component", text(&r["component"])),
            ("Paused", text(&r["paused"])),
            ("All paused", if paused.is_empty() { "-".to_string() } else { paused.join(", ") }),
        ],
    );
}

fn print_freeze(ctx: &Context, r: &serde_json::Value) {
    print_fields(
        ctx.format,
        r,
        &[("Account", text(&r["account"])), ("Frozen", text(&r["frozen"]))],
    );
}

fn print_role(ctx: &Context, r: &serde_json::Value) {
    print_fields(
        ctx.format,
        r,
        &[
            ("Account", text(&r["account"])),
            ("Role", text(&r["role"])),
            ("Has role", text(&r["has_role"])),
        ],
    );
}
