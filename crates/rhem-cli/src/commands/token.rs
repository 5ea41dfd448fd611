// crates/rhem-cli/src/commands/token.rs
//
// `rhem token {balance, allowance, transfer, approve, transfer-from, mint,
// burn, claim, info}`: ledger commands. Amounts are entered in RHEM.

use clap::Subcommand;
use serde_json::json;

use rhem_core::Address;
use rhem_economics::Rhem;

use super::{parse_rhem, units, Context};
use crate::output::{print_fields, rhem, text};

#[derive(Debug, Subcommand)]
pub enum TokenCmd {
    /// Show an account's balance.
    Balance { account: Address },
    /// Show what `spender` may still move on behalf of `owner`.
    Allowance { owner: Address, spender: Address },
    /// Move RHEM from the caller to another account.
    Transfer {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        to: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
    },
    /// Set the caller's allowance for a spender.
    Approve {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        spender: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
    },
    /// Spend an allowance: the caller moves RHEM from `from` to `to`.
    TransferFrom {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        from: Address,
        #[arg(long)]
        to: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
    },
    /// Mint new supply (Minter role).
    Mint {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        to: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
    },
    /// Burn from the caller's balance (Minter role).
    Burn {
        #[arg(long)]
        caller: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
    },
    /// Claim an airdrop allocation with a Merkle proof.
    Claim {
        #[arg(long)]
        caller: Address,
        #[arg(long, value_parser = parse_rhem)]
        amount: Rhem,
        /// Proof node (hex); repeat in leaf-to-root order.
        #[arg(long)]
        proof: Vec<String>,
    },
    /// Token metadata and supply.
    Info,
}

pub async fn run(ctx: &Context, cmd: &TokenCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        TokenCmd::Balance { account } => {
            let r = ctx.call("ledger/balance", json!({ "account": account })).await?;
            print_fields(
                ctx.format,
                &r,
                &[("Account", text(&r["account"])), ("Balance", rhem(&r["balance"]))],
            );
        }
        TokenCmd::Allowance { owner, spender } => {
            let r = ctx
                .call("ledger/allowance", json!({ "owner": owner, "spender": spender }))
                .await?;
            print_allowance(ctx, &r);
        }
        TokenCmd::Transfer { caller, to, amount } => {
            let r = ctx
                .call(
                    "ledger/transfer",
                    json!({ "caller": caller, "to": to, "amount": units(amount) }),
                )
                .await?;
            print_transfer(ctx, &r);
        }
        TokenCmd::Approve {
            caller,
            spender,
            amount,
        } => {
            let r = ctx
                .call(
                    "ledger/approve",
                    json!({ "caller": caller, "spender": spender, "amount": units(amount) }),
                )
                .await?;
            print_allowance(ctx, &r);
        }
        TokenCmd::TransferFrom {
            caller,
            from,
            to,
            amount,
        } => {
            let r = ctx
                .call(
                    "ledger/transfer_from",
                    json!({ "caller": caller, "from": from, "to": to, "amount": units(amount) }),
                )
                .await?;
            print_transfer(ctx, &r);
        }
        TokenCmd::Mint { caller, to, amount } => {
            let r = ctx
                .call(
                    "ledger/mint",
                    json!({ "caller": caller, "to": to, "amount": units(amount) }),
                )
                .await?;
            print_fields(ctx.format, &r, &[("Total supply", rhem(&r["total_supply"]))]);
        }
        TokenCmd::Burn { caller, amount } => {
            let r = ctx
                .call("ledger/burn", json!({ "caller": caller, "amount": units(amount) }))
                .await?;
            print_fields(ctx.format, &r, &[("Total supply", rhem(&r["total_supply"]))]);
        }
        TokenCmd::Claim {
            caller,
            amount,
            proof,
        } => {
            let r = ctx
                .call(
                    "ledger/claim",
                    json!({ "caller": caller, "amount": units(amount), "proof": proof }),
                )
                .await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Account", text(&r["account"])),
                    ("Claimed", rhem(&r["claimed"])),
                    ("Balance", rhem(&r["balance"])),
                ],
            );
        }
        TokenCmd::Info => {
            let r = ctx.call("ledger/info", json!({})).await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Name", text(&r["name"])),
                    ("Symbol", text(&r["symbol"])),
                    ("Decimals", text(&r["decimals"])),
                    ("Total supply", rhem(&r["total_supply"])),
                    ("Max supply", rhem(&r["max_supply"])),
                    ("Merkle root", text(&r["merkle_root"])),
                    ("Claims enabled", text(&r["claims_enabled"])),
                ],
            );
        }
    }
    Ok(())
}

fn print_allowance(ctx: &Context, r: &serde_json::Value) {
    print_fields(
        ctx.format,
        r,
        &[
            ("Owner", text(&r["owner"])),
            ("Spender", text(&r["spender"])),
            ("Allowance", rhem(&r["allowance"])),
        ],
    );
}

fn print_transfer(ctx: &Context, r: &serde_json::Value) {
    print_fields(
        ctx.format,
        r,
        &[
            ("From", text(&r["from"])),
            ("To", text(&r["to"])),
            ("Amount", rhem(&r["amount"])),
            ("From balance", rhem(&r["from_balance"])),
            ("To balance", rhem(&r["to_balance"])),
        ],
    );
}
