// crates/rhem-cli/src/commands/registry.rs
//
// `rhem registry {register, get}`: module directory commands.

use clap::Subcommand;
use serde_json::json;

use rhem_core::crypto::hash_bytes;
use rhem_core::Address;

use super::Context;
use crate::output::{print_fields, text};

#[derive(Debug, Subcommand)]
pub enum RegistryCmd {
    /// Register or replace a module (Governance role).
    Register {
        #[arg(long)]
        caller: Address,
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: Address,
        /// Timelock operation id (32-byte hex).
        #[arg(long, conflicts_with = "timelock_label")]
        timelock_id: Option<String>,
        /// Derive the timelock id as sha256 of this label instead.
        #[arg(long)]
        timelock_label: Option<String>,
    },
    /// Look up a module's address.
    Get { name: String },
}

pub async fn run(ctx: &Context, cmd: &RegistryCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        RegistryCmd::Register {
            caller,
            name,
            address,
            timelock_id,
            timelock_label,
        } => {
            let timelock_id = match (timelock_id, timelock_label) {
                (Some(id), _) => id.clone(),
                (None, Some(label)) => format!("0x{}", hex::encode(hash_bytes(label.as_bytes()))),
                (None, None) => return Err("one of --timelock-id or --timelock-label is required".into()),
            };
            let r = ctx
                .call(
                    "registry/register",
                    json!({
                        "caller": caller,
                        "name": name,
                        "address": address,
                        "timelock_id": timelock_id,
                    }),
                )
                .await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Name", text(&r["name"])),
                    ("Address", text(&r["address"])),
                    ("Replaced", text(&r["replaced"])),
                ],
            );
        }
        RegistryCmd::Get { name } => {
            let r = ctx.call("registry/get", json!({ "name": name })).await?;
            print_fields(
                ctx.format,
                &r,
                &[
                    ("Name", text(&r["name"])),
                    ("Address", text(&r["address"])),
                    ("Timelock id", text(&r["timelock_id"])),
                    ("Registered at", text(&r["registered_at"])),
                ],
            );
        }
    }
    Ok(())
}
