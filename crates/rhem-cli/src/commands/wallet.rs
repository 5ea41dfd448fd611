// crates/rhem-cli/src/commands/wallet.rs
//
// `rhem wallet derive`: address helpers.
//
// The daemon trusts the `caller` field of each request; signing lives in the
// wallet layer outside this tool. For development nodes the well-known roles
// (dao, multisig, deployer, ...) are label-derived addresses.

use clap::Subcommand;

use rhem_core::Address;

#[derive(Debug, Subcommand)]
pub enum WalletCmd {
    /// Print the address derived from a label (sha256 of the label).
    Derive {
        /// Label, e.g. "dao" or "rhem/staking".
        label: String,
    },
}

pub async fn run(cmd: &WalletCmd) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        WalletCmd::Derive { label } => {
            println!("{}", Address::derive(label));
        }
    }
    Ok(())
}
