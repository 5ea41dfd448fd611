// crates/rhem-cli/src/commands/mod.rs
//
// Command module declarations for the RHEM CLI, plus the context every
// command runs with and the argument parsers they share.

pub mod admin;
pub mod node;
pub mod registry;
pub mod stake;
pub mod token;
pub mod trade;
pub mod wallet;

use rhem_economics::Rhem;

use crate::output::OutputFormat;
use crate::rpc_client::{self, CliError};

/// Endpoint and output mode, from the global flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub rpc: String,
    pub format: OutputFormat,
}

impl Context {
    pub async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, CliError> {
        rpc_client::call(&self.rpc, method, params).await
    }
}

/// clap value parser for human RHEM amounts ("12", "0.25").
pub fn parse_rhem(s: &str) -> Result<Rhem, String> {
    Rhem::parse(s).map_err(|e| e.to_string())
}

/// Base-unit string the daemon expects.
pub fn units(amount: &Rhem) -> String {
    amount.0.to_string()
}
