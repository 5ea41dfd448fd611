// crates/rhem-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints.
// Each module defines request/response types and handler functions
// for a specific API group.
//
// Amounts travel as decimal strings of base units: JSON numbers cannot carry
// a u128 without loss. Addresses travel as 0x-prefixed hex.

pub mod admin;
pub mod ledger;
pub mod node;
pub mod registry;
pub mod staking;
pub mod trading;

use rhem_core::Amount;

use crate::error::RpcError;

/// Parse a base-unit amount field.
pub fn parse_amount(field: &str, value: &str) -> Result<Amount, RpcError> {
    value
        .trim()
        .parse::<Amount>()
        .map_err(|_| RpcError::invalid_request(format!("{}: not a base-unit amount: {:?}", field, value)))
}

/// Parse a 32-byte hash field (hex, optional `0x`).
pub fn parse_hash(field: &str, value: &str) -> Result<[u8; 32], RpcError> {
    let stripped = value.trim().trim_start_matches("0x");
    let bytes = hex::decode(stripped)
        .map_err(|e| RpcError::invalid_request(format!("{}: invalid hex: {}", field, e)))?;
    bytes
        .try_into()
        .map_err(|_| RpcError::invalid_request(format!("{}: expected 32 bytes", field)))
}

pub fn hash_to_hex(hash: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(hash))
}
