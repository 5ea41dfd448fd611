// crates/rhem-core/src/error.rs

use thiserror::Error;

use crate::address::{Address, Amount, Timestamp};
use crate::roles::{Component, Role};

/// Platform-wide error type for the RHEM platform.
///
/// Every core operation validates its preconditions before touching state,
/// so an `Err` always means nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RhemError {
    /// Zero or otherwise disallowed amount.
    #[error("Invalid amount")]
    InvalidAmount,

    /// Lock-period selector outside the fixed table.
    #[error("Invalid lock period: selector {selector}")]
    InvalidLockPeriod { selector: usize },

    /// Position index that does not exist or is already withdrawn.
    #[error("Invalid stake index: {index}")]
    InvalidStakeIndex { index: usize },

    /// Withdrawal attempted before the lock matured.
    #[error("Still locked: unlocks at {unlocks_at}, now {now}")]
    StillLocked { unlocks_at: Timestamp, now: Timestamp },

    #[error("Insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("Insufficient allowance: needed {needed}, available {available}")]
    InsufficientAllowance { needed: Amount, available: Amount },

    /// The reward pool cannot cover a payout (allowance or balance exhausted).
    #[error("Reward pool insufficient: needed {needed}, available {available}")]
    RewardInsufficient { needed: Amount, available: Amount },

    #[error("Account frozen: {0}")]
    AccountFrozen(Address),

    #[error("Paused: {0}")]
    Paused(Component),

    #[error("Access denied: {account} lacks role {role}")]
    AccessDenied { account: Address, role: Role },

    /// A component custody address used where only external accounts may act.
    /// Reported under the `AccessDenied` code.
    #[error("Access denied: {0} is a component custody account")]
    CustodyAccount(Address),

    #[error("Invalid Merkle proof")]
    InvalidProof,

    #[error("Already claimed: {0}")]
    AlreadyClaimed(Address),

    #[error("Supply cap exceeded")]
    SupplyCapExceeded,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RhemError {
    /// Stable machine-readable reason, surfaced to RPC clients.
    pub fn code(&self) -> &'static str {
        match self {
            RhemError::InvalidAmount => "InvalidAmount",
            RhemError::InvalidLockPeriod { .. } => "InvalidLockPeriod",
            RhemError::InvalidStakeIndex { .. } => "InvalidStakeIndex",
            RhemError::StillLocked { .. } => "StillLocked",
            RhemError::InsufficientBalance { .. } => "InsufficientBalance",
            RhemError::InsufficientAllowance { .. } => "InsufficientAllowance",
            RhemError::RewardInsufficient { .. } => "RewardInsufficient",
            RhemError::AccountFrozen(_) => "AccountFrozen",
            RhemError::Paused(_) => "Paused",
            RhemError::AccessDenied { .. } | RhemError::CustodyAccount(_) => "AccessDenied",
            RhemError::InvalidProof => "InvalidProof",
            RhemError::AlreadyClaimed(_) => "AlreadyClaimed",
            RhemError::SupplyCapExceeded => "SupplyCapExceeded",
            RhemError::InvalidAddress(_) => "InvalidAddress",
            RhemError::InvalidConfig(_) => "InvalidConfig",
            RhemError::NotFound(_) => "NotFound",
            RhemError::Overflow => "Overflow",
            RhemError::Serialization(_) => "Serialization",
        }
    }
}

impl From<serde_json::Error> for RhemError {
    fn from(e: serde_json::Error) -> Self {
        RhemError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_variant_names() {
        assert_eq!(RhemError::InvalidAmount.code(), "InvalidAmount");
        assert_eq!(
            RhemError::StillLocked {
                unlocks_at: 10,
                now: 5
            }
            .code(),
            "StillLocked"
        );
        assert_eq!(RhemError::Paused(Component::Staking).code(), "Paused");
        assert_eq!(
            RhemError::CustodyAccount(Address::derive("rhem/staking")).code(),
            "AccessDenied"
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = RhemError::InsufficientBalance {
            needed: 10,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: needed 10, available 3"
        );
    }
}
