// crates/rhem-core/src/roles.rs
//
// The enumerated role set and the pausable components of the platform.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capabilities checked by `AccessControl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Emergency operator (multisig): pause/unpause, role administration,
    /// reward-pool funding.
    Owner,
    /// DAO: module registration, reward multipliers, platform fees.
    Governance,
    /// May freeze and unfreeze accounts.
    Freezer,
    /// May mint and burn supply.
    Minter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "Owner"),
            Role::Governance => write!(f, "Governance"),
            Role::Freezer => write!(f, "Freezer"),
            Role::Minter => write!(f, "Minter"),
        }
    }
}

/// A component with its own pause flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Component {
    Ledger,
    Staking,
    Trading,
    Registry,
    RewardPool,
    Platform,
}

impl Component {
    pub const ALL: [Component; 6] = [
        Component::Ledger,
        Component::Staking,
        Component::Trading,
        Component::Registry,
        Component::RewardPool,
        Component::Platform,
    ];
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Ledger => write!(f, "Ledger"),
            Component::Staking => write!(f, "Staking"),
            Component::Trading => write!(f, "Trading"),
            Component::Registry => write!(f, "Registry"),
            Component::RewardPool => write!(f, "RewardPool"),
            Component::Platform => write!(f, "Platform"),
        }
    }
}
