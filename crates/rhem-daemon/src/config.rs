// crates/rhem-daemon/src/config.rs
//
// Runtime configuration for the RHEM daemon.
// Loaded from a TOML file or populated with defaults suitable for a local
// development node.

use serde::Deserialize;
use std::fs;

use rhem_core::{Address, RhemError};
use rhem_economics::{AccrualCurve, Deployment, Rhem, StakingConfig};

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data (state snapshot).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Host address for the RPC server.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: String,

    /// Port for the RPC server.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Time source.
    #[serde(default)]
    pub clock: ClockMode,

    /// Restore state from `data_dir/state.json` at start and write it on
    /// shutdown.
    #[serde(default)]
    pub snapshot: bool,

    #[serde(default)]
    pub deployment: DeploymentConfig,

    #[serde(default)]
    pub staking: StakingSection,
}

/// Where the platform reads the current time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    /// Wall clock.
    #[default]
    System,
    /// Starts at wall-clock time and moves only through `node/advance_time`.
    Manual,
}

impl std::str::FromStr for ClockMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ClockMode::System),
            "manual" => Ok(ClockMode::Manual),
            other => Err(format!("unknown clock mode: {}", other)),
        }
    }
}

/// Construction parameters of the platform. Addresses are 0x-prefixed hex;
/// token quantities are whole RHEM.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
    #[serde(default = "default_governance")]
    pub governance: String,
    /// Emergency multisig.
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_dev_wallet")]
    pub fee_wallet: String,
    #[serde(default = "default_dev_wallet")]
    pub dev_wallet: String,
    #[serde(default = "default_burn_address")]
    pub burn_address: String,
    /// Receives the initial supply.
    #[serde(default = "default_treasury")]
    pub treasury: String,
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,
    /// Claim tree root. All zeroes disables claims.
    #[serde(default = "default_merkle_root")]
    pub merkle_root: String,
    #[serde(default = "default_reward_pool_funding")]
    pub reward_pool_funding: u64,
    #[serde(default = "default_reward_pool_funding")]
    pub staking_allowance: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StakingSection {
    /// "step" or "linear".
    #[serde(default)]
    pub accrual: AccrualCurve,
    #[serde(default = "default_reward_cap_bp")]
    pub reward_cap_bp: u32,
    #[serde(default = "default_true")]
    pub freeze_blocks_staking: bool,
}

fn default_data_dir() -> String {
    "~/.rhem/data".to_string()
}

fn default_rpc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    50061
}

fn default_log_level() -> String {
    "info".to_string()
}

// Development defaults: well-known derived addresses, so a node started
// without a config file is usable from the CLI right away.
fn default_governance() -> String {
    Address::derive("dao").to_hex()
}

fn default_owner() -> String {
    Address::derive("multisig").to_hex()
}

fn default_dev_wallet() -> String {
    Address::derive("dev").to_hex()
}

fn default_burn_address() -> String {
    Address::derive("burn").to_hex()
}

fn default_treasury() -> String {
    Address::derive("deployer").to_hex()
}

fn default_initial_supply() -> u64 {
    1_000_000
}

fn default_merkle_root() -> String {
    format!("0x{}", "0".repeat(64))
}

fn default_reward_pool_funding() -> u64 {
    100_000
}

fn default_reward_cap_bp() -> u32 {
    StakingConfig::default().reward_cap_bp
}

fn default_true() -> bool {
    true
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            log_level: default_log_level(),
            clock: ClockMode::default(),
            snapshot: false,
            deployment: DeploymentConfig::default(),
            staking: StakingSection::default(),
        }
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            governance: default_governance(),
            owner: default_owner(),
            fee_wallet: default_dev_wallet(),
            dev_wallet: default_dev_wallet(),
            burn_address: default_burn_address(),
            treasury: default_treasury(),
            initial_supply: default_initial_supply(),
            merkle_root: default_merkle_root(),
            reward_pool_funding: default_reward_pool_funding(),
            staking_allowance: default_reward_pool_funding(),
        }
    }
}

impl Default for StakingSection {
    fn default() -> Self {
        Self {
            accrual: AccrualCurve::default(),
            reward_cap_bp: default_reward_cap_bp(),
            freeze_blocks_staking: true,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve the `[deployment]` and `[staking]` tables into core parameters.
    pub fn deployment(&self) -> Result<Deployment, RhemError> {
        let d = &self.deployment;
        Ok(Deployment {
            governance: Address::from_hex(&d.governance)?,
            owner: Address::from_hex(&d.owner)?,
            fee_wallet: Address::from_hex(&d.fee_wallet)?,
            dev_wallet: Address::from_hex(&d.dev_wallet)?,
            burn_address: Address::from_hex(&d.burn_address)?,
            treasury: Address::from_hex(&d.treasury)?,
            initial_supply: Rhem::from_whole(d.initial_supply).0,
            merkle_root: parse_root(&d.merkle_root)?,
            reward_pool_funding: Rhem::from_whole(d.reward_pool_funding).0,
            staking_allowance: Rhem::from_whole(d.staking_allowance).0,
            staking: StakingConfig {
                accrual: self.staking.accrual,
                reward_cap_bp: self.staking.reward_cap_bp,
                freeze_blocks_staking: self.staking.freeze_blocks_staking,
            },
        })
    }
}

fn parse_root(s: &str) -> Result<[u8; 32], RhemError> {
    let bytes = hex::decode(s.trim().trim_start_matches("0x"))
        .map_err(|e| RhemError::InvalidConfig(format!("merkle_root: {}", e)))?;
    bytes
        .try_into()
        .map_err(|_| RhemError::InvalidConfig("merkle_root: expected 32 bytes".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = DaemonConfig::parse("").unwrap();
        assert_eq!(config.rpc_port, 50061);
        assert_eq!(config.clock, ClockMode::System);
        assert!(!config.snapshot);
        let deployment = config.deployment().unwrap();
        assert_eq!(deployment.owner, Address::derive("multisig"));
        assert_eq!(deployment.merkle_root, [0u8; 32]);
        assert_eq!(deployment.initial_supply, Rhem::from_whole(1_000_000).0);
        assert!(deployment.staking.freeze_blocks_staking);
    }

    #[test]
    fn test_partial_tables() {
        let config = DaemonConfig::parse(
            r#"
            rpc_port = 6000
            clock = "manual"
            snapshot = true

            [deployment]
            initial_supply = 5000
            reward_pool_funding = 500

            [staking]
            accrual = "linear"
            "#,
        )
        .unwrap();
        assert_eq!(config.rpc_port, 6000);
        assert_eq!(config.clock, ClockMode::Manual);
        let deployment = config.deployment().unwrap();
        assert_eq!(deployment.reward_pool_funding, Rhem::from_whole(500).0);
        assert_eq!(deployment.staking_allowance, Rhem::from_whole(100_000).0);
        assert_eq!(deployment.staking.accrual, AccrualCurve::Linear);
        assert_eq!(deployment.staking.reward_cap_bp, 10_000);
    }

    #[test]
    fn test_bad_address_is_rejected() {
        let mut config = DaemonConfig::default();
        config.deployment.owner = "0xnothex".to_string();
        assert!(matches!(
            config.deployment(),
            Err(RhemError::InvalidAddress(_))
        ));
        config.deployment.owner = default_owner();
        config.deployment.merkle_root = "0x00".to_string();
        assert!(matches!(
            config.deployment(),
            Err(RhemError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_clock_mode_from_str() {
        assert_eq!("manual".parse::<ClockMode>().unwrap(), ClockMode::Manual);
        assert!("lunar".parse::<ClockMode>().is_err());
    }
}
