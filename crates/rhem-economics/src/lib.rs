// crates/rhem-economics/src/lib.rs
//
// rhem-economics: the RHEM ledger, access control, reward pool, staking
// engine, trading engine, module registry, and platform fee collection.
//
// All monetary values are tracked in base units.
// 1 RHEM = 1,000,000,000,000,000,000 base units (10^18).

pub mod access;
pub mod fees;
pub mod platform;
pub mod registry;
pub mod reward_pool;
pub mod rewards;
pub mod staking;
pub mod token;
pub mod trading;

// Re-export key types for ergonomic access from downstream crates.
pub use access::AccessControl;
pub use fees::{split_platform_fee, trade_fee, FeeSplit, PlatformFees};
pub use platform::{custody_addresses, deployment_timelock_id, Deployment, Platform};
pub use registry::{ModuleEntry, ModuleRegistry};
pub use reward_pool::RewardPool;
pub use rewards::{
    compute_reward, lock_duration, AccrualCurve, BASIS_POINTS, DEFAULT_MULTIPLIER_BP,
    LOCK_PERIODS, LOCK_PERIOD_COUNT, LOCK_PERIOD_LABELS,
};
pub use staking::{PositionState, StakePosition, StakingConfig, StakingEngine, UnstakeReceipt};
pub use token::{Leg, Ledger, Rhem, MAX_SUPPLY, WEI_PER_RHEM};
pub use trading::{Side, TradeRecord, TradingEngine};
