// crates/rhem-rpc/src/handlers/staking.rs
//
// Staking handlers: Stake, Unstake, Positions, Rewards, Totals, Multiplier,
// SetMultiplier.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use rhem_core::{Address, Clock, Timestamp, SECONDS_PER_DAY};
use rhem_economics::{
    lock_duration, Platform, PositionState, StakePosition, LOCK_PERIOD_COUNT, LOCK_PERIOD_LABELS,
};

use super::parse_amount;
use crate::error::RpcError;

// ---------------------------------------------------------------------------
// Stake
// ---------------------------------------------------------------------------

/// Request to lock `amount` for the period at `selector`. The caller must
/// have approved the staking engine for at least `amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeRequest {
    pub caller: Address,
    pub amount: String,
    pub selector: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeResponse {
    /// Stable index of the new position.
    pub index: usize,
    pub unlocks_at: Timestamp,
    pub total_user_staked: String,
}

pub async fn handle_stake(
    platform: &RwLock<Platform>,
    clock: &dyn Clock,
    request: StakeRequest,
) -> Result<StakeResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let mut platform = platform.write().await;
    let now = clock.now();
    let index = platform.stake(request.caller, amount, request.selector, now)?;
    let unlocks_at = platform
        .positions(&request.caller)
        .get(index)
        .map(StakePosition::unlocks_at)
        .unwrap_or(now);
    Ok(StakeResponse {
        index,
        unlocks_at,
        total_user_staked: platform.total_user_staked(&request.caller).to_string(),
    })
}

// ---------------------------------------------------------------------------
// Unstake
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstakeRequest {
    pub caller: Address,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnstakeResponse {
    pub index: usize,
    pub principal: String,
    pub reward: String,
    pub payout: String,
}

pub async fn handle_unstake(
    platform: &RwLock<Platform>,
    clock: &dyn Clock,
    request: UnstakeRequest,
) -> Result<UnstakeResponse, RpcError> {
    let mut platform = platform.write().await;
    let now = clock.now();
    let receipt = platform.unstake(request.caller, request.index, now)?;
    Ok(UnstakeResponse {
        index: receipt.index,
        principal: receipt.principal.to_string(),
        reward: receipt.reward.to_string(),
        payout: receipt.payout.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionsRequest {
    pub account: Address,
}

/// One position as shown to wallets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInfo {
    pub index: usize,
    pub amount: String,
    pub selector: usize,
    pub lock_label: String,
    pub start: Timestamp,
    pub unlocks_at: Timestamp,
    pub multiplier_bp: u32,
    pub reward_cap_bp: u32,
    /// "open" or "withdrawn".
    pub state: String,
    /// Reward paid, once withdrawn.
    pub reward: Option<String>,
    pub withdrawn_at: Option<Timestamp>,
}

impl PositionInfo {
    fn from_position(index: usize, position: &StakePosition) -> Self {
        let (state, reward, withdrawn_at) = match position.state {
            PositionState::Open => ("open", None, None),
            PositionState::Withdrawn { at, reward } => ("withdrawn", Some(reward.to_string()), Some(at)),
        };
        Self {
            index,
            amount: position.amount.to_string(),
            selector: position.selector,
            lock_label: LOCK_PERIOD_LABELS
                .get(position.selector)
                .copied()
                .unwrap_or("unknown")
                .to_string(),
            start: position.start,
            unlocks_at: position.unlocks_at(),
            multiplier_bp: position.multiplier_bp,
            reward_cap_bp: position.reward_cap_bp,
            state: state.to_string(),
            reward,
            withdrawn_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionsResponse {
    pub account: Address,
    pub positions: Vec<PositionInfo>,
    pub total_user_staked: String,
}

pub async fn handle_positions(
    platform: &RwLock<Platform>,
    request: PositionsRequest,
) -> Result<PositionsResponse, RpcError> {
    let platform = platform.read().await;
    let positions = platform
        .positions(&request.account)
        .iter()
        .enumerate()
        .map(|(index, position)| PositionInfo::from_position(index, position))
        .collect();
    Ok(PositionsResponse {
        account: request.account,
        positions,
        total_user_staked: platform.total_user_staked(&request.account).to_string(),
    })
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsRequest {
    pub account: Address,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsResponse {
    /// Principal plus reward if withdrawn now.
    pub payout: String,
    pub reward: String,
    pub unlocks_at: Timestamp,
    pub now: Timestamp,
}

pub async fn handle_rewards(
    platform: &RwLock<Platform>,
    clock: &dyn Clock,
    request: RewardsRequest,
) -> Result<RewardsResponse, RpcError> {
    let platform = platform.read().await;
    let now = clock.now();
    let payout = platform.calculate_rewards(&request.account, request.index, now)?;
    let reward = platform
        .staking()
        .projected_reward(&request.account, request.index, now)?;
    let unlocks_at = platform
        .positions(&request.account)
        .get(request.index)
        .map(StakePosition::unlocks_at)
        .unwrap_or(now);
    Ok(RewardsResponse {
        payout: payout.to_string(),
        reward: reward.to_string(),
        unlocks_at,
        now,
    })
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsRequest {
    #[serde(default)]
    pub account: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsResponse {
    pub total_staked: String,
    pub user_staked: Option<String>,
    /// What the staking engine can still pull from the reward pool.
    pub reward_pool_available: String,
}

pub async fn handle_totals(
    platform: &RwLock<Platform>,
    request: TotalsRequest,
) -> Result<TotalsResponse, RpcError> {
    let platform = platform.read().await;
    Ok(TotalsResponse {
        total_staked: platform.total_staked().to_string(),
        user_staked: request
            .account
            .map(|account| platform.total_user_staked(&account).to_string()),
        reward_pool_available: platform
            .reward_pool()
            .available_for_staking(platform.ledger())
            .to_string(),
    })
}

// ---------------------------------------------------------------------------
// Multiplier / SetMultiplier
// ---------------------------------------------------------------------------

/// Query one selector, or the whole table when `selector` is omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplierRequest {
    #[serde(default)]
    pub selector: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplierInfo {
    pub selector: usize,
    pub label: String,
    pub lock_days: u64,
    pub multiplier_bp: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiplierResponse {
    pub multipliers: Vec<MultiplierInfo>,
}

fn multiplier_info(platform: &Platform, selector: usize) -> Result<MultiplierInfo, RpcError> {
    Ok(MultiplierInfo {
        selector,
        label: LOCK_PERIOD_LABELS
            .get(selector)
            .copied()
            .unwrap_or("unknown")
            .to_string(),
        lock_days: lock_duration(selector)? / SECONDS_PER_DAY,
        multiplier_bp: platform.reward_multiplier(selector)?,
    })
}

pub async fn handle_multiplier(
    platform: &RwLock<Platform>,
    request: MultiplierRequest,
) -> Result<MultiplierResponse, RpcError> {
    let platform = platform.read().await;
    let multipliers = match request.selector {
        Some(selector) => vec![multiplier_info(&platform, selector)?],
        None => (0..LOCK_PERIOD_COUNT)
            .map(|selector| multiplier_info(&platform, selector))
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(MultiplierResponse { multipliers })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMultiplierRequest {
    pub caller: Address,
    pub selector: usize,
    pub multiplier_bp: u32,
}

pub async fn handle_set_multiplier(
    platform: &RwLock<Platform>,
    request: SetMultiplierRequest,
) -> Result<MultiplierInfo, RpcError> {
    let mut platform = platform.write().await;
    platform.set_reward_multiplier(request.caller, request.selector, request.multiplier_bp)?;
    multiplier_info(&platform, request.selector)
}
