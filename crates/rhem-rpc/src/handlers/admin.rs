// crates/rhem-rpc/src/handlers/admin.rs
//
// Administrative handlers: Pause, Unpause, Freeze, Unfreeze, GrantRole,
// RevokeRole, HasRole, ApproveForStaking, CollectFee.
//
// Every call names its `caller`; the role check happens in the core.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use rhem_core::{Address, Component, Role};
use rhem_economics::Platform;

use super::parse_amount;
use crate::error::RpcError;

// ---------------------------------------------------------------------------
// Pause / Unpause
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseRequest {
    pub caller: Address,
    /// Defaults to the whole platform.
    #[serde(default = "default_component")]
    pub component: Component,
}

fn default_component() -> Component {
    Component::Platform
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PauseResponse {
    pub component: Component,
    pub paused: bool,
    /// Components whose own flag is currently set.
    pub paused_components: Vec<Component>,
}

fn pause_response(platform: &Platform, component: Component) -> PauseResponse {
    PauseResponse {
        component,
        paused: platform.access().is_paused(component),
        paused_components: Component::ALL
            .iter()
            .copied()
            .filter(|c| platform.access().is_paused(*c))
            .collect(),
    }
}

pub async fn handle_pause(
    platform: &RwLock<Platform>,
    request: PauseRequest,
) -> Result<PauseResponse, RpcError> {
    let mut platform = platform.write().await;
    platform.pause(request.caller, request.component)?;
    Ok(pause_response(&platform, request.component))
}

pub async fn handle_unpause(
    platform: &RwLock<Platform>,
    request: PauseRequest,
) -> Result<PauseResponse, RpcError> {
    let mut platform = platform.write().await;
    platform.unpause(request.caller, request.component)?;
    Ok(pause_response(&platform, request.component))
}

// ---------------------------------------------------------------------------
// Freeze / Unfreeze
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeRequest {
    pub caller: Address,
    pub account: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeResponse {
    pub account: Address,
    pub frozen: bool,
}

pub async fn handle_freeze(
    platform: &RwLock<Platform>,
    request: FreezeRequest,
) -> Result<FreezeResponse, RpcError> {
    let mut platform = platform.write().await;
    platform.freeze(request.caller, request.account)?;
    Ok(FreezeResponse {
        account: request.account,
        frozen: platform.access().is_frozen(&request.account),
    })
}

pub async fn handle_unfreeze(
    platform: &RwLock<Platform>,
    request: FreezeRequest,
) -> Result<FreezeResponse, RpcError> {
    let mut platform = platform.write().await;
    platform.unfreeze(request.caller, request.account)?;
    Ok(FreezeResponse {
        account: request.account,
        frozen: platform.access().is_frozen(&request.account),
    })
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRequest {
    pub caller: Address,
    pub account: Address,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasRoleRequest {
    pub account: Address,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleResponse {
    pub account: Address,
    pub role: Role,
    pub has_role: bool,
}

pub async fn handle_grant_role(
    platform: &RwLock<Platform>,
    request: RoleRequest,
) -> Result<RoleResponse, RpcError> {
    let mut platform = platform.write().await;
    platform.grant_role(request.caller, request.account, request.role)?;
    Ok(RoleResponse {
        account: request.account,
        role: request.role,
        has_role: platform.has_role(&request.account, request.role),
    })
}

pub async fn handle_revoke_role(
    platform: &RwLock<Platform>,
    request: RoleRequest,
) -> Result<RoleResponse, RpcError> {
    let mut platform = platform.write().await;
    platform.revoke_role(request.caller, request.account, request.role)?;
    Ok(RoleResponse {
        account: request.account,
        role: request.role,
        has_role: platform.has_role(&request.account, request.role),
    })
}

pub async fn handle_has_role(
    platform: &RwLock<Platform>,
    request: HasRoleRequest,
) -> Result<RoleResponse, RpcError> {
    let platform = platform.read().await;
    Ok(RoleResponse {
        account: request.account,
        role: request.role,
        has_role: platform.has_role(&request.account, request.role),
    })
}

// ---------------------------------------------------------------------------
// ApproveForStaking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveForStakingRequest {
    pub caller: Address,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveForStakingResponse {
    pub allowance: String,
    pub pool_balance: String,
    /// min(allowance, pool balance).
    pub available_for_staking: String,
}

pub async fn handle_approve_for_staking(
    platform: &RwLock<Platform>,
    request: ApproveForStakingRequest,
) -> Result<ApproveForStakingResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let mut platform = platform.write().await;
    platform.approve_for_staking(request.caller, amount)?;
    let pool = platform.reward_pool();
    Ok(ApproveForStakingResponse {
        allowance: amount.to_string(),
        pool_balance: pool.balance(platform.ledger()).to_string(),
        available_for_staking: pool.available_for_staking(platform.ledger()).to_string(),
    })
}

// ---------------------------------------------------------------------------
// CollectFee
// ---------------------------------------------------------------------------

/// Pull a platform fee from `from`, who must have approved the platform
/// fee collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectFeeRequest {
    pub caller: Address,
    pub from: Address,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectFeeResponse {
    pub dev_wallet: Address,
    pub dev_amount: String,
    pub burn_address: Address,
    pub burn_amount: String,
}

pub async fn handle_collect_fee(
    platform: &RwLock<Platform>,
    request: CollectFeeRequest,
) -> Result<CollectFeeResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let mut platform = platform.write().await;
    let split = platform.collect_platform_fee(request.caller, request.from, amount)?;
    Ok(CollectFeeResponse {
        dev_wallet: platform.fees().dev_wallet(),
        dev_amount: split.dev.to_string(),
        burn_address: platform.fees().burn_address(),
        burn_amount: split.burn.to_string(),
    })
}
