// crates/rhem-rpc/src/handlers/node.rs
//
// Node handlers: GetNodeInfo, AdvanceTime.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use rhem_core::{Address, Clock, Component, ManualClock, Timestamp};
use rhem_economics::Platform;

use crate::error::RpcError;

// ---------------------------------------------------------------------------
// GetNodeInfo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNodeInfoRequest {}

/// Custody addresses users approve or inspect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentAddresses {
    pub staking: Address,
    pub reward_pool: Address,
    pub trading: Address,
    pub fee_collector: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetNodeInfoResponse {
    /// Software version.
    pub version: String,
    pub uptime_seconds: u64,
    /// Current platform time.
    pub now: Timestamp,
    /// "system" or "manual".
    pub clock: String,
    pub deployed_at: Timestamp,
    pub addresses: ComponentAddresses,
    pub paused: Vec<Component>,
}

pub async fn handle_get_node_info(
    platform: &RwLock<Platform>,
    clock: &dyn Clock,
    manual_clock: bool,
    uptime_seconds: u64,
    _request: GetNodeInfoRequest,
) -> Result<GetNodeInfoResponse, RpcError> {
    let platform = platform.read().await;
    let now = clock.now();
    Ok(GetNodeInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        now,
        clock: if manual_clock { "manual" } else { "system" }.to_string(),
        deployed_at: platform.deployed_at(),
        addresses: ComponentAddresses {
            staking: platform.staking().address(),
            reward_pool: platform.reward_pool().address(),
            trading: platform.trading().address(),
            fee_collector: platform.fees().collector(),
        },
        paused: Component::ALL
            .iter()
            .copied()
            .filter(|c| platform.access().is_paused(*c))
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// AdvanceTime
// ---------------------------------------------------------------------------

/// Move a manual clock forward. Rejected on nodes running the system clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceTimeRequest {
    pub seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceTimeResponse {
    pub now: Timestamp,
}

pub async fn handle_advance_time(
    clock: Option<&ManualClock>,
    request: AdvanceTimeRequest,
) -> Result<AdvanceTimeResponse, RpcError> {
    let clock = clock.ok_or_else(|| RpcError::unavailable("node is not running a manual clock"))?;
    let now = clock.advance(request.seconds).ok_or_else(|| {
        RpcError::invalid_request(format!(
            "advancing by {} seconds overflows the clock",
            request.seconds
        ))
    })?;
    tracing::info!(seconds = request.seconds, now, "manual clock advanced");
    Ok(AdvanceTimeResponse { now })
}
