// crates/rhem-rpc/src/handlers/registry.rs
//
// Module registry handlers: Register, Get.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use rhem_core::{Address, Clock, RhemError, Timestamp};
use rhem_economics::Platform;

use super::{hash_to_hex, parse_hash};
use crate::error::RpcError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterModuleRequest {
    pub caller: Address,
    pub name: String,
    pub address: Address,
    /// Hex id of the timelock operation that approved this registration.
    pub timelock_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterModuleResponse {
    pub name: String,
    pub address: Address,
    /// Address previously registered under the same name.
    pub replaced: Option<Address>,
}

pub async fn handle_register(
    platform: &RwLock<Platform>,
    clock: &dyn Clock,
    request: RegisterModuleRequest,
) -> Result<RegisterModuleResponse, RpcError> {
    let timelock_id = parse_hash("timelock_id", &request.timelock_id)?;
    let mut platform = platform.write().await;
    let now = clock.now();
    let previous = platform.register_module(
        request.caller,
        &request.name,
        request.address,
        timelock_id,
        now,
    )?;
    Ok(RegisterModuleResponse {
        name: request.name,
        address: request.address,
        replaced: previous.map(|entry| entry.address),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetModuleRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    pub address: Address,
    pub timelock_id: String,
    pub registered_at: Timestamp,
}

pub async fn handle_get(
    platform: &RwLock<Platform>,
    request: GetModuleRequest,
) -> Result<ModuleInfo, RpcError> {
    let platform = platform.read().await;
    let entry = platform
        .registry()
        .entry(&request.name)
        .ok_or_else(|| RhemError::NotFound(format!("module {:?}", request.name)))?;
    Ok(ModuleInfo {
        address: entry.address,
        timelock_id: hash_to_hex(&entry.timelock_id),
        registered_at: entry.registered_at,
        name: request.name,
    })
}
