// crates/rhem-economics/src/registry.rs
//
// Name -> address directory of platform modules.
//
// Writes are governance-only and blocked while the registry is paused. The
// timelock id is an opaque credential produced by the external approval
// process; the registry stores it for audit and does not interpret it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rhem_core::{Address, Component, RhemError, Role, Timestamp};

use crate::access::AccessControl;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub address: Address,
    pub timelock_id: [u8; 32],
    pub registered_at: Timestamp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleEntry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or overwrite `name`. Returns the entry it replaced, if any.
    pub fn register_module(
        &mut self,
        access: &AccessControl,
        caller: &Address,
        name: &str,
        address: Address,
        timelock_id: [u8; 32],
        now: Timestamp,
    ) -> Result<Option<ModuleEntry>, RhemError> {
        access.require_not_paused(Component::Registry)?;
        access.require_role(caller, Role::Governance)?;
        if name.trim().is_empty() {
            return Err(RhemError::InvalidConfig("module name is empty".to_string()));
        }
        if address.is_zero() {
            return Err(RhemError::InvalidAddress("module is the zero address".to_string()));
        }
        let entry = ModuleEntry {
            address,
            timelock_id,
            registered_at: now,
        };
        let previous = self.modules.insert(name.to_string(), entry);
        tracing::info!(
            name,
            address = %address,
            replaced = previous.is_some(),
            "module registered"
        );
        Ok(previous)
    }

    /// Address registered under `name`. `None` for unknown names.
    pub fn get_module(&self, name: &str) -> Option<Address> {
        self.modules.get(name).map(|e| e.address)
    }

    pub fn entry(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }
}
