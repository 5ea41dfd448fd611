// crates/rhem-economics/src/access.rs
//
// Central access control: the (account, role) capability table, per-component
// pause flags, and the frozen-account set.
//
// Every mutating entry point in the other components calls
// `require_not_paused` (and `require_not_frozen` where it applies) before it
// reads anything else. Pausing `Component::Platform` pauses every component.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use rhem_core::{Address, Component, RhemError, Role};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessControl {
    grants: BTreeSet<(Address, Role)>,
    paused: BTreeSet<Component>,
    frozen: BTreeSet<Address>,
}

impl AccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bootstrap grant used at deployment, before any owner exists.
    pub(crate) fn bootstrap_grant(&mut self, account: Address, role: Role) {
        self.grants.insert((account, role));
        tracing::info!(account = %account, role = %role, "role granted at deployment");
    }

    pub fn has_role(&self, account: &Address, role: Role) -> bool {
        self.grants.contains(&(*account, role))
    }

    pub fn require_role(&self, account: &Address, role: Role) -> Result<(), RhemError> {
        if self.has_role(account, role) {
            Ok(())
        } else {
            Err(RhemError::AccessDenied {
                account: *account,
                role,
            })
        }
    }

    /// Accounts currently holding `role`.
    pub fn members(&self, role: Role) -> Vec<Address> {
        self.grants
            .iter()
            .filter(|(_, r)| *r == role)
            .map(|(a, _)| *a)
            .collect()
    }

    pub fn grant_role(&mut self, caller: &Address, account: Address, role: Role) -> Result<(), RhemError> {
        self.require_role(caller, Role::Owner)?;
        if account.is_zero() {
            return Err(RhemError::InvalidAddress("grant to the zero address".to_string()));
        }
        if self.grants.insert((account, role)) {
            tracing::info!(account = %account, role = %role, by = %caller, "role granted");
        }
        Ok(())
    }

    /// Revoke `role` from `account`. The last owner cannot be removed.
    pub fn revoke_role(&mut self, caller: &Address, account: Address, role: Role) -> Result<(), RhemError> {
        self.require_role(caller, Role::Owner)?;
        if role == Role::Owner && self.members(Role::Owner) == vec![account] {
            return Err(RhemError::InvalidConfig("cannot revoke the last owner".to_string()));
        }
        if self.grants.remove(&(account, role)) {
            tracing::info!(account = %account, role = %role, by = %caller, "role revoked");
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pause
    // -----------------------------------------------------------------------

    pub fn pause(&mut self, caller: &Address, component: Component) -> Result<(), RhemError> {
        self.require_role(caller, Role::Owner)?;
        if self.paused.insert(component) {
            tracing::warn!(component = %component, by = %caller, "paused");
        }
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address, component: Component) -> Result<(), RhemError> {
        self.require_role(caller, Role::Owner)?;
        if self.paused.remove(&component) {
            tracing::info!(component = %component, by = %caller, "unpaused");
        }
        Ok(())
    }

    pub fn is_paused(&self, component: Component) -> bool {
        self.paused.contains(&component) || self.paused.contains(&Component::Platform)
    }

    pub fn require_not_paused(&self, component: Component) -> Result<(), RhemError> {
        if self.paused.contains(&component) {
            Err(RhemError::Paused(component))
        } else if self.paused.contains(&Component::Platform) {
            Err(RhemError::Paused(Component::Platform))
        } else {
            Ok(())
        }
    }

    // -----------------------------------------------------------------------
    // Freeze
    // -----------------------------------------------------------------------

    pub fn freeze(&mut self, caller: &Address, account: Address) -> Result<(), RhemError> {
        self.require_role(caller, Role::Freezer)?;
        if self.frozen.insert(account) {
            tracing::warn!(account = %account, by = %caller, "account frozen");
        }
        Ok(())
    }

    pub fn unfreeze(&mut self, caller: &Address, account: Address) -> Result<(), RhemError> {
        self.require_role(caller, Role::Freezer)?;
        if self.frozen.remove(&account) {
            tracing::info!(account = %account, by = %caller, "account unfrozen");
        }
        Ok(())
    }

    pub fn is_frozen(&self, account: &Address) -> bool {
        self.frozen.contains(account)
    }

    pub fn require_not_frozen(&self, account: &Address) -> Result<(), RhemError> {
        if self.is_frozen(account) {
            Err(RhemError::AccountFrozen(*account))
        } else {
            Ok(())
        }
    }
}
