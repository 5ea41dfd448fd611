// crates/rhem-economics/src/reward_pool.rs
//
// The reward reserve for staking.
//
// The pool's funds live in the ledger under the pool's custody address. The
// bound staking engine never debits the pool directly: the owner grants it an
// allowance with `approve_for_staking`, and the engine pulls rewards with
// `transfer_from`. The allowance is therefore the ceiling on what staking can
// ever pay out.

use serde::{Deserialize, Serialize};

use rhem_core::{Address, Amount, Component, RhemError, Role};

use crate::access::AccessControl;
use crate::token::Ledger;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardPool {
    /// Custody address holding the reserve.
    address: Address,
    /// The one staking engine allowed to pull rewards.
    staking_engine: Option<Address>,
}

impl RewardPool {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            staking_engine: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn staking_engine(&self) -> Option<Address> {
        self.staking_engine
    }

    /// Reserve currently held by the pool.
    pub fn balance(&self, ledger: &Ledger) -> Amount {
        ledger.balance_of(&self.address)
    }

    /// What the bound engine can still pull: the smaller of allowance and balance.
    pub fn available_for_staking(&self, ledger: &Ledger) -> Amount {
        match self.staking_engine {
            Some(engine) => ledger
                .allowance(&self.address, &engine)
                .min(ledger.balance_of(&self.address)),
            None => 0,
        }
    }

    /// Bind (or rebind) the staking engine. Rebinding revokes the previous
    /// engine's allowance.
    pub fn set_staking_engine(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        caller: &Address,
        engine: Address,
    ) -> Result<(), RhemError> {
        access.require_not_paused(Component::RewardPool)?;
        access.require_role(caller, Role::Owner)?;
        if engine.is_zero() {
            return Err(RhemError::InvalidAddress("staking engine is the zero address".to_string()));
        }
        if let Some(previous) = self.staking_engine {
            if previous != engine {
                ledger.approve(self.address, previous, 0)?;
            }
        }
        self.staking_engine = Some(engine);
        tracing::info!(engine = %engine, "reward pool bound to staking engine");
        Ok(())
    }

    /// Set the bound engine's pull allowance to `amount`.
    pub fn approve_for_staking(
        &self,
        access: &AccessControl,
        ledger: &mut Ledger,
        caller: &Address,
        amount: Amount,
    ) -> Result<(), RhemError> {
        access.require_not_paused(Component::RewardPool)?;
        access.require_role(caller, Role::Owner)?;
        let engine = self
            .staking_engine
            .ok_or_else(|| RhemError::InvalidConfig("no staking engine bound".to_string()))?;
        ledger.approve(self.address, engine, amount)?;
        tracing::info!(engine = %engine, amount = %amount, "staking allowance approved");
        Ok(())
    }

    /// Move surplus reserve out of the pool.
    pub fn withdraw(
        &self,
        access: &AccessControl,
        ledger: &mut Ledger,
        caller: &Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), RhemError> {
        access.require_not_paused(Component::RewardPool)?;
        access.require_role(caller, Role::Owner)?;
        if amount == 0 {
            return Err(RhemError::InvalidAmount);
        }
        ledger.transfer(self.address, to, amount)?;
        tracing::info!(to = %to, amount = %amount, "reward pool withdrawal");
        Ok(())
    }
}
