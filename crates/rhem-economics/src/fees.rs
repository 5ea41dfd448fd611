// crates/rhem-economics/src/fees.rs
//
// Fee arithmetic and the platform fee collector.
//
// Trade fee: amount / 100 (1%, floor).
// Platform fee: half to the dev wallet, the remainder (including any odd unit)
// to the burn address. The burn address is an ordinary account, so the
// "burned" half stays in total supply.

use serde::{Deserialize, Serialize};

use rhem_core::{Address, Amount, Component, RhemError, Role};

use crate::access::AccessControl;
use crate::token::{Leg, Ledger};

/// Divisor for the trade fee (1%).
pub const TRADE_FEE_DIVISOR: Amount = 100;

pub fn trade_fee(amount: Amount) -> Amount {
    amount / TRADE_FEE_DIVISOR
}

/// How a platform fee divides between its two destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub dev: Amount,
    pub burn: Amount,
}

pub fn split_platform_fee(amount: Amount) -> FeeSplit {
    let dev = amount / 2;
    FeeSplit {
        dev,
        burn: amount - dev,
    }
}

/// Collects platform fees on behalf of governance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformFees {
    /// Spender address payers approve.
    collector: Address,
    dev_wallet: Address,
    burn_address: Address,
}

impl PlatformFees {
    pub fn new(collector: Address, dev_wallet: Address, burn_address: Address) -> Self {
        Self {
            collector,
            dev_wallet,
            burn_address,
        }
    }

    pub fn collector(&self) -> Address {
        self.collector
    }

    pub fn dev_wallet(&self) -> Address {
        self.dev_wallet
    }

    pub fn burn_address(&self) -> Address {
        self.burn_address
    }

    /// Pull `amount` from `from` and split it between dev wallet and burn address.
    pub fn collect(
        &self,
        access: &AccessControl,
        ledger: &mut Ledger,
        caller: &Address,
        from: Address,
        amount: Amount,
    ) -> Result<FeeSplit, RhemError> {
        access.require_not_paused(Component::Platform)?;
        access.require_role(caller, Role::Governance)?;
        if amount == 0 {
            return Err(RhemError::InvalidAmount);
        }
        let split = split_platform_fee(amount);
        ledger.settle(&[
            Leg::transfer_from(self.collector, from, self.dev_wallet, split.dev),
            Leg::transfer_from(self.collector, from, self.burn_address, split.burn),
        ])?;
        tracing::info!(
            from = %from,
            dev = %split.dev,
            burn = %split.burn,
            "platform fee collected"
        );
        Ok(split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::WEI_PER_RHEM;

    #[test]
    fn test_trade_fee_floor() {
        assert_eq!(trade_fee(100 * WEI_PER_RHEM), WEI_PER_RHEM);
        assert_eq!(trade_fee(99), 0);
        assert_eq!(trade_fee(250), 2);
    }

    #[test]
    fn test_split_keeps_odd_unit_in_burn() {
        assert_eq!(split_platform_fee(10), FeeSplit { dev: 5, burn: 5 });
        assert_eq!(split_platform_fee(11), FeeSplit { dev: 5, burn: 6 });
    }

    #[test]
    fn test_collect_platform_fee() {
        let dao = Address::derive("dao");
        let dev = Address::derive("dev");
        let burn = Address::derive("burn");
        let fees = PlatformFees::new(Address::derive("rhem/platform"), dev, burn);

        let mut access = AccessControl::new();
        access.bootstrap_grant(dao, Role::Governance);
        let mut ledger = Ledger::default();
        let amount = 10 * WEI_PER_RHEM;
        ledger.mint(dao, amount).unwrap();
        ledger.approve(dao, fees.collector(), amount).unwrap();

        fees.collect(&access, &mut ledger, &dao, dao, amount).unwrap();
        assert_eq!(ledger.balance_of(&dev), amount / 2);
        assert_eq!(ledger.balance_of(&burn), amount / 2);
        assert_eq!(ledger.balance_of(&dao), 0);
    }

    #[test]
    fn test_collect_requires_governance() {
        let fees = PlatformFees::new(
            Address::derive("rhem/platform"),
            Address::derive("dev"),
            Address::derive("burn"),
        );
        let access = AccessControl::new();
        let mut ledger = Ledger::default();
        let user = Address::derive("user");
        assert!(matches!(
            fees.collect(&access, &mut ledger, &user, user, 10),
            Err(RhemError::AccessDenied { .. })
        ));
    }
}
