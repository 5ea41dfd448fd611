// crates/rhem-economics/src/trading.rs
//
// Trade execution with a flat 1% fee and per-account trade history.
//
// A trade pulls `amount` from the caller (who must have approved this engine),
// routes `amount / 100` to the fee wallet and the rest to the settlement
// account for the trade's side. Integer division floors the fee; the
// fractional remainder stays with the net leg, so nothing is created or lost.
// The history record is appended only after settlement succeeds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rhem_core::{Address, Amount, Component, RhemError, Role, Timestamp};

use crate::access::AccessControl;
use crate::fees::trade_fee;
use crate::token::{Leg, Ledger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    pub fn is_buy(&self) -> bool {
        *self == Side::Buy
    }
}

/// Immutable record of an executed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub amount: Amount,
    pub price: Amount,
    pub side: Side,
    pub fee: Amount,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingEngine {
    /// Spender address the trader approves.
    address: Address,
    fee_wallet: Address,
    buy_settlement: Address,
    sell_settlement: Address,
    history: BTreeMap<Address, Vec<TradeRecord>>,
}

impl TradingEngine {
    /// Both sides settle into the engine's own market account until
    /// `set_settlement` says otherwise.
    pub fn new(address: Address, fee_wallet: Address) -> Self {
        Self {
            address,
            fee_wallet,
            buy_settlement: address,
            sell_settlement: address,
            history: BTreeMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn fee_wallet(&self) -> Address {
        self.fee_wallet
    }

    pub fn settlement(&self, side: Side) -> Address {
        match side {
            Side::Buy => self.buy_settlement,
            Side::Sell => self.sell_settlement,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn execute_trade(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        caller: Address,
        amount: Amount,
        price: Amount,
        side: Side,
        now: Timestamp,
    ) -> Result<TradeRecord, RhemError> {
        access.require_not_paused(Component::Trading)?;
        access.require_not_frozen(&caller)?;
        if amount == 0 {
            return Err(RhemError::InvalidAmount);
        }

        let fee = trade_fee(amount);
        let net = amount - fee;
        ledger.settle(&[
            Leg::transfer_from(self.address, caller, self.fee_wallet, fee),
            Leg::transfer_from(self.address, caller, self.settlement(side), net),
        ])?;

        let record = TradeRecord {
            amount,
            price,
            side,
            fee,
            timestamp: now,
        };
        self.history.entry(caller).or_default().push(record.clone());
        tracing::info!(
            account = %caller,
            amount = %amount,
            price = %price,
            side = ?side,
            fee = %fee,
            "trade executed"
        );
        Ok(record)
    }

    pub fn trade_history(&self, account: &Address) -> &[TradeRecord] {
        self.history.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_settlement(
        &mut self,
        access: &AccessControl,
        caller: &Address,
        side: Side,
        account: Address,
    ) -> Result<(), RhemError> {
        access.require_not_paused(Component::Trading)?;
        access.require_role(caller, Role::Owner)?;
        if account.is_zero() {
            return Err(RhemError::InvalidAddress("settlement is the zero address".to_string()));
        }
        match side {
            Side::Buy => self.buy_settlement = account,
            Side::Sell => self.sell_settlement = account,
        }
        tracing::info!(side = ?side, account = %account, "settlement account updated");
        Ok(())
    }
}
