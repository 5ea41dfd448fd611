// crates/rhem-rpc/src/handlers/trading.rs
//
// Trading handlers: Execute, History, SetSettlement.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use rhem_core::{Address, Clock, Timestamp};
use rhem_economics::{Platform, Side, TradeRecord};

use super::parse_amount;
use crate::error::RpcError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteTradeRequest {
    /// Trader; must have approved the trading engine for `amount`.
    pub caller: Address,
    pub amount: String,
    /// Quote price, recorded as given.
    pub price: String,
    pub is_buy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInfo {
    pub amount: String,
    pub price: String,
    pub side: Side,
    pub fee: String,
    pub timestamp: Timestamp,
}

impl From<&TradeRecord> for TradeInfo {
    fn from(record: &TradeRecord) -> Self {
        Self {
            amount: record.amount.to_string(),
            price: record.price.to_string(),
            side: record.side,
            fee: record.fee.to_string(),
            timestamp: record.timestamp,
        }
    }
}

pub async fn handle_execute(
    platform: &RwLock<Platform>,
    clock: &dyn Clock,
    request: ExecuteTradeRequest,
) -> Result<TradeInfo, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let price = parse_amount("price", &request.price)?;
    let mut platform = platform.write().await;
    let now = clock.now();
    let record = platform.execute_trade(
        request.caller,
        amount,
        price,
        Side::from_is_buy(request.is_buy),
        now,
    )?;
    Ok(TradeInfo::from(&record))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeHistoryRequest {
    pub account: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeHistoryResponse {
    pub account: Address,
    pub trades: Vec<TradeInfo>,
}

pub async fn handle_history(
    platform: &RwLock<Platform>,
    request: TradeHistoryRequest,
) -> Result<TradeHistoryResponse, RpcError> {
    let platform = platform.read().await;
    Ok(TradeHistoryResponse {
        account: request.account,
        trades: platform
            .trade_history(&request.account)
            .iter()
            .map(TradeInfo::from)
            .collect(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetSettlementRequest {
    /// Must hold the Owner role.
    pub caller: Address,
    pub is_buy: bool,
    pub account: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResponse {
    pub side: Side,
    pub account: Address,
}

pub async fn handle_set_settlement(
    platform: &RwLock<Platform>,
    request: SetSettlementRequest,
) -> Result<SettlementResponse, RpcError> {
    let side = Side::from_is_buy(request.is_buy);
    let mut platform = platform.write().await;
    platform.set_trade_settlement(request.caller, side, request.account)?;
    Ok(SettlementResponse {
        side,
        account: platform.trading().settlement(side),
    })
}
