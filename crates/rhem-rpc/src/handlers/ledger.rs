// crates/rhem-rpc/src/handlers/ledger.rs
//
// Ledger handlers: Balance, Allowance, Transfer, Approve, TransferFrom,
// Mint, Burn, Claim, Info.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use rhem_core::Address;
use rhem_economics::token::{DECIMALS, TOKEN_NAME, TOKEN_SYMBOL};
use rhem_economics::{Platform, MAX_SUPPLY};

use super::{hash_to_hex, parse_amount, parse_hash};
use crate::error::RpcError;

// ---------------------------------------------------------------------------
// Balance / Allowance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceRequest {
    pub account: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub account: Address,
    /// Balance in base units.
    pub balance: String,
}

pub async fn handle_balance(
    platform: &RwLock<Platform>,
    request: BalanceRequest,
) -> Result<BalanceResponse, RpcError> {
    let platform = platform.read().await;
    Ok(BalanceResponse {
        account: request.account,
        balance: platform.balance_of(&request.account).to_string(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceRequest {
    pub owner: Address,
    pub spender: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub owner: Address,
    pub spender: Address,
    pub allowance: String,
}

pub async fn handle_allowance(
    platform: &RwLock<Platform>,
    request: AllowanceRequest,
) -> Result<AllowanceResponse, RpcError> {
    let platform = platform.read().await;
    Ok(AllowanceResponse {
        owner: request.owner,
        spender: request.spender,
        allowance: platform
            .allowance(&request.owner, &request.spender)
            .to_string(),
    })
}

// ---------------------------------------------------------------------------
// Transfer / Approve / TransferFrom
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub caller: Address,
    pub to: Address,
    pub amount: String,
}

/// Balances of both sides after a successful transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    pub from: Address,
    pub to: Address,
    pub amount: String,
    pub from_balance: String,
    pub to_balance: String,
}

fn transfer_response(platform: &Platform, from: Address, to: Address, amount: &str) -> TransferResponse {
    TransferResponse {
        from,
        to,
        amount: amount.to_string(),
        from_balance: platform.balance_of(&from).to_string(),
        to_balance: platform.balance_of(&to).to_string(),
    }
}

pub async fn handle_transfer(
    platform: &RwLock<Platform>,
    request: TransferRequest,
) -> Result<TransferResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let mut platform = platform.write().await;
    platform.transfer(request.caller, request.to, amount)?;
    Ok(transfer_response(&platform, request.caller, request.to, &request.amount))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub caller: Address,
    pub spender: Address,
    pub amount: String,
}

pub async fn handle_approve(
    platform: &RwLock<Platform>,
    request: ApproveRequest,
) -> Result<AllowanceResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let mut platform = platform.write().await;
    platform.approve(request.caller, request.spender, amount)?;
    Ok(AllowanceResponse {
        owner: request.caller,
        spender: request.spender,
        allowance: amount.to_string(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferFromRequest {
    /// The spender spending `from`'s allowance.
    pub caller: Address,
    pub from: Address,
    pub to: Address,
    pub amount: String,
}

pub async fn handle_transfer_from(
    platform: &RwLock<Platform>,
    request: TransferFromRequest,
) -> Result<TransferResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let mut platform = platform.write().await;
    platform.transfer_from(request.caller, request.from, request.to, amount)?;
    Ok(transfer_response(&platform, request.from, request.to, &request.amount))
}

// ---------------------------------------------------------------------------
// Mint / Burn
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintRequest {
    pub caller: Address,
    pub to: Address,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyResponse {
    pub total_supply: String,
}

pub async fn handle_mint(
    platform: &RwLock<Platform>,
    request: MintRequest,
) -> Result<SupplyResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let mut platform = platform.write().await;
    platform.mint(request.caller, request.to, amount)?;
    Ok(SupplyResponse {
        total_supply: platform.ledger().total_supply().to_string(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurnRequest {
    pub caller: Address,
    pub amount: String,
}

pub async fn handle_burn(
    platform: &RwLock<Platform>,
    request: BurnRequest,
) -> Result<SupplyResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let mut platform = platform.write().await;
    platform.burn(request.caller, amount)?;
    Ok(SupplyResponse {
        total_supply: platform.ledger().total_supply().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub caller: Address,
    pub amount: String,
    /// Sibling hashes from leaf to root, hex-encoded.
    #[serde(default)]
    pub proof: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub account: Address,
    pub claimed: String,
    pub balance: String,
}

pub async fn handle_claim(
    platform: &RwLock<Platform>,
    request: ClaimRequest,
) -> Result<ClaimResponse, RpcError> {
    let amount = parse_amount("amount", &request.amount)?;
    let proof = request
        .proof
        .iter()
        .map(|node| parse_hash("proof", node))
        .collect::<Result<Vec<_>, _>>()?;
    let mut platform = platform.write().await;
    platform.claim(request.caller, amount, &proof)?;
    Ok(ClaimResponse {
        account: request.caller,
        claimed: amount.to_string(),
        balance: platform.balance_of(&request.caller).to_string(),
    })
}

// ---------------------------------------------------------------------------
// Info
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerInfoRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerInfoResponse {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: String,
    pub max_supply: String,
    pub merkle_root: String,
    /// False when the claim root is all zeroes.
    pub claims_enabled: bool,
}

pub async fn handle_info(
    platform: &RwLock<Platform>,
    _request: LedgerInfoRequest,
) -> Result<LedgerInfoResponse, RpcError> {
    let platform = platform.read().await;
    let root = platform.ledger().merkle_root();
    Ok(LedgerInfoResponse {
        name: TOKEN_NAME.to_string(),
        symbol: TOKEN_SYMBOL.to_string(),
        decimals: DECIMALS,
        total_supply: platform.ledger().total_supply().to_string(),
        max_supply: MAX_SUPPLY.to_string(),
        merkle_root: hash_to_hex(&root),
        claims_enabled: root != [0u8; 32],
    })
}
