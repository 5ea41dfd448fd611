// crates/rhem-daemon/tests/integration.rs
//
// Integration tests for the RHEM daemon stack.
//
// Drives the RPC dispatcher in-process (no sockets) against a deployed
// platform on a manual clock. The daemon is a binary crate with no lib.rs,
// so these tests use the public APIs of rhem-rpc, rhem-economics and
// rhem-core directly.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::RwLock;

use rhem_core::crypto::{claim_leaf, merkle_proof, merkle_root};
use rhem_core::{Address, ManualClock, SECONDS_PER_DAY};
use rhem_economics::{Deployment, Platform, StakingConfig, WEI_PER_RHEM};
use rhem_rpc::{JsonRpcRequest, RhemService};

const T0: u64 = 1_700_000_000;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn rhem(n: u64) -> String {
    (n as u128 * WEI_PER_RHEM).to_string()
}

fn addr(label: &str) -> Address {
    Address::derive(label)
}

fn deployment(merkle_root: [u8; 32]) -> Deployment {
    Deployment {
        governance: addr("dao"),
        owner: addr("multisig"),
        fee_wallet: addr("dev"),
        dev_wallet: addr("dev"),
        burn_address: addr("burn"),
        treasury: addr("deployer"),
        initial_supply: 1_000_000 * WEI_PER_RHEM,
        merkle_root,
        reward_pool_funding: 10_000 * WEI_PER_RHEM,
        staking_allowance: 10_000 * WEI_PER_RHEM,
        staking: StakingConfig::default(),
    }
}

struct Node {
    service: RhemService,
    clock: Arc<ManualClock>,
}

impl Node {
    fn start(merkle_root: [u8; 32]) -> Self {
        let platform = Platform::deploy(&deployment(merkle_root), T0).unwrap();
        let clock = Arc::new(ManualClock::new(T0));
        let service = RhemService::with_manual_clock(Arc::new(RwLock::new(platform)), clock.clone());
        Self { service, clock }
    }

    /// Call and require success; returns the result payload.
    async fn ok(&self, method: &str, params: Value) -> Value {
        let resp = self
            .service
            .dispatch(JsonRpcRequest {
                method: method.to_string(),
                params,
            })
            .await;
        assert!(resp.success, "{} failed: {:?} {:?}", method, resp.code, resp.error);
        resp.result.unwrap()
    }

    /// Call and require failure; returns the error code.
    async fn err(&self, method: &str, params: Value) -> String {
        let resp = self
            .service
            .dispatch(JsonRpcRequest {
                method: method.to_string(),
                params,
            })
            .await;
        assert!(!resp.success, "{} unexpectedly succeeded", method);
        resp.code.unwrap()
    }

    async fn balance(&self, account: Address) -> u128 {
        let result = self.ok("ledger/balance", json!({ "account": account })).await;
        result["balance"].as_str().unwrap().parse().unwrap()
    }

    async fn supply_invariant_holds(&self) -> bool {
        let platform = self.service.platform().read().await;
        platform.ledger().sum_of_balances() == platform.ledger().total_supply()
    }

    async fn addresses(&self) -> Value {
        self.ok("node/info", json!({})).await["addresses"].clone()
    }

    /// Fund `user` from the treasury and approve `spender` for the same amount.
    async fn fund_and_approve(&self, user: Address, spender: &Value, amount: &str) {
        self.ok(
            "ledger/transfer",
            json!({ "caller": addr("deployer"), "to": user, "amount": amount }),
        )
        .await;
        self.ok(
            "ledger/approve",
            json!({ "caller": user, "spender": spender, "amount": amount }),
        )
        .await;
    }
}

// ---------------------------------------------------------------------------
// Staking lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_stake_then_unstake_after_lock() {
    let node = Node::start([0u8; 32]);
    let user = addr("user");
    let staking = node.addresses().await["staking"].clone();
    node.fund_and_approve(user, &staking, &rhem(100)).await;

    let staked = node
        .ok("staking/stake", json!({ "caller": user, "amount": rhem(100), "selector": 0 }))
        .await;
    assert_eq!(staked["index"], json!(0));
    assert_eq!(staked["unlocks_at"], json!(T0 + 7 * SECONDS_PER_DAY));

    let totals = node.ok("staking/totals", json!({ "account": user })).await;
    assert_eq!(totals["total_staked"], json!(rhem(100)));
    assert_eq!(totals["user_staked"], json!(rhem(100)));

    // Before maturity: locked, and the step curve projects principal only.
    assert_eq!(
        node.err("staking/unstake", json!({ "caller": user, "index": 0 })).await,
        "StillLocked"
    );
    let rewards = node
        .ok("staking/rewards", json!({ "account": user, "index": 0 }))
        .await;
    assert_eq!(rewards["payout"], json!(rhem(100)));

    node.clock.advance(7 * SECONDS_PER_DAY).unwrap();
    let rewards = node
        .ok("staking/rewards", json!({ "account": user, "index": 0 }))
        .await;
    assert_eq!(rewards["payout"], json!(rhem(101)));

    let receipt = node
        .ok("staking/unstake", json!({ "caller": user, "index": 0 }))
        .await;
    assert_eq!(receipt["payout"], json!(rhem(101)));
    assert_eq!(node.balance(user).await, 101 * WEI_PER_RHEM);

    let totals = node.ok("staking/totals", json!({ "account": user })).await;
    assert_eq!(totals["total_staked"], json!("0"));
    assert_eq!(totals["reward_pool_available"], json!(rhem(9_999)));

    // Withdrawn positions stay listed but cannot be withdrawn again.
    let positions = node.ok("staking/positions", json!({ "account": user })).await;
    assert_eq!(positions["positions"][0]["state"], json!("withdrawn"));
    assert_eq!(
        node.err("staking/unstake", json!({ "caller": user, "index": 0 })).await,
        "InvalidStakeIndex"
    );
    assert!(node.supply_invariant_holds().await);
}

#[tokio::test]
async fn test_stake_rejections() {
    let node = Node::start([0u8; 32]);
    let user = addr("user");
    let staking = node.addresses().await["staking"].clone();
    node.fund_and_approve(user, &staking, &rhem(10)).await;

    assert_eq!(
        node.err("staking/stake", json!({ "caller": user, "amount": "0", "selector": 0 })).await,
        "InvalidAmount"
    );
    assert_eq!(
        node.err("staking/stake", json!({ "caller": user, "amount": rhem(1), "selector": 8 })).await,
        "InvalidLockPeriod"
    );
    assert_eq!(
        node.err("staking/stake", json!({ "caller": user, "amount": rhem(11), "selector": 0 })).await,
        "InsufficientAllowance"
    );
    let totals = node.ok("staking/totals", json!({})).await;
    assert_eq!(totals["total_staked"], json!("0"));
}

#[tokio::test]
async fn test_governance_multiplier_change_applies_to_new_positions() {
    let node = Node::start([0u8; 32]);
    let user = addr("user");
    let staking = node.addresses().await["staking"].clone();
    node.fund_and_approve(user, &staking, &rhem(200)).await;

    node.ok("staking/stake", json!({ "caller": user, "amount": rhem(100), "selector": 1 }))
        .await;
    assert_eq!(
        node.err(
            "staking/set_multiplier",
            json!({ "caller": addr("multisig"), "selector": 1, "multiplier_bp": 500 })
        )
        .await,
        "AccessDenied"
    );
    let info = node
        .ok(
            "staking/set_multiplier",
            json!({ "caller": addr("dao"), "selector": 1, "multiplier_bp": 500 }),
        )
        .await;
    assert_eq!(info["multiplier_bp"], json!(500));
    assert_eq!(info["lock_days"], json!(14));

    node.ok("staking/stake", json!({ "caller": user, "amount": rhem(100), "selector": 1 }))
        .await;
    node.clock.advance(14 * SECONDS_PER_DAY).unwrap();

    let old = node.ok("staking/unstake", json!({ "caller": user, "index": 0 })).await;
    let new = node.ok("staking/unstake", json!({ "caller": user, "index": 1 })).await;
    assert_eq!(old["reward"], json!(rhem(1)));
    assert_eq!(new["reward"], json!(rhem(5)));
}

// ---------------------------------------------------------------------------
// Trading
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_trade_fee_and_history() {
    let node = Node::start([0u8; 32]);
    let user = addr("user");
    let trading = node.addresses().await["trading"].clone();
    node.fund_and_approve(user, &trading, &rhem(100)).await;

    let trade = node
        .ok(
            "trading/execute",
            json!({ "caller": user, "amount": rhem(100), "price": rhem(1), "is_buy": true }),
        )
        .await;
    assert_eq!(trade["fee"], json!(rhem(1)));
    assert_eq!(trade["side"], json!("buy"));
    assert_eq!(node.balance(addr("dev")).await, WEI_PER_RHEM);

    let history = node.ok("trading/history", json!({ "account": user })).await;
    assert_eq!(history["trades"].as_array().unwrap().len(), 1);
    assert_eq!(history["trades"][0]["amount"], json!(rhem(100)));
    assert!(node.supply_invariant_holds().await);
}

#[tokio::test]
async fn test_frozen_trader_is_rejected_until_unfrozen() {
    let node = Node::start([0u8; 32]);
    let user = addr("user");
    let trading = node.addresses().await["trading"].clone();
    node.fund_and_approve(user, &trading, &rhem(10)).await;

    node.ok("admin/freeze", json!({ "caller": addr("multisig"), "account": user }))
        .await;
    let params = json!({ "caller": user, "amount": rhem(1), "price": "1", "is_buy": false });
    assert_eq!(node.err("trading/execute", params.clone()).await, "AccountFrozen");

    node.ok("admin/unfreeze", json!({ "caller": addr("multisig"), "account": user }))
        .await;
    node.ok("trading/execute", params).await;
}

// ---------------------------------------------------------------------------
// Platform administration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_register_module_and_pause() {
    let node = Node::start([0u8; 32]);
    let dao = addr("dao");
    let multisig = addr("multisig");
    let timelock = format!("0x{}", "ab".repeat(32));

    node.ok(
        "registry/register",
        json!({ "caller": dao, "name": "Oracle", "address": multisig, "timelock_id": timelock }),
    )
    .await;
    let module = node.ok("registry/get", json!({ "name": "Oracle" })).await;
    assert_eq!(module["address"], json!(multisig));

    // Only the owner may pause.
    assert_eq!(
        node.err("admin/pause", json!({ "caller": addr("deployer") })).await,
        "AccessDenied"
    );
    node.ok("admin/pause", json!({ "caller": multisig })).await;
    assert_eq!(
        node.err(
            "registry/register",
            json!({ "caller": dao, "name": "Test", "address": multisig, "timelock_id": timelock })
        )
        .await,
        "Paused"
    );
    // Reads keep working while paused.
    node.ok("registry/get", json!({ "name": "Staking" })).await;
    node.ok("ledger/info", json!({})).await;

    node.ok("admin/unpause", json!({ "caller": multisig })).await;
    node.ok(
        "registry/register",
        json!({ "caller": dao, "name": "Test", "address": multisig, "timelock_id": timelock }),
    )
    .await;
}

#[tokio::test]
async fn test_collect_platform_fee() {
    let node = Node::start([0u8; 32]);
    let dao = addr("dao");
    let collector = node.addresses().await["fee_collector"].clone();

    node.ok(
        "ledger/transfer",
        json!({ "caller": addr("deployer"), "to": dao, "amount": rhem(10) }),
    )
    .await;
    node.ok(
        "ledger/approve",
        json!({ "caller": dao, "spender": collector, "amount": rhem(10) }),
    )
    .await;
    let split = node
        .ok("admin/collect_fee", json!({ "caller": dao, "from": dao, "amount": rhem(10) }))
        .await;
    assert_eq!(split["dev_amount"], json!(rhem(5)));
    assert_eq!(node.balance(addr("dev")).await, 5 * WEI_PER_RHEM);
    assert_eq!(node.balance(addr("burn")).await, 5 * WEI_PER_RHEM);
}

#[tokio::test]
async fn test_role_administration() {
    let node = Node::start([0u8; 32]);
    let multisig = addr("multisig");
    let user = addr("user");

    let has = node
        .ok("admin/has_role", json!({ "account": user, "role": "Minter" }))
        .await;
    assert_eq!(has["has_role"], json!(false));

    node.ok(
        "admin/grant_role",
        json!({ "caller": multisig, "account": user, "role": "Minter" }),
    )
    .await;
    node.ok("ledger/mint", json!({ "caller": user, "to": user, "amount": rhem(3) }))
        .await;
    assert_eq!(node.balance(user).await, 3 * WEI_PER_RHEM);

    node.ok(
        "admin/revoke_role",
        json!({ "caller": multisig, "account": user, "role": "Minter" }),
    )
    .await;
    assert_eq!(
        node.err("ledger/burn", json!({ "caller": user, "amount": rhem(1) })).await,
        "AccessDenied"
    );
}

// ---------------------------------------------------------------------------
// Reward pool exhaustion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unstake_fails_cleanly_when_allowance_exhausted() {
    let node = Node::start([0u8; 32]);
    let user = addr("user");
    let staking = node.addresses().await["staking"].clone();
    node.fund_and_approve(user, &staking, &rhem(100)).await;
    node.ok("staking/stake", json!({ "caller": user, "amount": rhem(100), "selector": 0 }))
        .await;

    node.ok(
        "admin/approve_for_staking",
        json!({ "caller": addr("multisig"), "amount": "0" }),
    )
    .await;
    node.clock.advance(7 * SECONDS_PER_DAY).unwrap();
    assert_eq!(
        node.err("staking/unstake", json!({ "caller": user, "index": 0 })).await,
        "RewardInsufficient"
    );
    let positions = node.ok("staking/positions", json!({ "account": user })).await;
    assert_eq!(positions["positions"][0]["state"], json!("open"));

    node.ok(
        "admin/approve_for_staking",
        json!({ "caller": addr("multisig"), "amount": rhem(1) }),
    )
    .await;
    node.ok("staking/unstake", json!({ "caller": user, "index": 0 })).await;
    assert!(node.supply_invariant_holds().await);
}

// ---------------------------------------------------------------------------
// Merkle claim
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_claim_once() {
    let alice = addr("alice");
    let bob = addr("bob");
    let leaves = vec![
        claim_leaf(&alice, 50 * WEI_PER_RHEM),
        claim_leaf(&bob, 20 * WEI_PER_RHEM),
    ];
    let node = Node::start(merkle_root(&leaves));
    let proof: Vec<String> = merkle_proof(&leaves, 0)
        .unwrap()
        .iter()
        .map(|h| format!("0x{}", hex::encode(h)))
        .collect();

    let params = json!({ "caller": alice, "amount": rhem(50), "proof": proof });
    node.ok("ledger/claim", params.clone()).await;
    assert_eq!(node.balance(alice).await, 50 * WEI_PER_RHEM);
    assert_eq!(node.err("ledger/claim", params).await, "AlreadyClaimed");

    // Alice's proof does not prove Bob's leaf.
    assert_eq!(
        node.err(
            "ledger/claim",
            json!({ "caller": bob, "amount": rhem(20), "proof": ["0x".to_string() + &"00".repeat(32)] })
        )
        .await,
        "InvalidProof"
    );
    assert!(node.supply_invariant_holds().await);
}
