// crates/rhem-economics/src/platform.rs
//
// The assembled platform: one ledger, one access-control table, and the
// components that move value through them.
//
// `Platform` is the single authoritative in-process state. Callers serialize
// mutating calls (the RPC layer holds a write lock per call), every method
// runs to completion, and a method that returns `Err` has changed nothing.
// Time is passed in by the caller, read once from its clock.
//
// Custody addresses (staking engine, reward pool, trading market, fee
// collector) are derived from public labels, so anyone can name them. They
// never act through this surface: value leaves them only through their own
// component's logic, bounded by the allowances that component was granted.

use serde::{Deserialize, Serialize};

use rhem_core::crypto::hash_bytes;
use rhem_core::{Address, Amount, Component, RhemError, Role, Timestamp};

use crate::access::AccessControl;
use crate::fees::{FeeSplit, PlatformFees};
use crate::registry::{ModuleEntry, ModuleRegistry};
use crate::reward_pool::RewardPool;
use crate::staking::{StakePosition, StakingConfig, StakingEngine, UnstakeReceipt};
use crate::token::{Ledger, MAX_SUPPLY};
use crate::trading::{Side, TradeRecord, TradingEngine};

pub const PLATFORM_LABEL: &str = "rhem/platform";
pub const STAKING_LABEL: &str = "rhem/staking";
pub const REWARD_POOL_LABEL: &str = "rhem/reward-pool";
pub const TRADING_LABEL: &str = "rhem/trading";

/// Timelock id recorded for the modules registered at deployment.
pub fn deployment_timelock_id() -> [u8; 32] {
    hash_bytes(b"deploy")
}

/// Addresses that hold component funds: staking, reward pool, trading, fee collector.
pub fn custody_addresses() -> [Address; 4] {
    [
        Address::derive(STAKING_LABEL),
        Address::derive(REWARD_POOL_LABEL),
        Address::derive(TRADING_LABEL),
        Address::derive(PLATFORM_LABEL),
    ]
}

/// Construction parameters, supplied once.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// DAO: module registration, multipliers, platform fees.
    pub governance: Address,
    /// Multisig: pause, freeze, mint, role administration.
    pub owner: Address,
    /// Receives trade fees.
    pub fee_wallet: Address,
    /// Receives half of every platform fee.
    pub dev_wallet: Address,
    /// Receives the other half of every platform fee.
    pub burn_address: Address,
    /// Holder of the initial supply.
    pub treasury: Address,
    pub initial_supply: Amount,
    pub merkle_root: [u8; 32],
    /// Moved from the treasury into the reward pool at deployment.
    pub reward_pool_funding: Amount,
    /// Pull allowance granted to the staking engine at deployment.
    pub staking_allowance: Amount,
    pub staking: StakingConfig,
}

impl Deployment {
    fn validate(&self) -> Result<(), RhemError> {
        let named = [
            ("governance", self.governance),
            ("owner", self.owner),
            ("fee_wallet", self.fee_wallet),
            ("dev_wallet", self.dev_wallet),
            ("burn_address", self.burn_address),
            ("treasury", self.treasury),
        ];
        let custody = custody_addresses();
        for (name, address) in named {
            if address.is_zero() {
                return Err(RhemError::InvalidConfig(format!("{} is the zero address", name)));
            }
            if custody.contains(&address) {
                return Err(RhemError::InvalidConfig(format!(
                    "{} is a component custody address",
                    name
                )));
            }
        }
        if self.initial_supply > MAX_SUPPLY {
            return Err(RhemError::InvalidConfig(
                "initial supply exceeds the supply cap".to_string(),
            ));
        }
        if self.reward_pool_funding > self.initial_supply {
            return Err(RhemError::InvalidConfig(
                "reward pool funding exceeds initial supply".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    ledger: Ledger,
    access: AccessControl,
    reward_pool: RewardPool,
    staking: StakingEngine,
    trading: TradingEngine,
    registry: ModuleRegistry,
    fees: PlatformFees,
    deployed_at: Timestamp,
}

impl Platform {
    /// Build and wire every component.
    ///
    /// Grants `Owner`, `Freezer` and `Minter` to the owner and `Governance` to
    /// the governance address, mints the initial supply to the treasury, funds
    /// the reward pool, binds pool and staking engine to each other, approves
    /// the staking allowance, and registers the modules.
    pub fn deploy(deployment: &Deployment, now: Timestamp) -> Result<Self, RhemError> {
        deployment.validate()?;

        let mut access = AccessControl::new();
        access.bootstrap_grant(deployment.owner, Role::Owner);
        access.bootstrap_grant(deployment.owner, Role::Freezer);
        access.bootstrap_grant(deployment.owner, Role::Minter);
        access.bootstrap_grant(deployment.governance, Role::Governance);

        let mut ledger = Ledger::new(deployment.merkle_root);
        let mut reward_pool = RewardPool::new(Address::derive(REWARD_POOL_LABEL));
        let mut staking = StakingEngine::new(Address::derive(STAKING_LABEL), deployment.staking);
        let trading = TradingEngine::new(Address::derive(TRADING_LABEL), deployment.fee_wallet);
        let fees = PlatformFees::new(
            Address::derive(PLATFORM_LABEL),
            deployment.dev_wallet,
            deployment.burn_address,
        );
        let mut registry = ModuleRegistry::new();

        if deployment.initial_supply > 0 {
            ledger.mint(deployment.treasury, deployment.initial_supply)?;
        }
        ledger.transfer(
            deployment.treasury,
            reward_pool.address(),
            deployment.reward_pool_funding,
        )?;

        reward_pool.set_staking_engine(&access, &mut ledger, &deployment.owner, staking.address())?;
        staking.set_reward_pool(&access, &deployment.owner, reward_pool.address())?;
        reward_pool.approve_for_staking(
            &access,
            &mut ledger,
            &deployment.owner,
            deployment.staking_allowance,
        )?;

        let timelock_id = deployment_timelock_id();
        for (name, address) in [
            ("Staking", staking.address()),
            ("Trading", trading.address()),
            ("RewardPool", reward_pool.address()),
        ] {
            registry.register_module(&access, &deployment.governance, name, address, timelock_id, now)?;
        }

        tracing::info!(
            owner = %deployment.owner,
            governance = %deployment.governance,
            supply = %deployment.initial_supply,
            "platform deployed"
        );

        Ok(Self {
            ledger,
            access,
            reward_pool,
            staking,
            trading,
            registry,
            fees,
            deployed_at: now,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn reward_pool(&self) -> &RewardPool {
        &self.reward_pool
    }

    pub fn staking(&self) -> &StakingEngine {
        &self.staking
    }

    pub fn trading(&self) -> &TradingEngine {
        &self.trading
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn fees(&self) -> &PlatformFees {
        &self.fees
    }

    pub fn deployed_at(&self) -> Timestamp {
        self.deployed_at
    }

    pub fn is_custody_account(&self, account: &Address) -> bool {
        *account == self.staking.address()
            || *account == self.reward_pool.address()
            || *account == self.trading.address()
            || *account == self.fees.collector()
    }

    /// Pause check for `component`, then reject any custody address among `accounts`.
    fn require_external(&self, component: Component, accounts: &[&Address]) -> Result<(), RhemError> {
        self.access.require_not_paused(component)?;
        match accounts.iter().find(|a| self.is_custody_account(a)) {
            Some(account) => Err(RhemError::CustodyAccount(**account)),
            None => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Ledger
    // -----------------------------------------------------------------------

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    pub fn transfer(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), RhemError> {
        self.require_external(Component::Ledger, &[&caller])?;
        self.ledger.transfer(caller, to, amount)
    }

    pub fn approve(&mut self, caller: Address, spender: Address, amount: Amount) -> Result<(), RhemError> {
        self.require_external(Component::Ledger, &[&caller])?;
        self.ledger.approve(caller, spender, amount)
    }

    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), RhemError> {
        self.require_external(Component::Ledger, &[&caller, &from])?;
        self.ledger.transfer_from(caller, from, to, amount)
    }

    pub fn mint(&mut self, caller: Address, to: Address, amount: Amount) -> Result<(), RhemError> {
        self.access.require_not_paused(Component::Ledger)?;
        self.access.require_role(&caller, Role::Minter)?;
        self.ledger.mint(to, amount)
    }

    /// Burn from the caller's own balance.
    pub fn burn(&mut self, caller: Address, amount: Amount) -> Result<(), RhemError> {
        self.require_external(Component::Ledger, &[&caller])?;
        self.access.require_role(&caller, Role::Minter)?;
        self.ledger.burn(caller, amount)
    }

    pub fn claim(&mut self, caller: Address, amount: Amount, proof: &[[u8; 32]]) -> Result<(), RhemError> {
        self.require_external(Component::Ledger, &[&caller])?;
        self.ledger.claim(caller, amount, proof)
    }

    // -----------------------------------------------------------------------
    // Staking
    // -----------------------------------------------------------------------

    pub fn stake(
        &mut self,
        caller: Address,
        amount: Amount,
        selector: usize,
        now: Timestamp,
    ) -> Result<usize, RhemError> {
        self.require_external(Component::Staking, &[&caller])?;
        self.staking
            .stake(&self.access, &mut self.ledger, caller, amount, selector, now)
    }

    pub fn unstake(&mut self, caller: Address, index: usize, now: Timestamp) -> Result<UnstakeReceipt, RhemError> {
        self.require_external(Component::Staking, &[&caller])?;
        self.staking
            .unstake(&self.access, &mut self.ledger, caller, index, now)
    }

    pub fn set_reward_multiplier(
        &mut self,
        caller: Address,
        selector: usize,
        multiplier_bp: u32,
    ) -> Result<(), RhemError> {
        self.staking
            .set_reward_multiplier(&self.access, &caller, selector, multiplier_bp)
    }

    pub fn set_reward_cap(&mut self, caller: Address, cap_bp: u32) -> Result<(), RhemError> {
        self.staking.set_reward_cap(&self.access, &caller, cap_bp)
    }

    /// Rebind the staking engine to a reward pool address.
    pub fn set_reward_pool(&mut self, caller: Address, pool: Address) -> Result<(), RhemError> {
        self.staking.set_reward_pool(&self.access, &caller, pool)
    }

    pub fn total_staked(&self) -> Amount {
        self.staking.total_staked()
    }

    pub fn total_user_staked(&self, account: &Address) -> Amount {
        self.staking.total_user_staked(account)
    }

    pub fn positions(&self, account: &Address) -> &[StakePosition] {
        self.staking.positions(account)
    }

    pub fn calculate_rewards(&self, account: &Address, index: usize, now: Timestamp) -> Result<Amount, RhemError> {
        self.staking.calculate_rewards(account, index, now)
    }

    pub fn reward_multiplier(&self, selector: usize) -> Result<u32, RhemError> {
        self.staking.reward_multiplier(selector)
    }

    // -----------------------------------------------------------------------
    // Reward pool
    // -----------------------------------------------------------------------

    /// Rebind the reward pool to a staking engine address.
    pub fn set_staking_module(&mut self, caller: Address, engine: Address) -> Result<(), RhemError> {
        self.reward_pool
            .set_staking_engine(&self.access, &mut self.ledger, &caller, engine)
    }

    pub fn approve_for_staking(&mut self, caller: Address, amount: Amount) -> Result<(), RhemError> {
        self.reward_pool
            .approve_for_staking(&self.access, &mut self.ledger, &caller, amount)
    }

    pub fn withdraw_from_reward_pool(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), RhemError> {
        self.reward_pool
            .withdraw(&self.access, &mut self.ledger, &caller, to, amount)
    }

    // -----------------------------------------------------------------------
    // Trading
    // -----------------------------------------------------------------------

    pub fn execute_trade(
        &mut self,
        caller: Address,
        amount: Amount,
        price: Amount,
        side: Side,
        now: Timestamp,
    ) -> Result<TradeRecord, RhemError> {
        self.require_external(Component::Trading, &[&caller])?;
        self.trading
            .execute_trade(&self.access, &mut self.ledger, caller, amount, price, side, now)
    }

    pub fn trade_history(&self, account: &Address) -> &[TradeRecord] {
        self.trading.trade_history(account)
    }

    /// Route one side's proceeds to `account` instead of market custody.
    pub fn set_trade_settlement(
        &mut self,
        caller: Address,
        side: Side,
        account: Address,
    ) -> Result<(), RhemError> {
        self.trading.set_settlement(&self.access, &caller, side, account)
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    pub fn register_module(
        &mut self,
        caller: Address,
        name: &str,
        address: Address,
        timelock_id: [u8; 32],
        now: Timestamp,
    ) -> Result<Option<ModuleEntry>, RhemError> {
        self.registry
            .register_module(&self.access, &caller, name, address, timelock_id, now)
    }

    pub fn get_module(&self, name: &str) -> Option<Address> {
        self.registry.get_module(name)
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    pub fn pause(&mut self, caller: Address, component: Component) -> Result<(), RhemError> {
        self.access.pause(&caller, component)
    }

    pub fn unpause(&mut self, caller: Address, component: Component) -> Result<(), RhemError> {
        self.access.unpause(&caller, component)
    }

    pub fn freeze(&mut self, caller: Address, account: Address) -> Result<(), RhemError> {
        self.access.freeze(&caller, account)
    }

    pub fn unfreeze(&mut self, caller: Address, account: Address) -> Result<(), RhemError> {
        self.access.unfreeze(&caller, account)
    }

    pub fn grant_role(&mut self, caller: Address, account: Address, role: Role) -> Result<(), RhemError> {
        if self.is_custody_account(&account) {
            return Err(RhemError::CustodyAccount(account));
        }
        self.access.grant_role(&caller, account, role)
    }

    pub fn revoke_role(&mut self, caller: Address, account: Address, role: Role) -> Result<(), RhemError> {
        self.access.revoke_role(&caller, account, role)
    }

    pub fn has_role(&self, account: &Address, role: Role) -> bool {
        self.access.has_role(account, role)
    }

    pub fn collect_platform_fee(
        &mut self,
        caller: Address,
        from: Address,
        amount: Amount,
    ) -> Result<FeeSplit, RhemError> {
        self.require_external(Component::Platform, &[&caller, &from])?;
        self.fees
            .collect(&self.access, &mut self.ledger, &caller, from, amount)
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    pub fn to_json(&self) -> Result<String, RhemError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RhemError> {
        let platform: Platform = serde_json::from_str(json)?;
        if platform.ledger.sum_of_balances() != platform.ledger.total_supply() {
            return Err(RhemError::InvalidConfig(
                "snapshot balances do not sum to total supply".to_string(),
            ));
        }
        Ok(platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::WEI_PER_RHEM;
    use rhem_core::SECONDS_PER_DAY;

    const T0: Timestamp = 1_700_000_000;

    fn rhem(n: u64) -> Amount {
        n as Amount * WEI_PER_RHEM
    }

    fn deployment() -> Deployment {
        Deployment {
            governance: Address::derive("dao"),
            owner: Address::derive("multisig"),
            fee_wallet: Address::derive("dev"),
            dev_wallet: Address::derive("dev"),
            burn_address: Address::derive("burn"),
            treasury: Address::derive("deployer"),
            initial_supply: rhem(1_000_000),
            merkle_root: [0u8; 32],
            reward_pool_funding: rhem(10_000),
            staking_allowance: rhem(10_000),
            staking: StakingConfig::default(),
        }
    }

    #[test]
    fn test_deploy_wires_components() {
        let d = deployment();
        let platform = Platform::deploy(&d, T0).unwrap();
        assert_eq!(platform.ledger().total_supply(), rhem(1_000_000));
        assert_eq!(platform.balance_of(&d.treasury), rhem(990_000));
        assert_eq!(platform.reward_pool().balance(platform.ledger()), rhem(10_000));
        assert_eq!(
            platform.reward_pool().available_for_staking(platform.ledger()),
            rhem(10_000)
        );
        assert_eq!(
            platform.reward_pool().staking_engine(),
            Some(platform.staking().address())
        );
        assert_eq!(
            platform.staking().reward_pool(),
            Some(platform.reward_pool().address())
        );
        assert_eq!(
            platform.get_module("Staking"),
            Some(platform.staking().address())
        );
        assert!(platform.has_role(&d.owner, Role::Owner));
        assert!(platform.has_role(&d.governance, Role::Governance));
        assert!(!platform.has_role(&d.governance, Role::Owner));
    }

    #[test]
    fn test_deploy_rejects_zero_addresses() {
        let mut d = deployment();
        d.fee_wallet = Address::ZERO;
        assert!(matches!(
            Platform::deploy(&d, T0),
            Err(RhemError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_collect_platform_fee_via_platform() {
        let d = deployment();
        let mut platform = Platform::deploy(&d, T0).unwrap();
        let amount = rhem(10);
        platform.transfer(d.treasury, d.governance, amount).unwrap();
        let collector = platform.fees().collector();
        platform.approve(d.governance, collector, amount).unwrap();
        platform
            .collect_platform_fee(d.governance, d.governance, amount)
            .unwrap();
        assert_eq!(platform.balance_of(&d.dev_wallet), amount / 2);
        assert_eq!(platform.balance_of(&d.burn_address), amount / 2);
    }

    #[test]
    fn test_mint_and_burn_are_role_gated() {
        let d = deployment();
        let mut platform = Platform::deploy(&d, T0).unwrap();
        let user = Address::derive("user");
        assert!(matches!(
            platform.mint(user, user, 1),
            Err(RhemError::AccessDenied { .. })
        ));
        platform.mint(d.owner, d.owner, rhem(5)).unwrap();
        platform.burn(d.owner, rhem(2)).unwrap();
        assert_eq!(platform.balance_of(&d.owner), rhem(3));
        assert_eq!(platform.ledger().total_supply(), rhem(1_000_003));
    }

    #[test]
    fn test_pause_is_uniform_and_reads_still_work() {
        let d = deployment();
        let mut platform = Platform::deploy(&d, T0).unwrap();
        let user = Address::derive("user");
        platform.pause(d.owner, Component::Platform).unwrap();

        assert!(matches!(
            platform.transfer(d.treasury, user, 1),
            Err(RhemError::Paused(_))
        ));
        assert!(matches!(
            platform.stake(user, 1, 0, T0),
            Err(RhemError::Paused(_))
        ));
        assert!(matches!(
            platform.execute_trade(user, 1, 1, Side::Buy, T0),
            Err(RhemError::Paused(_))
        ));
        assert!(matches!(
            platform.register_module(d.governance, "X", user, [0u8; 32], T0),
            Err(RhemError::Paused(_))
        ));
        assert_eq!(platform.total_staked(), 0);
        assert_eq!(platform.balance_of(&d.treasury), rhem(990_000));

        platform.unpause(d.owner, Component::Platform).unwrap();
        assert!(platform.transfer(d.treasury, user, 1).is_ok());
    }

    #[test]
    fn test_custody_accounts_cannot_act_as_callers() {
        let d = deployment();
        let mut platform = Platform::deploy(&d, T0).unwrap();
        let attacker = Address::derive("attacker");
        let pool = platform.reward_pool().address();
        let engine = platform.staking().address();

        // Fund every custody address so a successful debit would be visible.
        let user = Address::derive("user");
        platform.transfer(d.treasury, user, rhem(100)).unwrap();
        platform.approve(user, engine, rhem(100)).unwrap();
        platform.stake(user, rhem(100), 0, T0).unwrap();
        platform
            .transfer(d.treasury, platform.trading().address(), rhem(5))
            .unwrap();
        platform
            .transfer(d.treasury, platform.fees().collector(), rhem(5))
            .unwrap();

        for custody in custody_addresses() {
            let balance = platform.balance_of(&custody);
            assert!(balance > 0);
            assert!(matches!(
                platform.transfer(custody, attacker, balance),
                Err(RhemError::CustodyAccount(a)) if a == custody
            ));
            assert!(matches!(
                platform.approve(custody, attacker, Amount::MAX),
                Err(RhemError::CustodyAccount(_))
            ));
            assert!(matches!(
                platform.transfer_from(attacker, custody, attacker, 1),
                Err(RhemError::CustodyAccount(_))
            ));
            assert!(matches!(
                platform.transfer_from(custody, user, attacker, 1),
                Err(RhemError::CustodyAccount(_))
            ));
            assert!(matches!(
                platform.stake(custody, 1, 0, T0),
                Err(RhemError::CustodyAccount(_))
            ));
            assert!(matches!(
                platform.unstake(custody, 0, T0 + 7 * SECONDS_PER_DAY),
                Err(RhemError::CustodyAccount(_))
            ));
            assert!(matches!(
                platform.execute_trade(custody, 1, 1, Side::Buy, T0),
                Err(RhemError::CustodyAccount(_))
            ));
            assert!(matches!(
                platform.collect_platform_fee(d.governance, custody, 2),
                Err(RhemError::CustodyAccount(_))
            ));
            assert!(matches!(
                platform.grant_role(d.owner, custody, Role::Owner),
                Err(RhemError::CustodyAccount(_))
            ));
            assert_eq!(platform.balance_of(&custody), balance);
            assert_eq!(RhemError::CustodyAccount(custody).code(), "AccessDenied");
        }

        // The pool's allowance stays exactly what the owner approved.
        assert_eq!(platform.allowance(&pool, &engine), rhem(10_000));
        assert_eq!(platform.balance_of(&attacker), 0);
        assert_eq!(platform.ledger().sum_of_balances(), platform.ledger().total_supply());

        // The staker's own position is unaffected and still pays out.
        let receipt = platform
            .unstake(user, 0, T0 + 7 * SECONDS_PER_DAY)
            .unwrap();
        assert_eq!(receipt.payout, rhem(101));
    }

    #[test]
    fn test_deploy_rejects_custody_address_as_role_holder() {
        let mut d = deployment();
        d.owner = Address::derive(REWARD_POOL_LABEL);
        assert!(matches!(
            Platform::deploy(&d, T0),
            Err(RhemError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rebinding_setters_are_role_gated() {
        let d = deployment();
        let mut platform = Platform::deploy(&d, T0).unwrap();
        let pool = platform.reward_pool().address();
        let engine = platform.staking().address();
        let user = Address::derive("user");

        assert!(matches!(
            platform.set_staking_module(user, engine),
            Err(RhemError::AccessDenied { .. })
        ));
        platform.set_staking_module(d.owner, engine).unwrap();
        platform.set_reward_pool(d.owner, pool).unwrap();
        assert_eq!(platform.staking().reward_pool(), Some(pool));

        // The cap is a governance lever; the owner cannot move it.
        assert!(platform.set_reward_cap(d.owner, 500).is_err());
        platform.set_reward_cap(d.governance, 500).unwrap();
        assert!(matches!(
            platform.set_reward_multiplier(d.governance, 0, 600),
            Err(RhemError::InvalidConfig(_))
        ));

        platform
            .withdraw_from_reward_pool(d.owner, d.treasury, rhem(1_000))
            .unwrap();
        assert_eq!(platform.reward_pool().balance(platform.ledger()), rhem(9_000));
        assert_eq!(platform.balance_of(&d.treasury), rhem(991_000));
    }

    #[test]
    fn test_sell_proceeds_follow_configured_settlement() {
        let d = deployment();
        let mut platform = Platform::deploy(&d, T0).unwrap();
        let user = Address::derive("user");
        let desk = Address::derive("desk");
        platform.transfer(d.treasury, user, rhem(100)).unwrap();
        platform
            .approve(user, platform.trading().address(), rhem(100))
            .unwrap();

        assert!(platform.set_trade_settlement(user, Side::Sell, desk).is_err());
        platform.set_trade_settlement(d.owner, Side::Sell, desk).unwrap();
        let record = platform
            .execute_trade(user, rhem(100), rhem(1), Side::Sell, T0)
            .unwrap();
        assert_eq!(record.fee, rhem(1));
        assert_eq!(platform.balance_of(&desk), rhem(99));
        assert_eq!(platform.balance_of(&d.fee_wallet), rhem(1));
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_positions() {
        let d = deployment();
        let mut platform = Platform::deploy(&d, T0).unwrap();
        let user = Address::derive("user");
        platform.transfer(d.treasury, user, rhem(100)).unwrap();
        platform
            .approve(user, platform.staking().address(), rhem(100))
            .unwrap();
        platform.stake(user, rhem(100), 0, T0).unwrap();

        let json = platform.to_json().unwrap();
        let mut restored = Platform::from_json(&json).unwrap();
        assert_eq!(restored.total_staked(), rhem(100));
        assert_eq!(restored.positions(&user).len(), 1);
        let receipt = restored
            .unstake(user, 0, T0 + 7 * SECONDS_PER_DAY)
            .unwrap();
        assert_eq!(receipt.payout, rhem(101));
    }
}
