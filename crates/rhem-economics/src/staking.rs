// crates/rhem-economics/src/staking.rs
//
// Time-locked staking with reward accrual.
//
// A position moves Open -> Withdrawn exactly once. Positions are appended per
// account in call order and are never removed or compacted, so an index handed
// out by `stake` refers to the same position forever.
//
// Lock periods (selector -> duration) are fixed; see `rewards::LOCK_PERIODS`.
// The multiplier for a selector and the reward cap are copied into the position
// at stake time, so later governance changes only affect positions opened
// afterwards.
//
// Principal sits in the engine's custody address. Rewards are pulled from the
// reward pool through the allowance the pool granted this engine; if that
// allowance (or the pool balance) cannot cover a payout, `unstake` fails and
// nothing moves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rhem_core::{Address, Amount, Component, RhemError, Role, Timestamp};

use crate::access::AccessControl;
use crate::rewards::{
    compute_reward, lock_duration, AccrualCurve, DEFAULT_MULTIPLIER_BP, DEFAULT_REWARD_CAP_BP,
    LOCK_PERIOD_COUNT, MAX_REWARD_CAP_BP,
};
use crate::token::{Leg, Ledger};

/// Lifecycle of a stake position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PositionState {
    Open,
    /// Terminal. Records when the position closed and what it paid.
    Withdrawn { at: Timestamp, reward: Amount },
}

/// A single locked deposit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakePosition {
    /// Principal in base units. Always > 0.
    pub amount: Amount,
    /// Index into the lock-period table.
    pub selector: usize,
    /// Time the position was opened.
    pub start: Timestamp,
    /// Multiplier in effect when the position was opened.
    pub multiplier_bp: u32,
    /// Reward cap in effect when the position was opened.
    #[serde(default = "default_reward_cap_bp")]
    pub reward_cap_bp: u32,
    pub state: PositionState,
}

fn default_reward_cap_bp() -> u32 {
    DEFAULT_REWARD_CAP_BP
}

impl StakePosition {
    pub fn is_open(&self) -> bool {
        self.state == PositionState::Open
    }

    /// Earliest time `unstake` succeeds.
    pub fn unlocks_at(&self) -> Timestamp {
        // Selector was validated when the position was created.
        let lock = lock_duration(self.selector).unwrap_or(0);
        self.start.saturating_add(lock)
    }
}

/// Engine-wide policy, fixed at deployment except for the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    pub accrual: AccrualCurve,
    /// Ceiling on reward per position, in basis points of principal.
    pub reward_cap_bp: u32,
    /// Whether frozen accounts are barred from stake and unstake.
    pub freeze_blocks_staking: bool,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            accrual: AccrualCurve::Step,
            reward_cap_bp: DEFAULT_REWARD_CAP_BP,
            freeze_blocks_staking: true,
        }
    }
}

/// What a successful `unstake` paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakeReceipt {
    pub index: usize,
    pub principal: Amount,
    pub reward: Amount,
    pub payout: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakingEngine {
    /// Custody address holding staked principal.
    address: Address,
    /// Reward pool custody address rewards are pulled from.
    reward_pool: Option<Address>,
    multipliers: [u32; LOCK_PERIOD_COUNT],
    config: StakingConfig,
    positions: BTreeMap<Address, Vec<StakePosition>>,
    user_totals: BTreeMap<Address, Amount>,
    total_staked: Amount,
}

impl StakingEngine {
    pub fn new(address: Address, config: StakingConfig) -> Self {
        Self {
            address,
            reward_pool: None,
            multipliers: [DEFAULT_MULTIPLIER_BP; LOCK_PERIOD_COUNT],
            config,
            positions: BTreeMap::new(),
            user_totals: BTreeMap::new(),
            total_staked: 0,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn reward_pool(&self) -> Option<Address> {
        self.reward_pool
    }

    // -----------------------------------------------------------------------
    // User operations
    // -----------------------------------------------------------------------

    /// Lock `amount` for the duration of `selector`. Returns the new position's index.
    ///
    /// The caller must have approved this engine for at least `amount`.
    pub fn stake(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        caller: Address,
        amount: Amount,
        selector: usize,
        now: Timestamp,
    ) -> Result<usize, RhemError> {
        access.require_not_paused(Component::Staking)?;
        if self.config.freeze_blocks_staking {
            access.require_not_frozen(&caller)?;
        }
        if amount == 0 {
            return Err(RhemError::InvalidAmount);
        }
        lock_duration(selector)?;

        let user_total = self
            .total_user_staked(&caller)
            .checked_add(amount)
            .ok_or(RhemError::Overflow)?;
        let total = self.total_staked.checked_add(amount).ok_or(RhemError::Overflow)?;

        ledger.transfer_from(self.address, caller, self.address, amount)?;

        let position = StakePosition {
            amount,
            selector,
            start: now,
            multiplier_bp: self.multipliers[selector],
            reward_cap_bp: self.config.reward_cap_bp,
            state: PositionState::Open,
        };
        let list = self.positions.entry(caller).or_default();
        list.push(position);
        let index = list.len() - 1;
        self.user_totals.insert(caller, user_total);
        self.total_staked = total;

        tracing::info!(
            account = %caller,
            index,
            amount = %amount,
            selector,
            multiplier_bp = self.multipliers[selector],
            "staked"
        );
        Ok(index)
    }

    /// Close position `index` after its lock matured, paying principal plus reward.
    pub fn unstake(
        &mut self,
        access: &AccessControl,
        ledger: &mut Ledger,
        caller: Address,
        index: usize,
        now: Timestamp,
    ) -> Result<UnstakeReceipt, RhemError> {
        access.require_not_paused(Component::Staking)?;
        if self.config.freeze_blocks_staking {
            access.require_not_frozen(&caller)?;
        }
        let position = self.open_position(&caller, index)?.clone();

        let unlocks_at = position.unlocks_at();
        if now < unlocks_at {
            return Err(RhemError::StillLocked { unlocks_at, now });
        }

        let reward = self.reward_for(&position, now)?;
        let payout = position.amount.checked_add(reward).ok_or(RhemError::Overflow)?;

        let mut legs = vec![Leg::transfer(self.address, caller, position.amount)];
        if reward > 0 {
            let pool = self.reward_pool.ok_or(RhemError::RewardInsufficient {
                needed: reward,
                available: 0,
            })?;
            let available = ledger
                .allowance(&pool, &self.address)
                .min(ledger.balance_of(&pool));
            if available < reward {
                return Err(RhemError::RewardInsufficient {
                    needed: reward,
                    available,
                });
            }
            legs.push(Leg::transfer_from(self.address, pool, caller, reward));
        }
        ledger.settle(&legs)?;

        if let Some(p) = self.positions.get_mut(&caller).and_then(|l| l.get_mut(index)) {
            p.state = PositionState::Withdrawn { at: now, reward };
        }
        let remaining = self.total_user_staked(&caller) - position.amount;
        if remaining == 0 {
            self.user_totals.remove(&caller);
        } else {
            self.user_totals.insert(caller, remaining);
        }
        self.total_staked -= position.amount;

        tracing::info!(
            account = %caller,
            index,
            principal = %position.amount,
            reward = %reward,
            "unstaked"
        );
        Ok(UnstakeReceipt {
            index,
            principal: position.amount,
            reward,
            payout,
        })
    }

    // -----------------------------------------------------------------------
    // Governance
    // -----------------------------------------------------------------------

    /// Change the multiplier for positions opened from now on.
    pub fn set_reward_multiplier(
        &mut self,
        access: &AccessControl,
        caller: &Address,
        selector: usize,
        multiplier_bp: u32,
    ) -> Result<(), RhemError> {
        access.require_not_paused(Component::Staking)?;
        access.require_role(caller, Role::Governance)?;
        lock_duration(selector)?;
        if multiplier_bp > self.config.reward_cap_bp {
            return Err(RhemError::InvalidConfig(format!(
                "multiplier {} bp exceeds reward cap {} bp",
                multiplier_bp, self.config.reward_cap_bp
            )));
        }
        self.multipliers[selector] = multiplier_bp;
        tracing::info!(selector, multiplier_bp, "reward multiplier updated");
        Ok(())
    }

    pub fn set_reward_cap(
        &mut self,
        access: &AccessControl,
        caller: &Address,
        cap_bp: u32,
    ) -> Result<(), RhemError> {
        access.require_not_paused(Component::Staking)?;
        access.require_role(caller, Role::Governance)?;
        if cap_bp > MAX_REWARD_CAP_BP {
            return Err(RhemError::InvalidConfig(format!(
                "reward cap {} bp exceeds maximum {} bp",
                cap_bp, MAX_REWARD_CAP_BP
            )));
        }
        self.config.reward_cap_bp = cap_bp;
        tracing::info!(cap_bp, "reward cap updated");
        Ok(())
    }

    /// Point the engine at the reward pool it pulls from.
    pub fn set_reward_pool(
        &mut self,
        access: &AccessControl,
        caller: &Address,
        pool: Address,
    ) -> Result<(), RhemError> {
        access.require_not_paused(Component::Staking)?;
        access.require_role(caller, Role::Owner)?;
        if pool.is_zero() {
            return Err(RhemError::InvalidAddress("reward pool is the zero address".to_string()));
        }
        self.reward_pool = Some(pool);
        tracing::info!(pool = %pool, "staking engine bound to reward pool");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn total_staked(&self) -> Amount {
        self.total_staked
    }

    pub fn total_user_staked(&self, account: &Address) -> Amount {
        self.user_totals.get(account).copied().unwrap_or(0)
    }

    pub fn reward_multiplier(&self, selector: usize) -> Result<u32, RhemError> {
        lock_duration(selector)?;
        Ok(self.multipliers[selector])
    }

    /// Every position `account` ever opened, in creation order.
    pub fn positions(&self, account: &Address) -> &[StakePosition] {
        self.positions.get(account).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Projected payout (principal + reward) of an open position as of `now`.
    pub fn calculate_rewards(
        &self,
        account: &Address,
        index: usize,
        now: Timestamp,
    ) -> Result<Amount, RhemError> {
        let position = self.open_position(account, index)?;
        let reward = self.reward_for(position, now)?;
        position.amount.checked_add(reward).ok_or(RhemError::Overflow)
    }

    /// Projected reward alone of an open position as of `now`.
    pub fn projected_reward(
        &self,
        account: &Address,
        index: usize,
        now: Timestamp,
    ) -> Result<Amount, RhemError> {
        let position = self.open_position(account, index)?;
        self.reward_for(position, now)
    }

    fn open_position(&self, account: &Address, index: usize) -> Result<&StakePosition, RhemError> {
        self.positions
            .get(account)
            .and_then(|list| list.get(index))
            .filter(|p| p.is_open())
            .ok_or(RhemError::InvalidStakeIndex { index })
    }

    fn reward_for(&self, position: &StakePosition, now: Timestamp) -> Result<Amount, RhemError> {
        let lock = lock_duration(position.selector)?;
        let elapsed = now.saturating_sub(position.start);
        compute_reward(
            position.amount,
            position.multiplier_bp,
            position.reward_cap_bp,
            elapsed,
            lock,
            self.config.accrual,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reward_pool::RewardPool;
    use crate::token::WEI_PER_RHEM;
    use rhem_core::SECONDS_PER_DAY;

    const T0: Timestamp = 1_700_000_000;
    const DAY: u64 = SECONDS_PER_DAY;

    struct Fixture {
        access: AccessControl,
        ledger: Ledger,
        pool: RewardPool,
        engine: StakingEngine,
    }

    fn owner() -> Address {
        Address::derive("multisig")
    }

    fn dao() -> Address {
        Address::derive("dao")
    }

    fn user() -> Address {
        Address::derive("user")
    }

    fn rhem(n: u64) -> Amount {
        n as Amount * WEI_PER_RHEM
    }

    fn fixture_with(config: StakingConfig) -> Fixture {
        let mut access = AccessControl::new();
        access.bootstrap_grant(owner(), Role::Owner);
        access.bootstrap_grant(owner(), Role::Freezer);
        access.bootstrap_grant(dao(), Role::Governance);

        let mut ledger = Ledger::default();
        let mut pool = RewardPool::new(Address::derive("rhem/reward-pool"));
        let mut engine = StakingEngine::new(Address::derive("rhem/staking"), config);

        pool.set_staking_engine(&access, &mut ledger, &owner(), engine.address())
            .unwrap();
        engine.set_reward_pool(&access, &owner(), pool.address()).unwrap();

        ledger.mint(user(), rhem(1_000)).unwrap();
        ledger.approve(user(), engine.address(), rhem(1_000)).unwrap();
        ledger.mint(pool.address(), rhem(10_000)).unwrap();
        pool.approve_for_staking(&access, &mut ledger, &owner(), rhem(10_000))
            .unwrap();

        Fixture {
            access,
            ledger,
            pool,
            engine,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(StakingConfig::default())
    }

    impl Fixture {
        fn stake(&mut self, amount: Amount, selector: usize, now: Timestamp) -> Result<usize, RhemError> {
            self.engine
                .stake(&self.access, &mut self.ledger, user(), amount, selector, now)
        }

        fn unstake(&mut self, index: usize, now: Timestamp) -> Result<UnstakeReceipt, RhemError> {
            self.engine
                .unstake(&self.access, &mut self.ledger, user(), index, now)
        }

        fn custody(&self) -> Amount {
            self.ledger.balance_of(&self.engine.address())
        }
    }

    #[test]
    fn test_stake_and_unstake_with_rewards() {
        let mut f = fixture();
        assert_eq!(f.stake(rhem(100), 0, T0).unwrap(), 0);
        assert_eq!(f.engine.total_staked(), rhem(100));
        assert_eq!(f.engine.total_user_staked(&user()), rhem(100));
        assert_eq!(f.custody(), rhem(100));

        let before = f.ledger.balance_of(&user());
        let receipt = f.unstake(0, T0 + 7 * DAY).unwrap();
        assert_eq!(receipt.principal, rhem(100));
        assert_eq!(receipt.reward, rhem(1));
        assert_eq!(f.ledger.balance_of(&user()), before + receipt.payout);
        assert!(receipt.payout >= rhem(100));
        assert_eq!(f.engine.total_staked(), 0);
        assert_eq!(f.engine.total_user_staked(&user()), 0);
        assert!(!f.engine.positions(&user())[0].is_open());
        assert_eq!(f.custody(), 0);
    }

    #[test]
    fn test_respects_lock_periods() {
        let mut f = fixture();
        f.stake(rhem(100), 1, T0).unwrap();
        let err = f.unstake(0, T0 + 7 * DAY).unwrap_err();
        assert_eq!(
            err,
            RhemError::StillLocked {
                unlocks_at: T0 + 14 * DAY,
                now: T0 + 7 * DAY
            }
        );
        assert!(f.engine.positions(&user())[0].is_open());
        assert_eq!(f.engine.total_staked(), rhem(100));
    }

    #[test]
    fn test_unlocks_exactly_at_duration() {
        let mut f = fixture();
        f.stake(rhem(10), 2, T0).unwrap();
        assert!(matches!(
            f.unstake(0, T0 + 30 * DAY - 1),
            Err(RhemError::StillLocked { .. })
        ));
        assert!(f.unstake(0, T0 + 30 * DAY).is_ok());
    }

    #[test]
    fn test_invalid_inputs() {
        let mut f = fixture();
        assert_eq!(f.stake(0, 0, T0), Err(RhemError::InvalidAmount));
        assert_eq!(
            f.stake(rhem(100), 8, T0),
            Err(RhemError::InvalidLockPeriod { selector: 8 })
        );
        assert_eq!(
            f.unstake(0, T0).unwrap_err(),
            RhemError::InvalidStakeIndex { index: 0 }
        );
    }

    #[test]
    fn test_withdrawn_position_cannot_be_reused() {
        let mut f = fixture();
        f.stake(rhem(5), 0, T0).unwrap();
        f.unstake(0, T0 + 7 * DAY).unwrap();
        assert_eq!(
            f.unstake(0, T0 + 8 * DAY).unwrap_err(),
            RhemError::InvalidStakeIndex { index: 0 }
        );
        assert!(f.engine.calculate_rewards(&user(), 0, T0 + 8 * DAY).is_err());
    }

    #[test]
    fn test_pause_blocks_stake() {
        let mut f = fixture();
        f.access.pause(&owner(), Component::Staking).unwrap();
        assert_eq!(
            f.stake(rhem(100), 0, T0),
            Err(RhemError::Paused(Component::Staking))
        );
        f.access.unpause(&owner(), Component::Staking).unwrap();
        f.stake(rhem(100), 0, T0).unwrap();
        assert_eq!(f.engine.total_staked(), rhem(100));
    }

    #[test]
    fn test_multiplier_update_and_projection() {
        let mut f = fixture();
        f.engine
            .set_reward_multiplier(&f.access, &dao(), 0, 200)
            .unwrap();
        assert_eq!(f.engine.reward_multiplier(0).unwrap(), 200);
        f.stake(rhem(100), 0, T0).unwrap();
        let payout = f.engine.calculate_rewards(&user(), 0, T0 + 7 * DAY).unwrap();
        assert!(payout > rhem(100));
        assert_eq!(payout, rhem(102));
    }

    #[test]
    fn test_multiplier_snapshot_isolation() {
        let mut f = fixture();
        f.stake(rhem(100), 0, T0).unwrap();
        let before = f.engine.projected_reward(&user(), 0, T0 + 7 * DAY).unwrap();
        f.engine
            .set_reward_multiplier(&f.access, &dao(), 0, 5_000)
            .unwrap();
        let after = f.engine.projected_reward(&user(), 0, T0 + 7 * DAY).unwrap();
        assert_eq!(before, after);
        assert_eq!(f.engine.positions(&user())[0].multiplier_bp, 100);
    }

    #[test]
    fn test_reward_cap_change_is_prospective() {
        let mut f = fixture();
        f.stake(rhem(100), 0, T0).unwrap();
        f.engine.set_reward_cap(&f.access, &dao(), 50).unwrap();
        assert_eq!(f.engine.positions(&user())[0].reward_cap_bp, DEFAULT_REWARD_CAP_BP);

        let receipt = f.unstake(0, T0 + 7 * DAY).unwrap();
        assert_eq!(receipt.reward, rhem(1));

        let index = f.stake(rhem(100), 0, T0 + 7 * DAY).unwrap();
        assert_eq!(f.engine.positions(&user())[index].reward_cap_bp, 50);
        let receipt = f.unstake(index, T0 + 14 * DAY).unwrap();
        assert_eq!(receipt.reward, rhem(100) / 200);
    }

    #[test]
    fn test_only_governance_sets_multiplier() {
        let mut f = fixture();
        assert!(matches!(
            f.engine.set_reward_multiplier(&f.access, &user(), 0, 300),
            Err(RhemError::AccessDenied { .. })
        ));
        assert!(matches!(
            f.engine.set_reward_multiplier(&f.access, &dao(), 0, 20_000),
            Err(RhemError::InvalidConfig(_))
        ));
        assert_eq!(f.engine.reward_multiplier(0).unwrap(), 100);
    }

    #[test]
    fn test_index_stability() {
        let mut f = fixture();
        f.stake(rhem(1), 0, T0).unwrap();
        f.stake(rhem(2), 1, T0).unwrap();
        f.stake(rhem(3), 0, T0).unwrap();
        f.unstake(0, T0 + 7 * DAY).unwrap();

        let positions = f.engine.positions(&user());
        assert_eq!(positions.len(), 3);
        assert_eq!(positions[1].amount, rhem(2));
        assert_eq!(positions[2].amount, rhem(3));
        assert_eq!(f.stake(rhem(4), 0, T0 + 7 * DAY).unwrap(), 3);
        assert!(f.unstake(2, T0 + 7 * DAY).is_ok());
        assert_eq!(f.engine.total_user_staked(&user()), rhem(6));
    }

    #[test]
    fn test_reward_insufficient_rolls_back() {
        let mut f = fixture();
        f.pool
            .approve_for_staking(&f.access, &mut f.ledger, &owner(), 1)
            .unwrap();
        f.stake(rhem(100), 0, T0).unwrap();
        let user_before = f.ledger.balance_of(&user());

        let err = f.unstake(0, T0 + 7 * DAY).unwrap_err();
        assert_eq!(
            err,
            RhemError::RewardInsufficient {
                needed: rhem(1),
                available: 1
            }
        );
        assert!(f.engine.positions(&user())[0].is_open());
        assert_eq!(f.engine.total_staked(), rhem(100));
        assert_eq!(f.custody(), rhem(100));
        assert_eq!(f.ledger.balance_of(&user()), user_before);
    }

    #[test]
    fn test_stake_requires_allowance() {
        let mut f = fixture();
        f.ledger.approve(user(), f.engine.address(), 0).unwrap();
        assert!(matches!(
            f.stake(rhem(1), 0, T0),
            Err(RhemError::InsufficientAllowance { .. })
        ));
        assert!(f.engine.positions(&user()).is_empty());
        assert_eq!(f.engine.total_staked(), 0);
    }

    #[test]
    fn test_frozen_policy() {
        let mut f = fixture();
        f.access.freeze(&owner(), user()).unwrap();
        assert_eq!(
            f.stake(rhem(1), 0, T0),
            Err(RhemError::AccountFrozen(user()))
        );

        let mut open = fixture_with(StakingConfig {
            freeze_blocks_staking: false,
            ..StakingConfig::default()
        });
        open.access.freeze(&owner(), user()).unwrap();
        assert!(open.stake(rhem(1), 0, T0).is_ok());
    }

    #[test]
    fn test_linear_curve_conservation() {
        let mut f = fixture_with(StakingConfig {
            accrual: AccrualCurve::Linear,
            ..StakingConfig::default()
        });
        let supply = f.ledger.total_supply();
        f.stake(rhem(100), 0, T0).unwrap();
        let mid = f.engine.projected_reward(&user(), 0, T0 + 3 * DAY).unwrap();
        assert!(mid > 0 && mid < rhem(1));
        f.unstake(0, T0 + 30 * DAY).unwrap();
        assert_eq!(f.ledger.total_supply(), supply);
        assert_eq!(f.ledger.sum_of_balances(), supply);
        assert_eq!(f.pool.balance(&f.ledger), rhem(10_000) - rhem(1));
    }
}
