// crates/rhem-economics/src/rewards.rs
//
// Lock-period table and the staking reward formula.
//
// At full accrual a position earns
//
//   reward = principal * min(multiplier_bp, cap_bp) / 10_000
//
// and the accrual curve decides what fraction of that is earned after a
// given elapsed time:
//   - Step:   nothing before maturity, everything at or after it.
//   - Linear: min(elapsed, lock) / lock of the full reward.
// Both curves are non-decreasing in elapsed time and never exceed the cap.

use serde::{Deserialize, Serialize};

use rhem_core::{Amount, RhemError, SECONDS_PER_DAY};

/// Basis-point denominator (10_000 bp = 1.0x).
pub const BASIS_POINTS: Amount = 10_000;

/// Multiplier applied to every selector until governance changes it.
pub const DEFAULT_MULTIPLIER_BP: u32 = 100;

/// Default reward ceiling: 100% of principal.
pub const DEFAULT_REWARD_CAP_BP: u32 = 10_000;

/// Highest cap governance may configure: 10x principal.
pub const MAX_REWARD_CAP_BP: u32 = 100_000;

pub const LOCK_PERIOD_COUNT: usize = 8;

/// Lock durations in seconds, indexed by selector.
pub const LOCK_PERIODS: [u64; LOCK_PERIOD_COUNT] = [
    7 * SECONDS_PER_DAY,
    14 * SECONDS_PER_DAY,
    30 * SECONDS_PER_DAY,
    30 * SECONDS_PER_DAY,
    3 * 30 * SECONDS_PER_DAY,
    6 * 30 * SECONDS_PER_DAY,
    9 * 30 * SECONDS_PER_DAY,
    12 * 30 * SECONDS_PER_DAY,
];

/// Human labels shown by wallets next to each selector.
pub const LOCK_PERIOD_LABELS: [&str; LOCK_PERIOD_COUNT] = [
    "7 Days", "14 Days", "30 Days", "1 Month", "3 Months", "6 Months", "9 Months", "12 Months",
];

/// Duration of the lock for `selector`.
pub fn lock_duration(selector: usize) -> Result<u64, RhemError> {
    LOCK_PERIODS
        .get(selector)
        .copied()
        .ok_or(RhemError::InvalidLockPeriod { selector })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccrualCurve {
    #[default]
    Step,
    Linear,
}

/// Reward earned by `principal` after `elapsed` seconds of a `lock`-second lock.
pub fn compute_reward(
    principal: Amount,
    multiplier_bp: u32,
    cap_bp: u32,
    elapsed: u64,
    lock: u64,
    curve: AccrualCurve,
) -> Result<Amount, RhemError> {
    let effective_bp = multiplier_bp.min(cap_bp) as Amount;
    let full = principal
        .checked_mul(effective_bp)
        .ok_or(RhemError::Overflow)?
        / BASIS_POINTS;

    let reward = match curve {
        AccrualCurve::Step => {
            if elapsed >= lock {
                full
            } else {
                0
            }
        }
        AccrualCurve::Linear => {
            if lock == 0 || elapsed >= lock {
                full
            } else {
                full.checked_mul(elapsed as Amount).ok_or(RhemError::Overflow)? / lock as Amount
            }
        }
    };
    Ok(reward)
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: Amount = 100_000_000_000_000_000_000; // 100 RHEM

    #[test]
    fn test_lock_table() {
        assert_eq!(lock_duration(0).unwrap(), 7 * SECONDS_PER_DAY);
        assert_eq!(lock_duration(1).unwrap(), 14 * SECONDS_PER_DAY);
        assert_eq!(lock_duration(7).unwrap(), 360 * SECONDS_PER_DAY);
        assert_eq!(
            lock_duration(8),
            Err(RhemError::InvalidLockPeriod { selector: 8 })
        );
    }

    #[test]
    fn test_step_pays_only_at_maturity() {
        let lock = lock_duration(0).unwrap();
        let before = compute_reward(P, 100, 10_000, lock - 1, lock, AccrualCurve::Step).unwrap();
        let at = compute_reward(P, 100, 10_000, lock, lock, AccrualCurve::Step).unwrap();
        assert_eq!(before, 0);
        assert_eq!(at, P / 100);
    }

    #[test]
    fn test_linear_accrues_and_saturates() {
        let lock = 100;
        let half = compute_reward(P, 200, 10_000, 50, lock, AccrualCurve::Linear).unwrap();
        let full = compute_reward(P, 200, 10_000, 100, lock, AccrualCurve::Linear).unwrap();
        let later = compute_reward(P, 200, 10_000, 10_000, lock, AccrualCurve::Linear).unwrap();
        assert_eq!(full, P * 2 / 100);
        assert_eq!(half, full / 2);
        assert_eq!(later, full);
    }

    #[test]
    fn test_cap_bounds_reward() {
        let reward = compute_reward(P, 50_000, 10_000, 10, 10, AccrualCurve::Step).unwrap();
        assert_eq!(reward, P);
    }

    #[test]
    fn test_monotone_in_elapsed() {
        for curve in [AccrualCurve::Step, AccrualCurve::Linear] {
            let lock = 7 * SECONDS_PER_DAY;
            let mut last = 0;
            for elapsed in (0..=2 * lock).step_by(3_600) {
                let r = compute_reward(P, 300, 10_000, elapsed, lock, curve).unwrap();
                assert!(r >= last, "{:?} decreased at {}", curve, elapsed);
                last = r;
            }
        }
    }
}
