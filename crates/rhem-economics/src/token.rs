// crates/rhem-economics/src/token.rs
//
// The RHEM fungible-token ledger: balances, allowances, transfers, role-gated
// supply changes, and the one-time Merkle claim.
//
// The smallest unit is the base unit; 1 RHEM = 10^18 base units. All internal
// accounting is integer base units. Sum of balances equals total supply at
// all times; only mint, burn and claim change the supply.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use rhem_core::crypto::{claim_leaf, verify_proof};
use rhem_core::{Address, Amount, RhemError};

pub const TOKEN_NAME: &str = "Rhesus Macaque Coin";
pub const TOKEN_SYMBOL: &str = "RHEM";
pub const DECIMALS: u32 = 18;

/// Number of base units in one RHEM. 1 RHEM = 10^18 base units.
pub const WEI_PER_RHEM: Amount = 1_000_000_000_000_000_000;

/// Maximum supply: 1,000,000,000 RHEM in base units.
pub const MAX_SUPPLY: Amount = 1_000_000_000 * WEI_PER_RHEM;

/// A RHEM amount, for display and for parsing human input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rhem(pub Amount);

impl Rhem {
    /// Whole RHEM to base units.
    pub fn from_whole(rhem: u64) -> Self {
        Self(rhem as Amount * WEI_PER_RHEM)
    }

    /// Parse a decimal string such as `"12"` or `"0.25"`.
    ///
    /// # Example
    /// ```
    /// use rhem_economics::token::{Rhem, WEI_PER_RHEM};
    /// assert_eq!(Rhem::parse("1.5").unwrap().0, 3 * WEI_PER_RHEM / 2);
    /// ```
    pub fn parse(s: &str) -> Result<Self, RhemError> {
        let s = s.trim();
        let invalid = || RhemError::InvalidConfig(format!("not a RHEM amount: {:?}", s));
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > DECIMALS as usize
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let whole: Amount = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_units: Amount = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
            padded.parse().map_err(|_| invalid())?
        };
        whole
            .checked_mul(WEI_PER_RHEM)
            .and_then(|w| w.checked_add(frac_units))
            .map(Rhem)
            .ok_or(RhemError::Overflow)
    }
}

impl fmt::Display for Rhem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WEI_PER_RHEM;
        let frac = self.0 % WEI_PER_RHEM;
        if frac == 0 {
            write!(f, "{} RHEM", whole)
        } else {
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{} RHEM", whole, trimmed)
        }
    }
}

/// One movement of funds inside an atomic settlement.
///
/// With `spender` set the leg is a transfer-on-behalf and consumes
/// `allowance[from][spender]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub spender: Option<Address>,
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

impl Leg {
    pub fn transfer(from: Address, to: Address, amount: Amount) -> Self {
        Self {
            spender: None,
            from,
            to,
            amount,
        }
    }

    pub fn transfer_from(spender: Address, from: Address, to: Address, amount: Amount) -> Self {
        Self {
            spender: Some(spender),
            from,
            to,
            amount,
        }
    }
}

/// Balance and allowance store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    balances: BTreeMap<Address, Amount>,
    /// owner -> spender -> remaining allowance.
    allowances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    total_supply: Amount,
    /// Root of the claim tree. All zeroes disables claims.
    merkle_root: [u8; 32],
    claimed: BTreeSet<Address>,
}

impl Ledger {
    pub fn new(merkle_root: [u8; 32]) -> Self {
        Self {
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            total_supply: 0,
            merkle_root,
            claimed: BTreeSet::new(),
        }
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn merkle_root(&self) -> [u8; 32] {
        self.merkle_root
    }

    pub fn has_claimed(&self, account: &Address) -> bool {
        self.claimed.contains(account)
    }

    /// Sum of every balance. Equals `total_supply()` at all times.
    pub fn sum_of_balances(&self) -> Amount {
        self.balances.values().sum()
    }

    /// Move `amount` from `from` to `to`. Zero is an accepted no-op.
    pub fn transfer(&mut self, from: Address, to: Address, amount: Amount) -> Result<(), RhemError> {
        self.settle(&[Leg::transfer(from, to, amount)])
    }

    /// Set `spender`'s allowance over `owner`'s balance, replacing any prior value.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: Amount) -> Result<(), RhemError> {
        if spender.is_zero() {
            return Err(RhemError::InvalidAddress("approve to the zero address".to_string()));
        }
        self.set_allowance(owner, spender, amount);
        Ok(())
    }

    /// Transfer on behalf of `from`, consuming `spender`'s allowance.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), RhemError> {
        self.settle(&[Leg::transfer_from(spender, from, to, amount)])
    }

    /// Apply every leg or none.
    ///
    /// Debits and allowance consumption are aggregated per account before
    /// anything is written, so a batch that would overdraw on its second leg
    /// fails without the first leg becoming visible. Allowance shortfalls are
    /// reported before balance shortfalls.
    pub fn settle(&mut self, legs: &[Leg]) -> Result<(), RhemError> {
        let mut debits: BTreeMap<Address, Amount> = BTreeMap::new();
        let mut spends: BTreeMap<(Address, Address), Amount> = BTreeMap::new();

        for leg in legs.iter().filter(|l| l.amount > 0) {
            if leg.to.is_zero() {
                return Err(RhemError::InvalidAddress(
                    "transfer to the zero address".to_string(),
                ));
            }
            let debit = debits.entry(leg.from).or_insert(0);
            *debit = debit.checked_add(leg.amount).ok_or(RhemError::Overflow)?;
            if let Some(spender) = leg.spender {
                let spend = spends.entry((leg.from, spender)).or_insert(0);
                *spend = spend.checked_add(leg.amount).ok_or(RhemError::Overflow)?;
            }
        }

        for ((owner, spender), needed) in &spends {
            let available = self.allowance(owner, spender);
            if available < *needed {
                return Err(RhemError::InsufficientAllowance {
                    needed: *needed,
                    available,
                });
            }
        }
        for (account, needed) in &debits {
            let available = self.balance_of(account);
            if available < *needed {
                return Err(RhemError::InsufficientBalance {
                    needed: *needed,
                    available,
                });
            }
        }

        for leg in legs.iter().filter(|l| l.amount > 0) {
            if let Some(spender) = leg.spender {
                let remaining = self.allowance(&leg.from, &spender) - leg.amount;
                self.set_allowance(leg.from, spender, remaining);
            }
            self.debit(leg.from, leg.amount);
            self.credit(leg.to, leg.amount);
            tracing::trace!(from = %leg.from, to = %leg.to, amount = %leg.amount, "transfer");
        }
        Ok(())
    }

    /// Create new supply, bounded by `MAX_SUPPLY`.
    pub fn mint(&mut self, to: Address, amount: Amount) -> Result<(), RhemError> {
        if to.is_zero() {
            return Err(RhemError::InvalidAddress("mint to the zero address".to_string()));
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(RhemError::SupplyCapExceeded)?;
        if new_supply > MAX_SUPPLY {
            return Err(RhemError::SupplyCapExceeded);
        }
        self.total_supply = new_supply;
        self.credit(to, amount);
        tracing::info!(to = %to, amount = %amount, supply = %new_supply, "mint");
        Ok(())
    }

    /// Destroy supply held by `from`.
    pub fn burn(&mut self, from: Address, amount: Amount) -> Result<(), RhemError> {
        let available = self.balance_of(&from);
        if available < amount {
            return Err(RhemError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.debit(from, amount);
        self.total_supply -= amount;
        tracing::info!(from = %from, amount = %amount, supply = %self.total_supply, "burn");
        Ok(())
    }

    /// Mint a Merkle-proven allocation to `claimant`, once per address.
    pub fn claim(
        &mut self,
        claimant: Address,
        amount: Amount,
        proof: &[[u8; 32]],
    ) -> Result<(), RhemError> {
        if amount == 0 {
            return Err(RhemError::InvalidAmount);
        }
        if self.claimed.contains(&claimant) {
            return Err(RhemError::AlreadyClaimed(claimant));
        }
        if self.merkle_root == [0u8; 32]
            || !verify_proof(&self.merkle_root, claim_leaf(&claimant, amount), proof)
        {
            return Err(RhemError::InvalidProof);
        }
        self.mint(claimant, amount)?;
        self.claimed.insert(claimant);
        tracing::info!(claimant = %claimant, amount = %amount, "claim");
        Ok(())
    }

    fn set_allowance(&mut self, owner: Address, spender: Address, amount: Amount) {
        if amount == 0 {
            if let Some(m) = self.allowances.get_mut(&owner) {
                m.remove(&spender);
                if m.is_empty() {
                    self.allowances.remove(&owner);
                }
            }
        } else {
            self.allowances.entry(owner).or_default().insert(spender, amount);
        }
    }

    fn debit(&mut self, account: Address, amount: Amount) {
        let balance = self.balance_of(&account) - amount;
        if balance == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }

    fn credit(&mut self, account: Address, amount: Amount) {
        // Bounded by total supply, which is bounded by MAX_SUPPLY.
        *self.balances.entry(account).or_insert(0) += amount;
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new([0u8; 32])
    }
}
