// crates/rhem-core/src/address.rs
//
// Account identifiers and the scalar units used across the platform.
//
// Addresses are 32-byte identifiers rendered as `0x`-prefixed hex. Component
// custody accounts (staking engine, reward pool, trading market) are derived
// from a fixed label so every deployment agrees on them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crypto::hash_bytes;
use crate::error::RhemError;

/// Token amount in base units (1 RHEM = 10^18 base units).
pub type Amount = u128;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// A 32-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address. Never a valid transfer recipient.
    pub const ZERO: Address = Address([0u8; 32]);

    /// Derive a deterministic address from a label (sha256 of the label).
    pub fn derive(label: &str) -> Self {
        Address(hash_bytes(label.as_bytes()))
    }

    /// Parse a hex string, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, RhemError> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(trimmed).map_err(|e| RhemError::InvalidAddress(format!("{}: {}", s, e)))?;
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            RhemError::InvalidAddress(format!("{}: expected 32 bytes", s))
        })?;
        Ok(Address(array))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps test failure output readable.
        let h = hex::encode(self.0);
        write!(f, "Address(0x{}..{})", &h[..8], &h[56..])
    }
}

impl FromStr for Address {
    type Err = RhemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        let addr = Address::derive("alice");
        let parsed = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
        assert!(addr.to_hex().starts_with("0x"));
        assert_eq!(addr.to_hex().len(), 66);
    }

    #[test]
    fn test_parse_without_prefix() {
        let addr = Address::derive("bob");
        let bare = hex::encode(addr.0);
        assert_eq!(Address::from_hex(&bare).unwrap(), addr);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(matches!(
            Address::from_hex("0xabcd"),
            Err(RhemError::InvalidAddress(_))
        ));
        assert!(Address::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_derive_is_deterministic() {
        assert_eq!(Address::derive("rhem/staking"), Address::derive("rhem/staking"));
        assert_ne!(Address::derive("rhem/staking"), Address::derive("rhem/trading"));
        assert!(!Address::derive("x").is_zero());
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn test_serde_as_string() {
        let addr = Address::derive("carol");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
