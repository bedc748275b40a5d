//! # Addresses
//!
//! An [`Address`] is a 20-byte account identifier. Holders, spenders,
//! vaults and the contract itself are all plain addresses; nothing in the
//! ledger distinguishes a vault from any other account except the registry
//! that remembers which address was assigned to which pool.
//!
//! On the wire (JSON scenarios, snapshots, events) an address is the
//! `0x`-prefixed lowercase hex string of its bytes. Because it serializes
//! as a string, it can be used directly as a JSON object key.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::hash::blake3_hash_parts;

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Errors that can occur while parsing an address.
#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    /// The string is not valid hex.
    #[error("invalid hex in address: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The decoded byte string has the wrong length.
    #[error("invalid address length: expected {ADDRESS_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
}

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The null address. Never a valid recipient or spender; used as the
    /// counterparty of mint and burn transfers.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Wraps raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Returns `true` for the null address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LENGTH]
    }

    /// Derives a deterministic address from a list of byte parts.
    ///
    /// Computed as the first 20 bytes of a length-prefixed BLAKE3 hash of
    /// the parts. Different part lists give different addresses with
    /// overwhelming probability, and the result is never the null address
    /// in practice.
    pub fn derive(parts: &[&[u8]]) -> Self {
        let digest = blake3_hash_parts(parts);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Self(bytes)
    }

    /// Convenience for deriving an address from a single label, e.g.
    /// `Address::named("alice")` in tests and scenarios.
    pub fn named(label: &str) -> Self {
        Self::derive(&[label.as_bytes()])
    }

    /// Returns the `0x`-prefixed hex encoding.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses a hex address, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(stripped)?;
        if bytes.len() != ADDRESS_LENGTH {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; ADDRESS_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}...)", &self.to_hex()[..10])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
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
    use std::collections::BTreeMap;

    #[test]
    fn zero_address_is_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address::named("alice").is_zero());
        assert_eq!(Address::default(), Address::ZERO);
    }

    #[test]
    fn hex_roundtrip_with_and_without_prefix() {
        let addr = Address::named("alice");
        let hex = addr.to_hex();
        assert!(hex.starts_with("0x"));
        assert_eq!(hex.len(), 2 + 2 * ADDRESS_LENGTH);
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
        assert_eq!(Address::from_hex(&hex[2..]).unwrap(), addr);
    }

    #[test]
    fn wrong_length_rejected() {
        let err = Address::from_hex("0xdeadbeef").unwrap_err();
        assert_eq!(err, AddressError::InvalidLength(4));
    }

    #[test]
    fn bad_hex_rejected() {
        assert!(matches!(
            Address::from_hex("0xzz"),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn derive_is_deterministic_and_distinct() {
        let contract = Address::named("token");
        let a = Address::derive(&[contract.as_bytes(), b"sale"]);
        let b = Address::derive(&[contract.as_bytes(), b"sale"]);
        let c = Address::derive(&[contract.as_bytes(), b"founders"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn serializes_as_json_string_and_map_key() {
        let addr = Address::named("bob");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        let mut map = BTreeMap::new();
        map.insert(addr, 7u32);
        let json = serde_json::to_string(&map).unwrap();
        let back: BTreeMap<Address, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&addr), Some(&7));
    }
}
