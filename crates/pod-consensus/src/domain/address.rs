//! Account addresses.
//!
//! An `Address` is the opaque, fixed-width account identifier used
//! throughout: a canonical 20-byte form and a human-readable base58 form.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed-width account identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

/// `serde` round-trips through the base58 form so addresses read naturally
/// in `EngineConfig` TOML/JSON (`Coinbase`/`Miner`) as well as in
/// encoded wire payloads.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Error returned when parsing a base58 address string fails.
#[derive(Debug, thiserror::Error)]
pub enum AddressParseError {
    #[error("invalid base58 encoding: {0}")]
    Base58(#[from] bs58::decode::Error),
    #[error("address must be 20 bytes, got {0}")]
    WrongLength(usize),
}

impl Address {
    /// Build an address from its canonical byte form.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The canonical byte form.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// The human-readable base58 form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s).into_vec()?;
        let len = bytes.len();
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| AddressParseError::WrongLength(len))?;
        Ok(Self(arr))
    }
}
