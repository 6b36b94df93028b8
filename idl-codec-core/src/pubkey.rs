//! Fixed 32-byte public key value.

use std::fmt;
use std::str::FromStr;

use base58::ToBase58;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// Public key length in bytes.
pub const PUBKEY_LEN: usize = 32;

/// A 32-byte public key, displayed as base58.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, BorshSerialize, BorshDeserialize)]
pub struct Pubkey(pub [u8; PUBKEY_LEN]);

impl Pubkey {
    pub const fn new(bytes: [u8; PUBKEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBKEY_LEN] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        self.0.to_base58()
    }
}

impl From<[u8; PUBKEY_LEN]> for Pubkey {
    fn from(bytes: [u8; PUBKEY_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Pubkey {
    type Err = CodecError;

    /// Parse base58, or 64 hex characters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::hex::decode_bytes_32(s).map(Self)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
