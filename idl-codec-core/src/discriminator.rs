//! 8-byte identity prefixes for accounts, instructions and events.
//!
//! A discriminator is the first eight bytes of
//! `sha256("{namespace}:{name}")`. Every framed payload is
//! `[discriminator][body]`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{CodecError, Result};

/// Discriminator length in bytes.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Namespace used for account discriminators.
pub const ACCOUNT_NAMESPACE: &str = "account";

/// Namespace used for instruction discriminators.
pub const INSTRUCTION_NAMESPACE: &str = "global";

/// Namespace used for event discriminators.
pub const EVENT_NAMESPACE: &str = "event";

/// An 8-byte payload identity tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Discriminator(pub [u8; DISCRIMINATOR_LEN]);

impl Discriminator {
    /// Derive the discriminator for `name` within `namespace`.
    pub fn compute(namespace: &str, name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update(b":");
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; DISCRIMINATOR_LEN];
        bytes.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
        Self(bytes)
    }

    /// Build a discriminator from an explicit IDL byte list.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; DISCRIMINATOR_LEN] = bytes.try_into().map_err(|_| {
            CodecError::invalid_idl(format!(
                "discriminator must be {DISCRIMINATOR_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Split a payload into its discriminator and body.
    ///
    /// Returns `None` when the payload is shorter than a discriminator.
    pub fn split(data: &[u8]) -> Option<(Self, &[u8])> {
        if data.len() < DISCRIMINATOR_LEN {
            return None;
        }
        let (head, body) = data.split_at(DISCRIMINATOR_LEN);
        let mut bytes = [0u8; DISCRIMINATOR_LEN];
        bytes.copy_from_slice(head);
        Some((Self(bytes), body))
    }

    pub fn as_bytes(&self) -> &[u8; DISCRIMINATOR_LEN] {
        &self.0
    }

    /// Whether `data` starts with this discriminator.
    pub fn matches(&self, data: &[u8]) -> bool {
        data.len() >= DISCRIMINATOR_LEN && data[..DISCRIMINATOR_LEN] == self.0
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::hex::encode(&self.0))
    }
}

impl fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discriminator({self})")
    }
}

impl From<[u8; DISCRIMINATOR_LEN]> for Discriminator {
    fn from(bytes: [u8; DISCRIMINATOR_LEN]) -> Self {
        Self(bytes)
    }
}

/// Prepend the discriminator of `namespace:name` to `body`.
pub fn frame_encode(namespace: &str, name: &str, body: &[u8]) -> Vec<u8> {
    frame_with(Discriminator::compute(namespace, name), body)
}

/// Prepend an already-known discriminator to `body`.
pub fn frame_with(discriminator: Discriminator, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(DISCRIMINATOR_LEN + body.len());
    out.extend_from_slice(discriminator.as_bytes());
    out.extend_from_slice(body);
    out
}

/// Verify that `data` is framed for `namespace:expected_name` and return the body.
pub fn frame_decode<'a>(namespace: &str, expected_name: &str, data: &'a [u8]) -> Result<&'a [u8]> {
    verify(
        expected_name,
        Discriminator::compute(namespace, expected_name),
        data,
    )
}

/// Verify `data` against an already-known discriminator and return the body.
///
/// Nothing past the prefix is inspected when the prefix does not match.
pub fn verify<'a>(name: &str, expected: Discriminator, data: &'a [u8]) -> Result<&'a [u8]> {
    let (actual, body) = Discriminator::split(data).ok_or(CodecError::Truncated {
        offset: 0,
        needed: DISCRIMINATOR_LEN,
        remaining: data.len(),
    })?;
    if actual != expected {
        return Err(CodecError::DiscriminatorMismatch {
            name: name.to_string(),
            expected,
            actual,
        });
    }
    Ok(body)
}

/// Index named items by discriminator for lookups from raw payloads.
///
/// On a collision the first declared item keeps the slot.
pub(crate) fn index_by_discriminator<'a>(
    items: impl IntoIterator<Item = (&'a str, Discriminator)>,
) -> HashMap<Discriminator, usize> {
    let mut index = HashMap::new();
    for (position, (name, disc)) in items.into_iter().enumerate() {
        match index.entry(disc) {
            Entry::Occupied(_) => {
                tracing::warn!(name, discriminator = %disc, "duplicate discriminator, keeping first declaration");
            }
            Entry::Vacant(slot) => {
                slot.insert(position);
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_anchor_discriminator() {
        // sha256("global:initialize")[..8]
        let disc = Discriminator::compute(INSTRUCTION_NAMESPACE, "initialize");
        assert_eq!(disc.0, [175, 175, 109, 31, 13, 152, 155, 237]);
    }

    #[test]
    fn split_requires_eight_bytes() {
        assert!(Discriminator::split(&[1, 2, 3, 4, 5, 6, 7]).is_none());
        let (disc, body) = Discriminator::split(&[1, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        assert_eq!(disc.0, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(body, &[9]);
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        let err = Discriminator::from_slice(&[0; 7]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidIdl { .. }));
    }

    #[test]
    fn display_is_lowercase_hex() {
        let disc = Discriminator([0xde, 0xad, 0xbe, 0xef, 0, 1, 2, 0xff]);
        assert_eq!(disc.to_string(), "deadbeef000102ff");
    }
}
