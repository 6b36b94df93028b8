//! Hex encoding/decoding utilities.

use base58::FromBase58;

use crate::error::{CodecError, Result};

pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decode a hex string, with or without a `0x` prefix.
pub fn decode(hex: &str) -> Result<Vec<u8>> {
    let hex = strip_prefix(hex);
    if hex.len() % 2 != 0 {
        return Err(CodecError::invalid_value(format!(
            "hex string has odd length: {}",
            hex.len()
        )));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = hex
            .get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| CodecError::invalid_value(format!("invalid hex at position {}", i)))?;
        bytes.push(byte);
    }
    Ok(bytes)
}

/// Decode a 32-byte value from base58 or hex string.
pub fn decode_bytes_32(input: &str) -> Result<[u8; 32]> {
    let is_hex = strip_prefix(input).len() == 64
        && strip_prefix(input).chars().all(|c| c.is_ascii_hexdigit());
    let bytes = if is_hex {
        decode(input)?
    } else {
        input.from_base58().map_err(|_| {
            CodecError::invalid_value(format!(
                "`{input}` is neither base58 nor 64 hex chars"
            ))
        })?
    };

    bytes.as_slice().try_into().map_err(|_| {
        CodecError::invalid_value(format!(
            "expected 32 bytes, got {} (provide base58 or 64 hex chars)",
            bytes.len()
        ))
    })
}

fn strip_prefix(input: &str) -> &str {
    input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input)
}
