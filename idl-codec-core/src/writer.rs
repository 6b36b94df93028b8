//! Growable little-endian output buffer.

use crate::error::{CodecError, Result};
use crate::pubkey::Pubkey;

/// Append-only writer producing the wire encoding.
#[derive(Debug, Clone, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

macro_rules! write_le {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) {
                self.buf.extend_from_slice(&value.to_le_bytes());
            }
        )*
    };
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    write_le! {
        write_u8 => u8,
        write_u16 => u16,
        write_u32 => u32,
        write_u64 => u64,
        write_u128 => u128,
        write_i8 => i8,
        write_i16 => i16,
        write_i32 => i32,
        write_i64 => i64,
        write_i128 => i128,
        write_f32 => f32,
        write_f64 => f64,
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a `u32` element or byte count.
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;
        self.write_u32(len);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.write_raw(bytes);
        Ok(())
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_bytes(value.as_bytes())
    }

    pub fn write_pubkey(&mut self, key: &Pubkey) {
        self.write_raw(key.as_bytes());
    }
}
