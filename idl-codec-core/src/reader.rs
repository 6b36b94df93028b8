//! Bounds-checked cursor over an encoded buffer.

use crate::error::{CodecError, Result};
use crate::pubkey::{Pubkey, PUBKEY_LEN};

/// Positional reader over a byte slice.
///
/// Every read validates the remaining length before advancing, so the
/// cursor never moves past the end of the buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

macro_rules! read_le {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let bytes = self.read_array::<{ std::mem::size_of::<$ty>() }>()?;
                Ok(<$ty>::from_le_bytes(bytes))
            }
        )*
    };
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Current cursor offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    /// Take the next `len` bytes.
    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(CodecError::Truncated {
                offset: self.offset,
                needed: len,
                remaining: self.remaining(),
            });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.data[start..self.offset])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_raw(N)?);
        Ok(out)
    }

    read_le! {
        read_u16 => u16,
        read_u32 => u32,
        read_u64 => u64,
        read_u128 => u128,
        read_i8 => i8,
        read_i16 => i16,
        read_i32 => i32,
        read_i64 => i64,
        read_i128 => i128,
        read_f32 => f32,
        read_f64 => f64,
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(CodecError::InvalidBool { offset, byte }),
        }
    }

    /// Read a `u32` length prefix and check it against the remaining bytes.
    ///
    /// `min_elem_size` is the smallest encoded size of one element, used
    /// to reject counts that cannot possibly fit before allocating.
    pub fn read_len(&mut self, min_elem_size: usize) -> Result<usize> {
        let offset = self.offset;
        let len = self.read_u32()? as usize;
        let needed = len.saturating_mul(min_elem_size);
        if needed > self.remaining() {
            return Err(CodecError::Truncated {
                offset,
                needed: needed.saturating_add(4),
                remaining: self.remaining() + 4,
            });
        }
        Ok(len)
    }

    /// `u32` length followed by raw bytes.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len(1)?;
        Ok(self.read_raw(len)?.to_vec())
    }

    /// `u32` length followed by UTF-8.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len(1)?;
        let offset = self.offset;
        let raw = self.read_raw(len)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| CodecError::InvalidUtf8 { offset })
    }

    /// Exactly 32 raw bytes.
    pub fn read_pubkey(&mut self) -> Result<Pubkey> {
        Ok(Pubkey(self.read_array::<PUBKEY_LEN>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let mut r = ByteReader::new(&[0x2a, 0, 0, 0, 0xff, 0xff]);
        assert_eq!(r.read_u32().unwrap(), 42);
        assert_eq!(r.read_i16().unwrap(), -1);
        assert!(r.is_empty());
    }

    #[test]
    fn truncated_read_does_not_advance() {
        let mut r = ByteReader::new(&[1, 2, 3]);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(
            err,
            CodecError::Truncated {
                offset: 0,
                needed: 4,
                remaining: 3
            }
        ));
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u8().unwrap(), 1);
    }

    #[test]
    fn bool_rejects_non_canonical() {
        let mut r = ByteReader::new(&[1, 0, 2]);
        assert!(r.read_bool().unwrap());
        assert!(!r.read_bool().unwrap());
        let err = r.read_bool().unwrap_err();
        assert!(matches!(err, CodecError::InvalidBool { offset: 2, byte: 2 }));
    }

    #[test]
    fn string_length_beyond_buffer_is_truncation() {
        // claims 1000 bytes, provides 2
        let mut r = ByteReader::new(&[0xe8, 0x03, 0, 0, b'h', b'i']);
        let err = r.read_string().unwrap_err();
        assert!(matches!(err, CodecError::Truncated { offset: 0, .. }));
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let mut r = ByteReader::new(&[2, 0, 0, 0, 0xc3, 0x28]);
        let err = r.read_string().unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8 { offset: 4 }));
    }

    #[test]
    fn u64_keeps_full_range() {
        let mut r = ByteReader::new(&[0xff; 8]);
        assert_eq!(r.read_u64().unwrap(), u64::MAX);
    }
}
