//! Variable-length integer codec and byte cursor.
//!
//! Every variable-length number in a packet (the packet length, the test
//! identifier length and the nanosecond part of a timestamp) goes through
//! this module. The two most significant bits of the first byte select the
//! total size; the remaining bits hold the value, big-endian.
//!
//! # Size Classes
//!
//! ```text
//! prefix  bytes  usable bits  max value
//!   00      1         6              63
//!   01      2        14          16_383
//!   10      3        22       4_194_303
//!   11      4        30   1_073_741_823
//! ```
//!
//! # Example
//! ```
//! use subunit_core::varint::{decode_number, write_number};
//!
//! let mut out = Vec::new();
//! write_number(&mut out, 16_384).unwrap();
//! assert_eq!(out, vec![0x80, 0x40, 0x00]);
//! assert_eq!(decode_number(&out).unwrap(), (16_384, 3));
//! ```

use crate::error::{Result, VarintError};

/// Largest value representable by a 4-byte number (2^30 - 1).
pub const MAX_VALUE: u64 = (1 << 30) - 1;

const ONE_BYTE_LIMIT: u64 = 1 << 6;
const TWO_BYTE_LIMIT: u64 = 1 << 14;
const THREE_BYTE_LIMIT: u64 = 1 << 22;
const FOUR_BYTE_LIMIT: u64 = 1 << 30;

const SIZE_MASK: u8 = 0xC0;

/// Number of bytes `value` occupies once encoded.
///
/// # Errors
/// Returns `VarintError::IntegerTooLarge` if `value` exceeds [`MAX_VALUE`].
pub fn encoded_len(value: u64) -> Result<usize> {
    match value {
        v if v < ONE_BYTE_LIMIT => Ok(1),
        v if v < TWO_BYTE_LIMIT => Ok(2),
        v if v < THREE_BYTE_LIMIT => Ok(3),
        v if v < FOUR_BYTE_LIMIT => Ok(4),
        v => Err(VarintError::IntegerTooLarge { value: v }.into()),
    }
}

/// Append the variable-length encoding of `value` to `out`.
///
/// Uses the fewest bytes that can hold the value. On error `out` is left
/// untouched.
///
/// # Errors
/// Returns `VarintError::IntegerTooLarge` if `value` exceeds [`MAX_VALUE`].
pub fn write_number(out: &mut Vec<u8>, value: u64) -> Result<()> {
    match encoded_len(value)? {
        1 => out.push(value as u8),
        2 => out.extend_from_slice(&(value as u16 | 0x4000).to_be_bytes()),
        3 => {
            out.push((value >> 16) as u8 | 0x80);
            out.extend_from_slice(&((value & 0xFFFF) as u16).to_be_bytes());
        }
        _ => out.extend_from_slice(&(value as u32 | 0xC000_0000).to_be_bytes()),
    }
    Ok(())
}

/// Decode one variable-length number from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
///
/// # Errors
/// Returns `VarintError::UnexpectedEof` if `bytes` is shorter than the size
/// announced by its first byte.
pub fn decode_number(bytes: &[u8]) -> Result<(u32, usize)> {
    let mut reader = Reader::new(bytes);
    let value = reader.read_number()?;
    Ok((value, reader.position()))
}

/// Reads packet fields front to back from a byte slice.
///
/// # Invariants
/// - `position` never exceeds `data.len()`
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    /// Create a new Reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Read exactly `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(VarintError::UnexpectedEof.into());
        }
        let start = self.position;
        self.position += count;
        Ok(&self.data[start..self.position])
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a big-endian u32.
    pub fn read_u32_be(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a variable-length number.
    ///
    /// The reader does not advance if the number is truncated.
    pub fn read_number(&mut self) -> Result<u32> {
        let first = *self
            .data
            .get(self.position)
            .ok_or(VarintError::UnexpectedEof)?;
        let size = ((first & SIZE_MASK) >> 6) as usize + 1;
        let bytes = self.read_bytes(size)?;

        let value = bytes[1..]
            .iter()
            .fold(u32::from(first & !SIZE_MASK), |acc, &b| (acc << 8) | u32::from(b));
        Ok(value)
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Check if every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }
}
