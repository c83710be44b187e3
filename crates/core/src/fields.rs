//! Optional packet fields: timestamp and test identifier.
//!
//! Each encoder works on its own and returns the complete byte sequence for
//! its field, or an empty vector when the field is absent. The packet
//! assembler only concatenates the results.
//!
//! # Field Formats
//!
//! ```text
//! timestamp:  seconds (4, big-endian u32) | nanoseconds (varint, 1-4)
//! test id:    byte length (varint, 1-4)   | UTF-8 bytes
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{PacketError, Result};
use crate::varint::{self, Reader};

/// Encode a timestamp field. `None` produces no bytes.
///
/// # Errors
/// Returns `PacketError::TimestampOutOfRange` for instants before the Unix
/// epoch or past the last second a u32 can count.
pub fn encode_timestamp(timestamp: Option<SystemTime>) -> Result<Vec<u8>> {
    let Some(timestamp) = timestamp else {
        return Ok(Vec::new());
    };

    let since_epoch = timestamp
        .duration_since(UNIX_EPOCH)
        .map_err(|_| PacketError::TimestampOutOfRange)?;
    let seconds =
        u32::try_from(since_epoch.as_secs()).map_err(|_| PacketError::TimestampOutOfRange)?;

    let mut out = Vec::with_capacity(8);
    out.extend_from_slice(&seconds.to_be_bytes());
    // subsec_nanos < 10^9, always inside the 30-bit range
    varint::write_number(&mut out, u64::from(since_epoch.subsec_nanos()))?;
    Ok(out)
}

/// Encode a test identifier field. An empty identifier produces no bytes.
///
/// The length prefix counts bytes, not characters.
///
/// # Errors
/// Returns `VarintError::IntegerTooLarge` if the identifier is longer than
/// [`varint::MAX_VALUE`] bytes.
pub fn encode_test_id(test_id: &str) -> Result<Vec<u8>> {
    if test_id.is_empty() {
        return Ok(Vec::new());
    }

    let len = test_id.len();
    let mut out = Vec::with_capacity(varint::encoded_len(len as u64)? + len);
    varint::write_number(&mut out, len as u64)?;
    out.extend_from_slice(test_id.as_bytes());
    Ok(out)
}

/// Read a timestamp field written by [`encode_timestamp`].
pub fn read_timestamp(reader: &mut Reader<'_>) -> Result<SystemTime> {
    let seconds = reader.read_u32_be()?;
    let nanos = reader.read_number()?;
    Ok(UNIX_EPOCH + Duration::new(u64::from(seconds), nanos))
}

/// Read a test identifier field written by [`encode_test_id`].
pub fn read_test_id(reader: &mut Reader<'_>) -> Result<String> {
    let len = reader.read_number()? as usize;
    let bytes = reader.read_bytes(len)?;
    let test_id = std::str::from_utf8(bytes).map_err(|_| PacketError::InvalidUtf8)?;
    Ok(test_id.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, VarintError};

    #[test]
    fn test_absent_fields_are_empty() {
        assert!(encode_timestamp(None).unwrap().is_empty());
        assert!(encode_test_id("").unwrap().is_empty());
    }

    #[test]
    fn test_timestamp_layout() {
        let ts = UNIX_EPOCH + Duration::new(0x0102_0304, 500);
        let bytes = encode_timestamp(Some(ts)).unwrap();

        // 500 needs a 2-byte number
        assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04, 0x41, 0xF4]);
    }

    #[test]
    fn test_timestamp_sizes() {
        let whole = encode_timestamp(Some(UNIX_EPOCH + Duration::from_secs(10))).unwrap();
        assert_eq!(whole.len(), 5);

        let max_nanos = encode_timestamp(Some(UNIX_EPOCH + Duration::new(10, 999_999_999))).unwrap();
        assert_eq!(max_nanos.len(), 8);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let ts = UNIX_EPOCH + Duration::new(1_445_000_000, 123_456_789);
        let bytes = encode_timestamp(Some(ts)).unwrap();

        let mut reader = Reader::new(&bytes);
        assert_eq!(read_timestamp(&mut reader).unwrap(), ts);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_timestamp_before_epoch() {
        let ts = UNIX_EPOCH - Duration::from_secs(1);
        assert!(matches!(
            encode_timestamp(Some(ts)),
            Err(Error::Packet(PacketError::TimestampOutOfRange))
        ));
    }

    #[test]
    fn test_timestamp_past_u32_seconds() {
        let ts = UNIX_EPOCH + Duration::from_secs(u64::from(u32::MAX) + 1);
        assert!(matches!(
            encode_timestamp(Some(ts)),
            Err(Error::Packet(PacketError::TimestampOutOfRange))
        ));

        let last = UNIX_EPOCH + Duration::from_secs(u64::from(u32::MAX));
        assert!(encode_timestamp(Some(last)).is_ok());
    }

    #[test]
    fn test_test_id_layout() {
        assert_eq!(encode_test_id("abc").unwrap(), vec![0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn test_test_id_counts_bytes() {
        // 6 characters, 9 bytes
        let id = "tést✓!";
        let bytes = encode_test_id(id).unwrap();

        assert_eq!(bytes[0] as usize, id.len());
        assert_eq!(&bytes[1..], id.as_bytes());

        let mut reader = Reader::new(&bytes);
        assert_eq!(read_test_id(&mut reader).unwrap(), id);
    }

    #[test]
    fn test_test_id_length_prefix_sizes() {
        for (len, prefix) in [(63, 1), (64, 2), (16_383, 2), (16_384, 3)] {
            let id = "x".repeat(len);
            let bytes = encode_test_id(&id).unwrap();
            assert_eq!(bytes.len(), len + prefix, "wrong size for {}", len);
        }
    }

    #[test]
    fn test_read_test_id_truncated() {
        let bytes = [0x05, b'a', b'b'];
        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            read_test_id(&mut reader),
            Err(Error::Varint(VarintError::UnexpectedEof))
        ));
    }

    #[test]
    fn test_read_test_id_invalid_utf8() {
        let bytes = [0x02, 0xC3, 0x28];
        let mut reader = Reader::new(&bytes);
        assert!(matches!(
            read_test_id(&mut reader),
            Err(Error::Packet(PacketError::InvalidUtf8))
        ));
    }
}
