//! Packet assembly and parsing.
//!
//! Every event becomes one self-framing packet:
//!
//! # Packet Format
//!
//! ```text
//! +---------------------+
//! | Signature (1)       |  0xB3
//! +---------------------+
//! | Flags (2)           |  version, presence bits, status
//! +---------------------+
//! | Length (varint 1-3) |  total packet size, signature through CRC
//! +---------------------+
//! | Timestamp (0, 5-8)  |  present iff the timestamp flag is set
//! +---------------------+
//! | Test ID (0, 2+)     |  present iff the test id flag is set
//! +---------------------+
//! | CRC32 (4)           |  IEEE, big-endian
//! +---------------------+
//! ```
//!
//! # CRC Coverage
//!
//! The CRC32 covers every byte before it, the length field included.
//!
//! # Length Field Sizing
//!
//! The length counts its own bytes. The size class is picked with fixed
//! thresholds on the length without the field: up to 62 bytes take a 1-byte
//! field, up to 16 381 a 2-byte field, up to 4 194 300 a 3-byte field.
//! Anything larger is rejected, so a packet never exceeds 4 194 303 bytes.

use std::thread;
use std::time::SystemTime;

use tracing::trace;

use crate::config::EncoderConfig;
use crate::error::{Error, PacketError, Result};
use crate::event::Event;
use crate::fields;
use crate::flags::{self, Flags, Status};
use crate::varint::{self, Reader};

/// First byte of every packet.
pub const SIGNATURE: u8 = 0xB3;

/// Size of the trailing checksum in bytes.
pub const CRC_SIZE: usize = 4;

/// Size of the smallest possible packet: signature, flags, 1-byte length, CRC.
pub const MIN_PACKET_SIZE: usize = 1 + 2 + 1 + CRC_SIZE;

/// Largest packet the 3-byte length field may declare.
pub const MAX_PACKET_SIZE: usize = 4_194_303;

/// Compute the final packet length from the length of everything except the
/// length field and the CRC.
///
/// # Errors
/// Returns `PacketError::TooLarge` when the packet would not fit in a 3-byte
/// length field.
pub fn packet_length(base_len: usize) -> Result<usize> {
    let len = base_len + CRC_SIZE;
    match len {
        0..=62 => Ok(len + 1),
        63..=16_381 => Ok(len + 2),
        16_382..=4_194_300 => Ok(len + 3),
        _ => Err(PacketError::TooLarge { size: len }.into()),
    }
}

/// Compute CRC32 (IEEE) over the protected bytes.
pub fn compute_crc(bytes: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// Output of the three independent sub-field encoders.
struct Fields {
    flags: [u8; 2],
    timestamp: Vec<u8>,
    test_id: Vec<u8>,
}

impl Fields {
    fn encode(event: &Event, config: &EncoderConfig) -> Result<Self> {
        if config.is_parallel(event.test_id().len()) {
            Self::encode_parallel(event)
        } else {
            Ok(Self {
                flags: flags::encode_flags(event),
                timestamp: fields::encode_timestamp(event.timestamp())?,
                test_id: fields::encode_test_id(event.test_id())?,
            })
        }
    }

    /// Encode on scoped threads. Results are joined back in field order, so
    /// completion order has no effect on the packet.
    fn encode_parallel(event: &Event) -> Result<Self> {
        thread::scope(|scope| {
            let timestamp = scope.spawn(|| fields::encode_timestamp(event.timestamp()));
            let test_id = scope.spawn(|| fields::encode_test_id(event.test_id()));
            let flags = flags::encode_flags(event);

            let timestamp = timestamp
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))?;
            let test_id = test_id
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))?;

            Ok(Self {
                flags,
                timestamp,
                test_id,
            })
        })
    }
}

/// Encode an event into a complete packet.
///
/// # Errors
/// - `VarintError::IntegerTooLarge` if the test identifier is too long for
///   its length prefix
/// - `PacketError::TooLarge` if the packet exceeds [`MAX_PACKET_SIZE`]
/// - `PacketError::TimestampOutOfRange` if the timestamp has no 32-bit
///   epoch-seconds representation
pub fn encode_packet(event: &Event, config: &EncoderConfig) -> Result<Vec<u8>> {
    let Fields {
        flags,
        timestamp,
        test_id,
    } = Fields::encode(event, config)?;

    let base_len = 1 + flags.len() + timestamp.len() + test_id.len();
    let length = packet_length(base_len)?;

    let mut packet = Vec::with_capacity(length);
    packet.push(SIGNATURE);
    packet.extend_from_slice(&flags);
    varint::write_number(&mut packet, length as u64)?;
    packet.extend_from_slice(&timestamp);
    packet.extend_from_slice(&test_id);

    let crc = compute_crc(&packet);
    packet.extend_from_slice(&crc.to_be_bytes());

    debug_assert_eq!(packet.len(), length);
    trace!(
        length,
        test_id_present = !test_id.is_empty(),
        timestamp_present = !timestamp.is_empty(),
        status = flags[1],
        "encoded packet"
    );

    Ok(packet)
}

/// A parsed packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    pub flags: Flags,

    /// Declared total length, equal to the input length
    pub length: usize,

    pub timestamp: Option<SystemTime>,

    pub test_id: Option<String>,

    pub crc32: u32,
}

impl DecodedPacket {
    pub fn status(&self) -> Status {
        self.flags.status
    }

    /// Rebuild an event that encodes to the same packet.
    ///
    /// An undefined status becomes an empty status name.
    pub fn to_event(&self) -> Event {
        let mut event = Event::new();
        if let Some(test_id) = &self.test_id {
            event = event.with_test_id(test_id.clone());
        }
        if self.flags.status != Status::Undefined {
            event = event.with_status(self.flags.status.name());
        }
        if let Some(timestamp) = self.timestamp {
            event = event.with_timestamp(timestamp);
        }
        event
    }
}

/// Parse a single packet occupying all of `bytes`.
///
/// # Errors
/// - `VarintError::UnexpectedEof` if the header is truncated
/// - `PacketError::InvalidSignature` if the first byte is not [`SIGNATURE`]
/// - `PacketError::UnsupportedVersion` if the version is not 2
/// - `PacketError::LengthMismatch` if the declared length is not `bytes.len()`
/// - `Error::Crc` if the checksum does not match
/// - `PacketError::TrailingBytes` if bytes remain after the last field
pub fn decode_packet(bytes: &[u8]) -> Result<DecodedPacket> {
    let mut reader = Reader::new(bytes);

    let signature = reader.read_u8()?;
    if signature != SIGNATURE {
        return Err(PacketError::InvalidSignature {
            expected: SIGNATURE,
            actual: signature,
        }
        .into());
    }

    let raw_flags = reader.read_bytes(2)?;
    let flags = Flags::parse([raw_flags[0], raw_flags[1]]);
    if flags.version != flags::VERSION {
        return Err(PacketError::UnsupportedVersion(flags.version).into());
    }

    let length = reader.read_number()? as usize;
    if length != bytes.len() || length < reader.position() + CRC_SIZE {
        return Err(PacketError::LengthMismatch {
            declared: length,
            actual: bytes.len(),
        }
        .into());
    }

    let crc_start = length - CRC_SIZE;
    let crc32 = u32::from_be_bytes([
        bytes[crc_start],
        bytes[crc_start + 1],
        bytes[crc_start + 2],
        bytes[crc_start + 3],
    ]);
    let computed = compute_crc(&bytes[..crc_start]);
    if computed != crc32 {
        return Err(Error::Crc {
            expected: crc32,
            actual: computed,
        });
    }

    let mut body = Reader::new(&bytes[reader.position()..crc_start]);
    let timestamp = if flags.timestamp_present {
        Some(fields::read_timestamp(&mut body)?)
    } else {
        None
    };
    let test_id = if flags.test_id_present {
        Some(fields::read_test_id(&mut body)?)
    } else {
        None
    };
    if !body.is_empty() {
        return Err(PacketError::TrailingBytes(body.remaining()).into());
    }

    Ok(DecodedPacket {
        flags,
        length,
        timestamp,
        test_id,
        crc32,
    })
}
