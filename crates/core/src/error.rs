//! Error types for the packet encoder.
//!
//! All operations return structured errors rather than panicking. Every
//! failure is terminal for the single encode call that produced it: nothing
//! is written to the sink once an error has been raised.

use thiserror::Error;

/// Top-level error type for all operations in the crate.
///
/// Each variant corresponds to a specific failure domain:
/// - Varint: the variable-length integer codec
/// - Packet: assembling or parsing a packet
/// - CRC: checksum mismatch on decode
/// - I/O: the sink rejected the write
#[derive(Debug, Error)]
pub enum Error {
    /// Variable-length integer codec error
    #[error("varint error: {0}")]
    Varint(#[from] VarintError),

    /// Packet assembly or parsing error
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    /// CRC validation failed, indicating data corruption
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    Crc { expected: u32, actual: u32 },

    /// The sink rejected the write
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short, stable name of the error kind, used in log fields and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Varint(VarintError::IntegerTooLarge { .. }) => "integer_too_large",
            Error::Varint(VarintError::UnexpectedEof) => "unexpected_eof",
            Error::Packet(PacketError::TooLarge { .. }) => "packet_too_large",
            Error::Packet(_) => "malformed_packet",
            Error::Crc { .. } => "crc_mismatch",
            Error::Io(_) => "sink_write_failure",
        }
    }
}

/// Variable-length integer errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VarintError {
    /// Value needs more than the 30 usable bits of a 4-byte number
    #[error("integer too large: {value} does not fit in 30 bits")]
    IntegerTooLarge { value: u64 },

    /// Input ended in the middle of a number or fixed-width field
    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// Packet errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    /// Packet would exceed the largest size a 3-byte length field can declare
    #[error("packet too large: {size} bytes")]
    TooLarge { size: usize },

    /// Timestamp cannot be expressed as 32-bit seconds since the Unix epoch
    #[error("timestamp out of range for 32-bit epoch seconds")]
    TimestampOutOfRange,

    /// First byte is not the packet signature
    #[error("invalid signature: expected {expected:#04x}, got {actual:#04x}")]
    InvalidSignature { expected: u8, actual: u8 },

    /// Flags carry a protocol version other than 2
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u8),

    /// Declared length disagrees with the bytes supplied
    #[error("length mismatch: header says {declared}, got {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// Bytes left over between the last field and the checksum
    #[error("{0} unexpected bytes before checksum")]
    TrailingBytes(usize),

    /// Test identifier is not valid UTF-8
    #[error("test identifier is not valid UTF-8")]
    InvalidUtf8,
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
