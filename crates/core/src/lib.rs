//! subunit-core: Subunit v2 packet encoder for test-result events
//!
//! Each [`Event`] (a test identifier, a status and a timestamp, all
//! optional) becomes one self-framing, CRC-checked packet written to any
//! [`std::io::Write`] sink.
//!
//! # Architecture
//!
//! - `varint`: 1-4 byte variable-length integers with a 2-bit size prefix
//! - `flags`: protocol version, presence bits and the status-code table
//! - `event`: the event type
//! - `fields`: timestamp and test identifier sub-encoders
//! - `packet`: packet assembly, length sizing, CRC and parsing
//! - `writer`: handing packets to a sink
//! - `config`: encoder configuration
//! - `metrics`: per-stream counters
//!
//! # Example
//! ```
//! use subunit_core::{Event, StreamResultToBytes};
//!
//! let mut stream = StreamResultToBytes::new(Vec::new());
//! stream
//!     .status(&Event::new().with_test_id("test_login").with_status("success"))
//!     .unwrap();
//!
//! let bytes = stream.into_inner();
//! assert_eq!(bytes[0], 0xB3);
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod fields;
pub mod flags;
pub mod metrics;
pub mod packet;
pub mod varint;
pub mod writer;

// Re-export commonly used types
pub use config::EncoderConfig;
pub use error::{Error, Result};
pub use event::Event;
pub use flags::Status;
pub use packet::{decode_packet, encode_packet, DecodedPacket};
pub use writer::{encode_status, StreamResultToBytes};
