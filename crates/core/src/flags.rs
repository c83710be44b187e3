//! The 2-byte flags field and the status-code table.
//!
//! # Layout
//!
//! ```text
//! byte 0:  VVVV I . T .    V = protocol version (2)
//!                          I = test identifier present
//!                          T = timestamp present
//! byte 1:  . . . . . S S S    S = status code
//! ```
//!
//! Bits marked `.` are reserved and always zero in packets written here.

use std::fmt;

use crate::event::Event;

/// Protocol version carried in the top nibble of the first flags byte.
pub const VERSION: u8 = 0x2;

/// Presence bit for the test identifier (flags byte 0).
pub const TEST_ID_PRESENT: u8 = 0x08;

/// Presence bit for the timestamp (flags byte 0).
pub const TIMESTAMP_PRESENT: u8 = 0x02;

const STATUS_MASK: u8 = 0x07;

/// Test status carried in the low 3 bits of the second flags byte.
///
/// Unknown and empty names map to [`Status::Undefined`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    Undefined,
    Exists,
    InProgress,
    Success,
    UnexpectedSuccess,
    Skip,
    Fail,
    ExpectedFail,
}

impl Status {
    /// Look up a status by its wire name.
    ///
    /// This never fails; anything not in the table is `Undefined`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "exists" => Status::Exists,
            "inprogress" => Status::InProgress,
            "success" => Status::Success,
            "uxsuccess" => Status::UnexpectedSuccess,
            "skip" => Status::Skip,
            "fail" => Status::Fail,
            "xfail" => Status::ExpectedFail,
            _ => Status::Undefined,
        }
    }

    /// Map a 3-bit code back to a status. Only the low 3 bits are used.
    pub fn from_code(code: u8) -> Self {
        match code & STATUS_MASK {
            1 => Status::Exists,
            2 => Status::InProgress,
            3 => Status::Success,
            4 => Status::UnexpectedSuccess,
            5 => Status::Skip,
            6 => Status::Fail,
            7 => Status::ExpectedFail,
            _ => Status::Undefined,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Status::Undefined => 0,
            Status::Exists => 1,
            Status::InProgress => 2,
            Status::Success => 3,
            Status::UnexpectedSuccess => 4,
            Status::Skip => 5,
            Status::Fail => 6,
            Status::ExpectedFail => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Status::Undefined => "undefined",
            Status::Exists => "exists",
            Status::InProgress => "inprogress",
            Status::Success => "success",
            Status::UnexpectedSuccess => "uxsuccess",
            Status::Skip => "skip",
            Status::Fail => "fail",
            Status::ExpectedFail => "xfail",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the flags field for an event.
pub fn encode_flags(event: &Event) -> [u8; 2] {
    let mut flags = [VERSION << 4, 0];
    if event.has_test_id() {
        flags[0] |= TEST_ID_PRESENT;
    }
    if event.has_timestamp() {
        flags[0] |= TIMESTAMP_PRESENT;
    }
    flags[1] |= Status::from_name(event.status()).code();
    flags
}

/// A decoded flags field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub version: u8,
    pub test_id_present: bool,
    pub timestamp_present: bool,
    pub status: Status,
}

impl Flags {
    pub fn parse(bytes: [u8; 2]) -> Self {
        Self {
            version: bytes[0] >> 4,
            test_id_present: bytes[0] & TEST_ID_PRESENT != 0,
            timestamp_present: bytes[0] & TIMESTAMP_PRESENT != 0,
            status: Status::from_code(bytes[1]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_status_table() {
        let table = [
            ("", 0x0),
            ("undefined", 0x0),
            ("exists", 0x1),
            ("inprogress", 0x2),
            ("success", 0x3),
            ("uxsuccess", 0x4),
            ("skip", 0x5),
            ("fail", 0x6),
            ("xfail", 0x7),
            ("dummystatus", 0x0),
            ("SUCCESS", 0x0),
        ];

        for (name, code) in table {
            assert_eq!(Status::from_name(name).code(), code, "wrong code for {:?}", name);
        }
    }

    #[test]
    fn test_code_name_round_trip() {
        for code in 0..8u8 {
            let status = Status::from_code(code);
            assert_eq!(status.code(), code);
            assert_eq!(Status::from_name(status.name()), status);
        }
    }

    #[test]
    fn test_version_only() {
        let flags = encode_flags(&Event::new());
        assert_eq!(flags, [0x20, 0x00]);
    }

    #[test]
    fn test_presence_bits() {
        let event = Event::new()
            .with_test_id("test-id")
            .with_status("fail")
            .with_timestamp(UNIX_EPOCH + Duration::from_secs(1));

        let flags = encode_flags(&event);
        assert_eq!(flags, [0x20 | TEST_ID_PRESENT | TIMESTAMP_PRESENT, 0x06]);

        let parsed = Flags::parse(flags);
        assert_eq!(parsed.version, VERSION);
        assert!(parsed.test_id_present);
        assert!(parsed.timestamp_present);
        assert_eq!(parsed.status, Status::Fail);
    }

    #[test]
    fn test_reserved_bits_zero() {
        let event = Event::new()
            .with_test_id("x")
            .with_status("xfail")
            .with_timestamp(UNIX_EPOCH + Duration::from_secs(1));

        let flags = encode_flags(&event);
        assert_eq!(flags[0] & 0b0000_0101, 0);
        assert_eq!(flags[1] & !STATUS_MASK, 0);
    }
}
