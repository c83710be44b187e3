//! Counters for a packet stream.
//!
//! # Thread Safety
//!
//! `Metrics` is NOT thread-safe. Each [`StreamResultToBytes`] owns its own
//! instance; callers sharing a writer across threads already serialize
//! access to it.
//!
//! [`StreamResultToBytes`]: crate::writer::StreamResultToBytes

use std::time::{Duration, Instant};

use crate::error::{Error, PacketError, VarintError};

/// Counters for packets handed to one sink.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// When the stream was created
    pub start_time: Instant,

    /// Packets fully written to the sink
    pub packets_written: u64,

    /// Bytes fully written to the sink
    pub bytes_written: u64,

    /// Encodes rejected because a number exceeded 30 bits
    pub integer_too_large: u64,

    /// Encodes rejected because the packet exceeded the size limit
    pub packet_too_large: u64,

    /// Writes the sink refused
    pub sink_failures: u64,

    /// Any other rejected encode
    pub other_failures: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            packets_written: 0,
            bytes_written: 0,
            integer_too_large: 0,
            packet_too_large: 0,
            sink_failures: 0,
            other_failures: 0,
        }
    }

    /// Record a packet that reached the sink.
    pub fn record_written(&mut self, len: usize) {
        self.packets_written += 1;
        self.bytes_written += len as u64;
    }

    /// Record a failed encode or write.
    pub fn record_failure(&mut self, err: &Error) {
        match err {
            Error::Varint(VarintError::IntegerTooLarge { .. }) => self.integer_too_large += 1,
            Error::Packet(PacketError::TooLarge { .. }) => self.packet_too_large += 1,
            Error::Io(_) => self.sink_failures += 1,
            _ => self.other_failures += 1,
        }
    }

    /// Total failed calls of any kind.
    pub fn failures(&self) -> u64 {
        self.integer_too_large + self.packet_too_large + self.sink_failures + self.other_failures
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "elapsed_ms={}\n\
             packets_written={}\n\
             bytes_written={}\n\
             integer_too_large={}\n\
             packet_too_large={}\n\
             sink_failures={}\n\
             other_failures={}\n",
            self.elapsed().as_millis(),
            self.packets_written,
            self.bytes_written,
            self.integer_too_large,
            self.packet_too_large,
            self.sink_failures,
            self.other_failures,
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.packets_written, 0);
        assert_eq!(metrics.failures(), 0);
        assert!(metrics.elapsed().as_millis() < 1000);
    }

    #[test]
    fn test_record_written() {
        let mut metrics = Metrics::new();
        metrics.record_written(8);
        metrics.record_written(20);

        assert_eq!(metrics.packets_written, 2);
        assert_eq!(metrics.bytes_written, 28);
    }

    #[test]
    fn test_record_failure_by_kind() {
        let mut metrics = Metrics::new();
        metrics.record_failure(&VarintError::IntegerTooLarge { value: 1 << 30 }.into());
        metrics.record_failure(&PacketError::TooLarge { size: 5_000_000 }.into());
        metrics.record_failure(&std::io::Error::other("closed").into());
        metrics.record_failure(&PacketError::TimestampOutOfRange.into());

        assert_eq!(metrics.integer_too_large, 1);
        assert_eq!(metrics.packet_too_large, 1);
        assert_eq!(metrics.sink_failures, 1);
        assert_eq!(metrics.other_failures, 1);
        assert_eq!(metrics.failures(), 4);
    }

    #[test]
    fn test_export_text() {
        let mut metrics = Metrics::new();
        metrics.record_written(8);

        let text = metrics.export_text();
        assert!(text.contains("packets_written=1"));
        assert!(text.contains("bytes_written=8"));
        assert!(text.contains("sink_failures=0"));
    }
}
