//! Encoder configuration.
//!
//! The encoder has no file, environment or command-line configuration. The
//! single knob decides when the sub-field encoders run on worker threads.
//! Packets are byte-for-byte identical either way.

/// Default identifier size (bytes) at which sub-fields are encoded in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64 * 1024;

/// Configuration for a packet encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Test identifiers of at least this many bytes have their flags,
    /// timestamp and identifier fields encoded on scoped threads.
    pub parallel_threshold: usize,
}

impl EncoderConfig {
    /// Never spawn threads.
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
        }
    }

    /// Spawn threads once the identifier reaches `threshold` bytes.
    pub fn with_parallel_threshold(threshold: usize) -> Self {
        Self {
            parallel_threshold: threshold,
        }
    }

    /// Whether an identifier of `test_id_len` bytes takes the parallel path.
    pub fn is_parallel(&self, test_id_len: usize) -> bool {
        test_id_len >= self.parallel_threshold
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}
