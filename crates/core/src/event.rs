//! Test-result events.

use std::time::SystemTime;

/// A single status event for one test.
///
/// Every field is optional: an empty test identifier or status, or a missing
/// timestamp, means the field is absent from the packet. Events are built
/// once by the caller and only read by the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    test_id: String,
    status: String,
    timestamp: Option<SystemTime>,
}

impl Event {
    /// Create an event with every field absent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_id(mut self, test_id: impl Into<String>) -> Self {
        self.test_id = test_id.into();
        self
    }

    /// Set the status name. Names outside the status table encode as
    /// `undefined`.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }

    pub fn has_test_id(&self) -> bool {
        !self.test_id.is_empty()
    }

    pub fn has_timestamp(&self) -> bool {
        self.timestamp.is_some()
    }
}
