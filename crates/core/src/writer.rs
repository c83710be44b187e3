//! Writing packets to a sink.
//!
//! A sink is any [`std::io::Write`]. Each event is encoded completely in
//! memory and handed to the sink in one `write_all` call, so a failed encode
//! never leaves partial bytes behind. The sink is owned by the caller;
//! serializing access to a shared stream is the caller's job.

use std::io::Write;

use tracing::debug;

use crate::config::EncoderConfig;
use crate::error::Result;
use crate::event::Event;
use crate::metrics::Metrics;
use crate::packet::encode_packet;

/// Encode `event` and write the packet to `sink`.
///
/// # Errors
/// Any encoding error aborts before the sink is touched. Sink failures are
/// returned as `Error::Io` with the original `io::Error`.
pub fn encode_status<W: Write + ?Sized>(event: &Event, sink: &mut W) -> Result<()> {
    encode_status_with(event, sink, &EncoderConfig::default()).map(|_| ())
}

/// Like [`encode_status`] with an explicit configuration. Returns the number
/// of bytes written.
pub fn encode_status_with<W: Write + ?Sized>(
    event: &Event,
    sink: &mut W,
    config: &EncoderConfig,
) -> Result<usize> {
    let packet = encode_packet(event, config).map_err(|err| {
        debug!(error = %err, kind = err.kind(), "failed to encode packet");
        err
    })?;

    sink.write_all(&packet).map_err(|err| {
        debug!(error = %err, len = packet.len(), "sink rejected packet");
        err
    })?;

    Ok(packet.len())
}

/// A stream of status events written as packets to one sink.
#[derive(Debug)]
pub struct StreamResultToBytes<W: Write> {
    output: W,
    config: EncoderConfig,
    metrics: Metrics,
}

impl<W: Write> StreamResultToBytes<W> {
    pub fn new(output: W) -> Self {
        Self::with_config(output, EncoderConfig::default())
    }

    pub fn with_config(output: W, config: EncoderConfig) -> Self {
        Self {
            output,
            config,
            metrics: Metrics::new(),
        }
    }

    /// Report a test status.
    ///
    /// # Errors
    /// See [`encode_status`]. On error nothing has been written.
    pub fn status(&mut self, event: &Event) -> Result<()> {
        match encode_status_with(event, &mut self.output, &self.config) {
            Ok(len) => {
                self.metrics.record_written(len);
                Ok(())
            }
            Err(err) => {
                self.metrics.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.output.flush()?;
        Ok(())
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn get_ref(&self) -> &W {
        &self.output
    }

    /// Give the sink back to the caller.
    pub fn into_inner(self) -> W {
        self.output
    }
}
