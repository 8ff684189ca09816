//! Composition root wiring the ring store, admission gate, and flow control
//! behind the open/read/write/close contract.

use crate::boundary::{ByteSink, ByteSource};
use crate::error::Result;
use crate::flow::FlowControl;
use crate::gate::AdmissionGate;
use crate::sync::{AtomicU64, CancelToken, Ordering};
use crate::PipeBufError;
use tracing::debug;

/// Buffer geometry at a point in time, for attribute reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub capacity: usize,
    pub occupancy: usize,
}

/// Monotonic transfer totals. Partial progress of interrupted or faulted
/// transfers is included; those bytes are final.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub bytes_written: u64,
    pub bytes_read: u64,
}

/// Exclusive-access blocking byte channel over a bounded circular buffer.
///
/// At most one [`Session`] may be open at a time. Buffered bytes survive
/// session turnover: the channel behaves as a continuous pipe, and a new
/// session picks up whatever the previous one left unread.
pub struct Channel {
    flow: FlowControl,
    gate: AdmissionGate,
    bytes_written: AtomicU64,
    bytes_read: AtomicU64,
}

impl Channel {
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Channel {
            flow: FlowControl::new(capacity)?,
            gate: AdmissionGate::new(),
            bytes_written: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
        })
    }

    /// Open the single session slot.
    ///
    /// # Errors
    /// Returns [`PipeBufError::Busy`] if a session is already open. Failure
    /// has no side effects.
    pub fn open(&self) -> Result<Session<'_>> {
        self.gate.acquire()?;
        let (capacity, occupancy) = self.flow.snapshot();
        debug!(capacity, occupancy, "session opened");
        Ok(Session { channel: self })
    }

    /// Change the buffer capacity, preserving buffered bytes oldest-first.
    ///
    /// # Errors
    /// Returns [`PipeBufError::WouldTruncate`] if more bytes are buffered
    /// than the requested capacity holds; the buffer is left untouched.
    pub fn resize(&self, new_capacity: usize) -> Result<()> {
        self.flow.resize(new_capacity)?;
        debug!(new_capacity, "channel resized");
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.flow.snapshot().0
    }

    pub fn occupancy(&self) -> usize {
        self.flow.snapshot().1
    }

    pub fn snapshot(&self) -> Snapshot {
        let (capacity, occupancy) = self.flow.snapshot();
        Snapshot {
            capacity,
            occupancy,
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}

fn progress(result: &Result<usize>) -> usize {
    match result {
        Ok(count) => *count,
        Err(PipeBufError::Interrupted { transferred })
        | Err(PipeBufError::Fault { transferred, .. }) => *transferred,
        Err(_) => 0,
    }
}

/// The open handle. Pairs one `open` with one eventual close; dropping the
/// session closes it, so close is idempotent by construction.
///
/// Transfer methods take `&self`: a reader and a writer may share the one
/// session from different threads.
pub struct Session<'a> {
    channel: &'a Channel,
}

impl Session<'_> {
    /// Write `len` bytes from `source`, blocking while the buffer is full.
    ///
    /// # Errors
    /// [`PipeBufError::Interrupted`] when `cancel` fires during a wait and
    /// [`PipeBufError::Fault`] when the source fails; both carry the count
    /// already transferred, and those bytes stay buffered.
    pub fn write<S: ByteSource + ?Sized>(
        &self,
        source: &S,
        len: usize,
        cancel: &CancelToken,
    ) -> Result<usize> {
        let result = self.channel.flow.write_from(source, len, cancel);
        self.channel
            .bytes_written
            .fetch_add(progress(&result) as u64, Ordering::Relaxed);
        result
    }

    /// Read up to `max` bytes into `sink`, blocking only while the buffer is
    /// empty and nothing has been transferred yet. A short count means the
    /// buffer drained; cancellation is reported separately.
    pub fn read<S: ByteSink + ?Sized>(
        &self,
        sink: &mut S,
        max: usize,
        cancel: &CancelToken,
    ) -> Result<usize> {
        let result = self.channel.flow.read_into(sink, max, cancel);
        self.channel
            .bytes_read
            .fetch_add(progress(&result) as u64, Ordering::Relaxed);
        result
    }

    pub fn write_slice(&self, bytes: &[u8], cancel: &CancelToken) -> Result<usize> {
        self.write(bytes, bytes.len(), cancel)
    }

    pub fn read_slice(&self, out: &mut [u8], cancel: &CancelToken) -> Result<usize> {
        let max = out.len();
        self.read(out, max, cancel)
    }

    /// Explicit close. Equivalent to dropping the session.
    pub fn close(self) {}
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.channel.gate.release();
        debug!(occupancy = self.channel.occupancy(), "session closed");
    }
}
