//! The blocking engine: suspends writers on a full store and readers on an
//! empty one, wakes the complementary side on every transfer, and aborts a
//! wait when its cancellation token fires.

use crate::boundary::{ByteSink, ByteSource};
use crate::error::{PipeBufError, Result};
use crate::ring::{Empty, Full, RingBuf};
use crate::sync::{CancelToken, Condvar, Mutex, Waker};
use std::sync::Arc;

struct Shared {
    ring: Mutex<RingBuf>,
    progress: Condvar,
}

impl Waker for Shared {
    fn wake_all(&self) {
        // taking the buffer lock orders this wake after any in-flight
        // predicate check; a waiter between check and wait still sees it
        let _guard = self.ring.lock().unwrap();
        self.progress.notify_all();
    }
}

pub(crate) struct FlowControl {
    shared: Arc<Shared>,
}

impl FlowControl {
    pub(crate) fn new(capacity: usize) -> Result<Self> {
        Ok(FlowControl {
            shared: Arc::new(Shared {
                ring: Mutex::new(RingBuf::new(capacity)?),
                progress: Condvar::new(),
            }),
        })
    }

    /// Copy `len` bytes from `source` into the store, suspending while the
    /// store is full.
    ///
    /// Returns `len` on full success. On cancellation or a source fault the
    /// bytes already pushed are final and their count is carried in the
    /// error.
    pub(crate) fn write_from<S: ByteSource + ?Sized>(
        &self,
        source: &S,
        len: usize,
        cancel: &CancelToken,
    ) -> Result<usize> {
        let _watch = cancel.watch(self.shared.clone());
        let mut ring = self.shared.ring.lock().unwrap();
        let mut transferred = 0;

        while transferred < len {
            let byte = match source.byte_at(transferred) {
                Ok(byte) => byte,
                Err(fault) => {
                    return Err(PipeBufError::Fault {
                        transferred,
                        source: fault,
                    })
                }
            };

            loop {
                match ring.push(byte) {
                    Ok(()) => break,
                    Err(Full) => {
                        if cancel.is_cancelled() {
                            return Err(PipeBufError::Interrupted { transferred });
                        }
                        ring = self.shared.progress.wait(ring).unwrap();
                        if cancel.is_cancelled() {
                            return Err(PipeBufError::Interrupted { transferred });
                        }
                    }
                }
            }

            transferred += 1;
            crate::pipe_trace!(transferred, occupancy = ring.occupancy(), "byte pushed");
            self.shared.progress.notify_all();
        }

        Ok(transferred)
    }

    /// Copy up to `max` bytes from the store into `sink`.
    ///
    /// Suspends only while nothing has been transferred yet and the store is
    /// empty; once at least one byte is out, a drained store ends the call
    /// with a short count.
    pub(crate) fn read_into<S: ByteSink + ?Sized>(
        &self,
        sink: &mut S,
        max: usize,
        cancel: &CancelToken,
    ) -> Result<usize> {
        let _watch = cancel.watch(self.shared.clone());
        let mut ring = self.shared.ring.lock().unwrap();
        let mut transferred = 0;

        while transferred < max {
            let byte = match ring.peek() {
                Ok(byte) => byte,
                Err(Empty) => {
                    if transferred > 0 {
                        break;
                    }
                    if cancel.is_cancelled() {
                        return Err(PipeBufError::Interrupted { transferred: 0 });
                    }
                    ring = self.shared.progress.wait(ring).unwrap();
                    if cancel.is_cancelled() {
                        return Err(PipeBufError::Interrupted { transferred: 0 });
                    }
                    continue;
                }
            };

            sink.put_byte(transferred, byte)
                .map_err(|fault| PipeBufError::Fault {
                    transferred,
                    source: fault,
                })?;
            // the peek above proves the store is non-empty
            let _ = ring.pop();
            transferred += 1;
            crate::pipe_trace!(transferred, occupancy = ring.occupancy(), "byte popped");
            self.shared.progress.notify_all();
        }

        Ok(transferred)
    }

    /// Change the store's capacity. Runs under the transfer lock, so it can
    /// never interleave with a push or pop; growth wakes blocked writers.
    pub(crate) fn resize(&self, new_capacity: usize) -> Result<()> {
        let mut ring = self.shared.ring.lock().unwrap();
        ring.resize(new_capacity)?;
        self.shared.progress.notify_all();
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> (usize, usize) {
        self.shared.ring.lock().unwrap().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[fixture]
    fn flow() -> FlowControl {
        FlowControl::new(4).unwrap()
    }

    #[fixture]
    fn cancel() -> CancelToken {
        CancelToken::new()
    }

    #[rstest]
    fn transfers_without_blocking_when_space_exists(flow: FlowControl, cancel: CancelToken) {
        assert_eq!(flow.write_from(b"ab".as_slice(), 2, &cancel).unwrap(), 2);

        let mut out = Vec::new();
        assert_eq!(flow.read_into(&mut out, 4, &cancel).unwrap(), 2);
        assert_eq!(out, b"ab");
    }

    #[rstest]
    fn source_fault_reports_confirmed_count(flow: FlowControl, cancel: CancelToken) {
        let result = flow.write_from(b"ab".as_slice(), 4, &cancel);
        match result {
            Err(PipeBufError::Fault {
                transferred,
                source,
            }) => {
                assert_eq!(transferred, 2);
                assert_eq!(source.offset, 2);
            }
            other => panic!("expected fault, got {:?}", other),
        }
        assert_eq!(flow.snapshot(), (4, 2));
    }

    #[rstest]
    fn sink_fault_leaves_undelivered_bytes_buffered(flow: FlowControl, cancel: CancelToken) {
        flow.write_from(b"abcd".as_slice(), 4, &cancel).unwrap();

        let mut small = [0u8; 2];
        let result = flow.read_into(&mut small[..], 4, &cancel);
        match result {
            Err(PipeBufError::Fault { transferred, .. }) => assert_eq!(transferred, 2),
            other => panic!("expected fault, got {:?}", other),
        }
        assert_eq!(small, *b"ab");
        assert_eq!(flow.snapshot(), (4, 2));
    }

    #[rstest]
    fn cancelled_wait_on_full_store_reports_progress(flow: FlowControl, cancel: CancelToken) {
        flow.write_from(b"abcd".as_slice(), 4, &cancel).unwrap();

        cancel.cancel();
        let result = flow.write_from(b"x".as_slice(), 1, &cancel);
        match result {
            Err(PipeBufError::Interrupted { transferred }) => assert_eq!(transferred, 0),
            other => panic!("expected interruption, got {:?}", other),
        }
    }

    #[rstest]
    fn cancelled_token_does_not_affect_waitless_transfers(flow: FlowControl, cancel: CancelToken) {
        cancel.cancel();

        // space exists, so the transfer completes without ever inspecting
        // the token
        assert_eq!(flow.write_from(b"ab".as_slice(), 2, &cancel).unwrap(), 2);

        let mut out = Vec::new();
        assert_eq!(flow.read_into(&mut out, 2, &cancel).unwrap(), 2);
    }

    #[rstest]
    fn cancelled_wait_on_empty_store_reports_zero(flow: FlowControl, cancel: CancelToken) {
        cancel.cancel();

        let mut out = Vec::new();
        let result = flow.read_into(&mut out, 4, &cancel);
        match result {
            Err(PipeBufError::Interrupted { transferred }) => assert_eq!(transferred, 0),
            other => panic!("expected interruption, got {:?}", other),
        }
    }

    #[rstest]
    fn drained_store_ends_read_short(flow: FlowControl, cancel: CancelToken) {
        flow.write_from(b"abc".as_slice(), 3, &cancel).unwrap();

        let mut out = Vec::new();
        assert_eq!(flow.read_into(&mut out, 10, &cancel).unwrap(), 3);
        assert_eq!(out, b"abc");
    }
}
