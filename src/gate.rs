use crate::error::PipeBufError;
use crate::sync::{AtomicBool, Ordering};
use crossbeam::utils::CachePadded;

/// At-most-one-session admission over the channel.
///
/// The transition must be a single compare-and-set: with a separate check
/// and set, two openers can both observe the gate closed.
pub(crate) struct AdmissionGate {
    open: CachePadded<AtomicBool>,
}

impl AdmissionGate {
    pub(crate) fn new() -> Self {
        AdmissionGate {
            open: CachePadded::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn acquire(&self) -> Result<(), PipeBufError> {
        self.open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| PipeBufError::Busy)
    }

    /// Unconditional close. Safe on an already-closed gate so error-path
    /// cleanup never has to track whether an acquire succeeded.
    pub(crate) fn release(&self) {
        self.open.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected() {
        let gate = AdmissionGate::new();
        gate.acquire().unwrap();
        assert!(matches!(gate.acquire(), Err(PipeBufError::Busy)));
    }

    #[test]
    fn release_reopens_the_gate() {
        let gate = AdmissionGate::new();
        gate.acquire().unwrap();
        gate.release();
        gate.acquire().unwrap();
    }

    #[test]
    fn release_without_acquire_is_harmless() {
        let gate = AdmissionGate::new();
        gate.release();
        gate.release();
        gate.acquire().unwrap();
    }
}
