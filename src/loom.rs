#[cfg(all(test, feature = "loom"))]
mod tests {
    use crate::{error::PipeBufError, flow::FlowControl, sync::CancelToken, Channel};
    use loom::{model::Builder, thread};
    use std::sync::Arc;

    #[test]
    fn test_exclusive_admission() {
        let mut builder = Builder::new();
        if builder.preemption_bound.is_none() {
            builder.preemption_bound = Some(3);
        }

        builder.check(|| {
            let channel = Arc::new(Channel::new(2).unwrap());
            let session = channel.open().unwrap();

            let contender = channel.clone();
            let handle = thread::spawn(move || contender.open().is_err());

            assert!(handle.join().unwrap(), "second open must observe Busy");

            drop(session);
            assert!(channel.open().is_ok());
        });
    }

    #[test]
    fn test_spsc_handshake() {
        let mut builder = Builder::new();
        if builder.preemption_bound.is_none() {
            builder.preemption_bound = Some(3);
        }

        builder.check(|| {
            let flow = Arc::new(FlowControl::new(2).unwrap());
            let cancel = CancelToken::new();

            let writer_flow = flow.clone();
            let writer_cancel = cancel.clone();
            let handle = thread::spawn(move || {
                writer_flow
                    .write_from(b"abc".as_slice(), 3, &writer_cancel)
                    .unwrap()
            });

            let mut received = Vec::new();
            while received.len() < 3 {
                let max = 3 - received.len();
                flow.read_into(&mut received, max, &cancel).unwrap();
            }

            assert_eq!(handle.join().unwrap(), 3);
            assert_eq!(received, b"abc");
        });
    }

    #[test]
    fn test_cancellation_wakes_blocked_writer() {
        let mut builder = Builder::new();
        if builder.preemption_bound.is_none() {
            builder.preemption_bound = Some(3);
        }

        builder.check(|| {
            let flow = Arc::new(FlowControl::new(1).unwrap());
            let cancel = CancelToken::new();

            let writer_flow = flow.clone();
            let writer_cancel = cancel.clone();
            let handle =
                thread::spawn(move || writer_flow.write_from(b"xy".as_slice(), 2, &writer_cancel));

            cancel.cancel();

            // the first byte never waits, the second always does, so every
            // interleaving ends in an interruption after exactly one byte
            match handle.join().unwrap() {
                Err(PipeBufError::Interrupted { transferred }) => assert_eq!(transferred, 1),
                other => panic!("expected interruption, got {:?}", other),
            }
            assert_eq!(flow.snapshot(), (1, 1));
        });
    }
}
