//! # pipebuf - Exclusive-Access Blocking Byte Channel
//!
//! Byte channel backed by a bounded circular buffer, exposed through the
//! open/read/write/close contract of a character device. At most one session
//! is open at a time, writers block while the buffer is full, readers block
//! while it is empty, and any blocked transfer can be aborted through a
//! [`CancelToken`].
//!
//! Bytes are delivered in FIFO order and transferred one at a time through
//! fallible [`ByteSource`]/[`ByteSink`] boundaries, so a failing caller
//! buffer aborts a transfer without corrupting the channel.
//!
//! ## Opening a Channel
//!
//! Create a channel with [`Channel::new`] and claim the single session slot
//! with [`Channel::open`]:
//!
//! ```rust
//! use pipebuf::Channel;
//!
//! let channel = Channel::new(16)?;
//! let session = channel.open()?;
//!
//! // the slot is exclusive until the session is closed or dropped
//! assert!(channel.open().is_err());
//! drop(session);
//! assert!(channel.open().is_ok());
//! # Ok::<(), pipebuf::PipeBufError>(())
//! ```
//!
//! ## Writing and Reading
//!
//! ```rust
//! use pipebuf::{CancelToken, Channel};
//!
//! let channel = Channel::new(16)?;
//! let session = channel.open()?;
//! let cancel = CancelToken::new();
//!
//! let written = session.write_slice(b"hello", &cancel)?;
//! assert_eq!(written, 5);
//!
//! // reads return short once the buffer drains
//! let mut out = [0u8; 16];
//! let count = session.read_slice(&mut out, &cancel)?;
//! assert_eq!(&out[..count], b"hello");
//! # Ok::<(), pipebuf::PipeBufError>(())
//! ```
//!
//! ## Blocking Handshake
//!
//! A writer larger than the buffer and a concurrent reader pace each other;
//! neither side spins:
//!
//! ```rust
//! use pipebuf::{CancelToken, Channel};
//! use std::thread;
//!
//! let channel = Channel::new(4)?;
//! let session = channel.open()?;
//! let cancel = CancelToken::new();
//!
//! thread::scope(|scope| {
//!     scope.spawn(|| {
//!         let payload: Vec<u8> = (0u8..32).collect();
//!         session.write_slice(&payload, &cancel).unwrap();
//!     });
//!
//!     let mut received = Vec::new();
//!     while received.len() < 32 {
//!         let mut chunk = [0u8; 8];
//!         let count = session.read_slice(&mut chunk, &cancel).unwrap();
//!         received.extend_from_slice(&chunk[..count]);
//!     }
//!     assert_eq!(received, (0u8..32).collect::<Vec<u8>>());
//! });
//! # Ok::<(), pipebuf::PipeBufError>(())
//! ```
//!
//! ## Cancellation
//!
//! A blocked transfer aborts when its token fires and reports the bytes it
//! already moved; those bytes are final, not rolled back:
//!
//! ```rust
//! use pipebuf::{CancelToken, Channel, PipeBufError};
//!
//! let channel = Channel::new(4)?;
//! let session = channel.open()?;
//! let cancel = CancelToken::new();
//!
//! session.write_slice(b"full", &cancel)?;
//! cancel.cancel();
//!
//! match session.write_slice(b"x", &cancel) {
//!     Err(PipeBufError::Interrupted { transferred }) => assert_eq!(transferred, 0),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! # Ok::<(), pipebuf::PipeBufError>(())
//! ```
//!
//! ## Resizing
//!
//! Capacity may change at runtime as long as no buffered byte would be lost:
//!
//! ```rust
//! use pipebuf::{CancelToken, Channel, PipeBufError};
//!
//! let channel = Channel::new(4)?;
//! let session = channel.open()?;
//! let cancel = CancelToken::new();
//!
//! session.write_slice(b"abc", &cancel)?;
//! assert!(matches!(
//!     channel.resize(2),
//!     Err(PipeBufError::WouldTruncate { .. })
//! ));
//!
//! channel.resize(8)?;
//! let mut out = [0u8; 3];
//! session.read_slice(&mut out, &cancel)?;
//! assert_eq!(&out, b"abc");
//! # Ok::<(), pipebuf::PipeBufError>(())
//! ```
//!
//! ## Monitoring
//!
//! ```rust
//! use pipebuf::{CancelToken, Channel};
//!
//! let channel = Channel::new(16)?;
//! let session = channel.open()?;
//! let cancel = CancelToken::new();
//! session.write_slice(b"hello", &cancel)?;
//!
//! let snapshot = channel.snapshot();
//! assert_eq!(snapshot.capacity, 16);
//! assert_eq!(snapshot.occupancy, 5);
//!
//! let stats = channel.stats();
//! assert_eq!(stats.bytes_written, 5);
//! assert_eq!(stats.bytes_read, 0);
//! # Ok::<(), pipebuf::PipeBufError>(())
//! ```
//!
//! ## Custom Transfer Boundaries
//!
//! Slices implement the boundary traits; anything else that can produce or
//! accept single bytes, and possibly fail doing so, can too:
//!
//! ```rust
//! use pipebuf::{ByteSource, CancelToken, Channel, Fault};
//!
//! struct Zeroes;
//!
//! impl ByteSource for Zeroes {
//!     fn byte_at(&self, _offset: usize) -> Result<u8, Fault> {
//!         Ok(0)
//!     }
//! }
//!
//! let channel = Channel::new(16)?;
//! let session = channel.open()?;
//! let cancel = CancelToken::new();
//!
//! assert_eq!(session.write(&Zeroes, 8, &cancel)?, 8);
//! assert_eq!(channel.occupancy(), 8);
//! # Ok::<(), pipebuf::PipeBufError>(())
//! ```

pub use boundary::{ByteSink, ByteSource, Fault};
pub use channel::{Channel, Session, Snapshot, Stats};
pub use error::{PipeBufError, Result};
pub use sync::CancelToken;

pub mod boundary;
pub mod channel;
pub mod error;
pub(crate) mod flow;
pub(crate) mod gate;
#[cfg(all(test, feature = "loom"))]
pub(crate) mod loom;
pub(crate) mod ring;
pub(crate) mod sync;
pub(crate) mod trace_macro;
