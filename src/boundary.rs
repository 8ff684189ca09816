//! Fallible per-byte transfer across the caller boundary.
//!
//! The channel never touches caller memory directly. Bytes enter through a
//! [`ByteSource`] and leave through a [`ByteSink`], both of which may fail at
//! any offset. A failed transfer aborts the in-progress operation; the bytes
//! confirmed before the failure are reported in
//! [`PipeBufError::Fault`](crate::PipeBufError::Fault).

use thiserror::Error;

/// A single-byte transfer failed at the given offset of the caller's buffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("faulty address at offset {offset}")]
pub struct Fault {
    pub offset: usize,
}

/// Supplier of outbound bytes, addressed by offset.
pub trait ByteSource {
    fn byte_at(&self, offset: usize) -> Result<u8, Fault>;
}

/// Receiver of inbound bytes, addressed by offset.
pub trait ByteSink {
    fn put_byte(&mut self, offset: usize, byte: u8) -> Result<(), Fault>;
}

impl ByteSource for [u8] {
    fn byte_at(&self, offset: usize) -> Result<u8, Fault> {
        self.get(offset).copied().ok_or(Fault { offset })
    }
}

impl ByteSink for [u8] {
    fn put_byte(&mut self, offset: usize, byte: u8) -> Result<(), Fault> {
        match self.get_mut(offset) {
            Some(slot) => {
                *slot = byte;
                Ok(())
            }
            None => Err(Fault { offset }),
        }
    }
}

impl ByteSink for Vec<u8> {
    fn put_byte(&mut self, _offset: usize, byte: u8) -> Result<(), Fault> {
        self.push(byte);
        Ok(())
    }
}
