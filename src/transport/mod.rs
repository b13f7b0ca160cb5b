//! # Instrument Transport Layer
//!
//! This module provides the byte channel the protocol engine talks through.
//!
//! ## Available Transports
//!
//! - [`serial`]: Raw-mode TTY for RS-232 adapters (Unix)
//! - [`mock`]: Scripted in-memory channel for tests and offline replay
//!
//! ## Channel Contract
//!
//! A channel moves one byte at a time. A read either yields a byte or
//! reports that nothing arrived within the per-read timeout; deciding how
//! many empty reads make a dead link is up to the caller. Writes block
//! until every byte has been handed to the device.

use std::io;

#[cfg(unix)]
pub mod serial;

pub mod mock;

pub use mock::MockChannel;
#[cfg(unix)]
pub use serial::SerialTransport;

/// Blocking byte-oriented I/O with a per-read timeout.
pub trait ByteChannel {
    /// Read a single byte.
    ///
    /// Returns `Ok(None)` when the read timeout expired with nothing received.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write every byte of `data` to the channel.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
}

impl<C: ByteChannel + ?Sized> ByteChannel for &mut C {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }
}

impl<C: ByteChannel + ?Sized> ByteChannel for Box<C> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }
}
