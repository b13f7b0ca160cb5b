//! # Scripted Channel
//!
//! An in-memory [`ByteChannel`] that plays back a prepared response and
//! records everything written to it. Once the script runs dry every read
//! times out, the same way a silent instrument looks on a real port.

use std::collections::VecDeque;
use std::io;

use super::ByteChannel;

/// In-memory channel with scripted input and captured output.
///
/// ## Example
///
/// ```
/// use scopeshot::transport::{ByteChannel, MockChannel};
///
/// let mut channel = MockChannel::new(b"0\r");
/// channel.write_all(b"ID\r").unwrap();
///
/// assert_eq!(channel.read_byte().unwrap(), Some(b'0'));
/// assert_eq!(channel.written(), b"ID\r");
/// ```
#[derive(Debug, Default)]
pub struct MockChannel {
    input: VecDeque<u8>,
    written: Vec<u8>,
    consumed: usize,
    broken: bool,
}

impl MockChannel {
    /// Create a channel that will answer with `input`.
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Default::default()
        }
    }

    /// Append more scripted input.
    pub fn push(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Make every subsequent read and write fail with a broken pipe.
    pub fn break_link(&mut self) {
        self.broken = true;
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of bytes handed out by `read_byte`.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Scripted bytes not read yet.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }
}

impl ByteChannel for MockChannel {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.broken {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        let byte = self.input.pop_front();
        if byte.is_some() {
            self.consumed += 1;
        }
        Ok(byte)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        if self.broken {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        self.written.extend_from_slice(data);
        Ok(())
    }
}
