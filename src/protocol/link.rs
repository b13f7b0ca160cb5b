//! # Link Layer
//!
//! Framing primitives on top of a [`ByteChannel`]: delimited token reads
//! and fixed-length checksummed block reads. Both read one byte at a time,
//! since the instrument paces everything at 1200 baud anyway and a byte
//! read past the end of a response would be lost to the next transaction.
//!
//! ## Timeouts
//!
//! A single read that returns nothing is not fatal; the instrument is slow
//! to start answering some commands. After `idle_reads` consecutive empty
//! reads the link gives up with [`ScopeshotError::Timeout`].
//!
//! ## Checksummed Blocks
//!
//! ```text
//! ┌────┬────┬─────┬──────┬──────────┐
//! │ d1 │ d2 │ ... │ dn   │ checksum │   checksum = (d1 + ... + dn) mod 256
//! └────┴────┴─────┴──────┴──────────┘
//! ```
//!
//! A mismatch does not abort the read. The block comes back flagged so the
//! caller can still decode whatever arrived.

use crate::error::ScopeshotError;
use crate::instrument::InstrumentConfig;
use crate::transport::ByteChannel;

use super::commands::{COMMA, CR};

/// Low 8 bits of the byte sum.
///
/// ## Example
///
/// ```
/// use scopeshot::protocol::link::checksum;
///
/// assert_eq!(checksum(&[0x01, 0x02, 0x03]), 0x06);
/// assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
/// ```
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// A fixed-length block read off the link together with its checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Payload bytes, exactly as received
    pub data: Vec<u8>,
    /// Checksum byte the instrument sent
    pub received: u8,
    /// Checksum computed over `data`
    pub computed: u8,
}

impl Block {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.received == self.computed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// # Instrument Link
///
/// Owns the byte channel for the duration of a session.
///
/// ## Example
///
/// ```
/// use scopeshot::instrument::InstrumentConfig;
/// use scopeshot::protocol::link::Link;
/// use scopeshot::transport::MockChannel;
///
/// let channel = MockChannel::new(b"0\r3,\x01\x02\x03\x06");
/// let mut link = Link::new(channel, &InstrumentConfig::SCOPEMETER_99);
///
/// assert_eq!(link.read_line()?, b"0");
/// assert_eq!(link.read_field()?, b"3");
///
/// let block = link.read_block(3)?;
/// assert!(block.is_valid());
/// assert_eq!(block.data, vec![1, 2, 3]);
/// # Ok::<(), scopeshot::error::ScopeshotError>(())
/// ```
pub struct Link<C> {
    channel: C,
    idle_reads: u32,
    max_token_len: usize,
}

impl<C: ByteChannel> Link<C> {
    pub fn new(channel: C, config: &InstrumentConfig) -> Self {
        Self::with_limits(channel, config.idle_reads, config.max_token_len)
    }

    /// Create a link with explicit timeout and token limits.
    ///
    /// `idle_reads` is raised to at least 1.
    pub fn with_limits(channel: C, idle_reads: u32, max_token_len: usize) -> Self {
        Self {
            channel,
            idle_reads: idle_reads.max(1),
            max_token_len,
        }
    }

    /// Write a complete command line.
    pub fn send(&mut self, cmd: &[u8]) -> Result<(), ScopeshotError> {
        log::debug!("-> {:?}", String::from_utf8_lossy(cmd));
        self.channel.write_all(cmd)?;
        Ok(())
    }

    /// Read bytes up to `stop`. The stop byte is consumed but not returned.
    ///
    /// ## Errors
    ///
    /// - [`ScopeshotError::TokenOverflow`] if more than `max_token_len`
    ///   bytes arrive before the stop byte
    /// - [`ScopeshotError::Timeout`] if the instrument goes quiet
    /// - [`ScopeshotError::Io`] if the channel fails
    pub fn read_until(&mut self, stop: u8) -> Result<Vec<u8>, ScopeshotError> {
        let mut token = Vec::new();

        loop {
            let byte = self.next_byte()?;
            if byte == stop {
                break;
            }
            if token.len() >= self.max_token_len {
                return Err(ScopeshotError::TokenOverflow {
                    limit: self.max_token_len,
                });
            }
            token.push(byte);
        }

        log::debug!("<- {:?}", String::from_utf8_lossy(&token));
        Ok(token)
    }

    /// Read a CR-terminated line.
    #[inline]
    pub fn read_line(&mut self) -> Result<Vec<u8>, ScopeshotError> {
        self.read_until(CR)
    }

    /// Read a comma-terminated field.
    #[inline]
    pub fn read_field(&mut self) -> Result<Vec<u8>, ScopeshotError> {
        self.read_until(COMMA)
    }

    /// Read `n` data bytes followed by one checksum byte.
    ///
    /// Always consumes exactly `n + 1` bytes. A checksum mismatch is logged
    /// and reported through [`Block::is_valid`], never as an error.
    pub fn read_block(&mut self, n: usize) -> Result<Block, ScopeshotError> {
        let mut data = Vec::with_capacity(n);
        let mut computed = 0u8;

        for _ in 0..n {
            let byte = self.next_byte()?;
            computed = computed.wrapping_add(byte);
            data.push(byte);
        }

        let received = self.next_byte()?;
        let block = Block {
            data,
            received,
            computed,
        };

        if block.is_valid() {
            log::debug!("<- {} byte block, checksum 0x{:02X}", n, computed);
        } else {
            log::warn!(
                "Checksum error (expected {}, read {})",
                block.computed,
                block.received
            );
        }

        Ok(block)
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    fn next_byte(&mut self) -> Result<u8, ScopeshotError> {
        for _ in 0..self.idle_reads {
            if let Some(byte) = self.channel.read_byte()? {
                return Ok(byte);
            }
        }
        Err(ScopeshotError::Timeout {
            idle_reads: self.idle_reads,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockChannel;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn link(input: &[u8]) -> Link<MockChannel> {
        Link::new(MockChannel::new(input), &InstrumentConfig::SCOPEMETER_99)
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x80, 0x80]), 0);
        assert_eq!(checksum(&[0xFF; 3]), 0xFD);
    }

    #[test]
    fn test_read_until_strips_stop_byte() {
        let mut link = link(b"FLUKE 99\rnext");
        assert_eq!(link.read_line().unwrap(), b"FLUKE 99".to_vec());
        // Exactly the token plus CR was consumed
        assert_eq!(link.channel().consumed(), 9);
        assert_eq!(link.channel().remaining(), 4);
    }

    #[test]
    fn test_read_until_empty_token() {
        let mut link = link(b"\r");
        assert_eq!(link.read_line().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_read_field_stops_at_comma() {
        let mut link = link(b"3907,\x1B");
        assert_eq!(link.read_field().unwrap(), b"3907".to_vec());
        assert_eq!(link.channel().remaining(), 1);
    }

    #[test]
    fn test_read_until_keeps_other_delimiters() {
        let mut link = link(b"1,2\r");
        assert_eq!(link.read_line().unwrap(), b"1,2".to_vec());
    }

    #[test]
    fn test_read_until_overflow() {
        let mut link = Link::with_limits(MockChannel::new(b"ABCDEF\r"), 10, 4);
        let err = link.read_line().unwrap_err();
        assert!(matches!(err, ScopeshotError::TokenOverflow { limit: 4 }));
    }

    #[test]
    fn test_read_until_at_limit_is_fine() {
        let mut link = Link::with_limits(MockChannel::new(b"ABCD\r"), 10, 4);
        assert_eq!(link.read_line().unwrap(), b"ABCD".to_vec());
    }

    #[test]
    fn test_read_until_times_out() {
        let mut link = link(b"no terminator");
        let err = link.read_line().unwrap_err();
        assert!(matches!(err, ScopeshotError::Timeout { idle_reads: 10 }));
    }

    #[test]
    fn test_read_until_channel_failure() {
        let mut channel = MockChannel::new(b"0\r");
        channel.break_link();
        let mut link = Link::new(channel, &InstrumentConfig::default());
        assert!(matches!(link.read_line(), Err(ScopeshotError::Io(_))));
    }

    #[test]
    fn test_read_block_valid() {
        let mut link = link(&[0x10, 0x20, 0x30, 0x60]);
        let block = link.read_block(3).unwrap();
        assert!(block.is_valid());
        assert_eq!(block.data, vec![0x10, 0x20, 0x30]);
        assert_eq!(block.computed, 0x60);
    }

    #[test]
    fn test_read_block_mismatch_is_not_an_error() {
        let mut link = link(&[0x10, 0x20, 0x30, 0x61, 0xAA]);
        let block = link.read_block(3).unwrap();
        assert!(!block.is_valid());
        assert_eq!(block.received, 0x61);
        assert_eq!(block.data, vec![0x10, 0x20, 0x30]);
        assert_eq!(link.channel().remaining(), 1);
    }

    #[test]
    fn test_read_block_empty() {
        let mut link = link(&[0x00]);
        let block = link.read_block(0).unwrap();
        assert!(block.is_valid());
        assert!(block.is_empty());
        assert_eq!(link.channel().consumed(), 1);
    }

    #[test]
    fn test_read_block_short_input_times_out() {
        let mut link = link(&[0x01, 0x02]);
        assert!(matches!(
            link.read_block(2),
            Err(ScopeshotError::Timeout { .. })
        ));
    }

    #[test]
    fn test_read_block_consumes_n_plus_one() {
        let mut rng = StdRng::seed_from_u64(0x5399);

        for _ in 0..50 {
            let n = rng.random_range(0..600);
            let mut input: Vec<u8> = (0..n + 1).map(|_| rng.random()).collect();
            // Trailing bytes that must be left alone, including delimiters
            input.extend_from_slice(b"\r,\x1B");

            let mut link = link(&input);
            let block = link.read_block(n).unwrap();

            assert_eq!(block.len(), n);
            assert_eq!(link.channel().consumed(), n + 1);
            assert_eq!(link.channel().remaining(), 3);
        }
    }

    #[test]
    fn test_appended_checksum_always_validates() {
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..50 {
            let n = rng.random_range(0..300);
            let mut input: Vec<u8> = (0..n).map(|_| rng.random()).collect();
            input.push(checksum(&input));

            let block = link(&input).read_block(n).unwrap();
            assert!(block.is_valid());
        }
    }

    #[test]
    fn test_send_writes_verbatim() {
        let mut link = link(b"");
        link.send(b"QG129\r").unwrap();
        assert_eq!(link.channel().written(), b"QG129\r");
    }
}
