//! # ScopeMeter Remote Commands
//!
//! This module implements the command side of the ScopeMeter's remote
//! control protocol, plus the acknowledgement codes it answers with.
//!
//! ## Protocol Overview
//!
//! Commands are two-letter ASCII mnemonics, optionally followed by decimal
//! parameters, terminated by a carriage return:
//!
//! | Command | Bytes | Meaning |
//! |---------|-------|---------|
//! | `ID` | `49 44 0D` | Identify |
//! | `IS` | `49 53 0D` | Instrument status |
//! | `QG<n>` | `51 47 ... 0D` | Query graphics in format `n` |
//!
//! Every command is answered with an acknowledgement line (see [`Ack`]).
//! Only when the acknowledgement is `0` does the instrument send a further
//! response.
//!
//! ## Response Delimiters
//!
//! - Text responses end with CR
//! - The graphics response starts with a decimal byte count ending in a
//!   comma, followed by that many binary bytes and a checksum byte

use std::fmt;

/// CR (Carriage Return) - Terminates commands and text responses
pub const CR: u8 = 0x0D;

/// Comma - Terminates the graphics byte count
pub const COMMA: u8 = b',';

/// Graphics format used for screen captures: the full screen as
/// Epson bit-image strips.
pub const DEFAULT_GRAPHICS_MODE: u32 = 129;

// ============================================================================
// COMMAND BUILDERS
// ============================================================================

/// Build an arbitrary command line: `mnemonic` followed by CR.
///
/// ## Example
///
/// ```
/// use scopeshot::protocol::commands;
///
/// assert_eq!(commands::command("CV"), b"CV\r".to_vec());
/// ```
pub fn command(mnemonic: &str) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(mnemonic.len() + 1);
    cmd.extend_from_slice(mnemonic.as_bytes());
    cmd.push(CR);
    cmd
}

/// # Identify (ID)
///
/// Asks for the model, firmware version and date string.
#[inline]
pub fn identify() -> Vec<u8> {
    command("ID")
}

/// # Instrument Status (IS)
///
/// Asks for the status word, returned as a decimal number.
#[inline]
pub fn instrument_status() -> Vec<u8> {
    command("IS")
}

/// # Query Graphics (QG n)
///
/// Asks for a screen dump in output format `mode`.
///
/// ## Example
///
/// ```
/// use scopeshot::protocol::commands;
///
/// assert_eq!(commands::query_graphics(129), b"QG129\r".to_vec());
/// ```
pub fn query_graphics(mode: u32) -> Vec<u8> {
    command(&format!("QG{}", mode))
}

// ============================================================================
// ACKNOWLEDGEMENT CODES
// ============================================================================

/// # Acknowledgement Code
///
/// The first character of the first response line.
///
/// | Code | Meaning |
/// |------|---------|
/// | `0` | No error, response follows |
/// | `1` | Syntax error |
/// | `2` | Execution error |
/// | `3` | Synchronization error |
/// | `4` | Communication error |
///
/// A non-zero code is not a link failure: the instrument simply has nothing
/// more to say, and the acknowledgement line itself is the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Success,
    SyntaxError,
    ExecutionError,
    SynchronizationError,
    CommunicationError,
    /// Any other leading byte (or an empty line, as `None`)
    Unknown(Option<u8>),
}

impl Ack {
    /// Classify an acknowledgement line by its first byte.
    pub fn from_token(token: &[u8]) -> Self {
        match token.first() {
            Some(b'0') => Self::Success,
            Some(b'1') => Self::SyntaxError,
            Some(b'2') => Self::ExecutionError,
            Some(b'3') => Self::SynchronizationError,
            Some(b'4') => Self::CommunicationError,
            other => Self::Unknown(other.copied()),
        }
    }

    /// Whether a response payload follows this acknowledgement.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "no error"),
            Self::SyntaxError => write!(f, "syntax error"),
            Self::ExecutionError => write!(f, "execution error"),
            Self::SynchronizationError => write!(f, "synchronization error"),
            Self::CommunicationError => write!(f, "communication error"),
            Self::Unknown(Some(byte)) => write!(f, "unknown acknowledge 0x{:02X}", byte),
            Self::Unknown(None) => write!(f, "empty acknowledge"),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify() {
        assert_eq!(identify(), b"ID\r".to_vec());
    }

    #[test]
    fn test_instrument_status() {
        assert_eq!(instrument_status(), vec![0x49, 0x53, 0x0D]);
    }

    #[test]
    fn test_query_graphics() {
        assert_eq!(query_graphics(129), b"QG129\r".to_vec());
        assert_eq!(query_graphics(2), b"QG2\r".to_vec());
        assert_eq!(query_graphics(0), b"QG0\r".to_vec());
    }

    #[test]
    fn test_ack_codes() {
        assert_eq!(Ack::from_token(b"0"), Ack::Success);
        assert_eq!(Ack::from_token(b"1"), Ack::SyntaxError);
        assert_eq!(Ack::from_token(b"2"), Ack::ExecutionError);
        assert_eq!(Ack::from_token(b"3"), Ack::SynchronizationError);
        assert_eq!(Ack::from_token(b"4"), Ack::CommunicationError);
    }

    #[test]
    fn test_ack_only_first_byte_counts() {
        assert_eq!(Ack::from_token(b"0 extra"), Ack::Success);
        assert_eq!(Ack::from_token(b"10"), Ack::SyntaxError);
    }

    #[test]
    fn test_ack_unknown() {
        assert_eq!(Ack::from_token(b"9"), Ack::Unknown(Some(b'9')));
        assert_eq!(Ack::from_token(b""), Ack::Unknown(None));
        assert!(!Ack::from_token(b"").is_success());
    }

    #[test]
    fn test_ack_display() {
        assert_eq!(Ack::SyntaxError.to_string(), "syntax error");
        assert_eq!(Ack::Unknown(Some(0x41)).to_string(), "unknown acknowledge 0x41");
    }
}
