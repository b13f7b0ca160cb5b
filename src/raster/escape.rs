//! # Epson Escape Sequence Parser
//!
//! The ScopeMeter renders its screen for an Epson-compatible dot-matrix
//! printer. The graphics payload is a printer job: a handful of setup
//! commands and one bit-image command per 8-row strip.
//!
//! ## Recognized Commands
//!
//! | Command | Bytes | Operands |
//! |---------|-------|----------|
//! | Reset | `ESC @` | none |
//! | Bit image | `ESC * m nL nH d1...dn` | mode, column count, `n` column bytes |
//! | Line spacing | `ESC A n` | 1 |
//! | 12-pitch | `ESC M` | none |
//! | Font family | `ESC k n` | 1 |
//!
//! Any other selector is taken as a command without operands. Bytes
//! outside an escape sequence are plain text.
//!
//! ## Bit Image Columns
//!
//! Each column byte is 8 vertical dots, MSB on top:
//!
//! ```text
//! byte 0b10110000
//!
//!   bit 7  █   row y+0
//!   bit 6  ░   row y+1
//!   bit 5  █   row y+2
//!   bit 4  █   row y+3
//!   bit 3  ░   ...
//!   bit 2  ░
//!   bit 1  ░
//!   bit 0  ░   row y+7
//! ```
//!
//! The column count is little-endian: `n = nL + nH * 256`.
//!
//! ## Truncation
//!
//! The payload can end in the middle of a command. The parser never reads
//! past the end: a bit image yields the columns that are present, anything
//! else is dropped, and iteration stops with [`EscapeParser::truncated_at`]
//! pointing at the incomplete escape.

use std::fmt;

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// One parsed escape command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeCommand<'a> {
    /// `ESC @`
    Reset,
    /// `ESC * m nL nH d1...dn`
    ///
    /// `data` is shorter than `columns` only when the payload was truncated.
    BitImage {
        mode: u8,
        columns: u16,
        data: &'a [u8],
    },
    /// `ESC A n`
    LineSpacing(u8),
    /// `ESC M`
    Pitch,
    /// `ESC k n`
    FontFamily(u8),
    /// `ESC` followed by a selector without a known meaning
    Unrecognized(u8),
}

impl fmt::Display for EscapeCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => write!(f, "ESC @ (reset)"),
            Self::BitImage {
                mode,
                columns,
                data,
            } => {
                write!(f, "ESC * mode {} columns {}", mode, columns)?;
                if data.len() < *columns as usize {
                    write!(f, " (only {} present)", data.len())?;
                }
                Ok(())
            }
            Self::LineSpacing(n) => write!(f, "ESC A {} (line spacing)", n),
            Self::Pitch => write!(f, "ESC M (12-pitch)"),
            Self::FontFamily(n) => write!(f, "ESC k {} (font family)", n),
            Self::Unrecognized(sel) => write!(f, "ESC 0x{:02X} (unrecognized)", sel),
        }
    }
}

/// Iterator over the escape commands in a payload.
///
/// Yields `(offset, command)`, where `offset` is the position of the ESC byte.
///
/// ## Example
///
/// ```
/// use scopeshot::raster::escape::{EscapeCommand, EscapeParser};
///
/// let payload = [0x1B, b'@', b'h', b'i', 0x1B, b'A', 0x02];
/// let commands: Vec<_> = EscapeParser::new(&payload).collect();
///
/// assert_eq!(commands, vec![
///     (0, EscapeCommand::Reset),
///     (4, EscapeCommand::LineSpacing(2)),
/// ]);
/// ```
#[derive(Debug, Clone)]
pub struct EscapeParser<'a> {
    payload: &'a [u8],
    pos: usize,
    text_bytes: usize,
    truncated_at: Option<usize>,
}

impl<'a> EscapeParser<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            payload,
            pos: 0,
            text_bytes: 0,
            truncated_at: None,
        }
    }

    /// Offset of the escape sequence that ran off the end of the payload.
    pub fn truncated_at(&self) -> Option<usize> {
        self.truncated_at
    }

    /// Plain text bytes skipped so far.
    pub fn text_bytes(&self) -> usize {
        self.text_bytes
    }

    /// Take `n` operand bytes, or mark the escape at `start` as truncated.
    fn operands(&mut self, start: usize, n: usize) -> Option<&'a [u8]> {
        let payload = self.payload;
        match payload.get(self.pos..self.pos + n) {
            Some(bytes) => {
                self.pos += n;
                Some(bytes)
            }
            None => self.truncate(start),
        }
    }

    fn truncate<T>(&mut self, start: usize) -> Option<T> {
        self.truncated_at = Some(start);
        self.pos = self.payload.len();
        None
    }
}

impl<'a> Iterator for EscapeParser<'a> {
    type Item = (usize, EscapeCommand<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let payload = self.payload;

        // Skip plain text
        while self.pos < payload.len() && payload[self.pos] != ESC {
            self.pos += 1;
            self.text_bytes += 1;
        }

        let start = self.pos;
        if start >= payload.len() {
            return None;
        }

        let Some(&selector) = payload.get(start + 1) else {
            return self.truncate(start);
        };
        self.pos = start + 2;

        let command = match selector {
            b'@' => EscapeCommand::Reset,
            b'*' => {
                let header = self.operands(start, 3)?;
                let mode = header[0];
                let columns = u16::from_le_bytes([header[1], header[2]]);

                let end = (self.pos + columns as usize).min(payload.len());
                let data = &payload[self.pos..end];
                self.pos = end;

                if data.len() < columns as usize {
                    self.truncated_at = Some(start);
                    self.pos = payload.len();
                }

                EscapeCommand::BitImage {
                    mode,
                    columns,
                    data,
                }
            }
            b'A' => EscapeCommand::LineSpacing(self.operands(start, 1)?[0]),
            b'M' => EscapeCommand::Pitch,
            b'k' => EscapeCommand::FontFamily(self.operands(start, 1)?[0]),
            other => EscapeCommand::Unrecognized(other),
        };

        Some((start, command))
    }
}

// ============================================================================
// TESTS
// ============================================================================
