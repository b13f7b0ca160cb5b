//! # Bit Image Decoder
//!
//! Replays a printer job into a [`Bitmap`], the way an Epson 8-pin printer
//! would lay it on paper: each bit-image command prints one 8-row strip
//! from the left margin, then the paper advances 8 rows.
//!
//! ```text
//! y = 0   ┌──────────────────────────┐  strip 0  (ESC * ... 240 columns)
//! y = 8   ├──────────────────────────┤  strip 1
//! y = 16  ├──────────────────────────┤  strip 2
//!   ...   │                          │
//! y = 232 └──────────────────────────┘  strip 29
//! ```
//!
//! The bit-image mode byte (single/double density) is recorded but does
//! not change how columns map to pixels. Line spacing and font commands
//! have no effect on the image.
//!
//! Decoding never fails. Dots that land outside the bitmap are dropped and
//! counted, and a truncated payload yields whatever was drawn before the
//! data ran out.

use crate::instrument::InstrumentConfig;

use super::bitmap::Bitmap;
use super::escape::{EscapeCommand, EscapeParser};

/// Rows advanced per bit-image command
pub const STRIP_HEIGHT: usize = 8;

/// What happened during a decode pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Bit-image commands processed
    pub strips: usize,
    /// Vertical cursor after the last strip
    pub cursor: usize,
    /// Dots that fell outside the bitmap
    pub dropped_pixels: usize,
    /// Plain text bytes ignored
    pub text_bytes: usize,
    /// Selectors of escapes that were skipped as unknown
    pub unrecognized: Vec<u8>,
    /// Offset of the escape sequence cut short by the end of the payload
    pub truncated_at: Option<usize>,
}

impl DecodeReport {
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated_at.is_some()
    }
}

/// # Escape Sequence Decoder
///
/// ## Example
///
/// ```
/// use scopeshot::raster::Decoder;
///
/// let payload = [0x1B, b'@', 0x1B, b'*', 0x00, 0x01, 0x00, 0xFF, 0x1B, b'A', 0x02];
/// let (bitmap, report) = Decoder::new(240, 240).decode_with_report(&payload);
///
/// assert!((0..8).all(|y| bitmap.get(0, y)));
/// assert_eq!(bitmap.count_set(), 8);
/// assert_eq!(report.cursor, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    width: usize,
    height: usize,
}

impl Decoder {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// A decoder sized for the instrument's screen.
    pub fn for_screen(config: &InstrumentConfig) -> Self {
        Self::new(config.width as usize, config.height as usize)
    }

    /// Decode a payload into a fresh bitmap.
    pub fn decode(&self, payload: &[u8]) -> Bitmap {
        self.decode_with_report(payload).0
    }

    /// Decode a payload into a fresh bitmap and describe the pass.
    pub fn decode_with_report(&self, payload: &[u8]) -> (Bitmap, DecodeReport) {
        let mut bitmap = Bitmap::new(self.width, self.height);
        let mut report = DecodeReport::default();
        let mut parser = EscapeParser::new(payload);

        for (offset, command) in parser.by_ref() {
            log::trace!("{:5}: {}", offset, command);

            match command {
                EscapeCommand::BitImage { mode, data, .. } => {
                    if report.strips == 0 {
                        log::debug!("Bit image mode {}", mode);
                    }
                    report.dropped_pixels += draw_strip(&mut bitmap, report.cursor, data);
                    report.cursor += STRIP_HEIGHT;
                    report.strips += 1;
                }
                EscapeCommand::Unrecognized(selector) => {
                    log::debug!("Skipping unknown escape 0x{:02X} at {}", selector, offset);
                    report.unrecognized.push(selector);
                }
                EscapeCommand::Reset
                | EscapeCommand::LineSpacing(_)
                | EscapeCommand::Pitch
                | EscapeCommand::FontFamily(_) => {}
            }
        }

        report.text_bytes = parser.text_bytes();
        report.truncated_at = parser.truncated_at();

        if let Some(offset) = report.truncated_at {
            log::warn!(
                "Payload ends inside the escape sequence at offset {}, image is partial",
                offset
            );
        }
        if report.dropped_pixels > 0 {
            log::warn!(
                "{} dots fell outside the {}x{} screen",
                report.dropped_pixels,
                self.width,
                self.height
            );
        }

        (bitmap, report)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::for_screen(&InstrumentConfig::SCOPEMETER_99)
    }
}

/// Decode a payload at the instrument's screen size.
pub fn decode(payload: &[u8], config: &InstrumentConfig) -> Bitmap {
    Decoder::for_screen(config).decode(payload)
}

/// Draw one 8-row strip starting at row `top`. Returns the number of dots
/// that fell outside the bitmap.
fn draw_strip(bitmap: &mut Bitmap, top: usize, columns: &[u8]) -> usize {
    let mut dropped = 0;

    for (x, &bits) in columns.iter().enumerate() {
        for row in 0..STRIP_HEIGHT {
            if bits & (0x80 >> row) != 0 && !bitmap.set(x, top + row) {
                dropped += 1;
            }
        }
    }

    dropped
}

// ============================================================================
// TESTS
// ============================================================================
