//! # Instrument Configuration
//!
//! This module defines the link parameters and screen geometry of the
//! supported instrument.
//!
//! ## Supported Instruments
//!
//! | Model | Screen | Baud | Read timeout |
//! |-------|--------|------|--------------|
//! | Fluke ScopeMeter 99 | 240 x 240 | 1200 | 1.0 s |
//!
//! ## Usage
//!
//! ```
//! use scopeshot::instrument::InstrumentConfig;
//!
//! let config = InstrumentConfig::SCOPEMETER_99;
//! println!("Screen: {}x{} ({} bytes per row)",
//!          config.width,
//!          config.height,
//!          config.stride());
//! ```
//!
//! ## JSON Overrides
//!
//! A config file only needs the fields that differ from the reference
//! instrument; everything else falls back to [`InstrumentConfig::SCOPEMETER_99`].
//!
//! ```json
//! { "baud_rate": 9600, "read_timeout_ms": 2500 }
//! ```

use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScopeshotError;

/// # Instrument Configuration
///
/// ## Screen
///
/// - **width** / **height**: Bitmap dimensions in pixels
///
/// ## Link
///
/// - **baud_rate**: Serial speed, 8N1, no handshaking
/// - **read_timeout_ms**: How long one read waits for a byte (VTIME)
/// - **idle_reads**: Consecutive empty reads before a response is abandoned
///
/// ## Limits
///
/// - **max_token_len**: Longest CR/comma-terminated token accepted
/// - **max_payload**: Largest graphics block accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Instrument model name
    pub name: Cow<'static, str>,

    /// Screen width in pixels
    pub width: u16,

    /// Screen height in pixels
    pub height: u16,

    /// Serial line speed
    pub baud_rate: u32,

    /// Per-read timeout in milliseconds
    pub read_timeout_ms: u32,

    /// Empty reads tolerated before giving up on a response
    pub idle_reads: u32,

    /// Maximum length of a delimited response token
    pub max_token_len: usize,

    /// Maximum length of a graphics payload
    pub max_payload: usize,
}

impl InstrumentConfig {
    /// # Fluke ScopeMeter 99
    ///
    /// 240 x 240 monochrome LCD, optically isolated RS-232 adapter.
    ///
    /// The instrument powers up at 1200 baud. The graphics dump for the
    /// full screen (`QG129`) is a few kilobytes, so a capture takes the
    /// better part of a minute.
    pub const SCOPEMETER_99: Self = Self {
        name: Cow::Borrowed("Fluke ScopeMeter 99"),
        width: 240,
        height: 240,
        baud_rate: 1200,
        read_timeout_ms: 1000,
        idle_reads: 10,
        max_token_len: 64,
        max_payload: 8192,
    };

    /// Bytes per packed bitmap row
    #[inline]
    pub fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    #[inline]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms as u64)
    }

    /// Per-read timeout in termios VTIME units (tenths of a second).
    ///
    /// VTIME is a single byte, and zero would turn reads into polls, so the
    /// result is clamped to `1..=255`.
    pub fn vtime(&self) -> u8 {
        (self.read_timeout_ms.div_ceil(100)).clamp(1, 255) as u8
    }

    /// Parse a JSON config, filling missing fields from the reference instrument.
    pub fn from_json(text: &str) -> Result<Self, ScopeshotError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ScopeshotError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScopeshotError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ScopeshotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), ScopeshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(ScopeshotError::Config(format!(
                "Screen size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.idle_reads == 0 {
            return Err(ScopeshotError::Config(
                "idle_reads must be at least 1".to_string(),
            ));
        }
        if self.max_token_len == 0 {
            return Err(ScopeshotError::Config(
                "max_token_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self::SCOPEMETER_99
    }
}
