//! # Error Types
//!
//! This module defines error types used throughout the scopeshot library.
//!
//! Everything in here is fatal to a session. Protocol anomalies the
//! instrument link is expected to produce now and then (a bad checksum, a
//! non-zero ack code, a truncated escape sequence) are *not* errors: they
//! are reported through flags on the returned values and through the log.

use thiserror::Error;

/// Main error type for scopeshot operations
#[derive(Debug, Error)]
pub enum ScopeshotError {
    /// Opening or configuring the serial device failed
    #[error("Channel error: {0}")]
    Channel(String),

    /// The instrument stopped sending mid-response
    #[error("Timed out waiting for the instrument ({idle_reads} empty reads)")]
    Timeout { idle_reads: u32 },

    /// A response token grew past the configured cap without a delimiter
    #[error("Response token exceeded {limit} bytes without a delimiter")]
    TokenOverflow { limit: usize },

    /// The graphics length field was not a usable byte count
    #[error("Invalid payload length: {0}")]
    InvalidLength(String),

    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
