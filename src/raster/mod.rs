//! # Raster Module
//!
//! This module turns the ScopeMeter's graphics payload into a bitmap.
//!
//! ## Modules
//!
//! - [`escape`]: Epson escape sequence parser
//! - [`decode`]: Replays bit-image strips into a bitmap
//! - [`bitmap`]: Packed 1-bit frame buffer
//!
//! ## Usage Example
//!
//! ```
//! use scopeshot::instrument::InstrumentConfig;
//! use scopeshot::raster;
//!
//! let payload = [0x1B, b'*', 0x00, 0x02, 0x00, 0x80, 0x01];
//! let bitmap = raster::decode(&payload, &InstrumentConfig::SCOPEMETER_99);
//!
//! assert!(bitmap.get(0, 0));
//! assert!(bitmap.get(1, 7));
//! ```

pub mod bitmap;
pub mod decode;
pub mod escape;

pub use bitmap::Bitmap;
pub use decode::{DecodeReport, Decoder, decode};
pub use escape::{EscapeCommand, EscapeParser};
