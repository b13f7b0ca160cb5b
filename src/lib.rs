//! # Scopeshot - ScopeMeter Screen Capture
//!
//! Scopeshot is a Rust library for pulling screen images off a Fluke
//! ScopeMeter 99 over its RS-232 remote interface. It provides:
//!
//! - **Transport**: Raw-mode serial port access, plus a scripted channel for tests
//! - **Protocol**: Command transactions, delimited reads, checksummed blocks
//! - **Raster**: Epson bit-image escape decoding into a 1-bit bitmap
//! - **Export**: PBM (P4), PNG preview, and raw payload dumps
//!
//! ## Quick Start
//!
//! ```no_run
//! use scopeshot::{
//!     export::pbm,
//!     instrument::InstrumentConfig,
//!     protocol::ScopeMeter,
//!     raster::Decoder,
//!     transport::SerialTransport,
//! };
//!
//! let config = InstrumentConfig::SCOPEMETER_99;
//!
//! // Open the serial port at 1200 baud
//! let transport = SerialTransport::open("/dev/ttyUSB0", &config)?;
//! let mut scope = ScopeMeter::new(transport, &config);
//!
//! // Ask for the screen as an Epson printer job
//! let reply = scope.query_graphics(129)?;
//!
//! if let Some(block) = reply.payload {
//!     if !block.is_valid() {
//!         eprintln!("checksum mismatch, decoding anyway");
//!     }
//!     let bitmap = Decoder::for_screen(&config).decode(&block.data);
//!     pbm::save("QG129.pbm", &bitmap, "scopeshot")?;
//! }
//!
//! # Ok::<(), scopeshot::error::ScopeshotError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transport`] | Byte channels |
//! | [`protocol`] | ScopeMeter remote commands |
//! | [`raster`] | Escape decoding and bitmaps |
//! | [`export`] | Image and dump writers |
//! | [`instrument`] | Instrument configuration |
//! | [`error`] | Error types |

pub mod error;
pub mod export;
pub mod instrument;
pub mod protocol;
pub mod raster;
pub mod transport;

// Re-exports for convenience
pub use error::ScopeshotError;
pub use instrument::InstrumentConfig;
pub use protocol::ScopeMeter;
pub use raster::{Bitmap, Decoder};
