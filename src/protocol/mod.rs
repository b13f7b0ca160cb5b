//! # ScopeMeter Remote Protocol
//!
//! This module implements the host side of the ScopeMeter's RS-232 remote
//! control protocol.
//!
//! ## Module Structure
//!
//! - [`commands`]: Command mnemonics and acknowledgement codes
//! - [`link`]: Delimited and checksummed reads over a byte channel
//! - [`session`]: Complete command transactions
//!
//! ## Usage Example
//!
//! ```
//! use scopeshot::instrument::InstrumentConfig;
//! use scopeshot::protocol::ScopeMeter;
//! use scopeshot::transport::MockChannel;
//!
//! // Ack, status word, ack, then a one-byte graphics block and its checksum
//! let channel = MockChannel::new(b"0\r0\r0\r1,\x00\x00");
//! let mut scope = ScopeMeter::new(channel, &InstrumentConfig::SCOPEMETER_99);
//!
//! let status = scope.instrument_status()?;
//! assert_eq!(status.payload.map(|s| s.value), Some(0));
//!
//! let graphics = scope.query_graphics(129)?;
//! assert!(graphics.payload.unwrap().is_valid());
//! # Ok::<(), scopeshot::error::ScopeshotError>(())
//! ```

pub mod commands;
pub mod link;
pub mod session;

pub use commands::Ack;
pub use link::{Block, Link};
pub use session::{Reply, ScopeMeter, Status};
