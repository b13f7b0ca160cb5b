//! # Export Module
//!
//! Writes decoded screens and raw payloads to disk.
//!
//! ## Modules
//!
//! - [`pbm`]: Binary PBM (P4), the canonical output
//! - [`png`]: PNG preview via the `image` crate
//! - [`dump`]: Raw graphics payload, for replaying with `scopeshot decode`

pub mod dump;
pub mod pbm;
pub mod png;

/// Creator string written into image headers
pub const CREATOR: &str = concat!("scopeshot ", env!("CARGO_PKG_VERSION"));
