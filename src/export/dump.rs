//! # Raw Payload Dump
//!
//! The graphics payload is saved exactly as received, whether or not its
//! checksum matched, so a bad capture can be inspected or re-decoded later
//! without another minute-long transfer.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScopeshotError;

/// Default dump file name for a graphics mode, e.g. `QG129.bin`.
pub fn default_path(mode: u32) -> PathBuf {
    PathBuf::from(format!("QG{}.bin", mode))
}

/// Write the payload bytes verbatim.
pub fn save<P: AsRef<Path>>(path: P, payload: &[u8]) -> Result<(), ScopeshotError> {
    fs::write(path.as_ref(), payload)?;
    log::info!("Wrote {} ({} bytes)", path.as_ref().display(), payload.len());
    Ok(())
}

/// Read a dump back.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, ScopeshotError> {
    Ok(fs::read(path)?)
}
