//! # PBM Writer
//!
//! Binary portable bitmap (`P4`):
//!
//! ```text
//! P4
//! # CREATOR: scopeshot 0.1.0
//! 240 240
//! <height × ceil(width / 8) bytes of packed rows>
//! ```
//!
//! PBM uses the same packing as [`Bitmap`]: MSB leftmost, 1 = black, each
//! row padded to a whole byte. The rows are written out verbatim.

use std::fs;
use std::path::Path;

use crate::error::ScopeshotError;
use crate::raster::Bitmap;

/// Encode a bitmap as a P4 file.
///
/// ## Example
///
/// ```
/// use scopeshot::export::pbm;
/// use scopeshot::raster::Bitmap;
///
/// let mut bitmap = Bitmap::new(8, 1);
/// bitmap.set(0, 0);
///
/// let file = pbm::encode(&bitmap, "test");
/// assert_eq!(file, b"P4\n# CREATOR: test\n8 1\n\x80".to_vec());
/// ```
pub fn encode(bitmap: &Bitmap, creator: &str) -> Vec<u8> {
    let header = format!(
        "P4\n# CREATOR: {}\n{} {}\n",
        creator,
        bitmap.width(),
        bitmap.height()
    );

    let mut out = Vec::with_capacity(header.len() + bitmap.as_bytes().len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(bitmap.as_bytes());
    out
}

/// Write a bitmap to `path` as a P4 file.
pub fn save<P: AsRef<Path>>(path: P, bitmap: &Bitmap, creator: &str) -> Result<(), ScopeshotError> {
    fs::write(path.as_ref(), encode(bitmap, creator))?;
    log::info!("Wrote {}", path.as_ref().display());
    Ok(())
}
