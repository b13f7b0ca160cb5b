//! # Monochrome Bitmap
//!
//! A fixed-size 1-bit frame buffer, packed the same way PBM and most
//! printer raster formats pack pixels:
//!
//! ```text
//! Row y:  byte 0           byte 1           ...   byte stride-1
//!         b7 b6 ... b0     b7 b6 ... b0
//!         x=0      x=7     x=8     x=15
//! ```
//!
//! Bit 7 (MSB) of each byte is the leftmost pixel. Rows are `stride` bytes
//! apart; when the width is not a multiple of 8 the low bits of the last
//! byte in each row are padding and stay zero.

use crate::instrument::InstrumentConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap with every pixel unset.
    pub fn new(width: usize, height: usize) -> Self {
        let stride = width.div_ceil(8);
        Self {
            width,
            height,
            stride,
            data: vec![0; stride * height],
        }
    }

    /// A blank bitmap the size of the instrument's screen.
    pub fn for_screen(config: &InstrumentConfig) -> Self {
        Self::new(config.width as usize, config.height as usize)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes per packed row
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Set a pixel.
    ///
    /// Returns `false` (and changes nothing) if `(x, y)` is outside the bitmap.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.stride + x / 8] |= 0x80 >> (x % 8);
        true
    }

    /// Read a pixel. Anything outside the bitmap reads as unset.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.stride + x / 8] & (0x80 >> (x % 8)) != 0
    }

    /// Unset every pixel.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// One packed row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.stride..(y + 1) * self.stride]
    }

    /// All rows, packed, top to bottom.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.data.iter().map(|b| b.count_ones() as usize).sum()
    }
}
