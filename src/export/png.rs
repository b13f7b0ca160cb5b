//! # PNG Preview
//!
//! Renders the bitmap black-on-white for viewers that don't open PBM.

use std::path::Path;

use image::{GrayImage, Luma};

use crate::error::ScopeshotError;
use crate::raster::Bitmap;

/// Convert to an 8-bit grayscale image: set pixels black, the rest white.
pub fn to_image(bitmap: &Bitmap) -> GrayImage {
    GrayImage::from_fn(bitmap.width() as u32, bitmap.height() as u32, |x, y| {
        if bitmap.get(x as usize, y as usize) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// Save the bitmap as a PNG.
pub fn save<P: AsRef<Path>>(path: P, bitmap: &Bitmap) -> Result<(), ScopeshotError> {
    let path = path.as_ref();
    to_image(bitmap)
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| ScopeshotError::Image(format!("Failed to save PNG: {}", e)))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_image_colors() {
        let mut bitmap = Bitmap::new(4, 2);
        bitmap.set(1, 1);

        let img = to_image(&bitmap);
        assert_eq!(img.dimensions(), (4, 2));
        assert_eq!(img.get_pixel(1, 1), &Luma([0]));
        assert_eq!(img.get_pixel(0, 0), &Luma([255]));
    }

    #[test]
    fn test_save_png() {
        let path = std::env::temp_dir().join(format!("scopeshot-preview-{}.png", std::process::id()));
        let mut bitmap = Bitmap::new(8, 8);
        bitmap.set(2, 3);

        save(&path, &bitmap).unwrap();
        let reloaded = image::open(&path).unwrap().to_luma8();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded, to_image(&bitmap));
    }
}
