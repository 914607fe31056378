//! Edge-map rendering to PNG

use crate::error::{Result, TamperError};
use crate::types::RasterImage;
use std::path::Path;

/// Encode a raster as PNG at `path`
pub fn write_png(raster: &RasterImage, path: &Path) -> Result<()> {
    let buffer = image::RgbaImage::from_raw(raster.width(), raster.height(), raster.pixels().to_vec())
        .ok_or_else(|| TamperError::OutputError {
            path: path.to_path_buf(),
            reason: "raster buffer does not match its dimensions".to_string(),
        })?;

    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| TamperError::OutputError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_png_round_trips_pixels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("edges.png");
        let mut pixels = Vec::new();
        for v in 0..12u8 {
            pixels.extend_from_slice(&[v * 20, v * 20, v * 20, 255]);
        }
        let raster = RasterImage::new(4, 3, pixels).unwrap();

        write_png(&raster, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.into_raw(), raster.pixels());
    }

    #[test]
    fn test_missing_directory_is_output_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("edges.png");
        let err = write_png(&RasterImage::blank(3, 3), &path).unwrap_err();
        assert!(!err.is_recoverable());
    }
}
