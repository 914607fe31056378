//! Image decoding using the `image` crate
//!
//! Decodes any supported container into an RGBA8 [`RasterImage`]. The raw
//! file bytes are returned alongside so the metadata inspector can read the
//! embedded tags from the original stream.

use crate::error::{ErrorContext, Result, TamperError};
use crate::types::RasterImage;
use std::path::Path;
use tracing::debug;

/// Maximum file size we'll attempt to decode (512 MB)
/// Prevents OOM on extremely large files
const MAX_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// A decoded image and the bytes it was decoded from
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub raster: RasterImage,
    pub file_bytes: Vec<u8>,
}

/// Read and decode an image file
pub fn decode(path: &Path) -> Result<DecodedImage> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        TamperError::decode_error(path, format!("Failed to read file metadata: {}", e))
    })?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(TamperError::decode_error(
            path,
            format!(
                "File too large ({:.1} MB). Maximum supported size is 512 MB.",
                metadata.len() as f64 / (1024.0 * 1024.0)
            ),
        ));
    }

    let file_bytes = std::fs::read(path)
        .map_err(|e| TamperError::decode_error(path, format!("Failed to open file: {}", e)))?;

    let raster = decode_bytes(path, &file_bytes)?;

    Ok(DecodedImage { raster, file_bytes })
}

/// Decode an in-memory image; `path` is only used for error context
pub fn decode_bytes(path: &Path, bytes: &[u8]) -> Result<RasterImage> {
    if bytes.is_empty() {
        return Err(TamperError::decode_error(path, "File is empty"));
    }

    let dynamic = image::load_from_memory(bytes).with_file_context(path)?;

    let rgba = dynamic.to_rgba8();
    let (width, height) = rgba.dimensions();

    debug!("Decoded {}: {}x{}", path.display(), width, height);

    RasterImage::new(width, height, rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png_to_rgba() {
        let bytes = png_bytes(5, 3, [10, 20, 30, 255]);
        let raster = decode_bytes(Path::new("mem.png"), &bytes).unwrap();
        assert_eq!(raster.width(), 5);
        assert_eq!(raster.height(), 3);
        assert_eq!(&raster.pixels()[..4], &[10, 20, 30, 255]);
        assert_eq!(raster.pixels().len(), 5 * 3 * 4);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_bytes(Path::new("bad.jpg"), b"definitely not an image").unwrap_err();
        assert!(matches!(err, TamperError::DecodeError { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_empty_is_decode_error() {
        let err = decode_bytes(Path::new("empty.png"), &[]).unwrap_err();
        assert!(matches!(err, TamperError::DecodeError { .. }));
    }
}
