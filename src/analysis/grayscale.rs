//! Luminosity grayscale conversion shared by the edge and spectral analyzers

use crate::types::{RasterImage, RGBA_CHANNELS};

/// ITU-R BT.601 luma weights
pub const LUMA_RED: f64 = 0.299;
pub const LUMA_GREEN: f64 = 0.587;
pub const LUMA_BLUE: f64 = 0.114;

/// Convert an RGBA8 raster to one luminosity byte per pixel, row-major
///
/// Alpha is ignored. Each value is rounded to nearest and clamped to [0, 255].
pub fn to_grayscale(raster: &RasterImage) -> Vec<u8> {
    raster
        .pixels()
        .chunks_exact(RGBA_CHANNELS)
        .map(|px| luminosity(px[0], px[1], px[2]))
        .collect()
}

/// Weighted luminosity of one RGB triple
#[inline]
pub fn luminosity(r: u8, g: u8, b: u8) -> u8 {
    let y = LUMA_RED * r as f64 + LUMA_GREEN * g as f64 + LUMA_BLUE * b as f64;
    y.round().clamp(0.0, 255.0) as u8
}
