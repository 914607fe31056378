//! Sobel gradient edge analysis
//!
//! Edge-map variance is a proxy for edge consistency: spliced regions tend to
//! carry gradient statistics that differ from the rest of the frame, which
//! widens the magnitude distribution.

use crate::analysis::grayscale::to_grayscale;
use crate::analysis::traits::EdgeDetector;
use crate::types::{EdgeResult, RasterImage, RGBA_CHANNELS};
use tracing::debug;

/// Empirical scale that maps gradient-magnitude variance onto [0, 1]
pub const EDGE_VARIANCE_SCALE: f64 = 5000.0;

/// Largest magnitude written to the edge map
const MAX_MAGNITUDE: f64 = 255.0;

/// Horizontal Sobel kernel, row-major
pub const SOBEL_X: [i32; 9] = [-1, 0, 1, -2, 0, 2, -1, 0, 1];

/// Vertical Sobel kernel, row-major
pub const SOBEL_Y: [i32; 9] = [-1, -2, -1, 0, 0, 0, 1, 2, 1];

/// Edge detector using 3x3 Sobel kernels on the luminosity channel
pub struct SobelEdgeDetector;

impl SobelEdgeDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SobelEdgeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeDetector for SobelEdgeDetector {
    fn detect(&self, raster: &RasterImage) -> EdgeResult {
        let width = raster.width() as usize;
        let height = raster.height() as usize;
        let gray = to_grayscale(raster);

        let mut edge_pixels = vec![0u8; raster.pixels().len()];
        let interior = width.saturating_sub(2) * height.saturating_sub(2);
        let mut edge_intensities = Vec::with_capacity(interior);

        for y in 1..height.saturating_sub(1) {
            for x in 1..width.saturating_sub(1) {
                let mut gx = 0i32;
                let mut gy = 0i32;
                for ky in 0..3 {
                    for kx in 0..3 {
                        let v = gray[(y + ky - 1) * width + (x + kx - 1)] as i32;
                        gx += SOBEL_X[ky * 3 + kx] * v;
                        gy += SOBEL_Y[ky * 3 + kx] * v;
                    }
                }

                let magnitude = (((gx * gx + gy * gy) as f64).sqrt().round()).min(MAX_MAGNITUDE) as u8;
                edge_intensities.push(magnitude as u32);

                let out = (y * width + x) * RGBA_CHANNELS;
                edge_pixels[out] = magnitude;
                edge_pixels[out + 1] = magnitude;
                edge_pixels[out + 2] = magnitude;
                edge_pixels[out + 3] = u8::MAX;
            }
        }

        let edge_variance = normalized_variance(&edge_intensities);

        debug!(
            "Sobel: {} interior pixels, normalized variance {:.4}",
            edge_intensities.len(),
            edge_variance
        );

        let edge_map = RasterImage::from_validated(raster.width(), raster.height(), edge_pixels);

        EdgeResult {
            edge_variance,
            edge_map,
            edge_intensities,
        }
    }

    fn name(&self) -> &'static str {
        "sobel"
    }
}

/// Population variance of the magnitudes divided by `EDGE_VARIANCE_SCALE`, capped at 1
///
/// An empty sequence (no interior pixels) scores 0.
pub fn normalized_variance(intensities: &[u32]) -> f64 {
    if intensities.is_empty() {
        return 0.0;
    }

    let count = intensities.len() as f64;
    let mean = intensities.iter().map(|&v| v as f64).sum::<f64>() / count;
    let variance = intensities
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count;

    (variance / EDGE_VARIANCE_SCALE).min(1.0)
}
