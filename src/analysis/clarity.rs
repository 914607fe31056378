//! Perceptual clarity: local noise and Laplacian sharpness
//!
//! Both estimators work on channel-averaged brightness `(R + G + B) / 3` over
//! interior pixels only. A raster without interior pixels has zero noise and
//! zero sharpness.

use crate::analysis::traits::ClarityEstimator;
use crate::types::{ClarityResult, RasterImage, RGBA_CHANNELS};
use tracing::debug;

/// RMS neighbour deviation that saturates the noise estimate
pub const NOISE_SCALE: f64 = 50.0;

/// Mean absolute Laplacian that saturates the sharpness estimate
pub const SHARPNESS_SCALE: f64 = 100.0;

/// Weight of the noise penalty in the clarity score
pub const NOISE_WEIGHT: f64 = 0.6;

/// Weight of the blur penalty in the clarity score
pub const BLUR_WEIGHT: f64 = 0.4;

/// Clarity estimator combining neighbourhood noise and Laplacian sharpness
pub struct LaplacianClarityEstimator;

impl LaplacianClarityEstimator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LaplacianClarityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ClarityEstimator for LaplacianClarityEstimator {
    fn estimate(&self, raster: &RasterImage) -> ClarityResult {
        if !raster.has_interior() {
            debug!(
                "Clarity: {}x{} has no interior pixels",
                raster.width(),
                raster.height()
            );
        }

        let brightness = Brightness::new(raster);
        let noise_level = noise_level(&brightness);
        let sharpness = sharpness(&brightness);
        let clarity_score = clarity_score(noise_level, sharpness);

        debug!(
            "Clarity: noise={:.4} sharpness={:.4} score={:.4}",
            noise_level, sharpness, clarity_score
        );

        ClarityResult {
            clarity_score,
            noise_level,
            sharpness,
        }
    }

    fn name(&self) -> &'static str {
        "laplacian"
    }
}

/// `max(0, 1 - noise*0.6 - (1 - sharpness)*0.4)`
pub fn clarity_score(noise_level: f64, sharpness: f64) -> f64 {
    (1.0 - noise_level * NOISE_WEIGHT - (1.0 - sharpness) * BLUR_WEIGHT).max(0.0)
}

/// Channel-averaged brightness view over an RGBA raster
struct Brightness<'a> {
    pixels: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> Brightness<'a> {
    fn new(raster: &'a RasterImage) -> Self {
        Self {
            pixels: raster.pixels(),
            width: raster.width() as usize,
            height: raster.height() as usize,
        }
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> f64 {
        let i = (y * self.width + x) * RGBA_CHANNELS;
        (self.pixels[i] as f64 + self.pixels[i + 1] as f64 + self.pixels[i + 2] as f64) / 3.0
    }

    /// Interior coordinates, row-major
    fn interior(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (w, h) = (self.width, self.height);
        (1..h.saturating_sub(1)).flat_map(move |y| (1..w.saturating_sub(1)).map(move |x| (x, y)))
    }
}

/// RMS difference between each pixel and the mean of its 8 neighbours, scaled
fn noise_level(img: &Brightness<'_>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;

    for (x, y) in img.interior() {
        let center = img.at(x, y);
        let mut surrounding = 0.0;
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if nx == x && ny == y {
                    continue;
                }
                surrounding += img.at(nx, ny);
            }
        }
        let diff = center - surrounding / 8.0;
        sum += diff * diff;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }
    ((sum / count as f64).sqrt() / NOISE_SCALE).min(1.0)
}

/// Mean absolute 4-neighbour Laplacian, scaled
fn sharpness(img: &Brightness<'_>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;

    for (x, y) in img.interior() {
        let laplacian = 4.0 * img.at(x, y)
            - img.at(x, y - 1)
            - img.at(x - 1, y)
            - img.at(x + 1, y)
            - img.at(x, y + 1);
        sum += laplacian.abs();
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }
    (sum / count as f64 / SHARPNESS_SCALE).min(1.0)
}
