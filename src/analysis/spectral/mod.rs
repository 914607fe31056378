//! Frequency-band energy analysis
//!
//! The grayscale raster is flattened row-major into one real signal, run
//! through the butterfly transform in [`fft`], and the first half of the
//! magnitude spectrum is split into low/mid/high bands.
//!
//! # Band boundaries
//!
//! With `N` bins and `half = N / 2`:
//!
//! - **low**: `[0, max(1, half/4))`
//! - **mid**: `[max(1, half/4), max(1, half/2))`
//! - **high**: `[max(1, half/2), half)`
//!
//! # Heuristic
//!
//! Natural photographs are dominated by low and mid frequencies.
//! Recompression and splicing tend to inject high-frequency energy or
//! flatten the mid band. Neither condition proves tampering.

pub mod fft;

use crate::analysis::grayscale::to_grayscale;
use crate::analysis::traits::SpectralAnalyzer;
use crate::types::{RasterImage, SpectralResult};
use tracing::debug;

/// Divisor mapping the (low+mid)/high ratio onto [0, 1]
pub const SPECTRUM_SCORE_SCALE: f64 = 10.0;

/// High band above this multiple of the low band is a spike
pub const HIGH_SPIKE_RATIO: f64 = 2.0;

/// Mid band below this fraction of the low band is oversmoothed
pub const MID_DIP_RATIO: f64 = 0.5;

/// Mean magnitude of each spectral band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandEnergies {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl BandEnergies {
    /// Split the first half of `magnitudes` into bands and average each
    pub fn from_magnitudes(magnitudes: &[f64]) -> Self {
        let half = magnitudes.len() / 2;
        let quarter_end = (half / 4).max(1).min(magnitudes.len());
        let half_end = (half / 2).max(1).min(magnitudes.len());

        let low = band_mean(magnitudes, 0, quarter_end);
        let mid = band_mean(magnitudes, quarter_end, half_end);
        let high = band_mean(magnitudes, half_end, half);

        Self { low, mid, high }
    }

    /// `clamp((low + mid) / max(1, high) / 10, 0, 1)`
    pub fn score(&self) -> f64 {
        ((self.low + self.mid) / self.high.max(1.0) / SPECTRUM_SCORE_SCALE).clamp(0.0, 1.0)
    }

    /// High-frequency spike or mid-frequency dip relative to the low band
    pub fn is_suspicious(&self) -> bool {
        self.high > HIGH_SPIKE_RATIO * self.low || self.mid < MID_DIP_RATIO * self.low
    }
}

/// Mean of `values[start..end]`; an empty or inverted range averages to 0
fn band_mean(values: &[f64], start: usize, end: usize) -> f64 {
    if start >= end {
        return 0.0;
    }
    let band = &values[start..end];
    band.iter().sum::<f64>() / band.len() as f64
}

/// True when every bin except DC is zero
fn has_no_ac_energy(magnitudes: &[f64]) -> bool {
    magnitudes.iter().skip(1).all(|&m| m == 0.0)
}

/// Spectral analyzer using the in-crate radix-2 transform
pub struct FftSpectralAnalyzer;

impl FftSpectralAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FftSpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralAnalyzer for FftSpectralAnalyzer {
    fn analyze(&self, raster: &RasterImage) -> SpectralResult {
        if raster.is_empty() {
            debug!("Spectral: empty raster, returning neutral result");
            return SpectralResult::neutral();
        }

        let signal: Vec<f64> = to_grayscale(raster).into_iter().map(f64::from).collect();
        let magnitude_spectrum = fft::transform(&signal).magnitudes();

        let bands = BandEnergies::from_magnitudes(&magnitude_spectrum);
        let spectrum_score = bands.score();
        // a spectrum with nothing but DC has no pattern to flag
        let suspicious_patterns = !has_no_ac_energy(&magnitude_spectrum) && bands.is_suspicious();

        debug!(
            "Spectral: N={} low={:.2} mid={:.2} high={:.2} score={:.3} suspicious={}",
            magnitude_spectrum.len(),
            bands.low,
            bands.mid,
            bands.high,
            spectrum_score,
            suspicious_patterns
        );

        SpectralResult {
            spectrum_score,
            magnitude_spectrum,
            suspicious_patterns,
        }
    }

    fn name(&self) -> &'static str {
        "radix2-fft"
    }
}

/// Stand-in used when spectral analysis is disabled
///
/// Always returns `{score: 0, spectrum: [], suspicious: false}`.
pub struct NeutralSpectralAnalyzer;

impl NeutralSpectralAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NeutralSpectralAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralAnalyzer for NeutralSpectralAnalyzer {
    fn analyze(&self, _raster: &RasterImage) -> SpectralResult {
        SpectralResult::neutral()
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
