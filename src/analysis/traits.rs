//! Analysis trait abstractions
//!
//! These traits define the interface for swappable analysis backends.
//! Each backend is a pure function of borrowed, read-only inputs, so a
//! single instance can be shared across threads.

use crate::types::{ClarityResult, EdgeResult, MetadataResult, RasterImage, SpectralResult};

/// Embedded metadata inspection backend
pub trait MetadataInspector: Send + Sync {
    /// Inspect the metadata embedded in the original file bytes
    ///
    /// Never fails: an unreadable container yields the conservative
    /// worst-case result.
    fn inspect(&self, file_bytes: &[u8]) -> MetadataResult;

    /// Get the name of this inspector (for logging)
    fn name(&self) -> &'static str;
}

/// Edge statistics backend
pub trait EdgeDetector: Send + Sync {
    /// Compute gradient statistics and a renderable edge map
    fn detect(&self, raster: &RasterImage) -> EdgeResult;

    /// Get the name of this detector (for logging)
    fn name(&self) -> &'static str;
}

/// Frequency-domain analysis backend
pub trait SpectralAnalyzer: Send + Sync {
    /// Score the distribution of energy across frequency bands
    fn analyze(&self, raster: &RasterImage) -> SpectralResult;

    /// Get the name of this analyzer (for logging)
    fn name(&self) -> &'static str;
}

/// Perceptual clarity backend
pub trait ClarityEstimator: Send + Sync {
    /// Estimate noise, sharpness and their combined clarity score
    fn estimate(&self, raster: &RasterImage) -> ClarityResult;

    /// Get the name of this estimator (for logging)
    fn name(&self) -> &'static str;
}
