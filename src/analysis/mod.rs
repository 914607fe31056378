//! Image forensics analyzers
//!
//! This module provides traits for analysis backends and concrete implementations.
//! The trait abstraction allows swapping backends without changing pipeline code.

pub mod clarity;
pub mod edge;
pub mod grayscale;
pub mod metadata;
pub mod spectral;
pub mod traits;

pub use traits::{ClarityEstimator, EdgeDetector, MetadataInspector, SpectralAnalyzer};

pub use clarity::LaplacianClarityEstimator;
pub use edge::SobelEdgeDetector;
pub use metadata::ExifMetadataInspector;

// Placeholder used when spectral analysis is switched off
pub use spectral::{FftSpectralAnalyzer, NeutralSpectralAnalyzer};
