//! tamperscan - Image Tamper Feature Extraction
//!
//! Scores a decoded image for tampering signals and fuses them into a fixed
//! six-element feature vector plus a one-sentence explanation, meant as
//! input to a downstream classifier.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `analysis`: metadata, Sobel edge, FFT band and clarity analyzers (with swappable backends)
//! - `pipeline`: fused per-image analysis and parallel batch orchestration
//! - `raster`: decoding files into [`RasterImage`] and rendering edge maps
//! - `config`: CLI argument parsing, runtime settings and analysis options
//! - `discovery`: File scanning and image ID generation
//! - `export`: JSON report output
//!
//! The analyzers and the fusion step only ever see a borrowed
//! [`RasterImage`] and the original file bytes; nothing in the core touches
//! the filesystem.
//!
//! # Example
//!
//! ```no_run
//! use tamperscan::{analyze_image, config::AnalysisOptions, raster};
//!
//! let decoded = raster::decode(std::path::Path::new("evidence.jpg")).expect("decode failed");
//! let result = analyze_image(&decoded.raster, &decoded.file_bytes, AnalysisOptions::default());
//! println!("{:?} {}", result.feature_vector, result.explanation);
//! ```

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod raster;
pub mod types;

// Re-export key types at crate root
pub use config::AnalysisOptions;
pub use error::{Result, TamperError};
pub use pipeline::TamperAnalyzer;
pub use types::{
    AnalysisResult, ClarityResult, EdgeResult, FeatureVector, MetadataResult, RasterImage,
    SpectralResult, ThreatLevel,
};

/// Analyze one decoded image with the built-in backends
pub fn analyze_image(raster: &RasterImage, file_bytes: &[u8], options: AnalysisOptions) -> AnalysisResult {
    TamperAnalyzer::new(options).analyze(raster, file_bytes)
}
