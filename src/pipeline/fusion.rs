//! Fused tamper analysis of a single image
//!
//! Runs the four analyzers concurrently over the same borrowed raster and
//! file bytes, then assembles the feature vector, explanation and threat
//! level. Each analyzer call is wrapped in a recovery boundary so one
//! misbehaving backend degrades to its fallback instead of aborting the
//! fused result.

use crate::analysis::clarity::clarity_score;
use crate::analysis::metadata::CRITICAL_FIELD_COUNT;
use crate::analysis::{
    ClarityEstimator, EdgeDetector, ExifMetadataInspector, FftSpectralAnalyzer,
    LaplacianClarityEstimator, MetadataInspector, NeutralSpectralAnalyzer, SobelEdgeDetector,
    SpectralAnalyzer,
};
use crate::config::options::{
    AnalysisOptions, LOW_CLARITY_THRESHOLD, LOW_SPECTRUM_THRESHOLD, THREAT_EDGE_THRESHOLD,
};
use crate::types::{
    AnalysisResult, ClarityResult, EdgeResult, FeatureVector, MetadataResult, RasterImage,
    SpectralResult, ThreatLevel,
};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Sentence used when no signal fires
pub const CLEAN_EXPLANATION: &str = "No suspicious elements detected in the image.";

/// Threat score below this is `Low`
const MEDIUM_THREAT_SCORE: f64 = 3.0;

/// Threat score below this (and at least `MEDIUM_THREAT_SCORE`) is `Medium`
const HIGH_THREAT_SCORE: f64 = 6.0;

/// Runs the four analyzers and fuses their results
pub struct TamperAnalyzer {
    metadata: Arc<dyn MetadataInspector>,
    edge: Arc<dyn EdgeDetector>,
    spectral: Arc<dyn SpectralAnalyzer>,
    clarity: Arc<dyn ClarityEstimator>,
    options: AnalysisOptions,
}

impl TamperAnalyzer {
    /// Analyzer with the built-in backends
    pub fn new(options: AnalysisOptions) -> Self {
        Self::with_backends(
            Arc::new(ExifMetadataInspector::new()),
            Arc::new(SobelEdgeDetector::new()),
            Arc::new(FftSpectralAnalyzer::new()),
            Arc::new(LaplacianClarityEstimator::new()),
            options,
        )
    }

    /// Analyzer with caller-supplied backends
    ///
    /// The spectral backend is replaced by [`NeutralSpectralAnalyzer`] when
    /// `options.perform_spectral_analysis` is false.
    pub fn with_backends(
        metadata: Arc<dyn MetadataInspector>,
        edge: Arc<dyn EdgeDetector>,
        spectral: Arc<dyn SpectralAnalyzer>,
        clarity: Arc<dyn ClarityEstimator>,
        options: AnalysisOptions,
    ) -> Self {
        let spectral: Arc<dyn SpectralAnalyzer> = if options.perform_spectral_analysis {
            spectral
        } else {
            Arc::new(NeutralSpectralAnalyzer::new())
        };

        debug!(
            "Fusion backends: metadata={} edge={} spectral={} clarity={}",
            metadata.name(),
            edge.name(),
            spectral.name(),
            clarity.name()
        );

        Self {
            metadata,
            edge,
            spectral,
            clarity,
            options,
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Analyze one image
    ///
    /// `file_bytes` are the original encoded bytes the raster was decoded
    /// from; metadata is read from them, not from the raster.
    pub fn analyze(&self, raster: &RasterImage, file_bytes: &[u8]) -> AnalysisResult {
        let ((metadata, edge), (spectral, clarity)) = rayon::join(
            || {
                rayon::join(
                    || {
                        recover(self.metadata.name(), MetadataResult::unrecoverable, || {
                            self.metadata.inspect(file_bytes)
                        })
                    },
                    || {
                        recover(
                            self.edge.name(),
                            || fallback_edge(raster),
                            || self.edge.detect(raster),
                        )
                    },
                )
            },
            || {
                rayon::join(
                    || {
                        recover(self.spectral.name(), SpectralResult::neutral, || {
                            self.spectral.analyze(raster)
                        })
                    },
                    || {
                        recover(self.clarity.name(), fallback_clarity, || {
                            self.clarity.estimate(raster)
                        })
                    },
                )
            },
        );

        let feature_vector = build_feature_vector(&metadata, &edge, &spectral, &clarity);
        let explanation = build_explanation(&metadata, &edge, &spectral, &clarity, &self.options);
        let threat_level = assess_threat(&metadata, &edge, &spectral, &clarity, &self.options);

        debug!(
            "Fused {}x{}: vector={:?} threat={}",
            raster.width(),
            raster.height(),
            feature_vector,
            threat_level.as_str()
        );

        AnalysisResult {
            metadata,
            edge,
            spectral,
            clarity,
            feature_vector,
            explanation,
            threat_level,
        }
    }
}

impl Default for TamperAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisOptions::default())
    }
}

/// Run `analyze`, substituting `fallback()` if it panics
fn recover<T>(stage: &str, fallback: impl FnOnce() -> T, analyze: impl FnOnce() -> T) -> T {
    match panic::catch_unwind(AssertUnwindSafe(analyze)) {
        Ok(result) => result,
        Err(payload) => {
            error!(
                "Analyzer '{}' panicked: {}. Using fallback result.",
                stage,
                panic_message(payload.as_ref())
            );
            fallback()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Zero variance and an untouched (all-zero) edge map of the input's size
fn fallback_edge(raster: &RasterImage) -> EdgeResult {
    EdgeResult {
        edge_variance: 0.0,
        edge_map: RasterImage::blank(raster.width(), raster.height()),
        edge_intensities: Vec::new(),
    }
}

/// Same values as a raster with no interior pixels
fn fallback_clarity() -> ClarityResult {
    ClarityResult {
        clarity_score: clarity_score(0.0, 0.0),
        noise_level: 0.0,
        sharpness: 0.0,
    }
}

/// Fixed-order tamper feature vector
pub fn build_feature_vector(
    metadata: &MetadataResult,
    edge: &EdgeResult,
    spectral: &SpectralResult,
    clarity: &ClarityResult,
) -> FeatureVector {
    [
        flag(metadata.has_metadata),
        metadata.missing_fields.len() as f64 / CRITICAL_FIELD_COUNT as f64,
        flag(metadata.suspicious_software),
        edge.edge_variance,
        spectral.spectrum_score,
        clarity.clarity_score,
    ]
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// One sentence listing every triggered signal, in a fixed order
pub fn build_explanation(
    metadata: &MetadataResult,
    edge: &EdgeResult,
    spectral: &SpectralResult,
    clarity: &ClarityResult,
    options: &AnalysisOptions,
) -> String {
    let mut issues: Vec<String> = Vec::new();

    if !metadata.has_metadata {
        issues.push("missing metadata".to_string());
    } else if !metadata.missing_fields.is_empty() {
        issues.push(format!(
            "missing {} critical metadata fields",
            metadata.missing_fields.len()
        ));
    }
    if metadata.suspicious_software {
        issues.push("editing software detected".to_string());
    }
    if edge.edge_variance > options.edge_threshold {
        issues.push("high edge inconsistency".to_string());
    }
    if spectral.suspicious_patterns {
        issues.push("suspicious frequency patterns (heuristic)".to_string());
    }
    if clarity.clarity_score < LOW_CLARITY_THRESHOLD {
        issues.push("low visual clarity".to_string());
    }

    if issues.is_empty() {
        CLEAN_EXPLANATION.to_string()
    } else {
        format!("Image flagged due to {}.", issues.join(", "))
    }
}

/// Bucket the fused signals into a triage level
pub fn assess_threat(
    metadata: &MetadataResult,
    edge: &EdgeResult,
    spectral: &SpectralResult,
    clarity: &ClarityResult,
    options: &AnalysisOptions,
) -> ThreatLevel {
    let mut score = 0.0;

    if !metadata.has_metadata {
        score += 2.0;
    }
    if metadata.suspicious_software {
        score += 2.0;
    }
    let missing = metadata.missing_fields.len();
    if missing > 2 {
        score += missing as f64 / 2.0;
    }
    if edge.edge_variance > THREAT_EDGE_THRESHOLD {
        score += 2.0;
    }
    // a disabled spectral pass reports 0 and must not count against the image
    if options.perform_spectral_analysis && spectral.spectrum_score < LOW_SPECTRUM_THRESHOLD {
        score += 2.0;
    }
    if clarity.clarity_score < LOW_CLARITY_THRESHOLD {
        score += 1.0;
    }

    if score < MEDIUM_THREAT_SCORE {
        ThreatLevel::Low
    } else if score < HIGH_THREAT_SCORE {
        ThreatLevel::Medium
    } else {
        ThreatLevel::High
    }
}
