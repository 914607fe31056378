//! JSON report export
//!
//! One report per output directory. Entries are keyed by image path so a
//! later run can skip images that were already analyzed.

use crate::error::{Result, TamperError};
use crate::types::{AnalysisResult, ClarityResult, FeatureVector, MetadataResult, ThreatLevel};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info, warn};

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// File name of the report inside the output directory
pub const REPORT_FILE_NAME: &str = "tamperscan.json";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportJson {
    /// Schema version for forward compatibility
    pub version: String,
    /// Export metadata
    pub metadata: ExportMetadata,
    /// Analyzed images, sorted by path
    pub images: Vec<ImageReportJson>,
}

/// Export metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// tamperscan version that generated this file
    pub generator_version: String,
    /// Timestamp of export
    pub exported_at: String,
    /// Number of images
    pub image_count: usize,
}

/// JSON representation of one analyzed image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReportJson {
    /// Deterministic id derived from the path
    pub image_id: i32,
    /// File path
    pub path: String,
    /// Container format detected from the extension
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    /// has_metadata, missing ratio, suspicious software, edge variance,
    /// spectrum score, clarity score
    pub feature_vector: FeatureVector,
    pub explanation: String,
    pub threat_level: ThreatLevel,
    pub metadata: MetadataResult,
    pub edge: EdgeJson,
    pub spectral: SpectralJson,
    pub clarity: ClarityResult,
    /// Rendered edge map (if written)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_map: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeJson {
    pub edge_variance: f64,
}

/// Spectral summary; the full magnitude spectrum is not exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralJson {
    pub spectrum_score: f64,
    pub suspicious_patterns: bool,
    /// Number of transform bins (0 when spectral analysis was skipped)
    pub bins: usize,
}

impl ImageReportJson {
    /// Build a report entry from a fused result
    pub fn from_analysis(
        image_id: i32,
        path: &Path,
        format: &str,
        size_bytes: u64,
        result: &AnalysisResult,
    ) -> Self {
        Self {
            image_id,
            path: path.to_string_lossy().to_string(),
            format: format.to_string(),
            width: result.edge.edge_map.width(),
            height: result.edge.edge_map.height(),
            size_bytes,
            feature_vector: result.feature_vector,
            explanation: result.explanation.clone(),
            threat_level: result.threat_level,
            metadata: result.metadata.clone(),
            edge: EdgeJson {
                edge_variance: result.edge.edge_variance,
            },
            spectral: SpectralJson {
                spectrum_score: result.spectral.spectrum_score,
                suspicious_patterns: result.spectral.suspicious_patterns,
                bins: result.spectral.magnitude_spectrum.len(),
            },
            clarity: result.clarity,
            edge_map: None,
        }
    }
}

/// Write report entries to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
/// This prevents data corruption if the write is interrupted.
pub fn write_json(images: &[ImageReportJson], output_path: &Path) -> Result<()> {
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| TamperError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let writer = BufWriter::new(file);

    let mut sorted = images.to_vec();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let output = ReportJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ExportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            image_count: sorted.len(),
        },
        images: sorted,
    };

    serde_json::to_writer_pretty(writer, &output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        TamperError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        TamperError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote {} images to {}", output.metadata.image_count, output_path.display());

    Ok(())
}

/// Read existing report and return the set of analyzed image paths
///
/// If the file doesn't exist or can't be parsed, returns an empty set.
pub fn read_existing_analysis(json_path: &Path) -> HashSet<String> {
    let paths: HashSet<String> = read_existing_images(json_path)
        .into_iter()
        .map(|i| i.path)
        .collect();

    debug!(
        "Loaded {} previously analyzed images from {}",
        paths.len(),
        json_path.display()
    );

    paths
}

/// Read existing report entries so a partial re-run can preserve them
pub fn read_existing_images(json_path: &Path) -> Vec<ImageReportJson> {
    if !json_path.exists() {
        debug!("No existing report at {}", json_path.display());
        return Vec::new();
    }

    let file = match File::open(json_path) {
        Ok(f) => f,
        Err(e) => {
            warn!(
                "Could not open existing report {}: {}. Its entries will be replaced.",
                json_path.display(),
                e
            );
            return Vec::new();
        }
    };

    match serde_json::from_reader::<_, ReportJson>(BufReader::new(file)) {
        Ok(json) => json.images,
        Err(e) => {
            warn!(
                "Could not parse existing report {}: {}. Its entries will be replaced.",
                json_path.display(),
                e
            );
            Vec::new()
        }
    }
}
