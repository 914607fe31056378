//! Core data types for tamperscan
//!
//! These types represent the domain model and flow through the pipeline.
//! Everything here is created fresh per analysis call and never mutated
//! after construction.

use crate::error::{Result, TamperError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Raster primitives
// =============================================================================

/// Bytes per RGBA8 pixel
pub const RGBA_CHANNELS: usize = 4;

/// Decoded RGBA8 pixel buffer
///
/// The pixel length is validated on construction, so analyzers can index
/// `(y * width + x) * 4` without bounds anxiety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap an RGBA8 buffer, rejecting a length that does not match the geometry
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(RGBA_CHANNELS))
            .ok_or_else(|| TamperError::InvalidRaster {
                reason: format!("{}x{} overflows the addressable pixel count", width, height),
            })?;

        if pixels.len() != expected {
            return Err(TamperError::InvalidRaster {
                reason: format!(
                    "{}x{} RGBA8 needs {} bytes, got {}",
                    width,
                    height,
                    expected,
                    pixels.len()
                ),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap a buffer the caller sized from an existing raster's geometry
    pub(crate) fn from_validated(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * RGBA_CHANNELS);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// All-zero (transparent black) raster of the given size
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * RGBA_CHANNELS],
        }
    }

    /// Raster filled with a single RGBA colour
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * RGBA_CHANNELS);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels (not bytes)
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if the raster has no pixels
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// True when a 3x3 neighbourhood fits somewhere in the raster
    pub fn has_interior(&self) -> bool {
        self.width >= 3 && self.height >= 3
    }

    /// Consume the raster and return its pixel buffer
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

// =============================================================================
// Metadata
// =============================================================================

/// Metadata fields whose absence counts as a tampering signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CriticalField {
    CaptureTimestamp,
    Make,
    Model,
    Software,
    Artist,
    #[serde(rename = "GPSLatitude")]
    GpsLatitude,
    #[serde(rename = "GPSLongitude")]
    GpsLongitude,
}

/// All critical fields, in reporting order
pub const CRITICAL_FIELDS: [CriticalField; 7] = [
    CriticalField::CaptureTimestamp,
    CriticalField::Make,
    CriticalField::Model,
    CriticalField::Software,
    CriticalField::Artist,
    CriticalField::GpsLatitude,
    CriticalField::GpsLongitude,
];

impl CriticalField {
    /// Field name as reported in explanations and JSON
    pub fn as_str(self) -> &'static str {
        match self {
            CriticalField::CaptureTimestamp => "CaptureTimestamp",
            CriticalField::Make => "Make",
            CriticalField::Model => "Model",
            CriticalField::Software => "Software",
            CriticalField::Artist => "Artist",
            CriticalField::GpsLatitude => "GPSLatitude",
            CriticalField::GpsLongitude => "GPSLongitude",
        }
    }

    /// Tag names that satisfy this field (any one is enough)
    pub fn tag_aliases(self) -> &'static [&'static str] {
        match self {
            CriticalField::CaptureTimestamp => &["ModifyDate", "DateTime", "DateTimeOriginal"],
            CriticalField::Make => &["Make"],
            CriticalField::Model => &["Model"],
            CriticalField::Software => &["Software"],
            CriticalField::Artist => &["Artist"],
            CriticalField::GpsLatitude => &["GPSLatitude"],
            CriticalField::GpsLongitude => &["GPSLongitude"],
        }
    }
}

impl std::fmt::Display for CriticalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recovered metadata tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTag {
    /// Raw value rendering
    pub value: String,
    /// Human-readable description (plain text for ASCII tags)
    pub description: String,
}

/// Tags recovered from a file's embedded metadata, keyed by tag name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTagSet {
    tags: BTreeMap<String, MetadataTag>,
}

impl MetadataTagSet {
    /// Build a tag set from (name, tag) pairs; the first occurrence of a name wins
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = (S, MetadataTag)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, tag) in tags {
            map.entry(name.into()).or_insert(tag);
        }
        Self { tags: map }
    }

    pub fn get(&self, name: &str) -> Option<&MetadataTag> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataTag)> {
        self.tags.iter()
    }
}

// =============================================================================
// Analysis results
// =============================================================================

/// Metadata inspection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataResult {
    /// At least one tag was recovered
    pub has_metadata: bool,
    /// Critical fields with no matching tag, in `CRITICAL_FIELDS` order
    pub missing_fields: Vec<CriticalField>,
    /// Software or Artist tag names a known editor
    pub suspicious_software: bool,
    /// Artist tag description, verbatim
    pub artist_tag: Option<String>,
    /// Everything that was recovered
    #[serde(skip)]
    pub tags: MetadataTagSet,
}

impl MetadataResult {
    /// Worst-case result used when no metadata container can be parsed
    pub fn unrecoverable() -> Self {
        Self {
            has_metadata: false,
            missing_fields: CRITICAL_FIELDS.to_vec(),
            suspicious_software: false,
            artist_tag: None,
            tags: MetadataTagSet::default(),
        }
    }
}

/// Sobel edge analysis result
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeResult {
    /// Population variance of interior gradient magnitudes, normalized to [0, 1]
    pub edge_variance: f64,
    /// Same-size grayscale-as-RGBA rendering of the gradient magnitudes
    pub edge_map: RasterImage,
    /// Interior gradient magnitudes, row-major
    pub edge_intensities: Vec<u32>,
}

/// Frequency-band analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralResult {
    /// Low+mid versus high band energy, normalized to [0, 1]
    pub spectrum_score: f64,
    /// Magnitude of every transform bin
    pub magnitude_spectrum: Vec<f64>,
    /// High-frequency spike or mid-frequency dip
    pub suspicious_patterns: bool,
}

impl SpectralResult {
    /// Placeholder used when spectral analysis is disabled
    pub fn neutral() -> Self {
        Self {
            spectrum_score: 0.0,
            magnitude_spectrum: Vec::new(),
            suspicious_patterns: false,
        }
    }
}

/// Perceptual clarity result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClarityResult {
    /// Combined clarity in [0, 1]
    pub clarity_score: f64,
    /// Local noise estimate in [0, 1]
    pub noise_level: f64,
    /// Laplacian sharpness estimate in [0, 1]
    pub sharpness: f64,
}

/// Tamper feature vector z_I
///
/// Order: has_metadata, missing ratio, suspicious software, edge variance,
/// spectrum score, clarity score.
pub type FeatureVector = [f64; 6];

/// Coarse triage bucket for human review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
}

impl ThreatLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreatLevel::Low => "Low",
            ThreatLevel::Medium => "Medium",
            ThreatLevel::High => "High",
        }
    }
}

/// Complete fused analysis of one image
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub metadata: MetadataResult,
    pub edge: EdgeResult,
    pub spectral: SpectralResult,
    pub clarity: ClarityResult,
    /// Fixed-order feature vector for the downstream classifier
    pub feature_vector: FeatureVector,
    /// One-sentence summary of triggered signals
    pub explanation: String,
    pub threat_level: ThreatLevel,
}

impl AnalysisResult {
    /// Renderable edge map produced by the edge analyzer
    pub fn edge_map(&self) -> &RasterImage {
        &self.edge.edge_map
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Image container formats accepted by the batch scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Tiff,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "webp" => Some(ImageFormat::Webp),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Webp => "WebP",
            ImageFormat::Bmp => "BMP",
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
