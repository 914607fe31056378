//! Metadata extraction from embedded image tags
//!
//! Uses kamadak-exif to read EXIF/TIFF IFDs from JPEG, TIFF, PNG, WebP and
//! HEIF containers. Missing critical fields and editor signatures in the
//! Software/Artist tags are scored as tampering signals.

use crate::analysis::traits::MetadataInspector;
use crate::types::{CriticalField, MetadataResult, MetadataTag, MetadataTagSet, CRITICAL_FIELDS};
use std::io::Cursor;
use tracing::{debug, warn};

/// Editing tools whose names in the Software or Artist tag flag the image
pub const SUSPICIOUS_SOFTWARE: [&str; 8] = [
    "photoshop",
    "gimp",
    "lightroom",
    "snapseed",
    "picsart",
    "paint.net",
    "coreldraw",
    "affinity",
];

/// Extra words that only count against the Artist tag
pub const SUSPICIOUS_ARTIST_WORDS: [&str; 2] = ["editor", "modified"];

/// Total number of critical fields, used to normalize the missing count
pub const CRITICAL_FIELD_COUNT: usize = CRITICAL_FIELDS.len();

impl MetadataTagSet {
    /// Parse every tag kamadak-exif can recover from the file bytes
    pub fn parse(file_bytes: &[u8]) -> Result<Self, exif::Error> {
        let mut cursor = Cursor::new(file_bytes);
        let exif = exif::Reader::new().read_from_container(&mut cursor)?;

        let tags = exif.fields().map(|field| {
            let description = match field.value {
                exif::Value::Ascii(ref parts) => ascii_text(parts),
                _ => field.display_value().with_unit(&exif).to_string(),
            };
            let tag = MetadataTag {
                value: field.display_value().to_string(),
                description,
            };
            (field.tag.to_string(), tag)
        });

        Ok(MetadataTagSet::from_tags(tags))
    }
}

/// Join the strings of an ASCII value, dropping trailing NUL padding
fn ascii_text(parts: &[Vec<u8>]) -> String {
    parts
        .iter()
        .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Score a parsed tag set
///
/// Pure function of the tags; `inspect` is parse + this.
pub fn inspect_tags(tags: &MetadataTagSet) -> MetadataResult {
    let missing_fields: Vec<CriticalField> = CRITICAL_FIELDS
        .iter()
        .copied()
        .filter(|field| !field.tag_aliases().iter().any(|alias| tags.contains(alias)))
        .collect();

    let software_flagged = tags
        .get("Software")
        .map(|tag| names_editor(&tag.description, &[]))
        .unwrap_or(false);

    let artist_tag = tags.get("Artist").map(|tag| tag.description.clone());
    let artist_flagged = artist_tag
        .as_deref()
        .map(|artist| names_editor(artist, &SUSPICIOUS_ARTIST_WORDS))
        .unwrap_or(false);

    MetadataResult {
        has_metadata: !tags.is_empty(),
        missing_fields,
        suspicious_software: software_flagged || artist_flagged,
        artist_tag,
        tags: tags.clone(),
    }
}

/// Case-insensitive substring match against the editor list plus `extra`
fn names_editor(text: &str, extra: &[&str]) -> bool {
    let lower = text.to_lowercase();
    SUSPICIOUS_SOFTWARE
        .iter()
        .chain(extra.iter())
        .any(|needle| lower.contains(needle))
}

/// Metadata inspector backed by kamadak-exif
pub struct ExifMetadataInspector;

impl ExifMetadataInspector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExifMetadataInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataInspector for ExifMetadataInspector {
    fn inspect(&self, file_bytes: &[u8]) -> MetadataResult {
        match MetadataTagSet::parse(file_bytes) {
            Ok(tags) => {
                debug!("Recovered {} metadata tags", tags.len());
                inspect_tags(&tags)
            }
            Err(exif::Error::NotFound(container)) => {
                debug!("No embedded metadata in {} container", container);
                MetadataResult::unrecoverable()
            }
            Err(e) => {
                warn!("Failed to read embedded metadata: {}", e);
                MetadataResult::unrecoverable()
            }
        }
    }

    fn name(&self) -> &'static str {
        "kamadak-exif"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(description: &str) -> MetadataTag {
        MetadataTag {
            value: format!("\"{}\"", description),
            description: description.to_string(),
        }
    }

    fn tag_set(pairs: &[(&str, &str)]) -> MetadataTagSet {
        MetadataTagSet::from_tags(pairs.iter().map(|(name, desc)| (name.to_string(), tag(desc))))
    }

    #[test]
    fn test_unparseable_bytes_fall_back() {
        let result = ExifMetadataInspector::new().inspect(b"definitely not an image container");
        assert_eq!(result, MetadataResult::unrecoverable());
    }

    #[test]
    fn test_empty_bytes_fall_back() {
        let result = ExifMetadataInspector::new().inspect(&[]);
        assert!(!result.has_metadata);
        assert_eq!(result.missing_fields.len(), CRITICAL_FIELD_COUNT);
    }

    #[test]
    fn test_complete_camera_tags() {
        let tags = tag_set(&[
            ("DateTimeOriginal", "2024:05:01 10:00:00"),
            ("Make", "Canon"),
            ("Model", "EOS R5"),
            ("Software", "Firmware 1.8.1"),
            ("Artist", "Field Office 12"),
            ("GPSLatitude", "28 deg 36 min 50 sec"),
            ("GPSLongitude", "77 deg 12 min 32 sec"),
        ]);
        let result = inspect_tags(&tags);
        assert!(result.has_metadata);
        assert!(result.missing_fields.is_empty());
        assert!(!result.suspicious_software);
        assert_eq!(result.artist_tag.as_deref(), Some("Field Office 12"));
    }

    #[test]
    fn test_capture_timestamp_aliases() {
        for alias in ["ModifyDate", "DateTime", "DateTimeOriginal"] {
            let result = inspect_tags(&tag_set(&[(alias, "2024:01:01 00:00:00")]));
            assert!(
                !result.missing_fields.contains(&CriticalField::CaptureTimestamp),
                "{} should satisfy CaptureTimestamp",
                alias
            );
            assert_eq!(result.missing_fields.len(), 6);
        }
    }

    #[test]
    fn test_photoshop_any_case_is_suspicious() {
        for name in ["Adobe Photoshop CC 2019", "PHOTOSHOP", "photoshop express"] {
            let result = inspect_tags(&tag_set(&[("Software", name)]));
            assert!(result.suspicious_software, "{} should be flagged", name);
        }
    }

    #[test]
    fn test_editor_word_only_counts_for_artist() {
        let software = inspect_tags(&tag_set(&[("Software", "Photo Editor Pro")]));
        assert!(!software.suspicious_software);

        let artist = inspect_tags(&tag_set(&[("Artist", "Photo Editor Pro")]));
        assert!(artist.suspicious_software);

        let modified = inspect_tags(&tag_set(&[("Artist", "MODIFIED by hand")]));
        assert!(modified.suspicious_software);
    }

    #[test]
    fn test_artist_with_editor_list_entry() {
        let result = inspect_tags(&tag_set(&[("Artist", "exported from GIMP")]));
        assert!(result.suspicious_software);
        assert_eq!(result.artist_tag.as_deref(), Some("exported from GIMP"));
    }

    #[test]
    fn test_unrelated_tags_still_count_as_metadata() {
        let result = inspect_tags(&tag_set(&[("Orientation", "row 0 at top")]));
        assert!(result.has_metadata);
        assert_eq!(result.missing_fields.len(), CRITICAL_FIELD_COUNT);
        assert!(result.artist_tag.is_none());
    }

    #[test]
    fn test_ascii_text_strips_nul_padding() {
        assert_eq!(ascii_text(&[b"Canon\0".to_vec()]), "Canon");
        assert_eq!(ascii_text(&[b"a".to_vec(), b"b".to_vec()]), "a b");
    }
}
