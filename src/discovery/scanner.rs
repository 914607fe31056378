//! File discovery and scanning

use crate::error::{Result, TamperError};
use crate::types::ImageFormat;
use hash32::FnvHasher;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Discovered image file with basic metadata
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub format: ImageFormat,
    pub size_bytes: u64,
}

/// Scan a path (file or directory) for image files
///
/// Directory results are sorted by path so batch output is stable.
pub fn scan(input: &Path, recursive: bool) -> Result<Vec<DiscoveredFile>> {
    if !input.exists() {
        return Err(TamperError::FileNotFound(input.to_path_buf()));
    }

    let mut files = Vec::new();

    if input.is_file() {
        // Single file mode
        if let Some(file) = try_discover_file(input) {
            files.push(file);
        } else {
            return Err(TamperError::UnsupportedFormat {
                path: input.to_path_buf(),
                format: input
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }
    } else if input.is_dir() {
        let walker = if recursive {
            WalkDir::new(input)
        } else {
            WalkDir::new(input).max_depth(1)
        };

        for entry in walker.sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_file() {
                if let Some(file) = try_discover_file(path) {
                    debug!("Discovered: {}", file.path.display());
                    files.push(file);
                }
            }
        }
    }

    info!("Discovered {} image files", files.len());

    if files.is_empty() {
        warn!("No supported image files found in {}", input.display());
    }

    Ok(files)
}

/// Try to create a DiscoveredFile if the path is a supported image format
fn try_discover_file(path: &Path) -> Option<DiscoveredFile> {
    let ext = path.extension()?.to_str()?;
    let format = ImageFormat::from_extension(ext)?;

    let metadata = std::fs::metadata(path).ok()?;

    Some(DiscoveredFile {
        path: path.to_path_buf(),
        format,
        size_bytes: metadata.len(),
    })
}

/// Deterministic evidence id for an image path
///
/// FNV-1a over the normalized path, masked to a positive `i32`.
pub fn generate_image_id(path: &Path) -> i32 {
    use hash32::Hasher as Hash32Hasher;

    let normalized = normalize_path_for_hash(path);

    let mut hasher = FnvHasher::default();
    hasher.write(normalized.as_bytes());
    let hash = hasher.finish32();

    (hash & 0x7FFF_FFFF) as i32
}

/// Normalize a path string for consistent hashing across platforms
fn normalize_path_for_hash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_image_id_deterministic() {
        let path = Path::new("/evidence/case-17/photo.jpg");
        assert_eq!(generate_image_id(path), generate_image_id(path));
    }

    #[test]
    fn test_image_id_non_negative() {
        let paths = [
            "/a.png",
            "/very/long/path/to/some/deeply/nested/scan.tiff",
            "C:\\Evidence\\Photo.JPG",
        ];

        for path_str in paths {
            let id = generate_image_id(Path::new(path_str));
            assert!(id >= 0, "Image ID should be non-negative: {}", id);
        }
    }

    #[test]
    fn test_path_normalization() {
        let win = normalize_path_for_hash(Path::new("C:\\Evidence\\Photo.jpg"));
        let unix = normalize_path_for_hash(Path::new("c:/evidence/photo.jpg"));
        assert_eq!(win, unix);
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(dir.path().join("a.JPG"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.webp"), b"x").unwrap();

        let files = scan(dir.path(), true).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.webp"]);
        assert_eq!(files[0].format, ImageFormat::Jpeg);

        let shallow = scan(dir.path(), false).unwrap();
        assert_eq!(shallow.len(), 2);
    }

    #[test]
    fn test_scan_single_unsupported_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        fs::write(&path, b"%PDF").unwrap();
        assert!(matches!(
            scan(&path, true),
            Err(TamperError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_scan_missing_path() {
        assert!(matches!(
            scan(Path::new("/no/such/evidence"), true),
            Err(TamperError::FileNotFound(_))
        ));
    }
}
