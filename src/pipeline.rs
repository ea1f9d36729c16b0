use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::DiscoveryConfig;
use crate::error::{MetadataError, Result};
use crate::extract::{ImageProbe, extract_with};
use crate::record::{ImageMetadataRecord, MetadataBatch};

/// Name fragments that suggest an image even when the extension is off.
const IMAGE_LIKE_NAMES: &[&str] = &["jpg", "jpeg", "png"];

/// Collect candidate image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// one level deep, or fully when `discovery.recursive` is set, in file-name
/// order. Only files whose extension is in `discovery.extensions` are kept;
/// the returned order is the discovery order of the batch.
///
/// # Example
///
/// ```rust,no_run
/// use image_metadata::config::DiscoveryConfig;
/// use image_metadata::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(
///     &[PathBuf::from("photo.jpg"), PathBuf::from("./photos/")],
///     &DiscoveryConfig::default(),
/// );
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf], discovery: &DiscoveryConfig) -> Vec<PathBuf> {
    let mut images = Vec::new();
    let max_depth = if discovery.recursive { usize::MAX } else { 1 };

    for path in paths {
        if path.is_file() {
            if is_supported_image(path, &discovery.extensions) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .min_depth(1)
                .max_depth(max_depth)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if !p.is_file() {
                    continue;
                }
                if is_supported_image(p, &discovery.extensions) {
                    log::debug!("Found: {}", p.display());
                    images.push(p.to_path_buf());
                } else if looks_like_image(p) {
                    log::warn!(
                        "Skipped {} (extension {:?} is not recognized)",
                        p.display(),
                        p.extension().unwrap_or_default()
                    );
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has one of the given extensions (case-insensitive).
fn is_supported_image(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn looks_like_image(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_LIKE_NAMES.iter().any(|frag| name.contains(frag))
}

/// Run the extractor over `paths` in order.
///
/// `on_record` is called with the zero-based index of each record as soon as
/// it is produced. Failed files still yield a record, so the batch always has
/// one entry per path.
pub fn run_batch<P, F>(paths: &[PathBuf], probe: &P, mut on_record: F) -> MetadataBatch
where
    P: ImageProbe + ?Sized,
    F: FnMut(usize, &ImageMetadataRecord),
{
    let mut batch = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        let record = extract_with(probe, path);
        on_record(i, &record);
        batch.push(record);
    }
    batch
}

/// Success/failure counts of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(batch: &[ImageMetadataRecord]) -> Self {
        let failed = batch.iter().filter(|r| !r.is_success()).count();
        Self {
            total: batch.len(),
            succeeded: batch.len() - failed,
            failed,
        }
    }
}

/// Render the batch as a pretty-printed JSON array.
pub fn to_json(batch: &[ImageMetadataRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(batch)?)
}

/// `image_metadata_<YYYYMMDD_HHMMSS>.json` for the given time.
pub fn artifact_file_name(at: &DateTime<Local>) -> String {
    format!("image_metadata_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Save the batch to a fresh timestamped JSON file in `dir`.
///
/// ```rust,no_run
/// use image_metadata::extract::FileProbe;
/// use image_metadata::pipeline::{run_batch, save_json};
/// use std::path::{Path, PathBuf};
///
/// let batch = run_batch(&[PathBuf::from("photo.jpg")], &FileProbe, |_, _| {});
/// let saved = save_json(&batch, Path::new(".")).unwrap();
/// println!("Metadata saved to {}", saved.display());
/// ```
pub fn save_json(batch: &[ImageMetadataRecord], dir: &Path) -> Result<PathBuf> {
    let path = dir.join(artifact_file_name(&Local::now()));
    write_json(batch, &path)?;
    Ok(path)
}

/// Write the batch to `path`. Refuses to overwrite an existing file.
pub fn write_json(batch: &[ImageMetadataRecord], path: &Path) -> Result<()> {
    let json = to_json(batch)?;
    let persist = |source: std::io::Error| MetadataError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(persist)?;
    file.write_all(json.as_bytes()).map_err(persist)?;
    file.write_all(b"\n").map_err(persist)?;
    log::debug!("Wrote {} record(s) to {}", batch.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::FileProbe;
    use crate::test_utils;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    fn discovery() -> DiscoveryConfig {
        DiscoveryConfig::default()
    }

    // ── is_supported_image ───────────────────────────────────────────

    #[test]
    fn supported_image_extensions() {
        let exts = discovery().extensions;
        for name in ["a.jpg", "a.JPEG", "a.png", "a.gif", "a.bmp", "a.tif", "a.TIFF", "a.webp"] {
            assert!(is_supported_image(Path::new(name), &exts), "{name}");
        }
    }

    #[test]
    fn configured_extensions_match_any_case() {
        let exts = vec!["WebP".to_string(), "heic".to_string()];
        assert!(is_supported_image(Path::new("a.webp"), &exts));
        assert!(is_supported_image(Path::new("a.HEIC"), &exts));
        assert!(!is_supported_image(Path::new("a.jpg"), &exts));
    }

    #[test]
    fn unsupported_image_extensions() {
        let exts = discovery().extensions;
        for name in ["doc.pdf", "video.mp4", "readme.txt", "noext", "photo.jpg.bak"] {
            assert!(!is_supported_image(Path::new(name), &exts), "{name}");
        }
    }

    #[test]
    fn image_like_names() {
        assert!(looks_like_image(Path::new("photo.jpg.bak")));
        assert!(looks_like_image(Path::new("PNG_export")));
        assert!(!looks_like_image(Path::new("notes.txt")));
    }

    // ── collect_images ───────────────────────────────────────────────

    #[test]
    fn collect_images_single_file() {
        let dir = TempDir::new().unwrap();
        let jpg = dir.path().join("test.jpg");
        fs::write(&jpg, b"fake").unwrap();

        let images = collect_images(&[jpg.clone()], &discovery());
        assert_eq!(images, [jpg]);
    }

    #[test]
    fn collect_images_skips_unsupported() {
        let dir = TempDir::new().unwrap();
        let txt = dir.path().join("readme.txt");
        fs::write(&txt, b"hello").unwrap();

        assert!(collect_images(&[txt], &discovery()).is_empty());
    }

    #[test]
    fn collect_images_sorted_top_level_only() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        fs::write(dir.path().join("c.png"), b"fake").unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(dir.path().join("b.txt"), b"fake").unwrap();
        fs::write(sub.join("d.gif"), b"fake").unwrap();

        let images = collect_images(&[dir.path().to_path_buf()], &discovery());
        assert_eq!(images, [dir.path().join("a.jpg"), dir.path().join("c.png")]);
    }

    #[test]
    fn collect_images_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(sub.join("b.png"), b"fake").unwrap();
        fs::write(sub.join("c.txt"), b"fake").unwrap();

        let mut config = discovery();
        config.recursive = true;
        let images = collect_images(&[dir.path().to_path_buf()], &config);
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn collect_images_custom_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(dir.path().join("b.heic"), b"fake").unwrap();

        let config = DiscoveryConfig {
            extensions: vec!["heic".into()],
            recursive: false,
        };
        let images = collect_images(&[dir.path().to_path_buf()], &config);
        assert_eq!(images, [dir.path().join("b.heic")]);
    }

    #[test]
    fn collect_images_nonexistent_path() {
        let images = collect_images(&[PathBuf::from("/nonexistent/path")], &discovery());
        assert!(images.is_empty());
    }

    // ── run_batch ────────────────────────────────────────────────────

    #[test]
    fn batch_keeps_order_and_counts_failures() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.png");
        let c = dir.path().join("c.png");
        let d = dir.path().join("d.jpg");
        test_utils::write_jpeg(&a, 10, 10);
        fs::write(&b, b"garbage").unwrap();
        test_utils::write_png(&d, 3, 3);
        // c.png is never created.

        let paths = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let mut seen = Vec::new();
        let batch = run_batch(&paths, &FileProbe, |i, record| {
            seen.push((i, record.filename.clone()))
        });

        assert_eq!(batch.len(), 4);
        let names: Vec<_> = batch.iter().map(|r| r.filename.clone()).collect();
        let expected: Vec<_> = paths.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(names, expected);
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[2].0, 2);

        assert_eq!(
            BatchSummary::of(&batch),
            BatchSummary {
                total: 4,
                succeeded: 2,
                failed: 2
            }
        );
        assert!(batch[1].error.as_deref().unwrap().starts_with("Error processing"));
        assert!(batch[2].error.as_deref().unwrap().starts_with("Image not found"));
        for record in &batch {
            assert_eq!(record.error.is_some(), record.basic_info.is_none());
        }
    }

    // ── persistence ──────────────────────────────────────────────────

    #[test]
    fn artifact_name_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(artifact_file_name(&at), "image_metadata_20240309_070501.json");
    }

    #[test]
    fn json_round_trip_has_exact_fields() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.png");
        test_utils::write_jpeg_with_exif(&a, 8, 8);
        test_utils::write_png(&b, 4, 2);
        let paths = vec![a, b, dir.path().join("missing.png")];
        let batch = run_batch(&paths, &FileProbe, |_, _| {});

        let saved = save_json(&batch, dir.path()).unwrap();
        let name = saved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("image_metadata_") && name.ends_with(".json"));

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&saved).unwrap()).unwrap();
        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), 3);
        for object in array {
            let mut keys: Vec<_> = object.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            assert_eq!(keys, ["basic_info", "error", "exif_data", "filename", "gps_data"]);
        }

        assert_eq!(array[0]["basic_info"]["size"], serde_json::json!([8, 8]));
        assert_eq!(array[0]["exif_data"]["Make"], "Canon");
        assert_eq!(array[0]["gps_data"]["GPSLatitudeRef"], "N");
        assert_eq!(
            array[0]["gps_data"]["GPSLatitude"],
            serde_json::json!([40.0, 0.0, 0.0])
        );
        assert!(array[1]["error"].is_null());
        assert_eq!(array[2]["basic_info"], serde_json::json!({}));
        assert!(array[2]["error"].as_str().unwrap().contains("missing.png"));
    }

    #[test]
    fn write_json_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image_metadata_20240101_000000.json");
        fs::write(&path, b"previous run").unwrap();

        let err = write_json(&[], &path).unwrap_err();
        assert!(matches!(err, MetadataError::Persist { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"previous run");
    }

    #[test]
    fn write_json_to_missing_dir_is_a_persist_error() {
        let dir = TempDir::new().unwrap();
        let err = save_json(&[], &dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, MetadataError::Persist { .. }));
    }
}
