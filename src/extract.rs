use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{
    AnimationDecoder, ColorType, Frames, ImageDecoder, ImageError, ImageFormat, ImageReader,
};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use crate::error::{MetadataError, Result};
use crate::exif::{
    self, GPS_INFO_NAME, RawTagTable, TagNamespace, TagValue, normalize_value, resolve_tag_name,
};
use crate::record::{BasicInfo, ImageMetadataRecord};

/// What a probe learns about one file before tag routing.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedImage {
    pub basic: BasicInfo,
    pub tags: RawTagTable,
}

/// The image-decoding capability used by the extractor.
///
/// [`FileProbe`] is the real implementation; anything that can produce
/// structural properties and a raw tag table for a path can stand in for it.
pub trait ImageProbe {
    /// Decode `path`. Fails with [`MetadataError::NotFound`] when the file is
    /// missing and [`MetadataError::DecodeFailure`] for everything else.
    fn probe(&self, path: &Path) -> Result<ProbedImage>;
}

/// Reads images from the filesystem with the `image` crate and tags with
/// kamadak-exif.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileProbe;

impl ImageProbe for FileProbe {
    fn probe(&self, path: &Path) -> Result<ProbedImage> {
        let basic = read_basic_info(path)?;
        let tags = exif::read_tag_table(path)?;
        log::debug!("{}: {} raw tag(s)", path.display(), tags.len());
        Ok(ProbedImage { basic, tags })
    }
}

/// Extract the metadata record for one file from disk.
///
/// Never fails: a missing or undecodable file yields a record whose `error`
/// field describes the problem.
///
/// ```rust,no_run
/// use image_metadata::extract::extract;
/// use std::path::Path;
///
/// let record = extract(Path::new("missing.png"));
/// assert!(record.error.unwrap().contains("missing.png"));
/// ```
pub fn extract(path: &Path) -> ImageMetadataRecord {
    extract_with(&FileProbe, path)
}

/// Extract one record using the given probe.
pub fn extract_with<P: ImageProbe + ?Sized>(probe: &P, path: &Path) -> ImageMetadataRecord {
    let filename = path.display().to_string();
    match probe.probe(path) {
        Ok(probed) => build_record(filename, probed),
        Err(e) => {
            log::debug!("Extraction failed: {e}");
            ImageMetadataRecord::failed(filename, e.to_string())
        }
    }
}

/// Route a probed tag table into the EXIF and GPS sections of a record.
///
/// Entries are taken in table order. A `GPSInfo` entry holding a nested table
/// is expanded into `gps_data` with GPS names and untouched values; every
/// other entry is normalized into `exif_data`. When two ids resolve to the
/// same name the later value replaces the earlier one.
pub fn build_record(filename: impl Into<String>, probed: ProbedImage) -> ImageMetadataRecord {
    let ProbedImage { basic, tags } = probed;
    let mut record = ImageMetadataRecord::new(filename, basic);

    for (id, value) in tags {
        let name = resolve_tag_name(id, TagNamespace::General);
        match value {
            TagValue::Nested(gps) if name == GPS_INFO_NAME => {
                for (gps_id, gps_value) in gps {
                    let gps_name = resolve_tag_name(gps_id, TagNamespace::Gps);
                    record.gps_data.insert(gps_name, gps_value);
                }
            }
            other => {
                let normalized = normalize_value(&other);
                if record.exif_data.insert(&*name, normalized).is_some() {
                    log::debug!("Tag {name} seen more than once, keeping the last value");
                }
            }
        }
    }

    record
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path).map(BufReader::new).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MetadataError::NotFound {
            path: path.to_path_buf(),
        },
        _ => MetadataError::decode(path, e),
    })
}

fn read_basic_info(path: &Path) -> Result<BasicInfo> {
    let decode = |e: ImageError| MetadataError::decode(path, e);

    let reader = ImageReader::new(open(path)?)
        .with_guessed_format()
        .map_err(|e| MetadataError::decode(path, e))?;
    let format = reader
        .format()
        .ok_or_else(|| MetadataError::decode(path, "cannot identify image file"))?;

    let decoder = reader.into_decoder().map_err(decode)?;
    let (width, height) = decoder.dimensions();
    let mode = mode_name(decoder.color_type());
    drop(decoder);

    let frames = count_frames(path, format)?;

    Ok(BasicInfo {
        filename: path.display().to_string(),
        width,
        height,
        format: format_name(format),
        mode,
        is_animated: frames > 1,
        frames,
    })
}

/// Frame count for formats that can animate; 1 for everything else,
/// including multi-page TIFF.
fn count_frames(path: &Path, format: ImageFormat) -> Result<u32> {
    let decode = |e: ImageError| MetadataError::decode(path, e);

    let frames = match format {
        ImageFormat::Gif => {
            let decoder = GifDecoder::new(open(path)?).map_err(decode)?;
            tally(decoder.into_frames()).map_err(decode)?
        }
        ImageFormat::Png => {
            let decoder = PngDecoder::new(open(path)?).map_err(decode)?;
            if !decoder.is_apng().map_err(decode)? {
                return Ok(1);
            }
            tally(decoder.apng().map_err(decode)?.into_frames()).map_err(decode)?
        }
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(open(path)?).map_err(decode)?;
            if !decoder.has_animation() {
                return Ok(1);
            }
            tally(decoder.into_frames()).map_err(decode)?
        }
        _ => return Ok(1),
    };

    Ok(u32::try_from(frames).unwrap_or(u32::MAX).max(1))
}

fn tally(frames: Frames<'_>) -> std::result::Result<usize, ImageError> {
    frames.into_iter().try_fold(0, |n, frame| frame.map(|_| n + 1))
}

fn mode_name(color: ColorType) -> String {
    let name = match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;32F",
        ColorType::Rgba32F => "RGBA;32F",
        other => return format!("{other:?}"),
    };
    name.to_string()
}

fn format_name(format: ImageFormat) -> String {
    let name = match format {
        ImageFormat::Jpeg => "JPEG",
        ImageFormat::Png => "PNG",
        ImageFormat::Gif => "GIF",
        ImageFormat::WebP => "WEBP",
        ImageFormat::Tiff => "TIFF",
        ImageFormat::Bmp => "BMP",
        ImageFormat::Ico => "ICO",
        other => return format!("{other:?}").to_uppercase(),
    };
    name.to_string()
}
