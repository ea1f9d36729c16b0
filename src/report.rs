//! Plain-text rendering of records for the terminal.

use std::fmt::Write;

use crate::record::ImageMetadataRecord;

const RULE_WIDTH: usize = 50;

/// Render one record as a human-readable block.
///
/// Failed records show only the error. EXIF values longer than `max_len`
/// characters are cut and suffixed with `...`; an empty EXIF section is
/// reported as such instead of being omitted.
pub fn render_record(record: &ImageMetadataRecord, max_len: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Processing Image: {}", record.filename);
    let _ = writeln!(out, "{rule}");

    if let Some(err) = &record.error {
        let _ = writeln!(out, "ERROR: {err}");
        return out;
    }

    if let Some(info) = &record.basic_info {
        let _ = writeln!(out, "\nBasic Image Info:");
        row(&mut out, "filename", &info.filename);
        row(&mut out, "size", &format!("({}, {})", info.width, info.height));
        row(&mut out, "height", &info.height.to_string());
        row(&mut out, "width", &info.width.to_string());
        row(&mut out, "format", &info.format);
        row(&mut out, "mode", &info.mode);
        row(&mut out, "is_animated", &info.is_animated.to_string());
        row(&mut out, "frames", &info.frames.to_string());
    }

    if record.exif_data.is_empty() {
        let _ = writeln!(out, "\nNo EXIF data found.");
    } else {
        let _ = writeln!(out, "\nEXIF Data:");
        for (tag, value) in record.exif_data.iter() {
            let shown = match value {
                Some(v) => truncate_display(v, max_len),
                None => "None".to_string(),
            };
            row(&mut out, tag, &shown);
        }
    }

    if !record.gps_data.is_empty() {
        let _ = writeln!(out, "\nGPS Data:");
        for (tag, value) in record.gps_data.iter() {
            row(&mut out, tag, &value.to_string());
        }
    }

    let _ = writeln!(out, "\n{}", "-".repeat(RULE_WIDTH));
    out
}

/// Cut `value` to `max_len` characters, appending `...` when anything was cut.
pub fn truncate_display(value: &str, max_len: usize) -> String {
    match value.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_string(),
    }
}

fn row(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "  {key:<20}: {value}");
}
