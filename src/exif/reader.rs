use kamadak_exif::{Context, Field, In, Reader, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::tags::GPS_INFO_TAG;
use super::value::{RawTagTable, Scalar, TagValue};
use crate::error::{MetadataError, Result};

/// Read the raw tag table of the primary image.
///
/// Entries come back in file order. GPS sub-IFD entries are grouped into a
/// single [`TagValue::Nested`] entry under [`GPS_INFO_TAG`], placed where the
/// first GPS entry was found. Thumbnail (IFD1) entries are skipped.
///
/// Malformed entries are skipped and the well-formed ones kept. A file
/// without an EXIF block, or in a container the reader does not understand,
/// yields an empty table. Only I/O faults are errors.
pub fn read_tag_table(path: &Path) -> Result<RawTagTable> {
    let file = File::open(path).map_err(|e| MetadataError::decode(path, e))?;
    let mut reader = BufReader::new(file);

    let exif = match Reader::new()
        .continue_on_error(true)
        .read_from_container(&mut reader)
    {
        Ok(exif) => exif,
        Err(kamadak_exif::Error::PartialResult(partial)) => {
            let (exif, errors) = partial.into_inner();
            for e in &errors {
                log::debug!("Skipping malformed EXIF entry in {}: {e}", path.display());
            }
            exif
        }
        Err(kamadak_exif::Error::Io(e)) => return Err(MetadataError::decode(path, e)),
        Err(e) => {
            log::debug!("No EXIF data found in {}: {e}", path.display());
            return Ok(RawTagTable::new());
        }
    };

    Ok(table_from_fields(exif.fields()))
}

fn table_from_fields<'a>(fields: impl Iterator<Item = &'a Field>) -> RawTagTable {
    let mut entries: Vec<(u16, TagValue)> = Vec::new();
    let mut gps = RawTagTable::new();
    let mut gps_slot = None;

    for field in fields.filter(|f| f.ifd_num == In::PRIMARY) {
        let id = field.tag.number();
        match field.tag.context() {
            Context::Gps => {
                gps_slot.get_or_insert(entries.len());
                gps.push(id, convert_value(&field.value));
            }
            // The pointer itself; its content arrives as GPS-context fields.
            Context::Tiff if id == GPS_INFO_TAG => {}
            _ => entries.push((id, convert_value(&field.value))),
        }
    }

    if let Some(slot) = gps_slot {
        entries.insert(slot, (GPS_INFO_TAG, TagValue::Nested(gps)));
    }

    entries.into_iter().collect()
}

/// Map an IFD value onto the closed [`TagValue`] model.
///
/// Single-component numeric values become plain scalars, multi-component
/// values become tuples. `BYTE` and `UNDEFINED` stay binary.
fn convert_value(value: &Value) -> TagValue {
    match value {
        Value::Byte(bytes) | Value::Undefined(bytes, _) => TagValue::Bytes(bytes.clone()),
        Value::Ascii(parts) => ascii_value(parts),
        Value::Short(v) => scalars(v.iter().map(|&n| Scalar::Int(n.into()))),
        Value::Long(v) => scalars(v.iter().map(|&n| Scalar::Int(n.into()))),
        Value::SByte(v) => scalars(v.iter().map(|&n| Scalar::Int(n.into()))),
        Value::SShort(v) => scalars(v.iter().map(|&n| Scalar::Int(n.into()))),
        Value::SLong(v) => scalars(v.iter().map(|&n| Scalar::Int(n.into()))),
        Value::Rational(v) => scalars(v.iter().map(|r| Scalar::Rational {
            num: r.num.into(),
            den: r.denom.into(),
        })),
        Value::SRational(v) => scalars(v.iter().map(|r| Scalar::Rational {
            num: r.num.into(),
            den: r.denom.into(),
        })),
        Value::Float(v) => scalars(v.iter().map(|&f| Scalar::Float(f.into()))),
        Value::Double(v) => scalars(v.iter().map(|&f| Scalar::Float(f))),
        Value::Unknown(typ, count, _) => {
            TagValue::text(format!("<unknown type {typ}, {count} components>"))
        }
    }
}

fn scalars(items: impl Iterator<Item = Scalar>) -> TagValue {
    let mut items: Vec<Scalar> = items.collect();
    if items.len() == 1 {
        TagValue::Scalar(items.remove(0))
    } else {
        TagValue::Scalar(Scalar::Tuple(items))
    }
}

/// ASCII fields may hold several NUL-separated strings. Non-UTF-8 content
/// stays binary so normalization can render it diagnostically.
fn ascii_value(parts: &[Vec<u8>]) -> TagValue {
    match parts {
        [] => TagValue::text(""),
        [single] => match std::str::from_utf8(single) {
            Ok(s) => TagValue::text(s),
            Err(_) => TagValue::Bytes(single.clone()),
        },
        _ => {
            let texts: Option<Vec<Scalar>> = parts
                .iter()
                .map(|p| std::str::from_utf8(p).ok().map(|s| Scalar::Text(s.to_owned())))
                .collect();
            match texts {
                Some(texts) => TagValue::Scalar(Scalar::Tuple(texts)),
                None => TagValue::Bytes(parts.join(&0u8)),
            }
        }
    }
}
