use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// A non-binary tag value as read from an IFD entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    /// Unsigned and signed rationals share this variant.
    Rational { num: i64, den: i64 },
    /// Multi-component values (e.g. the three rationals of a GPS coordinate).
    Tuple(Vec<Scalar>),
}

/// A raw tag value, as handed over by the tag reader.
///
/// Every IFD entry lands in exactly one of three shapes, so the extractor can
/// branch exhaustively instead of sniffing types at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Scalar(Scalar),
    Bytes(Vec<u8>),
    /// A sub-table keyed by its own id space (the GPS IFD).
    Nested(RawTagTable),
}

/// An ordered list of `(tag id, value)` pairs, in the order the file yields them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTagTable {
    entries: Vec<(u16, TagValue)>,
}

impl RawTagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: u16, value: TagValue) {
        self.entries.push((id, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &TagValue)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for RawTagTable {
    type Item = (u16, TagValue);
    type IntoIter = std::vec::IntoIter<(u16, TagValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(u16, TagValue)> for RawTagTable {
    fn from_iter<I: IntoIterator<Item = (u16, TagValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Scalar {
    /// Zero, empty text and empty tuples count as "no value".
    fn is_falsy(&self) -> bool {
        match self {
            Scalar::Text(s) => s.is_empty(),
            Scalar::Int(n) => *n == 0,
            Scalar::Float(f) => *f == 0.0,
            // 0/0 is NaN, which is a value, not zero.
            Scalar::Rational { num, den } => *num == 0 && *den != 0,
            Scalar::Tuple(items) => items.is_empty(),
        }
    }
}

impl TagValue {
    pub fn text(s: impl Into<String>) -> Self {
        TagValue::Scalar(Scalar::Text(s.into()))
    }

    pub fn int(n: i64) -> Self {
        TagValue::Scalar(Scalar::Int(n))
    }

    pub fn tuple(items: impl IntoIterator<Item = Scalar>) -> Self {
        TagValue::Scalar(Scalar::Tuple(items.into_iter().collect()))
    }

    pub fn is_falsy(&self) -> bool {
        match self {
            TagValue::Scalar(scalar) => scalar.is_falsy(),
            TagValue::Bytes(bytes) => bytes.is_empty(),
            TagValue::Nested(table) => table.is_empty(),
        }
    }
}

/// Normalize a tag value for the EXIF section of a record.
///
/// Byte sequences are decoded as UTF-8, falling back to their escaped
/// diagnostic form. Falsy values become `None`. Everything else is rendered
/// through `Display`. Total over every [`TagValue`].
pub fn normalize_value(value: &TagValue) -> Option<String> {
    match value {
        TagValue::Bytes(bytes) => Some(decode_bytes(bytes)).filter(|s| !s.is_empty()),
        v if v.is_falsy() => None,
        v => Some(v.to_string()),
    }
}

/// Decode bytes as UTF-8, or fall back to [`bytes_repr`].
pub fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => bytes_repr(bytes),
    }
}

/// Diagnostic form of a byte string: `b"ASCII\x00\xff"`. Not round-trippable.
pub fn bytes_repr(bytes: &[u8]) -> String {
    format!("b\"{}\"", bytes.escape_ascii())
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Rational { num, den } => write!(f, "{num}/{den}"),
            Scalar::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Scalar(scalar) => write!(f, "{scalar}"),
            TagValue::Bytes(bytes) => f.write_str(&bytes_repr(bytes)),
            TagValue::Nested(table) => {
                f.write_str("{")?;
                for (i, (id, value)) in table.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{id}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

// JSON shape: tuples become arrays, bytes their diagnostic string, nested
// tables an object keyed by the stringified id.

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Int(n) => serializer.serialize_i64(*n),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Rational { num, den } if *den != 0 => {
                serializer.serialize_f64(*num as f64 / *den as f64)
            }
            Scalar::Rational { num, den } => serializer.collect_str(&format_args!("{num}/{den}")),
            Scalar::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl Serialize for TagValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TagValue::Scalar(scalar) => scalar.serialize(serializer),
            TagValue::Bytes(bytes) => serializer.serialize_str(&bytes_repr(bytes)),
            TagValue::Nested(table) => table.serialize(serializer),
        }
    }
}

impl Serialize for RawTagTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, value) in self.iter() {
            map.serialize_entry(&id.to_string(), value)?;
        }
        map.end()
    }
}
