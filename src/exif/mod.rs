//! EXIF tag reading, naming, and value normalization.
//!
//! - [`read_tag_table`] — read the raw tag table of an image file
//! - [`resolve_tag_name`] — map a numeric tag id to its conventional name
//! - [`normalize_value`] — turn a raw value into a serializable string
//!
//! The name tables are static and sorted; lookups never fail and fall back
//! to the decimal id for unknown tags.

mod reader;
mod tags;
mod value;

pub use reader::read_tag_table;
pub use tags::{GPS_INFO_NAME, GPS_INFO_TAG, TagNamespace, resolve_tag_name};
pub use value::{RawTagTable, Scalar, TagValue, bytes_repr, decode_bytes, normalize_value};
