use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::exif::TagValue;

/// Structural properties of a decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicInfo {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    /// Encoded format, upper-case (`JPEG`, `PNG`, ...).
    pub format: String,
    /// Color mode (`RGB`, `RGBA`, `L`, ...).
    pub mode: String,
    pub is_animated: bool,
    pub frames: u32,
}

impl BasicInfo {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Serialize for BasicInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("BasicInfo", 8)?;
        s.serialize_field("filename", &self.filename)?;
        // (width, height) serializes as a two-element array.
        s.serialize_field("size", &self.size())?;
        s.serialize_field("height", &self.height)?;
        s.serialize_field("width", &self.width)?;
        s.serialize_field("format", &self.format)?;
        s.serialize_field("mode", &self.mode)?;
        s.serialize_field("is_animated", &self.is_animated)?;
        s.serialize_field("frames", &self.frames)?;
        s.end()
    }
}

/// Insertion-ordered name → value map.
///
/// Re-inserting an existing name replaces the value in place, so the last
/// value wins while the entry keeps its first position.
#[derive(Debug, Clone, PartialEq)]
pub struct TagMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for TagMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> TagMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous value for `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for TagMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// The extraction result for one file.
///
/// Either `error` is `None` and `basic_info` is populated, or `error` holds
/// the failure and every data field is empty.
///
/// # Example
///
/// ```rust,no_run
/// use image_metadata::extract::extract;
/// use std::path::Path;
///
/// let record = extract(Path::new("photo.jpg"));
/// match (&record.error, &record.basic_info) {
///     (Some(err), _) => eprintln!("{err}"),
///     (None, Some(info)) => println!("{} {}x{}", info.format, info.width, info.height),
///     (None, None) => unreachable!(),
/// }
/// for (tag, value) in record.exif_data.iter() {
///     println!("{tag}: {value:?}");
/// }
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ImageMetadataRecord {
    /// The source path as supplied by discovery.
    pub filename: String,
    #[serde(serialize_with = "basic_info_or_empty")]
    pub basic_info: Option<BasicInfo>,
    /// Resolved tag name → normalized value. `None` marks a present but empty tag.
    pub exif_data: TagMap<Option<String>>,
    /// Resolved GPS sub-tag name → value in its native form.
    pub gps_data: TagMap<TagValue>,
    pub error: Option<String>,
}

/// Records of one run, in discovery order.
pub type MetadataBatch = Vec<ImageMetadataRecord>;

impl ImageMetadataRecord {
    pub fn new(filename: impl Into<String>, basic_info: BasicInfo) -> Self {
        Self {
            filename: filename.into(),
            basic_info: Some(basic_info),
            exif_data: TagMap::new(),
            gps_data: TagMap::new(),
            error: None,
        }
    }

    pub fn failed(filename: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            basic_info: None,
            exif_data: TagMap::new(),
            gps_data: TagMap::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

fn basic_info_or_empty<S: Serializer>(
    info: &Option<BasicInfo>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match info {
        Some(info) => info.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}
