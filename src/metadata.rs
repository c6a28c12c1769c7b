//! Result model: a [`Metadata`] is a list of named [`Directory`]s, each an
//! ordered set of tags plus warnings.

use serde::Serialize;
use std::fmt;

pub const HEIF_DIRECTORY: &str = "HEIF";
pub const EXIF_DIRECTORY: &str = "Exif";
pub const ICC_DIRECTORY: &str = "ICC Profile";

/// Tag names published into the HEIF directory.
pub mod tags {
    pub const MAJOR_BRAND: &str = "Major Brand";
    pub const MINOR_VERSION: &str = "Minor Version";
    pub const COMPATIBLE_BRANDS: &str = "Compatible Brands";
    pub const HANDLER_TYPE: &str = "Handler Type";
    pub const PRIMARY_ITEM_ID: &str = "Primary Item ID";
    pub const IMAGE_WIDTH: &str = "Image Width";
    pub const IMAGE_HEIGHT: &str = "Image Height";
    pub const IMAGE_ROTATION: &str = "Image Rotation";
    pub const AUXILIARY_TYPE: &str = "Auxiliary Type";
    pub const COLOUR_TYPE: &str = "Colour Type";
    pub const COLOUR_PRIMARIES: &str = "Colour Primaries";
    pub const TRANSFER_CHARACTERISTICS: &str = "Transfer Characteristics";
    pub const MATRIX_COEFFICIENTS: &str = "Matrix Coefficients";
    pub const FULL_RANGE: &str = "Full Range";
    pub const BITS_PER_CHANNEL: &str = "Bits Per Channel";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    UInt(u64),
    Bool(bool),
    Text(String),
    TextList(Vec<String>),
    UIntList(Vec<u64>),
    Bytes(Vec<u8>),
}

impl TagValue {
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            TagValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::UInt(v) => write!(f, "{v}"),
            TagValue::Bool(v) => write!(f, "{v}"),
            TagValue::Text(s) => f.write_str(s),
            TagValue::TextList(v) => f.write_str(&v.join(" ")),
            TagValue::UIntList(v) => {
                let parts: Vec<String> = v.iter().map(u64::to_string).collect();
                f.write_str(&parts.join(" "))
            }
            TagValue::Bytes(b) => write!(f, "[{} bytes]", b.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    pub value: TagValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directory {
    pub name: String,
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Directory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Set a tag, replacing any earlier value under the same name.
    pub fn set(&mut self, name: &str, value: TagValue) {
        match self.tags.iter_mut().find(|t| t.name == name) {
            Some(tag) => tag.value = value,
            None => self.tags.push(Tag {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.iter().find(|t| t.name == name).map(|t| &t.value)
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub directories: Vec<Directory>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the directory called `name`, creating it if needed.
    pub fn directory_mut(&mut self, name: &str) -> &mut Directory {
        let idx = match self.directories.iter().position(|d| d.name == name) {
            Some(idx) => idx,
            None => {
                self.directories.push(Directory::new(name));
                self.directories.len() - 1
            }
        };
        &mut self.directories[idx]
    }

    pub fn directory(&self, name: &str) -> Option<&Directory> {
        self.directories.iter().find(|d| d.name == name)
    }

    pub fn heif(&self) -> Option<&Directory> {
        self.directory(HEIF_DIRECTORY)
    }

    /// All warnings across directories, prefixed by directory name.
    pub fn warnings(&self) -> impl Iterator<Item = String> + '_ {
        self.directories
            .iter()
            .flat_map(|d| d.warnings.iter().map(move |w| format!("{}: {}", d.name, w)))
    }
}
