use crate::metadata::{Directory, TagValue, tags};
use crate::parser::{Result, read_full_box_header, skip_to_end};
use crate::reader::{self, Charset, RandomAccessReader};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else { None }
    }
    pub fn as_str_lossy(&self) -> String {
        self.0.iter().map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect()
    }
    pub fn read(reader: &mut dyn RandomAccessReader) -> reader::Result<Self> {
        let mut b = [0u8; 4];
        reader.read_exact(&mut b)?;
        Ok(FourCC(b))
    }
}
impl fmt::Debug for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl fmt::Display for FourCC { fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.as_str_lossy()) } }
impl PartialEq<[u8; 4]> for FourCC { fn eq(&self, other: &[u8; 4]) -> bool { &self.0 == other } }
impl PartialEq<&[u8; 4]> for FourCC { fn eq(&self, other: &&[u8; 4]) -> bool { &self.0 == *other } }
impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.as_str_lossy())
    }
}

/// The universal box header (ISO/IEC 14496-12 §4.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxHeader {
    pub offset: u64,             // absolute offset of the size field
    pub declared_size: u32,      // 0 = runs to the end of the enclosing region, 1 = see large_size
    pub large_size: Option<u64>,
    pub box_type: FourCC,
    pub user_type: Option<[u8; 16]>,
    pub header_len: u64,         // 8, 16, 24 or 32
}

impl BoxHeader {
    pub fn size(&self) -> u64 {
        self.large_size.unwrap_or(self.declared_size as u64)
    }

    /// A size-0 box extends to the end of whatever encloses it and is always
    /// the last one in its region.
    pub fn is_last_box(&self) -> bool {
        self.declared_size == 0
    }

    /// Absolute end offset, unknown for last boxes.
    pub fn end(&self) -> Option<u64> {
        if self.is_last_box() {
            None
        } else {
            Some(self.offset.saturating_add(self.size()))
        }
    }

    /// Bytes of this box not yet consumed when the cursor is at `position`.
    pub fn bytes_unread(&self, position: u64) -> u64 {
        self.size().saturating_sub(position.saturating_sub(self.offset))
    }

    pub fn user_type_hex(&self) -> Option<String> {
        self.user_type.map(hex::encode)
    }
}

impl fmt::Display for BoxHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] offset={} size={}", self.box_type, self.offset, self.size())?;
        if let Some(u) = self.user_type_hex() {
            write!(f, " uuid={u}")?;
        }
        Ok(())
    }
}

/// A box header followed by version and flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullBoxHeader {
    pub header: BoxHeader,
    pub version: u8,
    pub flags: u32, // low 24 bits
}

/// `ftyp`: brand declaration (ISO/IEC 14496-12 §4.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTypeBox {
    pub major_brand: FourCC,
    pub minor_version: u32,
    pub compatible_brands: Vec<FourCC>,
}

impl FileTypeBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        let major_brand = FourCC::read(reader)?;
        let minor_version = reader.read_u32()?;
        let mut compatible_brands = Vec::new();
        loop {
            let position = reader.position();
            // a last ftyp runs to the end of the data
            let more = match header.end() {
                Some(_) => header.bytes_unread(position) >= 4,
                None => reader.is_available(position, 4)?,
            };
            if !more {
                break;
            }
            compatible_brands.push(FourCC::read(reader)?);
        }
        skip_to_end(reader, header)?;
        Ok(Self { major_brand, minor_version, compatible_brands })
    }

    pub fn has_compatible_brand(&self, brand: &[u8; 4]) -> bool {
        self.compatible_brands.iter().any(|b| b.0 == *brand)
    }

    pub fn add_metadata(&self, directory: &mut Directory) {
        directory.set(tags::MAJOR_BRAND, TagValue::Text(self.major_brand.to_string()));
        directory.set(tags::MINOR_VERSION, TagValue::UInt(self.minor_version as u64));
        directory.set(
            tags::COMPATIBLE_BRANDS,
            TagValue::TextList(self.compatible_brands.iter().map(FourCC::to_string).collect()),
        );
    }
}

/// `hdlr`: declares what the enclosing `meta` box holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerBox {
    pub version: u8,
    pub flags: u32,
    pub handler_type: FourCC,
    pub name: String,
}

impl HandlerBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        let full = read_full_box_header(reader, header)?;
        let _pre_defined = reader.read_u32()?;
        let handler_type = FourCC::read(reader)?;

        let mut name = String::new();
        if header.bytes_unread(reader.position()) >= 12 {
            reader.skip(12)?; // reserved
            let remaining = header.bytes_unread(reader.position());
            if remaining > 0 {
                name = reader.read_null_terminated_string(remaining, Charset::Utf8)?;
            }
        }
        skip_to_end(reader, header)?;

        Ok(Self {
            version: full.version,
            flags: full.flags,
            handler_type,
            name,
        })
    }

    pub fn add_metadata(&self, directory: &mut Directory) {
        directory.set(tags::HANDLER_TYPE, TagValue::Text(self.handler_type.to_string()));
    }
}
