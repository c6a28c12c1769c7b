//! Item tables from the `meta` box: item info, item locations, primary item
//! and item protection (ISO/IEC 14496-12 §8.11).

use crate::boxes::{BoxHeader, FourCC};
use crate::metadata::{Directory, TagValue, tags};
use crate::parser::{Result, read_box_header, read_full_box_header, skip_to_end};
use crate::reader::{Charset, RandomAccessReader};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

pub const ITEM_TYPE_EXIF: FourCC = FourCC(*b"Exif");
pub const ITEM_TYPE_MIME: FourCC = FourCC(*b"mime");
pub const ITEM_TYPE_URI: FourCC = FourCC(*b"uri ");

/// One `infe` entry. Which fields can be present depends on the version:
/// 0 and 1 carry name/content type/extension strings, 2 and 3 carry an item
/// type followed by type-specific strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemInfoEntry {
    pub version: u8,
    pub flags: u32,
    pub item_id: u32,
    pub item_protection_index: u16,
    pub item_name: Option<String>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub extension_type: Option<String>,
    pub item_type: Option<FourCC>,
    pub item_uri_type: Option<String>,
}

impl ItemInfoEntry {
    /// Every optional field is read only while bytes remain before the end of
    /// the entry, so short entries never read into the next box.
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        let full = read_full_box_header(reader, header)?;
        let mut entry = ItemInfoEntry {
            version: full.version,
            flags: full.flags,
            ..Default::default()
        };

        if full.version <= 1 {
            entry.item_id = reader.read_u16()? as u32;
            entry.item_protection_index = reader.read_u16()?;

            let remaining = header.bytes_unread(reader.position());
            if remaining > 0 {
                entry.item_name = Some(reader.read_null_terminated_string(remaining, Charset::Utf8)?);

                let remaining = header.bytes_unread(reader.position());
                if remaining > 0 {
                    entry.content_type = Some(reader.read_null_terminated_string(remaining, Charset::Utf8)?);

                    let remaining = header.bytes_unread(reader.position());
                    if remaining > 0 {
                        entry.extension_type = Some(reader.read_null_terminated_string(remaining, Charset::Utf8)?);
                    }
                }
            }

            if full.version == 1 && header.bytes_unread(reader.position()) >= 4 {
                entry.content_encoding = Some(reader.read_string(4, Charset::Latin1)?);
            }
        } else {
            entry.item_id = if full.version == 2 {
                reader.read_u16()? as u32
            } else {
                reader.read_u32()?
            };
            entry.item_protection_index = reader.read_u16()?;
            let item_type = FourCC::read(reader)?;
            entry.item_type = Some(item_type);

            let remaining = header.bytes_unread(reader.position());
            if remaining > 0 {
                entry.item_name = Some(reader.read_null_terminated_string(remaining, Charset::Utf8)?);

                if item_type == ITEM_TYPE_MIME {
                    let remaining = header.bytes_unread(reader.position());
                    if remaining > 0 {
                        entry.content_type = Some(reader.read_null_terminated_string(remaining, Charset::Utf8)?);

                        let remaining = header.bytes_unread(reader.position());
                        if remaining > 0 {
                            entry.content_encoding =
                                Some(reader.read_null_terminated_string(remaining, Charset::Utf8)?);
                        }
                    }
                } else if item_type == ITEM_TYPE_URI {
                    let remaining = header.bytes_unread(reader.position());
                    if remaining > 0 {
                        entry.item_uri_type = Some(reader.read_string(remaining, Charset::Utf8)?);
                    }
                }
            }
        }

        skip_to_end(reader, header)?;
        Ok(entry)
    }

    pub fn is_exif(&self) -> bool {
        self.item_type == Some(ITEM_TYPE_EXIF)
    }
}

/// `iinf`: the item info table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemInfoBox {
    pub version: u8,
    pub entries: Vec<ItemInfoEntry>,
    /// Index into `entries` of the (last) entry whose item type is `Exif`.
    exif_entry: Option<usize>,
}

impl ItemInfoBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        let full = read_full_box_header(reader, header)?;
        let entry_count = if full.version == 0 {
            reader.read_u16()? as u32
        } else {
            reader.read_u32()?
        };

        let mut entries = Vec::new();
        let mut exif_entry = None;
        for _ in 0..entry_count {
            let entry_header = read_box_header(reader)?;
            if entry_header.box_type != b"infe" {
                debug!("iinf: unexpected entry box {entry_header}");
            }
            let entry = ItemInfoEntry::read(reader, &entry_header)?;
            if entry.is_exif() {
                exif_entry = Some(entries.len());
            }
            entries.push(entry);
            if entry_header.is_last_box() {
                break;
            }
        }

        skip_to_end(reader, header)?;
        Ok(Self {
            version: full.version,
            entries,
            exif_entry,
        })
    }

    pub fn exif_entry(&self) -> Option<&ItemInfoEntry> {
        self.exif_entry.map(|i| &self.entries[i])
    }

    pub fn entry(&self, item_id: u32) -> Option<&ItemInfoEntry> {
        self.entries.iter().find(|e| e.item_id == item_id)
    }
}

/// Where an item's extents are to be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstructionMethod {
    /// Absolute offsets into the file.
    File,
    /// Offsets into the `idat` box of the same `meta` box.
    Idat,
    /// Offsets into another item's data.
    Item,
    Reserved(u8),
}

impl From<u8> for ConstructionMethod {
    fn from(v: u8) -> Self {
        match v {
            0 => ConstructionMethod::File,
            1 => ConstructionMethod::Idat,
            2 => ConstructionMethod::Item,
            n => ConstructionMethod::Reserved(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub index: Option<u64>,
    /// Base offset plus extent offset, relative to whatever the construction
    /// method designates.
    pub offset: u64,
    /// 0 means "to the end of the source".
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLocation {
    pub item_id: u32,
    pub construction_method: ConstructionMethod,
    pub data_reference_index: u16,
    pub base_offset: u64,
    pub extents: Vec<Extent>,
}

/// `iloc`: item id to extents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemLocationBox {
    pub version: u8,
    pub offset_size: u8,
    pub length_size: u8,
    pub base_offset_size: u8,
    pub index_size: u8,
    pub locations: BTreeMap<u32, ItemLocation>,
}

impl ItemLocationBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        let full = read_full_box_header(reader, header)?;
        let version = full.version;

        let sizes = reader.read_u8()?;
        let offset_size = sizes >> 4;
        let length_size = sizes & 0x0F;
        let sizes = reader.read_u8()?;
        let base_offset_size = sizes >> 4;
        let index_size = if version >= 1 { sizes & 0x0F } else { 0 };

        let item_count = if version < 2 {
            reader.read_u16()? as u32
        } else {
            reader.read_u32()?
        };

        let mut locations = BTreeMap::new();
        for _ in 0..item_count {
            let item_id = if version < 2 {
                reader.read_u16()? as u32
            } else {
                reader.read_u32()?
            };
            let construction_method = if version >= 1 {
                ConstructionMethod::from((reader.read_u16()? & 0x0F) as u8)
            } else {
                ConstructionMethod::File
            };
            let data_reference_index = reader.read_u16()?;
            let base_offset = reader.read_uint(base_offset_size)?;
            let extent_count = reader.read_u16()?;

            let mut extents = Vec::with_capacity(extent_count as usize);
            for _ in 0..extent_count {
                let index = if version >= 1 && index_size > 0 {
                    Some(reader.read_uint(index_size)?)
                } else {
                    None
                };
                let offset = reader.read_uint(offset_size)?;
                let length = reader.read_uint(length_size)?;
                extents.push(Extent {
                    index,
                    offset: base_offset.saturating_add(offset),
                    length,
                });
            }

            locations.insert(
                item_id,
                ItemLocation {
                    item_id,
                    construction_method,
                    data_reference_index,
                    base_offset,
                    extents,
                },
            );
        }

        skip_to_end(reader, header)?;
        Ok(Self {
            version,
            offset_size,
            length_size,
            base_offset_size,
            index_size,
            locations,
        })
    }

    pub fn location(&self, item_id: u32) -> Option<&ItemLocation> {
        self.locations.get(&item_id)
    }
}

/// `pitm`: id of the primary item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrimaryItemBox {
    pub item_id: u32,
}

impl PrimaryItemBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        let full = read_full_box_header(reader, header)?;
        let item_id = if full.version == 0 {
            reader.read_u16()? as u32
        } else {
            reader.read_u32()?
        };
        skip_to_end(reader, header)?;
        Ok(Self { item_id })
    }

    pub fn add_metadata(&self, directory: &mut Directory) {
        directory.set(tags::PRIMARY_ITEM_ID, TagValue::UInt(self.item_id as u64));
    }
}

/// One protection scheme (`sinf`) inside `ipro`. Only its header is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectionScheme {
    pub box_type: FourCC,
    pub size: u64,
}

/// `ipro`: item protection schemes, kept opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemProtectionBox {
    pub schemes: Vec<ProtectionScheme>,
}

impl ItemProtectionBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        read_full_box_header(reader, header)?;
        let protection_count = reader.read_u16()?;

        let mut schemes = Vec::new();
        for _ in 0..protection_count {
            let scheme = read_box_header(reader)?;
            skip_to_end(reader, &scheme)?;
            schemes.push(ProtectionScheme {
                box_type: scheme.box_type,
                size: scheme.size(),
            });
            if scheme.is_last_box() {
                break;
            }
        }

        skip_to_end(reader, header)?;
        Ok(Self { schemes })
    }
}
