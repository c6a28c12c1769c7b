//! Image property boxes (ISO/IEC 23008-12 §6.5) that map straight onto
//! directory tags.

use crate::boxes::{BoxHeader, FourCC};
use crate::metadata::{Directory, TagValue, tags};
use crate::parser::{Result, read_full_box_header, skip_to_end};
use crate::reader::{Charset, RandomAccessReader};
use serde::Serialize;

/// `ispe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageSpatialExtentsProperty {
    pub width: u32,
    pub height: u32,
}

impl ImageSpatialExtentsProperty {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        read_full_box_header(reader, header)?;
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        skip_to_end(reader, header)?;
        Ok(Self { width, height })
    }

    pub fn add_metadata(&self, directory: &mut Directory) {
        directory.set(tags::IMAGE_WIDTH, TagValue::UInt(self.width as u64));
        directory.set(tags::IMAGE_HEIGHT, TagValue::UInt(self.height as u64));
    }
}

/// `irot`: anti-clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageRotationBox {
    pub angle: u8,
}

impl ImageRotationBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        // top 6 bits reserved
        let angle = reader.read_u8()? & 0x03;
        skip_to_end(reader, header)?;
        Ok(Self { angle })
    }

    /// The first rotation seen wins.
    pub fn add_metadata(&self, directory: &mut Directory) {
        if !directory.contains(tags::IMAGE_ROTATION) {
            directory.set(tags::IMAGE_ROTATION, TagValue::UInt(self.angle as u64));
        }
    }
}

/// `auxC`: URN naming the kind of auxiliary image (alpha, depth, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuxiliaryTypeProperty {
    pub aux_type: String,
    pub aux_subtype: Vec<u8>,
}

impl AuxiliaryTypeProperty {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        read_full_box_header(reader, header)?;
        let mut aux_type = String::new();
        let remaining = header.bytes_unread(reader.position());
        if remaining > 0 {
            aux_type = reader.read_null_terminated_string(remaining, Charset::Utf8)?;
        }
        let aux_subtype = reader.read_bytes(header.bytes_unread(reader.position()))?;
        skip_to_end(reader, header)?;
        Ok(Self { aux_type, aux_subtype })
    }

    pub fn add_metadata(&self, directory: &mut Directory) {
        directory.set(tags::AUXILIARY_TYPE, TagValue::Text(self.aux_type.clone()));
    }
}

pub const COLOUR_TYPE_NCLX: FourCC = FourCC(*b"nclx");
pub const COLOUR_TYPE_RESTRICTED_ICC: FourCC = FourCC(*b"rICC");
pub const COLOUR_TYPE_ICC: FourCC = FourCC(*b"prof");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ColourInformation {
    Nclx {
        colour_primaries: u16,
        transfer_characteristics: u16,
        matrix_coefficients: u16,
        full_range: bool,
    },
    /// Raw ICC profile from a `rICC` or `prof` box.
    Icc(Vec<u8>),
    Unknown,
}

/// `colr`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColourInformationBox {
    pub colour_type: FourCC,
    pub info: ColourInformation,
}

impl ColourInformationBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        let colour_type = FourCC::read(reader)?;
        let info = if colour_type == COLOUR_TYPE_NCLX {
            let colour_primaries = reader.read_u16()?;
            let transfer_characteristics = reader.read_u16()?;
            let matrix_coefficients = reader.read_u16()?;
            // low 7 bits reserved
            let full_range = (reader.read_u8()? & 0x80) >> 7 == 1;
            ColourInformation::Nclx {
                colour_primaries,
                transfer_characteristics,
                matrix_coefficients,
                full_range,
            }
        } else if colour_type == COLOUR_TYPE_RESTRICTED_ICC || colour_type == COLOUR_TYPE_ICC {
            ColourInformation::Icc(reader.read_bytes(header.bytes_unread(reader.position()))?)
        } else {
            ColourInformation::Unknown
        };
        skip_to_end(reader, header)?;
        Ok(Self { colour_type, info })
    }

    pub fn icc_profile(&self) -> Option<&[u8]> {
        match &self.info {
            ColourInformation::Icc(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn add_metadata(&self, directory: &mut Directory) {
        directory.set(tags::COLOUR_TYPE, TagValue::Text(self.colour_type.to_string()));
        if let ColourInformation::Nclx {
            colour_primaries,
            transfer_characteristics,
            matrix_coefficients,
            full_range,
        } = self.info
        {
            directory.set(tags::COLOUR_PRIMARIES, TagValue::UInt(colour_primaries as u64));
            directory.set(tags::TRANSFER_CHARACTERISTICS, TagValue::UInt(transfer_characteristics as u64));
            directory.set(tags::MATRIX_COEFFICIENTS, TagValue::UInt(matrix_coefficients as u64));
            directory.set(tags::FULL_RANGE, TagValue::Bool(full_range));
        }
    }
}

/// `pixi`: bit depth of each channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PixelInformationBox {
    pub bits_per_channel: Vec<u8>,
}

impl PixelInformationBox {
    pub fn read(reader: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<Self> {
        read_full_box_header(reader, header)?;
        let channels = reader.read_u8()?;
        let bits_per_channel = reader.read_bytes(channels as u64)?;
        skip_to_end(reader, header)?;
        Ok(Self { bits_per_channel })
    }

    pub fn add_metadata(&self, directory: &mut Directory) {
        directory.set(
            tags::BITS_PER_CHANNEL,
            TagValue::UIntList(self.bits_per_channel.iter().map(|&b| b as u64).collect()),
        );
    }
}
