//! Decoders for payloads embedded in the box tree (EXIF items, ICC profiles).
//!
//! Box handlers only locate these payloads. What is made of them is up to a
//! [`SegmentDecoder`]; the default ones record the raw data plus the few
//! header fields needed to tell whether the payload is sane.

use crate::boxes::FourCC;
use crate::metadata::{EXIF_DIRECTORY, ICC_DIRECTORY, Metadata, TagValue};
use crate::reader::{ByteArrayReader, Endianness, RandomAccessReader};
use anyhow::{Context, bail, ensure};

/// Decodes an embedded payload into `metadata`.
///
/// The reader is positioned at local offset 0 of the payload. Errors are
/// reported back to the box walker, which records them as warnings and keeps
/// going.
pub trait SegmentDecoder: Send + Sync {
    fn extract(&self, reader: &mut dyn RandomAccessReader, metadata: &mut Metadata) -> anyhow::Result<()>;
}

/// The decoders a walk hands embedded payloads to.
pub struct Decoders {
    pub exif: Box<dyn SegmentDecoder>,
    pub icc: Box<dyn SegmentDecoder>,
}

impl Default for Decoders {
    fn default() -> Self {
        Self {
            exif: Box::new(ExifSegmentDecoder),
            icc: Box::new(IccProfileDecoder),
        }
    }
}

fn read_all(reader: &mut dyn RandomAccessReader) -> anyhow::Result<Vec<u8>> {
    let len = reader.length().unwrap_or(0);
    let start = reader.position();
    Ok(reader.read_bytes(len.saturating_sub(start))?)
}

/// Records TIFF-structured EXIF data: byte order, IFD0 location and entry
/// count, and the data itself.
pub struct ExifSegmentDecoder;

impl SegmentDecoder for ExifSegmentDecoder {
    fn extract(&self, reader: &mut dyn RandomAccessReader, metadata: &mut Metadata) -> anyhow::Result<()> {
        let data = read_all(reader)?;
        let directory = metadata.directory_mut(EXIF_DIRECTORY);
        directory.set("TIFF Data", TagValue::Bytes(data.clone()));

        let mut tiff = ByteArrayReader::new(&data);
        let mut order = [0u8; 2];
        tiff.read_exact(&mut order).context("reading TIFF byte order")?;
        let (endianness, name) = match &order {
            b"II" => (Endianness::Little, "Intel"),
            b"MM" => (Endianness::Big, "Motorola"),
            other => bail!("unknown TIFF byte order marker {:02x?}", other),
        };
        tiff.set_endianness(endianness);
        directory.set("Byte Order", TagValue::Text(name.to_string()));

        let marker = tiff.read_u16().context("reading TIFF marker")?;
        ensure!(marker == 0x2A, "unexpected TIFF marker {marker:#06x}");

        let ifd0 = tiff.read_u32().context("reading IFD0 offset")?;
        directory.set("IFD0 Offset", TagValue::UInt(ifd0 as u64));
        tiff.seek(ifd0 as u64).context("seeking to IFD0")?;
        let entries = tiff.read_u16().context("reading IFD0 entry count")?;
        directory.set("IFD0 Entry Count", TagValue::UInt(entries as u64));
        Ok(())
    }
}

const ICC_HEADER_LEN: u64 = 128;
const ICC_SIGNATURE: FourCC = FourCC(*b"acsp");

/// Records the fixed 128-byte ICC profile header fields and the profile data.
pub struct IccProfileDecoder;

impl SegmentDecoder for IccProfileDecoder {
    fn extract(&self, reader: &mut dyn RandomAccessReader, metadata: &mut Metadata) -> anyhow::Result<()> {
        let data = read_all(reader)?;
        let directory = metadata.directory_mut(ICC_DIRECTORY);
        directory.set("Profile Data", TagValue::Bytes(data.clone()));

        ensure!(
            data.len() as u64 >= ICC_HEADER_LEN,
            "ICC profile too short ({} bytes)",
            data.len()
        );

        let mut icc = ByteArrayReader::new(&data);
        let size = icc.read_u32()?;
        let cmm = FourCC::read(&mut icc)?;
        let version = icc.read_u32()?;
        let class = FourCC::read(&mut icc)?;
        let colour_space = FourCC::read(&mut icc)?;
        let connection_space = FourCC::read(&mut icc)?;
        icc.skip(12)?; // creation date
        let signature = FourCC::read(&mut icc)?;
        ensure!(signature == ICC_SIGNATURE, "invalid ICC signature {signature}");

        directory.set("Profile Size", TagValue::UInt(size as u64));
        directory.set("Preferred CMM Type", TagValue::Text(cmm.to_string()));
        directory.set(
            "Profile Version",
            TagValue::Text(format!(
                "{}.{}.{}",
                version >> 24,
                (version >> 20) & 0x0F,
                (version >> 16) & 0x0F
            )),
        );
        directory.set("Profile Class", TagValue::Text(class.to_string()));
        directory.set("Colour Space", TagValue::Text(colour_space.to_string()));
        directory.set("Profile Connection Space", TagValue::Text(connection_space.to_string()));
        Ok(())
    }
}
