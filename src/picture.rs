use crate::boxes::BoxHeader;
use crate::handler::{BoxHandler, Extraction};
use crate::items::{ConstructionMethod, ItemInfoBox, ItemLocationBox, ItemProtectionBox, PrimaryItemBox};
use crate::known_boxes::KnownBox;
use crate::parser::{Result, skip_to_end};
use crate::properties::{
    AuxiliaryTypeProperty, ColourInformationBox, ImageRotationBox, ImageSpatialExtentsProperty,
    PixelInformationBox,
};
use crate::reader::RandomAccessReader;
use log::{debug, warn};

/// Bytes in front of the TIFF data of an EXIF item: a 4-byte header offset
/// followed by `Exif\0\0`.
pub const EXIF_PREAMBLE_LEN: usize = 4 + 6;

/// Handler for a `meta` box with the `pict` role.
///
/// Image properties are published as they are read. The item tables are held
/// until the region is done, when the EXIF item they describe is located and
/// handed to the EXIF decoder.
#[derive(Debug, Default)]
pub struct PictureHandler {
    item_protection: Option<ItemProtectionBox>,
    primary_item: Option<PrimaryItemBox>,
    item_info: Option<ItemInfoBox>,
    item_location: Option<ItemLocationBox>,
}

impl PictureHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_info(&self) -> Option<&ItemInfoBox> {
        self.item_info.as_ref()
    }

    pub fn item_location(&self) -> Option<&ItemLocationBox> {
        self.item_location.as_ref()
    }

    pub fn item_protection(&self) -> Option<&ItemProtectionBox> {
        self.item_protection.as_ref()
    }

    fn extract_exif(&self, reader: &mut dyn RandomAccessReader, cx: &mut Extraction<'_>) -> Result<()> {
        let Some(entry) = self.item_info.as_ref().and_then(ItemInfoBox::exif_entry) else {
            return Ok(());
        };
        let item_id = entry.item_id;

        let Some(location) = self.item_location.as_ref().and_then(|iloc| iloc.location(item_id)) else {
            cx.heif()
                .add_warning(format!("No item location found for Exif item {item_id}"));
            return Ok(());
        };
        if location.construction_method != ConstructionMethod::File {
            cx.heif().add_warning(format!(
                "Exif item {item_id} uses unsupported construction method {:?}",
                location.construction_method
            ));
            return Ok(());
        }
        let Some(extent) = location.extents.first() else {
            cx.heif()
                .add_warning(format!("Exif item {item_id} has no extents"));
            return Ok(());
        };
        if location.extents.len() > 1 {
            debug!("Exif item {item_id}: {} extents, reading the first", location.extents.len());
        }

        let saved = reader.position();
        let data = read_extent(reader, extent.offset, extent.length);
        reader.seek(saved)?;
        let data = match data {
            Ok(data) => data,
            Err(e) => {
                cx.heif()
                    .add_warning(format!("Exif item {item_id} could not be read: {e}"));
                return Ok(());
            }
        };

        if data.len() < EXIF_PREAMBLE_LEN {
            cx.heif().add_warning(format!(
                "Exif item {item_id} is too short ({} bytes)",
                data.len()
            ));
            return Ok(());
        }
        cx.decode_exif(&data, EXIF_PREAMBLE_LEN);
        Ok(())
    }
}

/// Read one extent. A length of 0 runs to the end of the source.
fn read_extent(reader: &mut dyn RandomAccessReader, offset: u64, length: u64) -> Result<Vec<u8>> {
    let length = match (length, reader.length()) {
        (0, Some(total)) => total.saturating_sub(offset),
        _ => length,
    };
    reader.seek(offset)?;
    Ok(reader.read_bytes(length)?)
}

impl BoxHandler for PictureHandler {
    fn should_accept_container(&self, header: &BoxHeader) -> bool {
        matches!(KnownBox::from(header.box_type), KnownBox::Iprp | KnownBox::Ipco)
    }

    fn should_accept_box(&self, header: &BoxHeader) -> bool {
        matches!(
            KnownBox::from(header.box_type),
            KnownBox::Ipro
                | KnownBox::Pitm
                | KnownBox::Iinf
                | KnownBox::Iloc
                | KnownBox::Ispe
                | KnownBox::AuxC
                | KnownBox::Irot
                | KnownBox::Colr
                | KnownBox::Pixi
        )
    }

    /// Property containers are skipped without descending.
    fn process_container(
        &mut self,
        _depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        _cx: &mut Extraction<'_>,
    ) -> Result<()> {
        skip_to_end(reader, header)
    }

    fn process_box(
        &mut self,
        _depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()> {
        match KnownBox::from(header.box_type) {
            KnownBox::Ipro => self.item_protection = Some(ItemProtectionBox::read(reader, header)?),
            KnownBox::Pitm => self.primary_item = Some(PrimaryItemBox::read(reader, header)?),
            KnownBox::Iinf => self.item_info = Some(ItemInfoBox::read(reader, header)?),
            KnownBox::Iloc => self.item_location = Some(ItemLocationBox::read(reader, header)?),
            KnownBox::Ispe => ImageSpatialExtentsProperty::read(reader, header)?.add_metadata(cx.heif()),
            KnownBox::AuxC => AuxiliaryTypeProperty::read(reader, header)?.add_metadata(cx.heif()),
            KnownBox::Irot => ImageRotationBox::read(reader, header)?.add_metadata(cx.heif()),
            KnownBox::Pixi => PixelInformationBox::read(reader, header)?.add_metadata(cx.heif()),
            KnownBox::Colr => {
                let colour = ColourInformationBox::read(reader, header)?;
                colour.add_metadata(cx.heif());
                if let Some(profile) = colour.icc_profile() {
                    cx.decode_icc(profile);
                }
            }
            other => {
                warn!("picture handler accepted {other:?} without a decoder");
                skip_to_end(reader, header)?;
            }
        }
        Ok(())
    }

    fn process_completed(
        &mut self,
        _depth: usize,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()> {
        if let Some(primary) = &self.primary_item {
            primary.add_metadata(cx.heif());
        }
        if let Some(ipro) = &self.item_protection {
            debug!("{} item protection scheme(s)", ipro.schemes.len());
        }
        self.extract_exif(reader, cx)
    }
}
