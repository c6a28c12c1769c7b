use crate::boxes::{BoxHeader, FileTypeBox, FourCC, HandlerBox};
use crate::handler::{BoxHandler, Extraction, InertHandler, handler_for};
use crate::known_boxes::KnownBox;
use crate::parser::{Region, Result, read_box_header, read_full_box_header, skip_to_end, walk};
use crate::reader::RandomAccessReader;
use log::{debug, warn};

pub const REQUIRED_BRAND: FourCC = FourCC(*b"mif1");

/// Handler for the top level of a HEIF file.
///
/// Decodes `ftyp` and hands the contents of `meta` to the handler matching
/// the role its `hdlr` box declares. Everything else is skipped.
#[derive(Debug, Default)]
pub struct HeifBoxHandler;

impl HeifBoxHandler {
    pub fn new() -> Self {
        Self
    }

    fn process_file_type(
        &self,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()> {
        let file_type = FileTypeBox::read(reader, header)?;
        let directory = cx.heif();
        file_type.add_metadata(directory);
        if !file_type.has_compatible_brand(&REQUIRED_BRAND.0) {
            directory.add_warning(format!(
                "File Type Box does not contain required brand, {REQUIRED_BRAND}"
            ));
        }
        Ok(())
    }
}

impl BoxHandler for HeifBoxHandler {
    fn should_accept_container(&self, header: &BoxHeader) -> bool {
        KnownBox::from(header.box_type) == KnownBox::Meta
    }

    /// `meta` is a full box whose first child is `hdlr`; the remaining
    /// children are walked with the handler for the declared role.
    fn process_container(
        &mut self,
        depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()> {
        let meta = read_full_box_header(reader, header)?;
        debug!("meta version={} flags={:#x}", meta.version, meta.flags);

        let hdlr_header = read_box_header(reader)?;
        let mut handler: Box<dyn BoxHandler> = if KnownBox::from(hdlr_header.box_type) == KnownBox::Hdlr {
            let hdlr = HandlerBox::read(reader, &hdlr_header)?;
            hdlr.add_metadata(cx.heif());
            debug!("meta handler type {} ({:?})", hdlr.handler_type, hdlr.name);
            handler_for(hdlr.handler_type)
        } else {
            warn!("meta box starts with {hdlr_header} instead of a handler box");
            cx.heif()
                .add_warning(format!("Meta box has no handler box, found {}", hdlr_header.box_type));
            skip_to_end(reader, &hdlr_header)?;
            Box::new(InertHandler)
        };

        walk(depth + 1, reader, Region::of(header), handler.as_mut(), cx);
        skip_to_end(reader, header)
    }

    fn should_accept_box(&self, header: &BoxHeader) -> bool {
        KnownBox::from(header.box_type) == KnownBox::Ftyp
    }

    fn process_box(
        &mut self,
        _depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()> {
        match KnownBox::from(header.box_type) {
            KnownBox::Ftyp => self.process_file_type(header, reader, cx),
            _ => skip_to_end(reader, header),
        }
    }

    fn process_completed(
        &mut self,
        _depth: usize,
        _reader: &mut dyn RandomAccessReader,
        _cx: &mut Extraction<'_>,
    ) -> Result<()> {
        Ok(())
    }
}
