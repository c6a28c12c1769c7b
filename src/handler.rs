use crate::boxes::{BoxHeader, FourCC};
use crate::metadata::{Directory, HEIF_DIRECTORY, Metadata};
use crate::parser::Result;
use crate::picture::PictureHandler;
use crate::reader::{ByteArrayReader, RandomAccessReader};
use crate::segments::{Decoders, SegmentDecoder};
use log::warn;

/// State shared by every handler during one extraction: the result being
/// built and the decoders for embedded payloads.
pub struct Extraction<'a> {
    pub metadata: &'a mut Metadata,
    pub decoders: &'a Decoders,
}

impl<'a> Extraction<'a> {
    pub fn new(metadata: &'a mut Metadata, decoders: &'a Decoders) -> Self {
        Self { metadata, decoders }
    }

    pub fn heif(&mut self) -> &mut Directory {
        self.metadata.directory_mut(HEIF_DIRECTORY)
    }

    /// Run the EXIF decoder over `data`, starting `base_offset` bytes in.
    pub fn decode_exif(&mut self, data: &[u8], base_offset: usize) {
        let decoders = self.decoders;
        self.run("Exif", decoders.exif.as_ref(), data, base_offset);
    }

    pub fn decode_icc(&mut self, profile: &[u8]) {
        let decoders = self.decoders;
        self.run("ICC", decoders.icc.as_ref(), profile, 0);
    }

    /// Decoder failures are recorded as warnings and never stop the walk.
    fn run(&mut self, what: &str, decoder: &dyn SegmentDecoder, data: &[u8], base_offset: usize) {
        let mut reader = ByteArrayReader::with_base_offset(data, base_offset);
        if let Err(e) = decoder.extract(&mut reader, self.metadata) {
            warn!("{what} decoding failed: {e:#}");
            self.heif().add_warning(format!("{what} data could not be decoded: {e:#}"));
        }
    }
}

/// Per-region box dispatch used by [`walk`](crate::parser::walk).
///
/// For every box header in the region the walker asks, in order, whether the
/// handler takes it as a container, then as a leaf box. Boxes taken by neither
/// are skipped. Whatever the handler takes it must consume completely.
pub trait BoxHandler {
    fn should_accept_container(&self, header: &BoxHeader) -> bool;

    fn should_accept_box(&self, header: &BoxHeader) -> bool;

    /// Consume the container's payload, either by skipping it or by walking it
    /// with some handler.
    fn process_container(
        &mut self,
        depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()>;

    fn process_box(
        &mut self,
        depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()>;

    /// Called once when the region is done, however it ended.
    fn process_completed(
        &mut self,
        depth: usize,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()>;
}

pub const HANDLER_PICTURE: FourCC = FourCC(*b"pict");

/// Handler for the contents of a `meta` box declaring `role`. Roles without a
/// dedicated handler get an [`InertHandler`].
pub fn handler_for(role: FourCC) -> Box<dyn BoxHandler> {
    if role == HANDLER_PICTURE {
        Box::new(PictureHandler::new())
    } else {
        Box::new(InertHandler)
    }
}

/// Accepts nothing; every box in its region is skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct InertHandler;

impl BoxHandler for InertHandler {
    fn should_accept_container(&self, _header: &BoxHeader) -> bool {
        false
    }

    fn should_accept_box(&self, _header: &BoxHeader) -> bool {
        false
    }

    fn process_container(
        &mut self,
        _depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        _cx: &mut Extraction<'_>,
    ) -> Result<()> {
        crate::parser::skip_to_end(reader, header)
    }

    fn process_box(
        &mut self,
        _depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        _cx: &mut Extraction<'_>,
    ) -> Result<()> {
        crate::parser::skip_to_end(reader, header)
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
