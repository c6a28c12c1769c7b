use crate::boxes::BoxHeader;
use crate::handler::{BoxHandler, Extraction};
use crate::known_boxes::KnownBox;
use crate::metadata::Metadata;
use crate::parser::{Region, Result, extract, read_full_box_header, skip_to_end, walk};
use crate::reader::{ByteArrayReader, RandomAccessFileReader, RandomAccessReader, StreamReader};
use crate::segments::Decoders;
use crate::top_level::HeifBoxHandler;
use anyhow::Context;
use log::debug;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Extract HEIF metadata from `reader`, starting at its current position.
///
/// Never fails: whatever was decoded before the data ran out (or turned out
/// malformed) is returned, with warnings recorded on the directories.
///
/// ```no_run
/// use heifmeta::{ByteArrayReader, read_metadata};
///
/// let data = std::fs::read("image.heic")?;
/// let metadata = read_metadata(&mut ByteArrayReader::new(&data));
/// for warning in metadata.warnings() {
///     eprintln!("{warning}");
/// }
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn read_metadata(reader: &mut dyn RandomAccessReader) -> Metadata {
    read_metadata_with(reader, &Decoders::default())
}

/// Same as [`read_metadata`], handing embedded EXIF and ICC payloads to
/// `decoders`.
pub fn read_metadata_with(reader: &mut dyn RandomAccessReader, decoders: &Decoders) -> Metadata {
    let mut metadata = Metadata::new();
    let mut cx = Extraction::new(&mut metadata, decoders);
    let end = extract(reader, &mut HeifBoxHandler::new(), &mut cx);
    debug!("top level walk ended: {end:?}");
    metadata
}

/// Open `path` and extract its metadata through the file backend.
pub fn read_metadata_from_path(path: impl AsRef<Path>) -> anyhow::Result<Metadata> {
    let path = path.as_ref();
    let mut reader = RandomAccessFileReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(read_metadata(&mut reader))
}

/// Extract metadata from a forward-only stream, buffered in chunks as needed.
pub fn read_metadata_from_stream<R: Read>(stream: R) -> Metadata {
    read_metadata(&mut StreamReader::new(stream))
}

pub fn read_metadata_from_bytes(data: &[u8]) -> Metadata {
    read_metadata(&mut ByteArrayReader::new(data))
}

/// A JSON-serializable view of one box in the file's box tree.
#[derive(Debug, Clone, Serialize)]
pub struct BoxNode {
    /// Absolute byte offset of the box header.
    pub offset: u64,
    /// Total size including the header; 0 for a box that runs to the end.
    pub size: u64,
    pub header_size: u64,
    /// Four-character box type code (e.g. "ftyp", "meta").
    pub typ: String,
    /// User type of `uuid` boxes, as hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
    /// Human-readable box type name (e.g. "Item Location Box").
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BoxNode>>,
}

impl BoxNode {
    fn new(header: &BoxHeader) -> Self {
        BoxNode {
            offset: header.offset,
            size: header.size(),
            header_size: header.header_len,
            typ: header.box_type.to_string(),
            uuid: header.user_type_hex(),
            version: None,
            flags: None,
            full_name: KnownBox::from(header.box_type).full_name().to_string(),
            children: None,
        }
    }
}

/// Collects every box of a region, descending into known containers.
#[derive(Default)]
struct TreeHandler {
    nodes: Vec<BoxNode>,
}

impl TreeHandler {
    fn read_version(node: &mut BoxNode, header: &BoxHeader, reader: &mut dyn RandomAccessReader) -> Result<()> {
        if KnownBox::from(header.box_type).is_full_box() {
            let full = read_full_box_header(reader, header)?;
            node.version = Some(full.version);
            node.flags = Some(full.flags);
        }
        Ok(())
    }
}

impl BoxHandler for TreeHandler {
    fn should_accept_container(&self, header: &BoxHeader) -> bool {
        KnownBox::from(header.box_type).is_container()
    }

    fn should_accept_box(&self, _header: &BoxHeader) -> bool {
        true
    }

    fn process_container(
        &mut self,
        depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        cx: &mut Extraction<'_>,
    ) -> Result<()> {
        let mut node = BoxNode::new(header);
        Self::read_version(&mut node, header, reader)?;

        let mut children = TreeHandler::default();
        walk(depth + 1, reader, Region::of(header), &mut children, cx);
        node.children = Some(children.nodes);
        self.nodes.push(node);
        skip_to_end(reader, header)
    }

    fn process_box(
        &mut self,
        _depth: usize,
        header: &BoxHeader,
        reader: &mut dyn RandomAccessReader,
        _cx: &mut Extraction<'_>,
    ) -> Result<()> {
        let mut node = BoxNode::new(header);
        // a truncated leaf is still listed
        let read = Self::read_version(&mut node, header, reader);
        self.nodes.push(node);
        read?;
        skip_to_end(reader, header)
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

/// List the box tree of `reader` without decoding payloads, for inspection.
///
/// Like [`read_metadata`] this stops quietly at the first truncated or
/// malformed box and returns what was listed so far.
pub fn get_boxes(reader: &mut dyn RandomAccessReader) -> Vec<BoxNode> {
    let mut scratch = Metadata::new();
    let decoders = Decoders::default();
    let mut cx = Extraction::new(&mut scratch, &decoders);
    let mut tree = TreeHandler::default();
    let end = extract(reader, &mut tree, &mut cx);
    debug!("box listing ended: {end:?}");
    tree.nodes
}
