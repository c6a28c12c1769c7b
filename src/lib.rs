//! Metadata extraction from HEIF files.
//!
//! The box tree is walked once, depth first, through a [`RandomAccessReader`]
//! over a byte buffer, a seekable file or a forward-only stream. Decoded
//! values land in a [`Metadata`]; anything truncated or malformed ends the
//! walk early with what was read so far.

pub mod api;
pub mod boxes;
pub mod handler;
pub mod items;
pub mod known_boxes;
pub mod metadata;
pub mod parser;
pub mod picture;
pub mod properties;
pub mod reader;
pub mod segments;
pub mod top_level;
pub mod util;

pub use api::{
    BoxNode, get_boxes, read_metadata, read_metadata_from_bytes, read_metadata_from_path,
    read_metadata_from_stream, read_metadata_with,
};
pub use boxes::{BoxHeader, FourCC};
pub use handler::{BoxHandler, Extraction, handler_for};
pub use metadata::{Directory, Metadata, TagValue};
pub use parser::{Region, WalkEnd, read_box_header, walk};
pub use reader::{ByteArrayReader, RandomAccessFileReader, RandomAccessReader, ReadError, StreamReader};
pub use segments::{Decoders, SegmentDecoder};
