use crate::boxes::{BoxHeader, FourCC, FullBoxHeader};
use crate::handler::{BoxHandler, Extraction};
use crate::known_boxes::KnownBox;
use crate::reader::{Endianness, RandomAccessReader, ReadError};
use log::{debug, warn};

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("box {typ} at offset {offset} declares size {size}, smaller than its {header_len}-byte header")]
    InvalidSize { typ: FourCC, offset: u64, size: u64, header_len: u64 },
}

impl ParseError {
    /// True when the data simply ran out, which the walker treats as the end
    /// of the region.
    pub fn is_bounds_exceeded(&self) -> bool {
        matches!(self, ParseError::Read(e) if e.is_bounds_exceeded())
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

pub fn read_box_header(r: &mut dyn RandomAccessReader) -> Result<BoxHeader> {
    let offset = r.position();
    let declared_size = r.read_u32()?;
    let box_type = FourCC::read(r)?;

    let mut large_size = None;
    if declared_size == 1 {
        large_size = Some(r.read_u64()?);
    }

    let mut user_type = None;
    if box_type == b"uuid" {
        let mut u = [0u8; 16];
        r.read_exact(&mut u)?;
        user_type = Some(u);
    }

    let header = BoxHeader {
        offset,
        declared_size,
        large_size,
        box_type,
        user_type,
        header_len: r.position() - offset,
    };

    // only a 32-bit size of 0 means "last box"; a 64-bit size must cover the header
    let size = header.size();
    if !header.is_last_box() && size < header.header_len {
        return Err(ParseError::InvalidSize {
            typ: box_type,
            offset,
            size,
            header_len: header.header_len,
        });
    }

    Ok(header)
}

/// Read version and flags right after `header`. Version is the high byte of a
/// big-endian u32, flags the low 24 bits.
pub fn read_full_box_header(r: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<FullBoxHeader> {
    let word = r.read_u32()?;
    Ok(FullBoxHeader {
        header: header.clone(),
        version: (word >> 24) as u8,
        flags: word & 0x00FF_FFFF,
    })
}

/// Leave the cursor exactly at the end of `header`'s box, skipping whatever
/// the decoder didn't consume. Last boxes have no known end and are left alone.
pub fn skip_to_end(r: &mut dyn RandomAccessReader, header: &BoxHeader) -> Result<()> {
    let Some(end) = header.end() else {
        return Ok(());
    };
    let position = r.position();
    if position < end {
        r.skip(end - position)?;
    } else if position > end {
        warn!("{} decoder read {} bytes past the end of the box", header.box_type, position - end);
        r.seek(end)?;
    }
    Ok(())
}

/// Extent of one nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Walk until the cursor reaches this absolute offset.
    Bounded(u64),
    /// Walk until reading fails.
    Unbounded,
}

impl Region {
    /// Region covered by the payload of `header`; a last box inherits the
    /// unbounded region.
    pub fn of(header: &BoxHeader) -> Self {
        header.end().map_or(Region::Unbounded, Region::Bounded)
    }

    fn contains(&self, position: u64) -> bool {
        match self {
            Region::Bounded(end) => position < *end,
            Region::Unbounded => true,
        }
    }
}

/// Why a walk over one region stopped. None of these are failures from the
/// caller's point of view.
#[derive(Debug)]
pub enum WalkEnd {
    /// The cursor reached the end of the region.
    RegionEnd,
    /// A size-0 box was handled and closed the region.
    LastBox,
    /// An unrecognised size-0 box; the rest of the region can't be skipped.
    Malformed(BoxHeader),
    /// Data ran out (or a header was invalid) while reading or dispatching.
    Truncated(ParseError),
}

/// Depth-first walk over the boxes of `region`, dispatching each to `handler`.
///
/// `handler.process_completed` runs exactly once, whatever ends the walk.
pub fn walk(
    depth: usize,
    r: &mut dyn RandomAccessReader,
    region: Region,
    handler: &mut dyn BoxHandler,
    cx: &mut Extraction<'_>,
) -> WalkEnd {
    let end = walk_boxes(depth, r, region, handler, cx);
    match &end {
        WalkEnd::Truncated(e) if e.is_bounds_exceeded() => debug!("depth {depth}: end of data: {e}"),
        WalkEnd::Truncated(e) => warn!("depth {depth}: stopped walking: {e}"),
        WalkEnd::Malformed(h) => warn!("depth {depth}: unrecognised size-0 box {h}, stopping"),
        _ => {}
    }

    if let Err(e) = handler.process_completed(depth, r, cx) {
        debug!("depth {depth}: completion step failed: {e}");
    }
    end
}

fn walk_boxes(
    depth: usize,
    r: &mut dyn RandomAccessReader,
    region: Region,
    handler: &mut dyn BoxHandler,
    cx: &mut Extraction<'_>,
) -> WalkEnd {
    while region.contains(r.position()) {
        let h = match read_box_header(r) {
            Ok(h) => h,
            Err(e) => return WalkEnd::Truncated(e),
        };
        debug!("{:indent$}{h} {}", "", KnownBox::from(h.box_type).full_name(), indent = depth * 2);

        let dispatched = if handler.should_accept_container(&h) {
            handler.process_container(depth, &h, r, cx)
        } else if handler.should_accept_box(&h) {
            handler.process_box(depth, &h, r, cx)
        } else if h.size() > 0 {
            let unread = h.bytes_unread(r.position());
            r.skip(unread).map_err(ParseError::from)
        } else {
            return WalkEnd::Malformed(h);
        };

        if let Err(e) = dispatched {
            return WalkEnd::Truncated(e);
        }
        if h.is_last_box() {
            return WalkEnd::LastBox;
        }
    }
    WalkEnd::RegionEnd
}

/// Walk a whole source from its current position with `handler` at depth 0.
/// The reader is switched to big-endian first.
pub fn extract(r: &mut dyn RandomAccessReader, handler: &mut dyn BoxHandler, cx: &mut Extraction<'_>) -> WalkEnd {
    r.set_endianness(Endianness::Big);
    let region = r.length().map_or(Region::Unbounded, Region::Bounded);
    walk(0, r, region, handler, cx)
}
