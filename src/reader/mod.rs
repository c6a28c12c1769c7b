//! Random-access byte readers.
//!
//! All box decoding goes through [`RandomAccessReader`], a cursor-based contract
//! with three backends:
//!
//! - [`ByteArrayReader`] over an in-memory slice,
//! - [`RandomAccessFileReader`] over any seekable handle (usually a `File`),
//! - [`StreamReader`] over a forward-only stream, buffered lazily in chunks.
//!
//! A read whose range is not available fails with [`ReadError::BoundsExceeded`].
//! The box walker relies on that error to detect the end of data.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

mod buffer;
mod file;
mod stream;

pub use buffer::ByteArrayReader;
pub use file::RandomAccessFileReader;
pub use stream::{DEFAULT_CHUNK_LENGTH, StreamReader};

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error("attempt to read {count} bytes at offset {offset} exceeds available data length {length}")]
    BoundsExceeded { offset: u64, count: u64, length: u64 },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    pub fn is_bounds_exceeded(&self) -> bool {
        matches!(self, ReadError::BoundsExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReadError>;

/// Byte order used for multi-byte integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Motorola order; ISO base media files are big-endian throughout.
    #[default]
    Big,
    /// Intel order.
    Little,
}

/// Text encodings understood by the string readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    /// ISO-8859-1, every byte maps to the code point of the same value.
    Latin1,
    /// 7-bit ASCII, anything above 0x7f becomes U+FFFD.
    Ascii,
}

impl Charset {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
            Charset::Ascii => bytes
                .iter()
                .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
                .collect(),
        }
    }
}

/// Cursor-based random access over a byte source.
///
/// Backends implement the handful of required methods; the typed reads are
/// provided on top of [`read_exact`](Self::read_exact).
pub trait RandomAccessReader {
    /// Absolute cursor position.
    fn position(&self) -> u64;

    /// Move the cursor. Seeking to exactly the end of the data is allowed.
    fn seek(&mut self, position: u64) -> Result<()>;

    /// Fill `buf` from the cursor and advance past it. On failure the cursor
    /// does not move.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Whether `count` bytes starting at `offset` can be read. Stream backends
    /// may buffer more data to answer this.
    fn is_available(&mut self, offset: u64, count: u64) -> Result<bool>;

    /// Total length, when known. Stream backends only know it once the
    /// underlying stream has been exhausted (or if it was declared up front).
    fn length(&self) -> Option<u64>;

    fn endianness(&self) -> Endianness;

    fn set_endianness(&mut self, endianness: Endianness);

    fn read_u8(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b)?;
        Ok(match self.endianness() {
            Endianness::Big => BigEndian::read_u16(&b),
            Endianness::Little => LittleEndian::read_u16(&b),
        })
    }

    fn read_i16(&mut self) -> Result<i16> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b)?;
        Ok(match self.endianness() {
            Endianness::Big => BigEndian::read_i16(&b),
            Endianness::Little => LittleEndian::read_i16(&b),
        })
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b)?;
        Ok(match self.endianness() {
            Endianness::Big => BigEndian::read_u32(&b),
            Endianness::Little => LittleEndian::read_u32(&b),
        })
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b)?;
        Ok(match self.endianness() {
            Endianness::Big => BigEndian::read_i32(&b),
            Endianness::Little => LittleEndian::read_i32(&b),
        })
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b)?;
        Ok(match self.endianness() {
            Endianness::Big => BigEndian::read_u64(&b),
            Endianness::Little => LittleEndian::read_u64(&b),
        })
    }

    fn read_i64(&mut self) -> Result<i64> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b)?;
        Ok(match self.endianness() {
            Endianness::Big => BigEndian::read_i64(&b),
            Endianness::Little => LittleEndian::read_i64(&b),
        })
    }

    /// Unsigned integer stored in `width` bytes (0..=8). A zero width reads
    /// nothing and yields 0.
    fn read_uint(&mut self, width: u8) -> Result<u64> {
        match width {
            0 => Ok(0),
            1 => self.read_u8().map(u64::from),
            2 => self.read_u16().map(u64::from),
            4 => self.read_u32().map(u64::from),
            8 => self.read_u64(),
            n => {
                let mut b = vec![0u8; n.min(8) as usize];
                self.read_exact(&mut b)?;
                Ok(match self.endianness() {
                    Endianness::Big => BigEndian::read_uint(&b, b.len()),
                    Endianness::Little => LittleEndian::read_uint(&b, b.len()),
                })
            }
        }
    }

    fn read_bytes(&mut self, count: u64) -> Result<Vec<u8>> {
        let offset = self.position();
        if !self.is_available(offset, count)? {
            return Err(self.bounds_error(offset, count));
        }
        let mut buf = vec![0u8; count as usize];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_string(&mut self, count: u64, charset: Charset) -> Result<String> {
        let bytes = self.read_bytes(count)?;
        Ok(charset.decode(&bytes))
    }

    /// Read a string terminated by NUL, consuming at most `max_len` bytes.
    /// The terminator is consumed but not returned; if none is found within
    /// `max_len` bytes the whole run is returned.
    fn read_null_terminated_string(&mut self, max_len: u64, charset: Charset) -> Result<String> {
        let mut bytes = Vec::new();
        for _ in 0..max_len {
            let b = self.read_u8()?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        Ok(charset.decode(&bytes))
    }

    /// Advance by `n` bytes, failing (without moving) if they aren't there.
    fn skip(&mut self, n: u64) -> Result<()> {
        let offset = self.position();
        if !self.is_available(offset, n)? {
            return Err(self.bounds_error(offset, n));
        }
        self.seek(offset + n)
    }

    /// Advance by up to `n` bytes. Returns `false` if the data ended first, in
    /// which case the cursor is left at the end of the data.
    fn try_skip(&mut self, n: u64) -> Result<bool> {
        let offset = self.position();
        if self.is_available(offset, n)? {
            self.seek(offset + n)?;
            return Ok(true);
        }
        if let Some(len) = self.length() {
            if len > offset {
                self.seek(len)?;
            }
        }
        Ok(false)
    }

    fn bounds_error(&self, offset: u64, count: u64) -> ReadError {
        ReadError::BoundsExceeded {
            offset,
            count,
            length: self.length().unwrap_or(offset),
        }
    }
}
