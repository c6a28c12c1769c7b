use super::{Endianness, RandomAccessReader, ReadError, Result};
use log::{debug, warn};
use std::io::{ErrorKind, Read};
use std::num::NonZeroUsize;

pub const DEFAULT_CHUNK_LENGTH: usize = 2 * 1024;

/// Random access over a forward-only stream.
///
/// Bytes are pulled from the stream in fixed-size chunks the first time a read
/// reaches past what is already buffered, and every chunk is kept for the
/// lifetime of the reader. Memory therefore grows with the furthest offset
/// read, never with the size of the source.
pub struct StreamReader<R> {
    stream: R,
    chunk_length: usize,
    chunks: Vec<Box<[u8]>>,
    /// Valid bytes across all chunks. Only the last chunk can be partial.
    buffered: u64,
    finished: bool,
    length: Option<u64>,
    position: u64,
    endianness: Endianness,
}

impl<R: Read> StreamReader<R> {
    pub fn new(stream: R) -> Self {
        Self::build(stream, DEFAULT_CHUNK_LENGTH, None)
    }

    pub fn with_chunk_length(stream: R, chunk_length: NonZeroUsize) -> Self {
        Self::build(stream, chunk_length.get(), None)
    }

    /// `length` is trusted for [`length`](RandomAccessReader::length) until the
    /// stream actually ends; the observed length wins if they disagree.
    pub fn with_declared_length(stream: R, chunk_length: NonZeroUsize, length: u64) -> Self {
        Self::build(stream, chunk_length.get(), Some(length))
    }

    fn build(stream: R, chunk_length: usize, length: Option<u64>) -> Self {
        Self {
            stream,
            chunk_length,
            chunks: Vec::new(),
            buffered: 0,
            finished: false,
            length,
            position: 0,
            endianness: Endianness::Big,
        }
    }

    /// Number of bytes pulled from the stream so far.
    pub fn buffered_len(&self) -> u64 {
        self.buffered
    }

    /// Pull from the stream until `end` bytes are buffered or the stream ends.
    ///
    /// Every byte read is committed before an error is returned, so a failed
    /// fill resumes exactly where the stream left off.
    fn fill_to(&mut self, end: u64) -> Result<()> {
        let chunk_length = self.chunk_length as u64;
        while !self.finished && self.buffered < end {
            let index = (self.buffered / chunk_length) as usize;
            if index == self.chunks.len() {
                self.chunks.push(vec![0u8; self.chunk_length].into_boxed_slice());
                debug!("stream reader allocated chunk {index} ({} bytes buffered)", self.buffered);
            }
            let inner = (self.buffered % chunk_length) as usize;
            match self.stream.read(&mut self.chunks[index][inner..]) {
                Ok(0) => self.finish(self.buffered),
                Ok(n) => self.buffered += n as u64,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn finish(&mut self, observed: u64) {
        self.finished = true;
        if let Some(declared) = self.length {
            if declared != observed {
                warn!("stream declared {declared} bytes but ended after {observed}");
            }
        }
        self.length = Some(observed);
    }

    fn fits(&mut self, offset: u64, count: u64) -> Result<bool> {
        let Some(end) = offset.checked_add(count) else {
            return Ok(false);
        };
        self.fill_to(end)?;
        Ok(end <= self.buffered)
    }

    fn bounds(&self, offset: u64, count: u64) -> ReadError {
        ReadError::BoundsExceeded {
            offset,
            count,
            length: self.length.unwrap_or(self.buffered),
        }
    }
}

impl<R: Read> RandomAccessReader for StreamReader<R> {
    fn position(&self) -> u64 {
        self.position
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        if !self.fits(position, 0)? {
            return Err(self.bounds(position, 0));
        }
        self.position = position;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let count = buf.len() as u64;
        if !self.fits(self.position, count)? {
            return Err(self.bounds(self.position, count));
        }

        let mut from = self.position as usize;
        let mut copied = 0;
        while copied < buf.len() {
            let chunk = &self.chunks[from / self.chunk_length];
            let inner = from % self.chunk_length;
            let n = (buf.len() - copied).min(self.chunk_length - inner);
            buf[copied..copied + n].copy_from_slice(&chunk[inner..inner + n]);
            copied += n;
            from += n;
        }
        self.position += count;
        Ok(())
    }

    fn is_available(&mut self, offset: u64, count: u64) -> Result<bool> {
        self.fits(offset, count)
    }

    fn length(&self) -> Option<u64> {
        self.length
    }

    fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }
}
