use super::{Endianness, RandomAccessReader, ReadError, Result};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Reader over a seekable handle whose length is fixed when the reader is
/// created.
///
/// The handle's own cursor is tracked so that sequential reads never issue a
/// seek.
#[derive(Debug)]
pub struct RandomAccessFileReader<F = File> {
    inner: F,
    length: u64,
    position: u64,
    handle_position: u64,
    endianness: Endianness,
}

impl RandomAccessFileReader<File> {
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<F: Read + Seek> RandomAccessFileReader<F> {
    pub fn new(mut inner: F) -> std::io::Result<Self> {
        let length = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            length,
            position: 0,
            handle_position: 0,
            endianness: Endianness::Big,
        })
    }

    fn fits(&self, offset: u64, count: u64) -> bool {
        offset.checked_add(count).is_some_and(|end| end <= self.length)
    }

    fn bounds(&self, offset: u64, count: u64) -> ReadError {
        ReadError::BoundsExceeded {
            offset,
            count,
            length: self.length,
        }
    }
}

impl<F: Read + Seek> RandomAccessReader for RandomAccessFileReader<F> {
    fn position(&self) -> u64 {
        self.position
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        if !self.fits(position, 0) {
            return Err(self.bounds(position, 0));
        }
        self.position = position;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let count = buf.len() as u64;
        if !self.fits(self.position, count) {
            return Err(self.bounds(self.position, count));
        }
        if self.handle_position != self.position {
            self.handle_position = self.inner.seek(SeekFrom::Start(self.position))?;
        }
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.position += count;
                self.handle_position = self.position;
                Ok(())
            }
            Err(e) => {
                // The handle's cursor is unspecified after a failed read.
                self.handle_position = u64::MAX;
                if e.kind() == ErrorKind::UnexpectedEof {
                    Err(self.bounds(self.position, count))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    fn is_available(&mut self, offset: u64, count: u64) -> Result<bool> {
        Ok(self.fits(offset, count))
    }

    fn length(&self) -> Option<u64> {
        Some(self.length)
    }

    fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }
}
