use super::{Endianness, RandomAccessReader, ReadError, Result};

/// Reader over an in-memory byte slice.
///
/// With a non-zero `base_offset`, local position 0 maps to
/// `buffer[base_offset]` and the reported length excludes the skipped prefix.
#[derive(Debug, Clone)]
pub struct ByteArrayReader<'a> {
    buffer: &'a [u8],
    base_offset: usize,
    position: u64,
    endianness: Endianness,
}

impl<'a> ByteArrayReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_base_offset(buffer, 0)
    }

    /// A base offset past the end of `buffer` yields an empty reader.
    pub fn with_base_offset(buffer: &'a [u8], base_offset: usize) -> Self {
        Self {
            buffer,
            base_offset: base_offset.min(buffer.len()),
            position: 0,
            endianness: Endianness::Big,
        }
    }

    fn local_len(&self) -> u64 {
        (self.buffer.len() - self.base_offset) as u64
    }

    fn validate(&self, offset: u64, count: u64) -> Result<()> {
        if self.fits(offset, count) {
            Ok(())
        } else {
            Err(ReadError::BoundsExceeded {
                offset,
                count,
                length: self.local_len(),
            })
        }
    }

    fn fits(&self, offset: u64, count: u64) -> bool {
        offset
            .checked_add(count)
            .is_some_and(|end| end <= self.local_len())
    }
}

impl RandomAccessReader for ByteArrayReader<'_> {
    fn position(&self) -> u64 {
        self.position
    }

    fn seek(&mut self, position: u64) -> Result<()> {
        self.validate(position, 0)?;
        self.position = position;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let count = buf.len() as u64;
        self.validate(self.position, count)?;
        let start = self.base_offset + self.position as usize;
        buf.copy_from_slice(&self.buffer[start..start + buf.len()]);
        self.position += count;
        Ok(())
    }

    fn is_available(&mut self, offset: u64, count: u64) -> Result<bool> {
        Ok(self.fits(offset, count))
    }

    fn length(&self) -> Option<u64> {
        Some(self.local_len())
    }

    fn endianness(&self) -> Endianness {
        self.endianness
    }

    fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_offset_shifts_reads() {
        let data = [0xAAu8, 0xBB, 0x00, 0x01, 0x02, 0x03];
        let mut r = ByteArrayReader::with_base_offset(&data, 2);
        assert_eq!(r.length(), Some(4));
        assert_eq!(r.read_u32().unwrap(), 0x0001_0203);
        assert_eq!(r.position(), 4);
    }

    #[test]
    fn little_endian_reads() {
        let data = [0x01u8, 0x02];
        let mut r = ByteArrayReader::new(&data);
        r.set_endianness(Endianness::Little);
        assert_eq!(r.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn failed_read_leaves_cursor() {
        let data = [1u8, 2, 3];
        let mut r = ByteArrayReader::new(&data);
        r.seek(1).unwrap();
        let err = r.read_u32().unwrap_err();
        assert!(matches!(
            err,
            ReadError::BoundsExceeded { offset: 1, count: 4, length: 3 }
        ));
        assert_eq!(r.position(), 1);
    }
}
