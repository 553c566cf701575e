use crate::boxes::FourCC;
use crate::parser::ParseError;
use byteorder::{BigEndian, ByteOrder};

/// Bounds-checked read window over a byte region.
///
/// All reads are big-endian and advance an internal position; any read or
/// subview that would cross the window's end fails with
/// [`ParseError::OutOfBounds`] and returns no partial value.
#[derive(Debug, Clone)]
pub struct View<'a> {
    data: &'a [u8],
    /// Absolute offset of `data[0]` in the original buffer, for error reporting.
    base: u64,
    pos: usize,
}

impl<'a> View<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, base: 0, pos: 0 }
    }

    /// Total window length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left between the current position and the window's end.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Absolute offset of the current position in the original buffer.
    pub fn position(&self) -> u64 {
        self.base + self.pos as u64
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        if n > self.remaining() {
            return Err(ParseError::OutOfBounds {
                offset: self.position(),
                want: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64, ParseError> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    pub fn read_fourcc(&mut self) -> Result<FourCC, ParseError> {
        let b = self.take(4)?;
        Ok(FourCC([b[0], b[1], b[2], b[3]]))
    }

    /// Read exactly `n` bytes.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        self.take(n)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.take(n).map(|_| ())
    }

    /// New window over `[offset, offset + len)` of this window, independent of
    /// the current position. Fails if the range escapes this window.
    pub fn subview(&self, offset: usize, len: usize) -> Result<View<'a>, ParseError> {
        let end = offset.checked_add(len).filter(|&e| e <= self.data.len());
        match end {
            Some(end) => Ok(View {
                data: &self.data[offset..end],
                base: self.base + offset as u64,
                pos: 0,
            }),
            None => Err(ParseError::OutOfBounds {
                offset: self.base + offset as u64,
                want: len,
                remaining: self.data.len().saturating_sub(offset),
            }),
        }
    }
}
