//! Little-endian, offset-tracking access over in-memory byte buffers.
//! 'ByteStream' is the read side used by the parser, and 'ByteSink' is the
//! growable write side used by the encoder.

use crate::{Error, Result};

/// A read cursor over an immutable byte buffer. The offset always stays
/// within `0..=len`; any read that would pass the end fails and leaves the
/// cursor where it was.
pub struct ByteStream<'a> {
    /// The underlying buffer.
    data: &'a [u8],
    /// The offset of the next byte to read.
    offset: usize,
}

impl<'a> ByteStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// The offset of the next byte to read.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The number of bytes left in the stream.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn underrun(&self, needed: usize) -> Error {
        Error::StreamUnderrun {
            offset: self.offset,
            needed,
        }
    }

    /// Read the next byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.remaining() < 1 {
            return Err(self.underrun(1));
        }
        let v = self.data[self.offset];
        self.offset += 1;
        Ok(v)
    }

    /// Read the next 16-bit little-endian value.
    pub fn read_u16_le(&mut self) -> Result<u16> {
        if self.remaining() < 2 {
            return Err(self.underrun(2));
        }
        let lo = self.data[self.offset] as u16;
        let hi = self.data[self.offset + 1] as u16;
        self.offset += 2;
        Ok(lo | (hi << 8))
    }

    /// Read the next 'n' bytes as a view over the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.underrun(n));
        }
        let view = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(view)
    }

    /// Read the next 'n' bytes as a string, one Latin-1 code point per byte.
    pub fn read_fixed_str(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_bytes(n)?;
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    /// Advance the cursor by 'n' bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(self.underrun(n));
        }
        self.offset += n;
        Ok(())
    }
}

/// A write cursor over a growable byte buffer. The capacity doubles when a
/// write would overflow it, so growth is amortized and invisible to callers
/// except for cost.
pub struct ByteSink {
    /// The written bytes.
    data: Vec<u8>,
}

impl Default for ByteSink {
    fn default() -> Self {
        Self::with_capacity(64)
    }
}

impl ByteSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// The number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Double the capacity until 'extra' more bytes fit.
    fn grow_for(&mut self, extra: usize) {
        let needed = self.data.len() + extra;
        let mut capacity = self.data.capacity().max(1);
        while capacity < needed {
            capacity *= 2;
        }
        if capacity > self.data.capacity() {
            self.data.reserve_exact(capacity - self.data.len());
        }
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, v: u8) {
        self.grow_for(1);
        self.data.push(v);
    }

    /// Write a 16-bit value as two little-endian bytes.
    pub fn write_u16_le(&mut self, v: u16) {
        self.grow_for(2);
        self.data.push(v as u8);
        self.data.push((v >> 8) as u8);
    }

    /// Write a run of bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.grow_for(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Consume the sink and return an exactly-sized copy of the written
    /// region.
    pub fn finalize_bytes(self) -> Vec<u8> {
        let mut data = self.data;
        data.shrink_to_fit();
        data
    }

    /// Consume the sink and reinterpret the written region as 16-bit
    /// little-endian words. An odd number of written bytes is an error.
    pub fn finalize_u16s(self) -> Result<Vec<u16>> {
        if self.data.len() % 2 != 0 {
            return Err(Error::OddWordBoundary);
        }
        Ok(self
            .data
            .chunks_exact(2)
            .map(|pair| (pair[0] as u16) | ((pair[1] as u16) << 8))
            .collect())
    }
}
