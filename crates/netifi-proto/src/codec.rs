//! Primitive field codec shared by every frame.
//!
//! Writers go through [`bytes::BufMut`]. Reads go through [`Reader`], a
//! bounds-checked cursor over a [`Bytes`] buffer: opaque fields come back as
//! [`Bytes`] slices of the input, so decoding never copies payload bytes.
//!
//! Length prefixes are Big Endian `i32`. A negative prefix is rejected rather
//! than reinterpreted.

use bytes::{BufMut, Bytes};

use crate::{
    FrameHeader,
    errors::{ProtocolError, Result},
};

/// Size of an `i32` length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Encoded size of a length-prefixed byte field.
#[must_use]
pub const fn prefixed_len(len: usize) -> usize {
    LENGTH_PREFIX_SIZE + len
}

/// Write a length-prefixed byte field.
///
/// Callers bound the total frame size before writing, so the length always
/// fits in an `i32`.
pub fn put_prefixed(dst: &mut impl BufMut, bytes: &[u8]) {
    dst.put_i32(bytes.len() as i32);
    dst.put_slice(bytes);
}

/// Write a length-prefixed UTF-8 string.
pub fn put_str(dst: &mut impl BufMut, value: &str) {
    put_prefixed(dst, value.as_bytes());
}

/// Bounds-checked read cursor over a frame buffer.
///
/// The cursor never reads past the end of the buffer it was created from; the
/// buffer length is the frame length supplied by the transport.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a Bytes,
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a cursor at the start of `buf`.
    #[must_use]
    pub fn new(buf: &'a Bytes) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// End offset of the buffer
    #[must_use]
    pub fn end(&self) -> usize {
        self.buf.len()
    }

    /// Bytes left before the end of the buffer
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once every byte has been consumed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Advance past `len` bytes and return them as a borrowed slice.
    pub fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8]> {
        let buf: &'a Bytes = self.buf;
        if len > self.remaining() {
            return Err(ProtocolError::MalformedFrame {
                field,
                needed: len,
                remaining: self.remaining(),
            });
        }

        let start = self.pos;
        self.pos += len;
        Ok(&buf[start..self.pos])
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(field, N)?);
        Ok(arr)
    }

    /// Read and copy the 6-byte frame header.
    pub fn read_header(&mut self) -> Result<FrameHeader> {
        let bytes = self.take("header", FrameHeader::SIZE)?;
        FrameHeader::from_bytes(bytes).copied()
    }

    /// Read a Big Endian `i16`.
    pub fn read_i16(&mut self, field: &'static str) -> Result<i16> {
        self.read_array(field).map(i16::from_be_bytes)
    }

    /// Read a Big Endian `i32`.
    pub fn read_i32(&mut self, field: &'static str) -> Result<i32> {
        self.read_array(field).map(i32::from_be_bytes)
    }

    /// Read a Big Endian `i64`.
    pub fn read_i64(&mut self, field: &'static str) -> Result<i64> {
        self.read_array(field).map(i64::from_be_bytes)
    }

    /// Read an `i32` length prefix, rejecting negative values.
    pub fn read_len(&mut self, field: &'static str) -> Result<usize> {
        let length = self.read_i32(field)?;
        usize::try_from(length).map_err(|_| ProtocolError::InvalidLength { field, length })
    }

    /// Slice `len` bytes out of the buffer without copying.
    pub fn read_slice(&mut self, field: &'static str, len: usize) -> Result<Bytes> {
        let start = self.pos;
        self.take(field, len)?;
        Ok(self.buf.slice(start..self.pos))
    }

    /// Read a length-prefixed opaque field without copying.
    pub fn read_prefixed(&mut self, field: &'static str) -> Result<Bytes> {
        let len = self.read_len(field)?;
        self.read_slice(field, len)
    }

    /// Borrow exactly `len` bytes as UTF-8.
    pub fn read_str(&mut self, field: &'static str, len: usize) -> Result<&'a str> {
        let bytes = self.take(field, len)?;
        std::str::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8 { field })
    }

    /// Read exactly `len` bytes as UTF-8.
    pub fn read_utf8(&mut self, field: &'static str, len: usize) -> Result<String> {
        self.read_str(field, len).map(str::to_owned)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self, field: &'static str) -> Result<String> {
        let len = self.read_len(field)?;
        self.read_utf8(field, len)
    }
}
