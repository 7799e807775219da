//! Little-endian wire primitives for ROS1 message payloads.
//!
//! ROS1 serializes fields back to back with no framing: fixed-width values
//! in little-endian order, strings and byte arrays behind a u32 length
//! prefix. [`Cursor`] reads them with an advancing offset; the `put_*`
//! functions append them to a growable buffer. No layer above this one
//! touches raw offsets.

use crate::error::ShrinkError;

/// Bounds-checked reader over a byte buffer with an advancing offset.
///
/// Every read returns [`ShrinkError::TruncatedRecord`] instead of reading
/// past the end of the buffer.
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left past the current offset.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ShrinkError> {
        let slice = self
            .pos
            .checked_add(n)
            .and_then(|end| self.buf.get(self.pos..end))
            .ok_or(ShrinkError::TruncatedRecord {
                needed: n,
                available: self.remaining(),
            })?;
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ShrinkError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ShrinkError> {
        Ok(u8::from_le_bytes(self.take_array()?))
    }

    pub fn read_i8(&mut self) -> Result<i8, ShrinkError> {
        Ok(i8::from_le_bytes(self.take_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, ShrinkError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, ShrinkError> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ShrinkError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, ShrinkError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, ShrinkError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, ShrinkError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, ShrinkError> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> Result<f64, ShrinkError> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Reads a u32 length prefix followed by that many bytes of text.
    ///
    /// The bytes are not required to be valid UTF-8; invalid sequences are
    /// replaced rather than rejected.
    pub fn read_string(&mut self) -> Result<String, ShrinkError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Reads a u32 length prefix and returns that many bytes, borrowed from
    /// the input. The prefix is authoritative; callers copy into owned
    /// storage explicitly when they need to keep the data.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], ShrinkError> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }
}

pub fn put_u8(out: &mut Vec<u8>, value: u8) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_i8(out: &mut Vec<u8>, value: i8) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_i64(out: &mut Vec<u8>, value: i64) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_f32(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn put_f64(out: &mut Vec<u8>, value: f64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends a u32 byte-length prefix followed by the text bytes.
pub fn put_string(out: &mut Vec<u8>, value: &str) {
    put_u32(out, value.len() as u32);
    out.extend_from_slice(value.as_bytes());
}

/// Appends a u32 length prefix followed by the payload. An empty payload
/// emits the 4-byte zero prefix and nothing else.
pub fn put_bytes(out: &mut Vec<u8>, value: &[u8]) {
    put_u32(out, value.len() as u32);
    out.extend_from_slice(value);
}
