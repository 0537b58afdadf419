// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Big-endian byte cursor over a decompressed entity-scene buffer.
//!
//! Shaped after the teacher's `CdrCursor`: a position-tracking reader with
//! paired primitive accessors and bounds-checked reads. Unlike CDR this
//! format carries no alignment padding, so there is no origin stack here —
//! every read simply advances `offset` by the primitive's width.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::core::error::{CodecError, Result};

/// A cursor over an immutable byte slice, reading big-endian primitives.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    /// Wrap `data` with the cursor positioned at byte 0.
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, offset: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> u64 {
        self.offset as u64
    }

    /// Bytes remaining before the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// True once every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::truncated(n, self.remaining(), self.position()));
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a strict boolean: 0 or 1, any other byte value is malformed.
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::malformed(format!(
                "bool byte must be 0 or 1, found {other} at offset {}",
                self.position() - 1
            ))),
        }
    }

    /// Read a big-endian `u16`.
    pub fn read_u16_be(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    /// Read a big-endian `i32`.
    pub fn read_i32_be(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    /// Read a big-endian `u32`.
    pub fn read_u32_be(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    /// Read a big-endian `i64`.
    pub fn read_i64_be(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    /// Read a big-endian `u64`.
    pub fn read_u64_be(&mut self) -> Result<u64> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    /// Read a big-endian `f32`.
    pub fn read_f32_be(&mut self) -> Result<f32> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    /// Read a big-endian `f64`.
    pub fn read_f64_be(&mut self) -> Result<f64> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }

    /// Read a little-endian `u32` — used only for the outer frame's two
    /// size words, which are the one documented exception to this format's
    /// big-endian convention.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// Read exactly `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Read a big-endian unsigned integer of an arbitrary schema-declared
    /// width (1, 2, 4, or 8 bytes) — used for `Enum`-suffixed types.
    pub fn read_uint_be(&mut self, width: usize) -> Result<u64> {
        let bytes = self.take(width)?;
        let mut value: u64 = 0;
        for &b in bytes {
            value = (value << 8) | b as u64;
        }
        Ok(value)
    }

    /// Read a `u32`-length-prefixed run of opaque bytes. The bytes are not
    /// validated as UTF-8 — the engine's strings are 8-bit code units.
    pub fn read_length_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32_be()? as usize;
        self.take(len)
    }

    /// Assert that the next `expected.len()` bytes equal `expected` exactly,
    /// consuming them on success.
    pub fn expect(&mut self, expected: &[u8]) -> Result<()> {
        let start = self.position();
        let actual = self.take(expected.len())?;
        if actual != expected {
            return Err(CodecError::assertion(expected, actual, start));
        }
        Ok(())
    }
}

/// A growable big-endian byte sink, mirroring [`ByteCursor`]'s read API on
/// the write side.
#[derive(Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        ByteWriter::default()
    }

    /// Consume the writer, returning the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Current length of the buffer.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    /// Write a strict boolean as a single 0/1 byte.
    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(if v { 1 } else { 0 });
    }

    /// Write a big-endian `u16`.
    pub fn write_u16_be(&mut self, v: u16) {
        let mut tmp = [0u8; 2];
        BigEndian::write_u16(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Write a big-endian `i32`.
    pub fn write_i32_be(&mut self, v: i32) {
        let mut tmp = [0u8; 4];
        BigEndian::write_i32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Write a big-endian `u32`.
    pub fn write_u32_be(&mut self, v: u32) {
        let mut tmp = [0u8; 4];
        BigEndian::write_u32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Write a big-endian `i64`.
    pub fn write_i64_be(&mut self, v: i64) {
        let mut tmp = [0u8; 8];
        BigEndian::write_i64(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Write a big-endian `u64`.
    pub fn write_u64_be(&mut self, v: u64) {
        let mut tmp = [0u8; 8];
        BigEndian::write_u64(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Write a big-endian `f32`.
    pub fn write_f32_be(&mut self, v: f32) {
        let mut tmp = [0u8; 4];
        BigEndian::write_f32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Write a big-endian `f64`.
    pub fn write_f64_be(&mut self, v: f64) {
        let mut tmp = [0u8; 8];
        BigEndian::write_f64(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Write a little-endian `u32` — outer frame size words only.
    pub fn write_u32_le(&mut self, v: u32) {
        let mut tmp = [0u8; 4];
        LittleEndian::write_u32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    /// Append raw bytes verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a big-endian unsigned integer using exactly `width` bytes —
    /// the inverse of [`ByteCursor::read_uint_be`].
    pub fn write_uint_be(&mut self, value: u64, width: usize) {
        for i in (0..width).rev() {
            self.buf.push(((value >> (8 * i)) & 0xff) as u8);
        }
    }

    /// Write a `u32`-length-prefixed run of opaque bytes.
    pub fn write_length_prefixed_bytes(&mut self, bytes: &[u8]) {
        self.write_u32_be(bytes.len() as u32);
        self.write_bytes(bytes);
    }
}
