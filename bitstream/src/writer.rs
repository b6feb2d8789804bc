//! Byte writer for encoding little-endian binary data.

use crate::error::{ByteError, ByteResult};

/// A growable writer for little-endian binary data.
///
/// Writes are accumulated in an internal buffer. Call [`finish`](Self::finish)
/// to get the final byte buffer.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    /// Creates a new empty `ByteWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ByteWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Discards everything written after `len` bytes.
    ///
    /// Used to roll back a partially written field.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes raw bytes with no length prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Writes a string as a `u16` byte length followed by UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`ByteError::LengthOverflow`] if the encoded string is longer
    /// than `u16::MAX` bytes. Nothing is written in that case.
    pub fn write_str_u16(&mut self, value: &str) -> ByteResult<()> {
        let len = u16::try_from(value.len()).map_err(|_| ByteError::LengthOverflow {
            length: value.len(),
            max: usize::from(u16::MAX),
        })?;
        self.write_u16(len);
        self.write_raw(value.as_bytes());
        Ok(())
    }

    /// Writes a byte string as a `u32` length followed by the bytes.
    pub fn write_bytes_u32(&mut self, value: &[u8]) -> ByteResult<()> {
        let len = u32::try_from(value.len()).map_err(|_| ByteError::LengthOverflow {
            length: value.len(),
            max: u32::MAX as usize,
        })?;
        self.write_u32(len);
        self.write_raw(value);
        Ok(())
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        buf.append(&mut self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_writer() {
        let writer = ByteWriter::new();
        assert_eq!(writer.len(), 0);
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn integers_are_little_endian() {
        let mut writer = ByteWriter::new();
        writer.write_u16(0xBEEF);
        writer.write_u32(0x1234_5678);
        assert_eq!(writer.finish(), vec![0xEF, 0xBE, 0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn negative_i32() {
        let mut writer = ByteWriter::new();
        writer.write_i32(-1);
        assert_eq!(writer.finish(), vec![0xFF; 4]);
    }

    #[test]
    fn f32_bits() {
        let mut writer = ByteWriter::new();
        writer.write_f32(1.0);
        assert_eq!(writer.finish(), 1.0f32.to_le_bytes().to_vec());
    }

    #[test]
    fn str_prefix() {
        let mut writer = ByteWriter::new();
        writer.write_str_u16("bob").unwrap();
        assert_eq!(writer.finish(), vec![3, 0, b'b', b'o', b'b']);
    }

    #[test]
    fn empty_str_is_just_prefix() {
        let mut writer = ByteWriter::new();
        writer.write_str_u16("").unwrap();
        assert_eq!(writer.finish(), vec![0, 0]);
    }

    #[test]
    fn oversized_str_writes_nothing() {
        let long = "x".repeat(usize::from(u16::MAX) + 1);
        let mut writer = ByteWriter::new();
        writer.write_u8(7);
        let err = writer.write_str_u16(&long).unwrap_err();
        assert!(matches!(err, ByteError::LengthOverflow { .. }));
        assert_eq!(writer.as_slice(), &[7]);
    }

    #[test]
    fn bytes_prefix() {
        let mut writer = ByteWriter::new();
        writer.write_bytes_u32(&[9, 8]).unwrap();
        assert_eq!(writer.finish(), vec![2, 0, 0, 0, 9, 8]);
    }

    #[test]
    fn truncate_rolls_back() {
        let mut writer = ByteWriter::new();
        writer.write_u8(1);
        let mark = writer.len();
        writer.write_u32(0xFFFF_FFFF);
        writer.truncate(mark);
        assert_eq!(writer.finish(), vec![1]);
    }

    #[test]
    fn finish_into_appends() {
        let mut buf = vec![0xAA];
        let mut writer = ByteWriter::new();
        writer.write_u8(0xBB);
        writer.finish_into(&mut buf);
        assert_eq!(buf, vec![0xAA, 0xBB]);
    }
}
