//! Capture files: one direction of one channel, in send order.
//!
//! A capture is a sequence of `[u32 LE length][message bytes]` records.

use anyhow::{Context, Result};
use bitstream::{ByteReader, ByteWriter};

/// Splits a capture into its messages.
pub fn read_capture(bytes: &[u8]) -> Result<Vec<&[u8]>> {
    let mut reader = ByteReader::new(bytes);
    let mut messages = Vec::new();
    while !reader.is_empty() {
        let offset = reader.position();
        let message = reader
            .read_bytes_u32()
            .with_context(|| format!("truncated capture record at byte {offset}"))?;
        messages.push(message);
    }
    Ok(messages)
}

/// Builds a capture from messages.
pub fn write_capture<I>(messages: I) -> Result<Vec<u8>>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut writer = ByteWriter::new();
    for (index, message) in messages.into_iter().enumerate() {
        writer
            .write_bytes_u32(message.as_ref())
            .with_context(|| format!("capture record {index}"))?;
    }
    Ok(writer.finish())
}
