use crate::error::{Result, WrapError};
use crate::framing::{FieldReader, FieldWriter};
use std::io::{Read, Write};

/// Marker closing every wrap
pub const SIGNATURE: [u8; 3] = [0x00, b'=', 0x00];

/// Footer size in bytes: offset, chunk count, signature
pub const FOOTER_SIZE: usize = 11;

/// Trailer that lets a reader find a wrap from the end of its host file.
///
/// Structure (11 bytes fixed):
/// - Offset: uint32 LE, length of the base data and start of the first chunk
/// - Chunk Count: uint32 LE
/// - Signature: `00 3D 00`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub offset: u32,
    pub chunk_count: u32,
}

impl Footer {
    pub fn new(offset: u32, chunk_count: u32) -> Self {
        Self {
            offset,
            chunk_count,
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<usize> {
        let mut writer = FieldWriter::new(writer);
        writer.write_u32(self.offset)?;
        writer.write_u32(self.chunk_count)?;
        writer.write_tail(&SIGNATURE)?;
        Ok(writer.written())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut reader = FieldReader::new(reader);
        let offset = reader.read_u32()?;
        let chunk_count = reader.read_u32()?;

        let sig = reader.read_exact_field(SIGNATURE.len())?;
        if sig != SIGNATURE {
            return Err(WrapError::UnsupportedFormat(
                "Invalid wrap footer signature".to_string(),
            ));
        }

        Ok(Self {
            offset,
            chunk_count,
        })
    }

    /// Check the footer against the total length of the stream it closes
    pub fn validate_against_length(&self, stream_len: u64) -> Result<()> {
        let footer_start = stream_len.checked_sub(FOOTER_SIZE as u64).ok_or_else(|| {
            WrapError::UnsupportedFormat(format!(
                "Stream of {} bytes is too short for a wrap footer",
                stream_len
            ))
        })?;
        if u64::from(self.offset) > footer_start {
            return Err(WrapError::UnsupportedFormat(format!(
                "Wrap offset {} lies beyond the footer at {}",
                self.offset, footer_start
            )));
        }
        Ok(())
    }
}

/// Whether `tail` ends with the wrap signature
pub fn ends_with_signature(tail: &[u8]) -> bool {
    tail.ends_with(&SIGNATURE)
}
