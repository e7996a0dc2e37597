//! Byte-framing primitives shared by every wire record
//!
//! Four field shapes are used:
//! - fixed-width integer: 4 bytes, little-endian (lengths, flags, enum codes)
//! - terminated: bytes up to a 0x00 or the end of the record, 0x00 consumed
//! - length-prefixed: a fixed-width length followed by that many raw bytes
//! - tail: everything up to the end of the record, only ever the last field
//!
//! Every primitive can run its bytes through a [`ByteTransform`]. All
//! transforms are involutions, so the same transform decodes what it encoded.

use crate::error::{Result, WrapError};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Width of every fixed-width integer field
pub const INT_SIZE: usize = 4;

/// Reversible single-byte transform, `t.apply(t.apply(b)) == b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteTransform {
    #[default]
    None,
    /// Invert every bit
    Xor,
    /// Invert the even-position bits
    EvenXor,
    /// Invert the odd-position bits
    OddXor,
    /// Mirror the bit order
    Reverse,
}

impl ByteTransform {
    pub fn apply(self, byte: u8) -> u8 {
        match self {
            Self::None => byte,
            Self::Xor => !byte,
            Self::EvenXor => byte ^ 0x55,
            Self::OddXor => byte ^ 0xAA,
            Self::Reverse => byte.reverse_bits(),
        }
    }

    fn apply_in_place(self, bytes: &mut [u8]) {
        if self != Self::None {
            bytes.iter_mut().for_each(|b| *b = self.apply(*b));
        }
    }
}

/// Field encoder over any writer, counting the bytes it emits
pub struct FieldWriter<W: Write> {
    inner: W,
    transform: ByteTransform,
    written: usize,
}

impl<W: Write> FieldWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_transform(inner, ByteTransform::None)
    }

    pub fn with_transform(inner: W, transform: ByteTransform) -> Self {
        Self {
            inner,
            transform,
            written: 0,
        }
    }

    /// Number of bytes written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        if self.transform == ByteTransform::None {
            self.inner.write_all(bytes)?;
        } else {
            let mut encoded = bytes.to_vec();
            self.transform.apply_in_place(&mut encoded);
            self.inner.write_all(&encoded)?;
        }
        self.written += bytes.len();
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_le_bytes())
    }

    /// Write a length as a fixed-width integer
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| {
            WrapError::InvalidArgument(format!("Field too long: {} bytes (max {})", len, u32::MAX))
        })?;
        self.write_u32(len)
    }

    pub fn write_flag(&mut self, flag: bool) -> Result<()> {
        self.write_u32(u32::from(flag))
    }

    /// Write bytes followed by a 0x00 terminator. The bytes must be zero-free.
    pub fn write_terminated(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.contains(&0) {
            return Err(WrapError::InvalidArgument(
                "Terminated field must not contain a zero byte".to_string(),
            ));
        }
        self.put(bytes)?;
        self.put(&[0])
    }

    pub fn write_length_prefixed(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.put(bytes)
    }

    /// Write the final field of a record: no length, no terminator
    pub fn write_tail(&mut self, bytes: &[u8]) -> Result<()> {
        self.put(bytes)
    }
}

/// Field decoder over any reader
pub struct FieldReader<R: Read> {
    inner: R,
    transform: ByteTransform,
}

impl<R: Read> FieldReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_transform(inner, ByteTransform::None)
    }

    pub fn with_transform(inner: R, transform: ByteTransform) -> Self {
        Self { inner, transform }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; INT_SIZE];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| WrapError::from_read(e, "integer field"))?;
        self.transform.apply_in_place(&mut buf);
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_len(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    /// Read a 0/1 flag; only 1 counts as set
    pub fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read_u32()? == 1)
    }

    /// Read up to a 0x00 or the end of input
    pub fn read_terminated(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    let decoded = self.transform.apply(byte[0]);
                    if decoded == 0 {
                        break;
                    }
                    out.push(decoded);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(out)
    }

    /// Read a terminated field as UTF-8 text
    pub fn read_terminated_str(&mut self) -> Result<String> {
        String::from_utf8(self.read_terminated()?)
            .map_err(|e| WrapError::UnsupportedFormat(format!("Invalid UTF-8 in text field: {}", e)))
    }

    /// Read exactly `len` bytes
    pub fn read_exact_field(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.inner.by_ref().take(len as u64).read_to_end(&mut out)?;
        if out.len() != len {
            return Err(WrapError::UnsupportedFormat(format!(
                "Truncated field: expected {} bytes, got {}",
                len,
                out.len()
            )));
        }
        self.transform.apply_in_place(&mut out);
        Ok(out)
    }

    pub fn read_length_prefixed(&mut self) -> Result<Vec<u8>> {
        let len = self.read_len()?;
        self.read_exact_field(len)
    }

    /// Read everything left in the record
    pub fn read_tail(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.inner.read_to_end(&mut out)?;
        self.transform.apply_in_place(&mut out);
        Ok(out)
    }
}
