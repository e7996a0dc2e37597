use crate::error::{Result, WrapError};
use crate::resolve::kind::ResolverKind;
use crate::resolve::{Resolver, Unpacker};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// gzip member magic
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// zstd frame magic (0xFD2FB528, little-endian)
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Codec used by a compression layer.
///
/// The record carries no method field; the codec is recognized from the
/// magic bytes of the compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompressionMethod {
    #[default]
    Gzip,
    Zstd,
}

impl CompressionMethod {
    /// Identify the codec of a compressed stream
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&GZIP_MAGIC) {
            Some(Self::Gzip)
        } else if data.starts_with(&ZSTD_MAGIC) {
            Some(Self::Zstd)
        } else {
            None
        }
    }

    pub fn compress(self, data: &[u8], level: i32) -> Result<Vec<u8>> {
        match self {
            Self::Gzip => {
                let level = level.clamp(0, 9) as u32;
                let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
            Self::Zstd => zstd::encode_all(data, level).map_err(|e| {
                WrapError::UnsupportedFormat(format!("Zstd compression failed: {}", e))
            }),
        }
    }

    /// Decompress, refusing output larger than `limit` bytes
    pub fn decompress(self, data: &[u8], limit: u64) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let read = match self {
            Self::Gzip => GzDecoder::new(data).take(limit.saturating_add(1)).read_to_end(&mut out),
            Self::Zstd => zstd::stream::read::Decoder::new(data)
                .and_then(|decoder| decoder.take(limit.saturating_add(1)).read_to_end(&mut out)),
        };
        read.map_err(|e| {
            WrapError::UnsupportedFormat(format!("{:?} decompression failed: {}", self, e))
        })?;
        if out.len() as u64 > limit {
            return Err(WrapError::UnsupportedFormat(format!(
                "Decompressed payload exceeds limit of {} bytes",
                limit
            )));
        }
        Ok(out)
    }
}

/// Compresses the whole packed stream of its child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionResolver {
    method: CompressionMethod,
    level: i32,
    pub(crate) child: Box<Resolver>,
}

impl CompressionResolver {
    pub fn new(child: Resolver) -> Self {
        Self {
            method: CompressionMethod::default(),
            level: 6,
            child: Box::new(child),
        }
    }

    pub fn with_method(mut self, method: CompressionMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn method(&self) -> CompressionMethod {
        self.method
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn child(&self) -> &Resolver {
        &self.child
    }

    pub(crate) fn pack_record(&self) -> Result<Vec<u8>> {
        let child_data = self.child.pack()?;
        let compressed = self.method.compress(&child_data, self.level)?;

        let mut out = Vec::with_capacity(compressed.len() + 2);
        out.extend_from_slice(&ResolverKind::Compression.header());
        out.extend_from_slice(&compressed);
        Ok(out)
    }

    pub(crate) fn unpack_record(body: &[u8], unpacker: &Unpacker<'_>, depth: usize) -> Result<Self> {
        let method = CompressionMethod::detect(body).ok_or_else(|| {
            WrapError::UnsupportedFormat("Unrecognized compressed stream".to_string())
        })?;
        let child_data = method.decompress(body, unpacker.config().max_payload_size)?;
        let child = unpacker.unpack(&child_data, depth + 1)?;
        Ok(Self {
            method,
            level: 6,
            child: Box::new(child),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;

    #[test]
    fn test_both_methods_roundtrip() {
        let payload = b"compress me, compress me, compress me, compress me".to_vec();
        for method in [CompressionMethod::Gzip, CompressionMethod::Zstd] {
            let layer = CompressionResolver::new(Resolver::identity(payload.clone())).with_method(method);
            let packed = Resolver::from(layer).pack().unwrap();
            assert_eq!(CompressionMethod::detect(&packed[2..]), Some(method));

            let unpacked = Resolver::unpack(&packed).unwrap();
            match &unpacked {
                Resolver::Compression(layer) => assert_eq!(layer.method(), method),
                other => panic!("expected compression layer, got {:?}", other.kind()),
            }
            assert_eq!(unpacked.data(), &payload[..]);
        }
    }

    #[test]
    fn test_unrecognized_stream() {
        let err = Resolver::unpack(b"~2not compressed").unwrap_err();
        assert!(matches!(err, WrapError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_corrupt_gzip() {
        let mut data = b"~2".to_vec();
        data.extend_from_slice(&GZIP_MAGIC);
        data.extend_from_slice(&[0xFF; 12]);
        assert!(matches!(
            Resolver::unpack(&data),
            Err(WrapError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_decompression_limit() {
        let layer = CompressionResolver::new(Resolver::identity(vec![0u8; 64 * 1024]));
        let packed = Resolver::from(layer).pack().unwrap();

        let mut config = CodecConfig::default();
        config.max_payload_size = 1024;
        let err = Resolver::unpack_with(&packed, &config).unwrap_err();
        assert!(err.to_string().contains("exceeds limit"));
    }
}
