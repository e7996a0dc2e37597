use crate::error::{Result, WrapError};
use std::fmt;

/// First byte of every resolver record
pub const SENTINEL: u8 = b'~';

/// Resolver header size: sentinel + ASCII tag digit
pub const HEADER_SIZE: usize = 2;

/// Resolver variants and their wire tags.
///
/// Tags are append-only: never renumber or reuse one. A new resolver kind
/// takes the next unused value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResolverKind {
    Identity = 0,
    Crypto = 1,
    Compression = 2,
    Network = 3,
    Base64 = 4,
    File = 5,
}

impl ResolverKind {
    pub const ALL: [ResolverKind; 6] = [
        Self::Identity,
        Self::Crypto,
        Self::Compression,
        Self::Network,
        Self::Base64,
        Self::File,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Identity),
            1 => Ok(Self::Crypto),
            2 => Ok(Self::Compression),
            3 => Ok(Self::Network),
            4 => Ok(Self::Base64),
            5 => Ok(Self::File),
            _ => Err(WrapError::UnsupportedFormat(format!("Unknown resolver tag: {}", tag))),
        }
    }

    /// Two-byte record header, e.g. `~4` for Base64
    pub fn header(self) -> [u8; HEADER_SIZE] {
        [SENTINEL, b'0' + self.tag()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Crypto => "crypto",
            Self::Compression => "compression",
            Self::Network => "network",
            Self::Base64 => "base64",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Split a record into its kind and body.
///
/// Returns `None` when the buffer carries no header (too short, or the first
/// byte is not the sentinel); such a buffer is a raw payload.
pub fn parse_header(data: &[u8]) -> Result<Option<(ResolverKind, &[u8])>> {
    if data.len() <= HEADER_SIZE || data[0] != SENTINEL {
        return Ok(None);
    }
    let tag = data[1].wrapping_sub(b'0');
    let kind = ResolverKind::from_tag(tag)?;
    Ok(Some((kind, &data[HEADER_SIZE..])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_stable() {
        let tags: Vec<u8> = ResolverKind::ALL.iter().map(|k| k.tag()).collect();
        assert_eq!(tags, vec![0, 1, 2, 3, 4, 5]);
        for kind in ResolverKind::ALL {
            assert_eq!(ResolverKind::from_tag(kind.tag()).unwrap(), kind);
        }
    }

    #[test]
    fn test_header_is_printable() {
        assert_eq!(&ResolverKind::Identity.header(), b"~0");
        assert_eq!(&ResolverKind::Base64.header(), b"~4");
        assert_eq!(&ResolverKind::File.header(), b"~5");
    }

    #[test]
    fn test_parse_header() {
        assert!(parse_header(b"").unwrap().is_none());
        assert!(parse_header(b"~0").unwrap().is_none());
        assert!(parse_header(b"abc").unwrap().is_none());

        let (kind, body) = parse_header(b"~4Zm9v").unwrap().unwrap();
        assert_eq!(kind, ResolverKind::Base64);
        assert_eq!(body, b"Zm9v");
    }

    #[test]
    fn test_unknown_tags() {
        assert!(matches!(parse_header(b"~6x"), Err(WrapError::UnsupportedFormat(_))));
        // Below '0' wraps around to a large tag
        assert!(matches!(parse_header(b"~/x"), Err(WrapError::UnsupportedFormat(_))));
    }
}
