//! Resolver chains: the recursive, self-describing payload codec.
//!
//! A chain is a tree of [`Resolver`] nodes where every transform layer owns
//! exactly one child and the innermost node is an [`IdentityResolver`]
//! holding the payload. Packing recurses child-first and emits
//! `header ++ own fields ++ child payload` at each level; unpacking reads the
//! header, dispatches on the tag and rebuilds the same shape.
//!
//! Record layouts (integers are 4-byte little-endian):
//!
//! ```text
//! identity     ~0 [payload...]
//! crypto       ~1 [algorithm][password\0][renew][iv_len][iv][ciphertext...]
//! compression  ~2 [gzip member | zstd frame...]
//! network      ~3 [address...]
//! base64       ~4 [base64 text...]
//! file         ~5 [path...]
//! ```
//!
//! A buffer of two bytes or less, or one that does not start with the
//! sentinel, unpacks to an identity over the whole buffer, so files that were
//! never packed resolve to themselves.

mod base64;
mod chain;
mod compression;
mod crypto;
mod file;
mod identity;
mod kind;
mod network;

pub use self::base64::Base64Resolver;
pub use chain::{default_chain, password_chain, ChainLayout};
pub use compression::{CompressionMethod, CompressionResolver};
pub use crypto::CryptoResolver;
pub use file::FileResolver;
pub use identity::IdentityResolver;
pub use kind::{parse_header, ResolverKind, HEADER_SIZE, SENTINEL};
pub use network::NetworkResolver;

use crate::config::CodecConfig;
use crate::crypto::KdfParams;
use crate::error::{Result, WrapError};

/// One node of a resolver chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolver {
    Identity(IdentityResolver),
    Crypto(CryptoResolver),
    Compression(CompressionResolver),
    Network(NetworkResolver),
    Base64(Base64Resolver),
    File(FileResolver),
}

impl Resolver {
    /// Terminal node over `data`
    pub fn identity<D: Into<Vec<u8>>>(data: D) -> Self {
        Resolver::Identity(IdentityResolver::new(data))
    }

    pub fn kind(&self) -> ResolverKind {
        match self {
            Resolver::Identity(_) => ResolverKind::Identity,
            Resolver::Crypto(_) => ResolverKind::Crypto,
            Resolver::Compression(_) => ResolverKind::Compression,
            Resolver::Network(_) => ResolverKind::Network,
            Resolver::Base64(_) => ResolverKind::Base64,
            Resolver::File(_) => ResolverKind::File,
        }
    }

    /// Next node toward the terminal, `None` for the terminal itself
    pub fn child(&self) -> Option<&Resolver> {
        match self {
            Resolver::Identity(_) => None,
            Resolver::Crypto(r) => Some(&r.child),
            Resolver::Compression(r) => Some(&r.child),
            Resolver::Network(r) => Some(&r.child),
            Resolver::Base64(r) => Some(&r.child),
            Resolver::File(r) => Some(&r.child),
        }
    }

    fn child_mut(&mut self) -> Option<&mut Resolver> {
        match self {
            Resolver::Identity(_) => None,
            Resolver::Crypto(r) => Some(&mut r.child),
            Resolver::Compression(r) => Some(&mut r.child),
            Resolver::Network(r) => Some(&mut r.child),
            Resolver::Base64(r) => Some(&mut r.child),
            Resolver::File(r) => Some(&mut r.child),
        }
    }

    /// Walk the chain from this node to the terminal
    pub fn iter(&self) -> Layers<'_> {
        Layers { next: Some(self) }
    }

    /// Variant sequence, outermost first
    pub fn kinds(&self) -> Vec<ResolverKind> {
        self.iter().map(Resolver::kind).collect()
    }

    /// Number of transform layers above the terminal
    pub fn depth(&self) -> usize {
        self.iter().count() - 1
    }

    pub fn terminal(&self) -> &IdentityResolver {
        match self {
            Resolver::Identity(identity) => identity,
            Resolver::Crypto(r) => r.child.terminal(),
            Resolver::Compression(r) => r.child.terminal(),
            Resolver::Network(r) => r.child.terminal(),
            Resolver::Base64(r) => r.child.terminal(),
            Resolver::File(r) => r.child.terminal(),
        }
    }

    pub fn terminal_mut(&mut self) -> &mut IdentityResolver {
        match self {
            Resolver::Identity(identity) => identity,
            Resolver::Crypto(r) => r.child.terminal_mut(),
            Resolver::Compression(r) => r.child.terminal_mut(),
            Resolver::Network(r) => r.child.terminal_mut(),
            Resolver::Base64(r) => r.child.terminal_mut(),
            Resolver::File(r) => r.child.terminal_mut(),
        }
    }

    /// Payload held by the terminal node
    pub fn data(&self) -> &[u8] {
        self.terminal().data()
    }

    pub fn set_data<D: Into<Vec<u8>>>(&mut self, data: D) {
        self.terminal_mut().set_data(data);
    }

    /// Outermost crypto layer, if any
    pub fn find_crypto(&self) -> Option<&CryptoResolver> {
        self.iter().find_map(|layer| match layer {
            Resolver::Crypto(crypto) => Some(crypto),
            _ => None,
        })
    }

    pub fn find_crypto_mut(&mut self) -> Option<&mut CryptoResolver> {
        match self {
            Resolver::Crypto(crypto) => Some(crypto),
            other => other.child_mut().and_then(Resolver::find_crypto_mut),
        }
    }

    /// Serialize the chain into one self-describing buffer.
    ///
    /// File layers write their child to disk as a side effect; network layers
    /// emit only their address.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let packed = match self {
            Resolver::Identity(r) => r.pack_record(),
            Resolver::Crypto(r) => r.pack_record()?,
            Resolver::Compression(r) => r.pack_record()?,
            Resolver::Network(r) => r.pack_record()?,
            Resolver::Base64(r) => r.pack_record()?,
            Resolver::File(r) => r.pack_record()?,
        };
        tracing::debug!(kind = %self.kind(), bytes = packed.len(), "packed resolver");
        Ok(packed)
    }

    /// Rebuild a chain with the default configuration
    pub fn unpack(data: &[u8]) -> Result<Self> {
        Self::unpack_with(data, &CodecConfig::default())
    }

    pub fn unpack_with(data: &[u8], config: &CodecConfig) -> Result<Self> {
        Unpacker::new(config).unpack(data, 0)
    }
}

impl From<IdentityResolver> for Resolver {
    fn from(r: IdentityResolver) -> Self {
        Resolver::Identity(r)
    }
}

impl From<CryptoResolver> for Resolver {
    fn from(r: CryptoResolver) -> Self {
        Resolver::Crypto(r)
    }
}

impl From<CompressionResolver> for Resolver {
    fn from(r: CompressionResolver) -> Self {
        Resolver::Compression(r)
    }
}

impl From<NetworkResolver> for Resolver {
    fn from(r: NetworkResolver) -> Self {
        Resolver::Network(r)
    }
}

impl From<Base64Resolver> for Resolver {
    fn from(r: Base64Resolver) -> Self {
        Resolver::Base64(r)
    }
}

impl From<FileResolver> for Resolver {
    fn from(r: FileResolver) -> Self {
        Resolver::File(r)
    }
}

/// Iterator over a chain, outermost node first
pub struct Layers<'a> {
    next: Option<&'a Resolver>,
}

impl<'a> Iterator for Layers<'a> {
    type Item = &'a Resolver;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.child();
        Some(current)
    }
}

/// Recursive decoder carrying the settings that are not on the wire
pub(crate) struct Unpacker<'a> {
    config: &'a CodecConfig,
    kdf: KdfParams,
}

impl<'a> Unpacker<'a> {
    pub(crate) fn new(config: &'a CodecConfig) -> Self {
        Self {
            config,
            kdf: config.kdf(),
        }
    }

    pub(crate) fn config(&self) -> &CodecConfig {
        self.config
    }

    pub(crate) fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    /// Decode `data` found `depth` layers below the outermost record
    pub(crate) fn unpack(&self, data: &[u8], depth: usize) -> Result<Resolver> {
        if depth > self.config.max_chain_depth {
            return Err(WrapError::UnsupportedFormat(format!(
                "Resolver chain deeper than {} layers",
                self.config.max_chain_depth
            )));
        }

        // A transform's child is always a packed record, so a bare identity
        // header below the top level is an empty payload.
        if depth > 0 && IdentityResolver::is_empty_record(data) {
            return Ok(Resolver::Identity(IdentityResolver::default()));
        }

        let Some((kind, body)) = parse_header(data)? else {
            tracing::debug!(bytes = data.len(), "no resolver header, using raw payload");
            return Ok(Resolver::identity(data));
        };

        tracing::debug!(kind = %kind, depth, bytes = body.len(), "unpacking resolver");
        let resolver: Resolver = match kind {
            ResolverKind::Identity => IdentityResolver::unpack_record(body).into(),
            ResolverKind::Crypto => CryptoResolver::unpack_record(body, self, depth)?.into(),
            ResolverKind::Compression => {
                CompressionResolver::unpack_record(body, self, depth)?.into()
            }
            ResolverKind::Network => NetworkResolver::unpack_record(body, self, depth)?.into(),
            ResolverKind::Base64 => Base64Resolver::unpack_record(body, self, depth)?.into(),
            ResolverKind::File => FileResolver::unpack_record(body, self, depth)?.into(),
        };
        Ok(resolver)
    }
}

/// Reject values that cannot live in a zero-terminated field
pub(crate) fn validate_text_field(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(WrapError::InvalidArgument(format!("{} must not be empty", what)));
    }
    if value.as_bytes().contains(&0) {
        return Err(WrapError::InvalidArgument(format!(
            "{} must not contain a zero byte",
            what
        )));
    }
    Ok(())
}
