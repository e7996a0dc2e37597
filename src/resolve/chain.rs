use crate::config::CodecConfig;
use crate::error::Result;
use crate::resolve::kind::ResolverKind;
use crate::resolve::{CompressionResolver, CryptoResolver, Resolver};
use serde::{Deserialize, Serialize};

/// Nesting order of the crypto and compression layers in a default chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainLayout {
    /// Crypto outside, compressing the payload before it is encrypted
    #[default]
    EncryptCompressed,
    /// Compression outside, compressing the ciphertext
    CompressEncrypted,
}

impl ChainLayout {
    /// Variant sequence produced by this layout, outermost first
    pub fn kinds(self) -> [ResolverKind; 3] {
        match self {
            Self::EncryptCompressed => [
                ResolverKind::Crypto,
                ResolverKind::Compression,
                ResolverKind::Identity,
            ],
            Self::CompressEncrypted => [
                ResolverKind::Compression,
                ResolverKind::Crypto,
                ResolverKind::Identity,
            ],
        }
    }

    fn build(
        self,
        crypto: impl FnOnce(Resolver) -> CryptoResolver,
        data: Vec<u8>,
        config: &CodecConfig,
    ) -> Resolver {
        let identity = Resolver::identity(data);
        let compress = |child: Resolver| -> Resolver {
            CompressionResolver::new(child)
                .with_method(config.compression)
                .with_level(config.compression_level)
                .into()
        };
        let encrypt = |child: Resolver| -> Resolver {
            crypto(child)
                .with_algorithm(config.algorithm)
                .with_kdf(config.kdf())
                .into()
        };
        match self {
            Self::EncryptCompressed => encrypt(compress(identity)),
            Self::CompressEncrypted => compress(encrypt(identity)),
        }
    }
}

/// Chain over `data` protected by a generated password that is renewed on
/// every unpack
pub fn default_chain<D: Into<Vec<u8>>>(data: D, config: &CodecConfig) -> Resolver {
    config.layout.build(
        |child| CryptoResolver::ephemeral_with_length(child, config.password_length),
        data.into(),
        config,
    )
}

/// Chain over `data` protected by a fixed password
pub fn password_chain<D: Into<Vec<u8>>>(
    password: &str,
    data: D,
    config: &CodecConfig,
) -> Result<Resolver> {
    let mut layer = CryptoResolver::new(Resolver::identity(Vec::new()), password)?;
    Ok(config.layout.build(
        move |child| {
            layer.child = Box::new(child);
            layer
        },
        data.into(),
        config,
    ))
}
