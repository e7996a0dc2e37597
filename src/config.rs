//! Codec configuration
//!
//! Everything that is not carried on the wire but must agree between the
//! writer and the reader lives here: the key-derivation salt and work factor,
//! plus the defaults used when building new chains and the limits applied
//! while unpacking untrusted input.
//!
//! ```toml
//! algorithm = "aes"
//! salt = "sAl7I$n0Lie"
//! kdf_iterations = 1000
//! compression = "gzip"
//! layout = "encrypt-compressed"
//! max_chain_depth = 16
//! ```

use crate::crypto::{
    CryptoAlgorithm, KdfParams, DEFAULT_KDF_ITERATIONS, DEFAULT_PASSWORD_LENGTH, DEFAULT_SALT,
};
use crate::error::{Result, WrapError};
use crate::resolve::{ChainLayout, CompressionMethod};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default ceiling on nested resolver layers while unpacking
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 16;

/// Default ceiling on decompressed or downloaded payloads (1 GiB)
pub const DEFAULT_MAX_PAYLOAD_SIZE: u64 = 1 << 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Cipher for newly built crypto layers
    pub algorithm: CryptoAlgorithm,
    /// Key-derivation salt (public, must match between writer and reader)
    pub salt: String,
    pub kdf_iterations: u32,
    /// Length of generated passwords
    pub password_length: usize,
    /// Codec for newly built compression layers
    pub compression: CompressionMethod,
    pub compression_level: i32,
    /// Nesting order of the default chunk chain
    pub layout: ChainLayout,
    pub max_chain_depth: usize,
    pub max_payload_size: u64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            algorithm: CryptoAlgorithm::Aes,
            salt: String::from_utf8_lossy(DEFAULT_SALT).into_owned(),
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            password_length: DEFAULT_PASSWORD_LENGTH,
            compression: CompressionMethod::Gzip,
            compression_level: 6,
            layout: ChainLayout::EncryptCompressed,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl CodecConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Key-derivation parameters for crypto layers
    pub fn kdf(&self) -> KdfParams {
        KdfParams {
            salt: self.salt.as_bytes().to_vec(),
            iterations: self.kdf_iterations,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.kdf_iterations == 0 {
            return Err(WrapError::Config("kdf_iterations must be at least 1".to_string()));
        }
        if self.password_length == 0 {
            return Err(WrapError::Config("password_length must be at least 1".to_string()));
        }
        if self.max_chain_depth == 0 {
            return Err(WrapError::Config("max_chain_depth must be at least 1".to_string()));
        }
        Ok(())
    }
}
