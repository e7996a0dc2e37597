//! Named resolver chains.
//!
//! Chunk record layout:
//!
//! ```text
//! [name\0][packed_len: u32 LE][packed chain: packed_len bytes]
//! ```

use crate::config::CodecConfig;
use crate::error::{Result, WrapError};
use crate::framing::{FieldReader, FieldWriter};
use crate::resolve::{default_chain, password_chain, validate_text_field, Resolver};
use std::io::{Read, Write};

/// A named, independently packed payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    name: String,
    chain: Resolver,
}

impl Chunk {
    /// Chunk over `data` behind the default chain and a generated password
    pub fn new<D: Into<Vec<u8>>>(name: impl Into<String>, data: D) -> Result<Self> {
        Self::new_with_config(name, data, &CodecConfig::default())
    }

    pub fn new_with_config<D: Into<Vec<u8>>>(
        name: impl Into<String>,
        data: D,
        config: &CodecConfig,
    ) -> Result<Self> {
        Self::with_chain(name, default_chain(data, config))
    }

    /// Chunk over `data` behind the default chain and a fixed password
    pub fn with_password<D: Into<Vec<u8>>>(
        name: impl Into<String>,
        password: &str,
        data: D,
    ) -> Result<Self> {
        Self::with_password_config(name, password, data, &CodecConfig::default())
    }

    pub fn with_password_config<D: Into<Vec<u8>>>(
        name: impl Into<String>,
        password: &str,
        data: D,
        config: &CodecConfig,
    ) -> Result<Self> {
        Self::with_chain(name, password_chain(password, data, config)?)
    }

    pub fn with_chain(name: impl Into<String>, chain: Resolver) -> Result<Self> {
        let name = name.into();
        validate_text_field(&name, "Chunk name")?;
        Ok(Self { name, chain })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_text_field(&name, "Chunk name")?;
        self.name = name;
        Ok(())
    }

    /// Payload of the chain's terminal node
    pub fn data(&self) -> &[u8] {
        self.chain.data()
    }

    pub fn set_data<D: Into<Vec<u8>>>(&mut self, data: D) {
        self.chain.set_data(data);
    }

    pub fn chain(&self) -> &Resolver {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut Resolver {
        &mut self.chain
    }

    pub fn into_chain(self) -> Resolver {
        self.chain
    }

    /// Password of the outermost crypto layer
    pub fn password(&self) -> Option<&str> {
        self.chain.find_crypto().map(|crypto| crypto.password())
    }

    pub fn set_password(&mut self, password: &str) -> Result<()> {
        let name = &self.name;
        let crypto = self.chain.find_crypto_mut().ok_or_else(|| {
            WrapError::NotFound(format!("Chunk '{}' has no crypto layer", name))
        })?;
        crypto.set_password(password)
    }

    /// Whether `password` is the one protecting this chunk.
    ///
    /// A chunk without a crypto layer is unlocked by nothing.
    pub fn unlocks_with(&self, password: &str) -> bool {
        self.chain
            .find_crypto()
            .map_or(false, |crypto| crypto.verify_password(password))
    }

    /// Write the chunk record, returning the number of bytes written
    pub fn write_to<W: Write>(&self, writer: W) -> Result<usize> {
        let packed = self.chain.pack()?;

        let mut writer = FieldWriter::new(writer);
        writer.write_terminated(self.name.as_bytes())?;
        writer.write_length_prefixed(&packed)?;
        tracing::debug!(name = %self.name, bytes = writer.written(), "wrote chunk");
        Ok(writer.written())
    }

    pub fn read_from<R: Read>(reader: R, config: &CodecConfig) -> Result<Self> {
        let mut reader = FieldReader::new(reader);

        let name = reader.read_terminated_str()?;
        if name.is_empty() {
            return Err(WrapError::UnsupportedFormat("Empty chunk name".to_string()));
        }

        let len = reader.read_len()?;
        if len as u64 > config.max_payload_size {
            return Err(WrapError::UnsupportedFormat(format!(
                "Chunk '{}' claims {} bytes, limit is {}",
                name, len, config.max_payload_size
            )));
        }
        let packed = reader.read_exact_field(len)?;
        let chain = Resolver::unpack_with(&packed, config)?;
        tracing::debug!(name = %name, bytes = len, "read chunk");

        Ok(Self { name, chain })
    }
}
