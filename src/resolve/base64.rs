use crate::error::{Result, WrapError};
use crate::framing::{FieldReader, FieldWriter};
use crate::resolve::kind::ResolverKind;
use crate::resolve::{Resolver, Unpacker};
use ::base64::prelude::*;

/// Text-safe encoding of the child's packed stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Resolver {
    pub(crate) child: Box<Resolver>,
}

impl Base64Resolver {
    pub fn new(child: Resolver) -> Self {
        Self {
            child: Box::new(child),
        }
    }

    pub fn child(&self) -> &Resolver {
        &self.child
    }

    pub(crate) fn pack_record(&self) -> Result<Vec<u8>> {
        let encoded = BASE64_STANDARD.encode(self.child.pack()?);

        let mut writer = FieldWriter::new(Vec::with_capacity(encoded.len() + 2));
        writer.write_tail(&ResolverKind::Base64.header())?;
        writer.write_tail(encoded.as_bytes())?;
        Ok(writer.into_inner())
    }

    pub(crate) fn unpack_record(body: &[u8], unpacker: &Unpacker<'_>, depth: usize) -> Result<Self> {
        let text = FieldReader::new(body).read_terminated()?;
        let child_data = BASE64_STANDARD
            .decode(&text)
            .map_err(|e| WrapError::UnsupportedFormat(format!("Invalid base64 record: {}", e)))?;
        let child = unpacker.unpack(&child_data, depth + 1)?;
        Ok(Self {
            child: Box::new(child),
        })
    }
}
