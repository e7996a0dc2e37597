use crate::error::{Result, WrapError};
use crate::framing::{FieldReader, FieldWriter};
use crate::resolve::kind::ResolverKind;
use crate::resolve::{validate_text_field, Resolver, Unpacker};
use std::io::Read;

/// Fetch-only remote payload.
///
/// Unpacking downloads the child's packed stream from `address`. Packing
/// emits the address alone; nothing is uploaded and the in-memory child is
/// not part of the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkResolver {
    address: String,
    pub(crate) child: Box<Resolver>,
}

impl NetworkResolver {
    pub fn new(address: impl Into<String>, child: Resolver) -> Result<Self> {
        let address = address.into();
        validate_text_field(&address, "Network address")?;
        Ok(Self {
            address,
            child: Box::new(child),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: impl Into<String>) -> Result<()> {
        let address = address.into();
        validate_text_field(&address, "Network address")?;
        self.address = address;
        Ok(())
    }

    pub fn child(&self) -> &Resolver {
        &self.child
    }

    pub(crate) fn pack_record(&self) -> Result<Vec<u8>> {
        let mut writer = FieldWriter::new(Vec::with_capacity(self.address.len() + 2));
        writer.write_tail(&ResolverKind::Network.header())?;
        writer.write_tail(self.address.as_bytes())?;
        Ok(writer.into_inner())
    }

    pub(crate) fn unpack_record(body: &[u8], unpacker: &Unpacker<'_>, depth: usize) -> Result<Self> {
        let address = FieldReader::new(body).read_terminated_str()?;
        if address.is_empty() {
            return Err(WrapError::InvalidArgument("Empty network address field".to_string()));
        }

        let child_data = fetch(&address, unpacker.config().max_payload_size)?;
        let child = unpacker.unpack(&child_data, depth + 1)?;
        Ok(Self {
            address,
            child: Box::new(child),
        })
    }
}

/// Download the whole body at `address`, at most `limit` bytes
fn fetch(address: &str, limit: u64) -> Result<Vec<u8>> {
    tracing::debug!(address, "fetching network resolver payload");
    let response = ureq::get(address)
        .call()
        .map_err(|e| WrapError::Network(format!("Fetch of {} failed: {}", address, e)))?;

    let mut body = Vec::new();
    response
        .into_reader()
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| WrapError::Network(format!("Reading {} failed: {}", address, e)))?;
    if body.len() as u64 > limit {
        return Err(WrapError::Network(format!(
            "Response from {} exceeds limit of {} bytes",
            address, limit
        )));
    }
    tracing::debug!(address, bytes = body.len(), "fetched network resolver payload");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_emits_address_only() {
        let layer = NetworkResolver::new(
            "http://127.0.0.1:9/payload",
            Resolver::identity(b"local copy".to_vec()),
        )
        .unwrap();
        let packed = Resolver::from(layer).pack().unwrap();
        assert_eq!(packed, b"~3http://127.0.0.1:9/payload");
    }

    #[test]
    fn test_rejects_bad_addresses() {
        assert!(matches!(
            NetworkResolver::new("", Resolver::identity(Vec::new())),
            Err(WrapError::InvalidArgument(_))
        ));
        let mut layer = NetworkResolver::new("http://a", Resolver::identity(Vec::new())).unwrap();
        assert!(layer.set_address("x\0y").is_err());
        assert_eq!(layer.address(), "http://a");
    }

    #[test]
    fn test_malformed_address() {
        let err = Resolver::unpack(b"~3not a url").unwrap_err();
        assert!(matches!(err, WrapError::Network(_)));
    }
}
