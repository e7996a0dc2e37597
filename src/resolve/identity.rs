use crate::resolve::kind::ResolverKind;

/// Terminal resolver: owns the raw payload.
///
/// The payload is never absent; "no data" is an empty buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityResolver {
    data: Vec<u8>,
}

impl IdentityResolver {
    pub fn new<D: Into<Vec<u8>>>(data: D) -> Self {
        Self { data: data.into() }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data<D: Into<Vec<u8>>>(&mut self, data: D) {
        self.data = data.into();
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn pack_record(&self) -> Vec<u8> {
        let header = ResolverKind::Identity.header();
        let mut out = Vec::with_capacity(header.len() + self.data.len());
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.data);
        out
    }

    pub(crate) fn unpack_record(body: &[u8]) -> Self {
        Self::new(body)
    }

    /// Packed form of an empty identity
    pub(crate) fn is_empty_record(data: &[u8]) -> bool {
        data == ResolverKind::Identity.header()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_prefixes_header() {
        let identity = IdentityResolver::new(b"DotWrapped!".to_vec());
        assert_eq!(identity.pack_record(), b"~0DotWrapped!");
    }

    #[test]
    fn test_default_is_empty() {
        let mut identity = IdentityResolver::default();
        assert!(identity.data().is_empty());
        identity.set_data(vec![1, 2, 3]);
        assert_eq!(identity.data(), &[1, 2, 3]);
        identity.clear();
        assert!(identity.data().is_empty());
        assert!(IdentityResolver::is_empty_record(&identity.pack_record()));
    }
}
