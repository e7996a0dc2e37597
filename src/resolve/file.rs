use crate::error::{Result, WrapError};
use crate::framing::{FieldReader, FieldWriter};
use crate::resolve::kind::ResolverKind;
use crate::resolve::{validate_text_field, Resolver, Unpacker};
use std::fs;
use std::io;
use std::path::Path;

/// Stores the child's packed stream in a file; the record holds only the path.
///
/// Packing overwrites the target file. A failed pack may leave it partially
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResolver {
    path: String,
    pub(crate) child: Box<Resolver>,
}

impl FileResolver {
    pub fn new(path: impl Into<String>, child: Resolver) -> Result<Self> {
        let path = path.into();
        validate_text_field(&path, "File path")?;
        Ok(Self {
            path,
            child: Box::new(child),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) -> Result<()> {
        let path = path.into();
        validate_text_field(&path, "File path")?;
        self.path = path;
        Ok(())
    }

    pub fn child(&self) -> &Resolver {
        &self.child
    }

    pub(crate) fn pack_record(&self) -> Result<Vec<u8>> {
        let child_data = self.child.pack()?;
        fs::write(&self.path, &child_data)?;
        tracing::debug!(path = %self.path, bytes = child_data.len(), "wrote file resolver payload");

        let mut writer = FieldWriter::new(Vec::with_capacity(self.path.len() + 2));
        writer.write_tail(&ResolverKind::File.header())?;
        writer.write_tail(self.path.as_bytes())?;
        Ok(writer.into_inner())
    }

    pub(crate) fn unpack_record(body: &[u8], unpacker: &Unpacker<'_>, depth: usize) -> Result<Self> {
        let path = FieldReader::new(body).read_terminated_str()?;
        if path.is_empty() {
            return Err(WrapError::InvalidArgument("Empty file path field".to_string()));
        }

        let child_data = read_payload(Path::new(&path), unpacker.config().max_payload_size)?;
        let child = unpacker.unpack(&child_data, depth + 1)?;
        Ok(Self {
            path,
            child: Box::new(child),
        })
    }
}

fn read_payload(path: &Path, limit: u64) -> Result<Vec<u8>> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => WrapError::NotFound(format!("File not found: {}", path.display())),
        _ => WrapError::Io(e),
    })?;
    if metadata.len() > limit {
        return Err(WrapError::UnsupportedFormat(format!(
            "File payload of {} bytes exceeds limit of {} bytes",
            metadata.len(),
            limit
        )));
    }
    Ok(fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Base64Resolver;
    use tempfile::TempDir;

    #[test]
    fn test_rejects_bad_paths() {
        assert!(matches!(
            FileResolver::new("", Resolver::identity(Vec::new())),
            Err(WrapError::InvalidArgument(_))
        ));
        assert!(matches!(
            FileResolver::new("a\0b", Resolver::identity(Vec::new())),
            Err(WrapError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_record_holds_only_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payload.bin");
        let path_str = path.to_str().unwrap().to_string();

        let layer = FileResolver::new(path_str.clone(), Resolver::identity(b"on disk".to_vec())).unwrap();
        let packed = Resolver::from(layer).pack().unwrap();

        let mut expected = b"~5".to_vec();
        expected.extend_from_slice(path_str.as_bytes());
        assert_eq!(packed, expected);
        assert_eq!(fs::read(&path).unwrap(), b"~0on disk");

        let unpacked = Resolver::unpack(&packed).unwrap();
        assert_eq!(unpacked.data(), b"on disk");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut record = b"~5".to_vec();
        record.extend_from_slice(dir.path().join("absent").to_str().unwrap().as_bytes());

        let err = Resolver::unpack(&record).unwrap_err();
        assert!(matches!(err, WrapError::NotFound(_)));
    }

    #[test]
    fn test_file_over_base64() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("encoded.txt");

        let inner = Base64Resolver::new(Resolver::identity(b"DotWrapped!".to_vec()));
        let layer = FileResolver::new(path.to_str().unwrap(), inner.into()).unwrap();
        let packed = Resolver::from(layer).pack().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"~4fjBEb3RXcmFwcGVkIQ==");
        assert_eq!(Resolver::unpack(&packed).unwrap().data(), b"DotWrapped!");
    }
}
