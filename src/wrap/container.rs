use crate::chunk::Chunk;
use crate::config::CodecConfig;
use crate::error::{Result, WrapError};
use crate::wrap::footer::{ends_with_signature, Footer, FOOTER_SIZE, SIGNATURE};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Base data plus an ordered list of chunks, appendable to any host file.
///
/// File layout:
///
/// ```text
/// [base data][chunk records...][offset: u32][chunk count: u32][00 3D 00]
/// ```
///
/// `offset` is the base data length, so a reader locates everything from the
/// end of the file. Chunk names may repeat; lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wrap {
    base_data: Vec<u8>,
    chunks: Vec<Chunk>,
}

impl Wrap {
    /// Empty wrap
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_data<D: Into<Vec<u8>>>(base_data: D) -> Self {
        Self::from_parts(base_data, Vec::new())
    }

    pub fn from_parts<D: Into<Vec<u8>>>(base_data: D, chunks: Vec<Chunk>) -> Self {
        Self {
            base_data: base_data.into(),
            chunks,
        }
    }

    /// Unmanaged prefix, written and read back verbatim
    pub fn base_data(&self) -> &[u8] {
        &self.base_data
    }

    pub fn set_base_data<D: Into<Vec<u8>>>(&mut self, base_data: D) {
        self.base_data = base_data.into();
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunks_mut(&mut self) -> &mut Vec<Chunk> {
        &mut self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn add_chunk(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// Remove and return the first chunk called `name`
    pub fn remove_chunk(&mut self, name: &str) -> Result<Chunk> {
        let index = self.position(name)?;
        Ok(self.chunks.remove(index))
    }

    pub fn clear_chunks(&mut self) {
        self.chunks.clear();
    }

    /// First chunk called `name`
    pub fn find_chunk(&self, name: &str) -> Result<&Chunk> {
        let index = self.position(name)?;
        Ok(&self.chunks[index])
    }

    pub fn find_chunk_mut(&mut self, name: &str) -> Result<&mut Chunk> {
        let index = self.position(name)?;
        Ok(&mut self.chunks[index])
    }

    pub fn chunk_names(&self) -> Vec<&str> {
        self.chunks.iter().map(Chunk::name).collect()
    }

    /// Number of chunks called `name`; above one means later ones are shadowed
    pub fn count_named(&self, name: &str) -> usize {
        self.chunks.iter().filter(|c| c.name() == name).count()
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.chunks
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| WrapError::NotFound(format!("Chunk not found: {}", name)))
    }

    /// Write the whole wrap, returning the number of bytes written
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let offset = u32::try_from(self.base_data.len()).map_err(|_| {
            WrapError::InvalidArgument(format!(
                "Base data too large: {} bytes (max {})",
                self.base_data.len(),
                u32::MAX
            ))
        })?;
        let chunk_count = u32::try_from(self.chunks.len()).map_err(|_| {
            WrapError::InvalidArgument(format!("Too many chunks: {}", self.chunks.len()))
        })?;

        let mut bytes_written = 0;

        writer.write_all(&self.base_data)?;
        bytes_written += self.base_data.len();

        for chunk in &self.chunks {
            bytes_written += chunk.write_to(&mut writer)?;
        }

        bytes_written += Footer::new(offset, chunk_count).write_to(&mut writer)?;
        writer.flush()?;

        tracing::debug!(
            chunks = self.chunks.len(),
            bytes = bytes_written,
            "wrote wrap"
        );
        Ok(bytes_written)
    }

    /// Create or truncate `path` and write the wrap into it
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// Whether the stream ends with the wrap signature
    pub fn is_valid<R: Read + Seek>(mut reader: R) -> Result<bool> {
        let len = reader.seek(SeekFrom::End(0))?;
        if len < SIGNATURE.len() as u64 {
            return Ok(false);
        }
        reader.seek(SeekFrom::End(-(SIGNATURE.len() as i64)))?;
        let mut tail = [0u8; SIGNATURE.len()];
        reader.read_exact(&mut tail)?;
        Ok(ends_with_signature(&tail))
    }

    pub fn is_valid_file<P: AsRef<Path>>(path: P) -> Result<bool> {
        Self::is_valid(open(path.as_ref())?)
    }

    /// Read the wrap closing `reader`, or `None` if it carries no signature
    pub fn read_from<R: Read + Seek>(mut reader: R, config: &CodecConfig) -> Result<Option<Self>> {
        if !Self::is_valid(&mut reader)? {
            tracing::debug!("no wrap signature");
            return Ok(None);
        }

        let len = reader.seek(SeekFrom::End(0))?;
        if len < FOOTER_SIZE as u64 {
            return Err(WrapError::UnsupportedFormat(format!(
                "Signature found but stream of {} bytes cannot hold a footer",
                len
            )));
        }
        reader.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
        let footer = Footer::read_from(&mut reader)?;
        footer.validate_against_length(len)?;

        reader.seek(SeekFrom::Start(0))?;
        let mut reader = BufReader::new(reader);

        let mut base_data = Vec::new();
        (&mut reader)
            .take(u64::from(footer.offset))
            .read_to_end(&mut base_data)?;
        if base_data.len() != footer.offset as usize {
            return Err(WrapError::UnsupportedFormat("Truncated base data".to_string()));
        }

        let mut chunks = Vec::new();
        for _ in 0..footer.chunk_count {
            chunks.push(Chunk::read_from(&mut reader, config)?);
        }

        tracing::debug!(
            base_bytes = base_data.len(),
            chunks = chunks.len(),
            "read wrap"
        );
        Ok(Some(Self { base_data, chunks }))
    }

    /// Read the wrap stored in `path`.
    ///
    /// When the file carries no wrap, returns `None`, or with
    /// `create_if_absent` a new wrap whose base data is the whole file.
    pub fn read<P: AsRef<Path>>(path: P, create_if_absent: bool) -> Result<Option<Self>> {
        Self::read_with_config(path, create_if_absent, &CodecConfig::default())
    }

    pub fn read_with_config<P: AsRef<Path>>(
        path: P,
        create_if_absent: bool,
        config: &CodecConfig,
    ) -> Result<Option<Self>> {
        let path = path.as_ref();
        let mut file = open(path)?;
        if let Some(wrap) = Self::read_from(&mut file, config)? {
            return Ok(Some(wrap));
        }
        if !create_if_absent {
            return Ok(None);
        }

        file.seek(SeekFrom::Start(0))?;
        let mut base_data = Vec::new();
        file.read_to_end(&mut base_data)?;
        tracing::debug!(path = %path.display(), bytes = base_data.len(), "starting wrap over host file");
        Ok(Some(Self::with_base_data(base_data)))
    }

    /// The running executable as a wrap, created over it if it has none
    pub fn read_current_exe() -> Result<Self> {
        let path = std::env::current_exe()?;
        Self::read(&path, true)?.ok_or_else(|| {
            WrapError::NotFound(format!("No wrap in {}", path.display()))
        })
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            WrapError::NotFound(format!("File not found: {}", path.display()))
        }
        _ => WrapError::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Resolver;
    use std::io::Cursor;

    fn sample() -> Wrap {
        let mut wrap = Wrap::with_base_data(b"ABC".to_vec());
        wrap.add_chunk(Chunk::with_password("x", "pw", b"hello".to_vec()).unwrap());
        wrap
    }

    #[test]
    fn test_footer_roundtrip() {
        let wrap = sample();
        let mut buf = Vec::new();
        let written = wrap.write_to(&mut buf).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(&buf[..3], b"ABC");
        assert_eq!(&buf[buf.len() - 3..], &SIGNATURE);

        let parsed = Wrap::read_from(Cursor::new(&buf), &CodecConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(parsed.base_data(), b"ABC");
        assert_eq!(parsed.chunk_names(), vec!["x"]);
        assert_eq!(parsed.find_chunk("x").unwrap().data(), b"hello");
    }

    #[test]
    fn test_validity() {
        assert!(!Wrap::is_valid(Cursor::new(b"")).unwrap());
        assert!(!Wrap::is_valid(Cursor::new(b"\0=")).unwrap());
        assert!(!Wrap::is_valid(Cursor::new(b"plain file")).unwrap());

        let mut buf = b"plain file".to_vec();
        Footer::new(buf.len() as u32, 0).write_to(&mut buf).unwrap();
        assert!(Wrap::is_valid(Cursor::new(&buf)).unwrap());

        let wrap = Wrap::read_from(Cursor::new(&buf), &CodecConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(wrap.base_data(), b"plain file");
        assert!(wrap.is_empty());
    }

    #[test]
    fn test_missing_signature_is_none() {
        let result = Wrap::read_from(Cursor::new(b"no wrap here"), &CodecConfig::default());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_offset_past_footer() {
        let mut buf = b"ab".to_vec();
        Footer::new(100, 0).write_to(&mut buf).unwrap();
        assert!(matches!(
            Wrap::read_from(Cursor::new(&buf), &CodecConfig::default()),
            Err(WrapError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_lookup_and_removal() {
        let mut wrap = sample();
        wrap.add_chunk(Chunk::with_chain("x", Resolver::identity(b"second".to_vec())).unwrap());

        assert_eq!(wrap.count_named("x"), 2);
        assert_eq!(wrap.find_chunk("x").unwrap().data(), b"hello");
        assert!(matches!(wrap.find_chunk("y"), Err(WrapError::NotFound(_))));

        wrap.find_chunk_mut("x").unwrap().set_data(b"edited".to_vec());
        let removed = wrap.remove_chunk("x").unwrap();
        assert_eq!(removed.data(), b"edited");
        assert_eq!(wrap.find_chunk("x").unwrap().data(), b"second");

        wrap.clear_chunks();
        assert!(wrap.is_empty());
        assert!(matches!(wrap.remove_chunk("x"), Err(WrapError::NotFound(_))));
    }
}
