//! Encryption layer.
//!
//! Security caveat: the record stores the password in clear text next to the
//! ciphertext, so a packed crypto layer only hides its payload from readers
//! that do not parse the record. Keep that in mind before relying on it for
//! confidentiality; the layout is kept for compatibility with existing files.

use crate::crypto::{self, generate_password, CryptoAlgorithm, KdfParams, DEFAULT_PASSWORD_LENGTH};
use crate::error::{Result, WrapError};
use crate::framing::{FieldReader, FieldWriter};
use crate::resolve::kind::ResolverKind;
use crate::resolve::{validate_text_field, Resolver, Unpacker};
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct CryptoResolver {
    algorithm: CryptoAlgorithm,
    password: String,
    renew_password: bool,
    kdf: KdfParams,
    pub(crate) child: Box<Resolver>,
}

impl CryptoResolver {
    /// Encrypt `child` with a fixed password
    pub fn new(child: Resolver, password: impl Into<String>) -> Result<Self> {
        let password = password.into();
        validate_text_field(&password, "Password")?;
        Ok(Self {
            algorithm: CryptoAlgorithm::default(),
            password,
            renew_password: false,
            kdf: KdfParams::default(),
            child: Box::new(child),
        })
    }

    /// Encrypt `child` with a generated password that is replaced on every unpack
    pub fn ephemeral(child: Resolver) -> Self {
        Self::ephemeral_with_length(child, DEFAULT_PASSWORD_LENGTH)
    }

    pub fn ephemeral_with_length(child: Resolver, password_length: usize) -> Self {
        Self {
            algorithm: CryptoAlgorithm::default(),
            password: generate_password(password_length.max(1)),
            renew_password: true,
            kdf: KdfParams::default(),
            child: Box::new(child),
        }
    }

    pub fn with_algorithm(mut self, algorithm: CryptoAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn with_renew_password(mut self, renew: bool) -> Self {
        self.renew_password = renew;
        self
    }

    pub fn algorithm(&self) -> CryptoAlgorithm {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: CryptoAlgorithm) {
        self.algorithm = algorithm;
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_password(&mut self, password: impl Into<String>) -> Result<()> {
        let password = password.into();
        validate_text_field(&password, "Password")?;
        self.password = password;
        Ok(())
    }

    /// Whether `candidate` is the password this layer encrypts with
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    pub fn renew_password(&self) -> bool {
        self.renew_password
    }

    pub fn set_renew_password(&mut self, renew: bool) {
        self.renew_password = renew;
    }

    pub fn kdf(&self) -> &KdfParams {
        &self.kdf
    }

    pub fn child(&self) -> &Resolver {
        &self.child
    }

    pub(crate) fn pack_record(&self) -> Result<Vec<u8>> {
        let child_data = self.child.pack()?;
        let (ciphertext, iv) = crypto::encrypt(self.algorithm, &self.kdf, &self.password, &child_data)?;

        let mut writer = FieldWriter::new(Vec::with_capacity(ciphertext.len() + 64));
        writer.write_tail(&ResolverKind::Crypto.header())?;
        writer.write_u32(self.algorithm.code())?;
        writer.write_terminated(self.password.as_bytes())?;
        writer.write_flag(self.renew_password)?;
        writer.write_length_prefixed(&iv)?;
        writer.write_tail(&ciphertext)?;
        Ok(writer.into_inner())
    }

    pub(crate) fn unpack_record(body: &[u8], unpacker: &Unpacker<'_>, depth: usize) -> Result<Self> {
        let mut reader = FieldReader::new(body);
        let algorithm = CryptoAlgorithm::from_code(reader.read_u32()?)?;
        let password = reader.read_terminated_str()?;
        if password.is_empty() {
            return Err(WrapError::InvalidArgument("Empty password field".to_string()));
        }
        let renew_password = reader.read_flag()?;
        let iv = reader.read_length_prefixed()?;
        if iv.is_empty() {
            return Err(WrapError::InvalidArgument("Empty IV field".to_string()));
        }
        let ciphertext = reader.read_tail()?;

        let kdf = unpacker.kdf().clone();
        let child_data = crypto::decrypt(algorithm, &kdf, &password, &iv, &ciphertext)?;
        let child = unpacker.unpack(&child_data, depth + 1)?;

        let password = if renew_password {
            tracing::debug!("renewing crypto layer password");
            generate_password(unpacker.config().password_length)
        } else {
            password
        };

        Ok(Self {
            algorithm,
            password,
            renew_password,
            kdf,
            child: Box::new(child),
        })
    }
}

impl fmt::Debug for CryptoResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoResolver")
            .field("algorithm", &self.algorithm)
            .field("password", &"<redacted>")
            .field("renew_password", &self.renew_password)
            .field("child", &self.child)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: &str = "@S1mPlePa$$w0rd";

    #[test]
    fn test_rejects_bad_passwords() {
        assert!(matches!(
            CryptoResolver::new(Resolver::identity(Vec::new()), ""),
            Err(WrapError::InvalidArgument(_))
        ));
        assert!(matches!(
            CryptoResolver::new(Resolver::identity(Vec::new()), "a\0b"),
            Err(WrapError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_record_layout() {
        let layer = CryptoResolver::new(Resolver::identity(b"secret".to_vec()), PASSWORD).unwrap();
        let packed = Resolver::from(layer).pack().unwrap();

        assert_eq!(&packed[..2], b"~1");
        let mut reader = FieldReader::new(&packed[2..]);
        assert_eq!(reader.read_u32().unwrap(), CryptoAlgorithm::Aes.code());
        assert_eq!(reader.read_terminated_str().unwrap(), PASSWORD);
        assert!(!reader.read_flag().unwrap());
        let iv = reader.read_length_prefixed().unwrap();
        assert_eq!(iv.len(), 16);
        assert!(!iv.contains(&0));
        let ciphertext = reader.read_tail().unwrap();
        assert_eq!(ciphertext.len() % 16, 0);
    }

    #[test]
    fn test_fixed_password_survives_unpack() {
        let layer = CryptoResolver::new(Resolver::identity(b"secret".to_vec()), PASSWORD)
            .unwrap()
            .with_algorithm(CryptoAlgorithm::Rc2);
        let packed = Resolver::from(layer).pack().unwrap();

        let unpacked = Resolver::unpack(&packed).unwrap();
        let crypto = unpacked.find_crypto().unwrap();
        assert_eq!(crypto.password(), PASSWORD);
        assert_eq!(crypto.algorithm(), CryptoAlgorithm::Rc2);
        assert!(!crypto.renew_password());
        assert_eq!(unpacked.data(), b"secret");
    }

    #[test]
    fn test_renewed_password_changes_on_unpack() {
        let layer = CryptoResolver::ephemeral(Resolver::identity(b"session".to_vec()));
        let original = layer.password().to_string();
        let packed = Resolver::from(layer).pack().unwrap();

        let unpacked = Resolver::unpack(&packed).unwrap();
        let crypto = unpacked.find_crypto().unwrap();
        assert!(crypto.renew_password());
        assert_ne!(crypto.password(), original);
        assert_eq!(unpacked.data(), b"session");
    }

    #[test]
    fn test_empty_password_field_rejected() {
        let mut writer = FieldWriter::new(Vec::new());
        writer.write_tail(b"~1").unwrap();
        writer.write_u32(0).unwrap();
        writer.write_terminated(b"").unwrap();
        writer.write_flag(false).unwrap();
        writer.write_length_prefixed(&[1; 16]).unwrap();
        let err = Resolver::unpack(&writer.into_inner()).unwrap_err();
        assert!(matches!(err, WrapError::InvalidArgument(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let layer = CryptoResolver::new(Resolver::identity(Vec::new()), PASSWORD).unwrap();
        assert!(!format!("{:?}", layer).contains(PASSWORD));
    }
}
