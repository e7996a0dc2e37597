//! Symmetric block ciphers used by the crypto resolver.
//!
//! Every algorithm runs in CBC mode with PKCS7 padding, keyed from a password
//! through [`KdfParams`]. Empty input encrypts to empty output; an IV is still
//! produced so the record layout stays the same.

mod iv;
mod kdf;

pub use iv::{generate_iv, remap_zero_bytes};
pub use kdf::{
    generate_password, KdfParams, DEFAULT_KDF_ITERATIONS, DEFAULT_PASSWORD_LENGTH, DEFAULT_SALT,
};

use crate::error::{Result, WrapError};
use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use des::{Des, TdesEde3};
use rc2::Rc2;
use serde::{Deserialize, Serialize};

/// Cipher selection, stored on the wire as a fixed-width code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u32)]
pub enum CryptoAlgorithm {
    #[default]
    Aes = 0,
    Des = 1,
    TripleDes = 2,
    Rc2 = 3,
}

impl CryptoAlgorithm {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Aes),
            1 => Ok(Self::Des),
            2 => Ok(Self::TripleDes),
            3 => Ok(Self::Rc2),
            _ => Err(WrapError::Crypto(format!("Unsupported algorithm code: {}", code))),
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Derived key length in bytes
    pub fn key_size(self) -> usize {
        match self {
            Self::Aes => 32,
            Self::Des => 8,
            Self::TripleDes => 24,
            Self::Rc2 => 16,
        }
    }

    /// Block (and IV) length in bytes
    pub fn block_size(self) -> usize {
        match self {
            Self::Aes => 16,
            Self::Des | Self::TripleDes | Self::Rc2 => 8,
        }
    }
}

/// Encrypt `data`, returning `(ciphertext, iv)` with a freshly generated IV
pub fn encrypt(
    algorithm: CryptoAlgorithm,
    kdf: &KdfParams,
    password: &str,
    data: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    if password.is_empty() {
        return Err(WrapError::InvalidArgument("Password must not be empty".to_string()));
    }
    let iv = generate_iv(algorithm.block_size());
    tracing::trace!(algorithm = ?algorithm, iv = %hex::encode(&iv), "encrypt");
    if data.is_empty() {
        return Ok((Vec::new(), iv));
    }

    let key = kdf.derive_key(password, algorithm.key_size());
    let ciphertext = match algorithm {
        CryptoAlgorithm::Aes => cbc::Encryptor::<Aes256>::new_from_slices(&key, &iv)
            .map_err(invalid_length)?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        CryptoAlgorithm::Des => cbc::Encryptor::<Des>::new_from_slices(&key, &iv)
            .map_err(invalid_length)?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        CryptoAlgorithm::TripleDes => cbc::Encryptor::<TdesEde3>::new_from_slices(&key, &iv)
            .map_err(invalid_length)?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
        CryptoAlgorithm::Rc2 => cbc::Encryptor::<Rc2>::new_from_slices(&key, &iv)
            .map_err(invalid_length)?
            .encrypt_padded_vec_mut::<Pkcs7>(data),
    };
    Ok((ciphertext, iv))
}

/// Decrypt `data` with the IV it was produced under
pub fn decrypt(
    algorithm: CryptoAlgorithm,
    kdf: &KdfParams,
    password: &str,
    iv: &[u8],
    data: &[u8],
) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(WrapError::InvalidArgument("Password must not be empty".to_string()));
    }
    if iv.is_empty() {
        return Err(WrapError::InvalidArgument("IV must not be empty".to_string()));
    }
    tracing::trace!(algorithm = ?algorithm, iv = %hex::encode(iv), "decrypt");
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let key = kdf.derive_key(password, algorithm.key_size());
    let plaintext = match algorithm {
        CryptoAlgorithm::Aes => cbc::Decryptor::<Aes256>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .decrypt_padded_vec_mut::<Pkcs7>(data),
        CryptoAlgorithm::Des => cbc::Decryptor::<Des>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .decrypt_padded_vec_mut::<Pkcs7>(data),
        CryptoAlgorithm::TripleDes => cbc::Decryptor::<TdesEde3>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .decrypt_padded_vec_mut::<Pkcs7>(data),
        CryptoAlgorithm::Rc2 => cbc::Decryptor::<Rc2>::new_from_slices(&key, iv)
            .map_err(invalid_length)?
            .decrypt_padded_vec_mut::<Pkcs7>(data),
    };
    plaintext.map_err(|_| {
        WrapError::Crypto("Decryption failed (wrong password, IV or corrupt data)".to_string())
    })
}

fn invalid_length(err: cbc::cipher::InvalidLength) -> WrapError {
    WrapError::Crypto(format!("Invalid key or IV length: {}", err))
}
