//! Password-based key stretching and password generation.
//!
//! Keys come from PBKDF2-HMAC-SHA1 over the UTF-8 password and a salt. The
//! salt is a fixed public constant unless the caller configures another one,
//! so the password alone is the secret.

use pbkdf2::pbkdf2_hmac;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use sha1::Sha1;

/// Public salt mixed into every derived key by default
pub const DEFAULT_SALT: &[u8] = b"sAl7I$n0Lie";

/// PBKDF2 rounds used by default
pub const DEFAULT_KDF_ITERATIONS: u32 = 1000;

/// Length of generated passwords
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Salt and work factor for key derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KdfParams {
    pub salt: Vec<u8>,
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_vec(),
            iterations: DEFAULT_KDF_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Stretch `password` into a key of `key_len` bytes
    pub fn derive_key(&self, password: &str, key_len: usize) -> Vec<u8> {
        let mut key = vec![0u8; key_len];
        pbkdf2_hmac::<Sha1>(password.as_bytes(), &self.salt, self.iterations, &mut key);
        key
    }
}

/// Generate a random alphanumeric password (never contains a zero byte)
pub fn generate_password(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_passwords_differ() {
        let p1 = generate_password(8);
        let p2 = generate_password(8);
        assert_eq!(p1.len(), 8);
        assert_eq!(p2.len(), 8);
        assert_ne!(p1, p2);
        assert!(!p1.as_bytes().contains(&0));
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let params = KdfParams::default();
        let k1 = params.derive_key("@S1mPlePa$$w0rd", 32);
        let k2 = params.derive_key("@S1mPlePa$$w0rd", 32);
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), 32);

        // Shorter keys are a prefix of longer ones
        assert_eq!(params.derive_key("@S1mPlePa$$w0rd", 16), k1[..16]);
    }

    #[test]
    fn test_salt_changes_key() {
        let other = KdfParams {
            salt: b"another-salt".to_vec(),
            iterations: DEFAULT_KDF_ITERATIONS,
        };
        assert_ne!(
            KdfParams::default().derive_key("password", 32),
            other.derive_key("password", 32)
        );
    }

    #[test]
    fn test_rfc6070_vector() {
        // PBKDF2-HMAC-SHA1, P="password", S="salt", c=1, dkLen=20
        let params = KdfParams {
            salt: b"salt".to_vec(),
            iterations: 1,
        };
        let key = params.derive_key("password", 20);
        assert_eq!(hex::encode(key), "0c60c80f961f0e71f3a9b524af6012062fe037a6");
    }
}
