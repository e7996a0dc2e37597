use std::io;
use thiserror::Error;

/// Result type for tailwrap operations
pub type Result<T> = std::result::Result<T, WrapError>;

/// Unified error type for resolver, chunk and wrap operations
#[derive(Debug, Error)]
pub enum WrapError {
    // Caller errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Wire format errors
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // Cipher errors
    #[error("Cryptography error: {0}")]
    Crypto(String),

    // Lookup errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WrapError {
    /// Map a read failure, turning a short read into a format error.
    pub(crate) fn from_read(err: io::Error, what: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            WrapError::UnsupportedFormat(format!("Truncated {}", what))
        } else {
            WrapError::Io(err)
        }
    }
}

impl From<toml::de::Error> for WrapError {
    fn from(err: toml::de::Error) -> Self {
        WrapError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for WrapError {
    fn from(err: toml::ser::Error) -> Self {
        WrapError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_read_is_format_error() {
        let err = WrapError::from_read(io::Error::from(io::ErrorKind::UnexpectedEof), "length");
        assert!(matches!(err, WrapError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("Truncated length"));

        let err = WrapError::from_read(io::Error::from(io::ErrorKind::PermissionDenied), "length");
        assert!(matches!(err, WrapError::Io(_)));
    }
}
