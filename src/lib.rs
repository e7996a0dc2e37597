//! Tailwrap: resolver-chain codec and tail-appended chunk container
//!
//! This library provides:
//! - Resolver chains: nested, self-describing transforms (encryption,
//!   compression, Base64, file and network indirection) packed into one buffer
//! - Chunks: named resolver chains
//! - Wraps: a list of chunks appended to the end of any host file and found
//!   again from its footer
//!
//! # Example
//!
//! ```no_run
//! use tailwrap::{Chunk, Wrap};
//!
//! // Append a password-protected chunk to an existing file
//! let mut wrap = Wrap::read("app.bin", true)?.unwrap_or_default();
//! wrap.add_chunk(Chunk::with_password("notes", "s3cret", b"Hello, World!".to_vec())?);
//! wrap.write("app.bin")?;
//!
//! // Read it back
//! let wrap = Wrap::read("app.bin", false)?.unwrap_or_default();
//! let notes = wrap.find_chunk("notes")?;
//! assert!(notes.unlocks_with("s3cret"));
//! assert_eq!(notes.data(), b"Hello, World!");
//! # Ok::<(), tailwrap::WrapError>(())
//! ```

pub mod chunk;
pub mod config;
pub mod crypto;
pub mod error;
pub mod framing;
pub mod resolve;
pub mod wrap;

// Re-export commonly used types
pub use chunk::Chunk;
pub use config::CodecConfig;
pub use crypto::{CryptoAlgorithm, KdfParams};
pub use error::{Result, WrapError};
pub use framing::ByteTransform;
pub use resolve::{
    default_chain, password_chain, Base64Resolver, ChainLayout, CompressionMethod,
    CompressionResolver, CryptoResolver, FileResolver, IdentityResolver, NetworkResolver,
    Resolver, ResolverKind,
};
pub use wrap::{Footer, Wrap, FOOTER_SIZE, SIGNATURE};
