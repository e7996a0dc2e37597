//! File resolver tests
//!
//! The record stores only a path; the child's packed bytes live on disk.

use std::fs;
use tailwrap::{
    Base64Resolver, CodecConfig, CompressionResolver, CryptoResolver, FileResolver, Resolver,
    ResolverKind, WrapError,
};
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_payload_is_not_duplicated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("payload.bin");
    let payload = vec![0xAB; 4096];

    let layer = FileResolver::new(path.to_str().unwrap(), Resolver::identity(payload.clone())).unwrap();
    let packed = Resolver::from(layer).pack().unwrap();

    assert_eq!(packed.len(), 2 + path.to_str().unwrap().len());
    assert_eq!(fs::metadata(&path).unwrap().len(), 2 + payload.len() as u64);
    assert_eq!(Resolver::unpack(&packed).unwrap().data(), &payload[..]);
}

#[test]
fn test_pack_overwrites_existing_file() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(temp_file.path(), vec![0xFF; 1024]).unwrap();

    let layer = FileResolver::new(
        temp_file.path().to_str().unwrap(),
        Resolver::identity(b"short".to_vec()),
    )
    .unwrap();
    Resolver::from(layer).pack().unwrap();

    assert_eq!(fs::read(temp_file.path()).unwrap(), b"~0short");
}

#[test]
fn test_file_holding_encrypted_chain() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("secret.bin");

    let crypto = CryptoResolver::new(
        CompressionResolver::new(Resolver::identity(b"classified".to_vec())).into(),
        "pw",
    )
    .unwrap();
    let chain: Resolver = FileResolver::new(path.to_str().unwrap(), crypto.into())
        .unwrap()
        .into();
    let packed = chain.pack().unwrap();
    assert_eq!(&fs::read(&path).unwrap()[..2], b"~1");

    let unpacked = Resolver::unpack(&packed).unwrap();
    assert_eq!(
        unpacked.kinds(),
        vec![
            ResolverKind::File,
            ResolverKind::Crypto,
            ResolverKind::Compression,
            ResolverKind::Identity
        ]
    );
    assert_eq!(unpacked.data(), b"classified");
}

#[test]
fn test_base64_of_file_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("inner.bin");

    let file = FileResolver::new(path.to_str().unwrap(), Resolver::identity(b"nested".to_vec())).unwrap();
    let chain: Resolver = Base64Resolver::new(file.into()).into();
    let unpacked = Resolver::unpack(&chain.pack().unwrap()).unwrap();

    match unpacked.child() {
        Some(Resolver::File(file)) => assert_eq!(file.path(), path.to_str().unwrap()),
        other => panic!("Expected file layer, got: {:?}", other),
    }
    assert_eq!(unpacked.data(), b"nested");
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut record = b"~5".to_vec();
    record.extend_from_slice(dir.path().join("gone.bin").to_str().unwrap().as_bytes());

    match Resolver::unpack(&record) {
        Err(WrapError::NotFound(_)) => {}
        other => panic!("Expected NotFound, got: {:?}", other),
    }
}

#[test]
fn test_oversized_file_rejected() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(temp_file.path(), vec![0u8; 2048]).unwrap();

    let mut record = b"~5".to_vec();
    record.extend_from_slice(temp_file.path().to_str().unwrap().as_bytes());

    let config = CodecConfig {
        max_payload_size: 1024,
        ..CodecConfig::default()
    };
    assert!(matches!(
        Resolver::unpack_with(&record, &config),
        Err(WrapError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_set_path() {
    let mut layer = FileResolver::new("a.bin", Resolver::identity(Vec::new())).unwrap();
    layer.set_path("b.bin").unwrap();
    assert_eq!(layer.path(), "b.bin");
    assert!(matches!(layer.set_path(""), Err(WrapError::InvalidArgument(_))));
}
