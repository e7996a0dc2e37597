//! Generate seed corpora for fuzzing

use std::fs;
use tailwrap::{
    Base64Resolver, Chunk, CompressionMethod, CompressionResolver, CryptoAlgorithm,
    CryptoResolver, Resolver, Wrap,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let unpack_dir = "fuzz/corpus/fuzz_unpack";
    let wrap_dir = "fuzz/corpus/fuzz_wrap_parse";
    fs::create_dir_all(unpack_dir)?;
    fs::create_dir_all(wrap_dir)?;

    println!("Generating seed corpus...");

    // Resolver records, one per transform
    let chains: Vec<(&str, Resolver)> = vec![
        ("identity", Resolver::identity(b"Hello, World!".to_vec())),
        (
            "base64",
            Base64Resolver::new(Resolver::identity(b"DotWrapped!".to_vec())).into(),
        ),
        (
            "gzip",
            CompressionResolver::new(Resolver::identity(b"compress ".repeat(100))).into(),
        ),
        (
            "zstd",
            CompressionResolver::new(Resolver::identity(b"compress ".repeat(100)))
                .with_method(CompressionMethod::Zstd)
                .into(),
        ),
        (
            "crypto_aes",
            CryptoResolver::new(Resolver::identity(b"secret".to_vec()), "pw")?.into(),
        ),
        (
            "crypto_des",
            CryptoResolver::new(Resolver::identity(b"secret".to_vec()), "pw")?
                .with_algorithm(CryptoAlgorithm::Des)
                .into(),
        ),
    ];
    for (name, chain) in chains {
        let path = format!("{}/seed_{}.bin", unpack_dir, name);
        fs::write(&path, chain.pack()?)?;
        println!("✓ Generated: {}", path);
    }

    // Wraps
    let mut wraps = vec![
        ("empty", Wrap::new()),
        ("base_only", Wrap::with_base_data(b"host file bytes".to_vec())),
    ];
    let mut single = Wrap::with_base_data(b"ABC".to_vec());
    single.add_chunk(Chunk::with_password("x", "pw", b"hello".to_vec())?);
    wraps.push(("single", single));
    let mut multi = Wrap::with_base_data((0..255).collect::<Vec<u8>>());
    multi.add_chunk(Chunk::new("first", b"one".to_vec())?);
    multi.add_chunk(Chunk::with_chain("raw", Resolver::identity(Vec::new()))?);
    multi.add_chunk(Chunk::with_password("first", "pw", b"shadowed".to_vec())?);
    wraps.push(("multi", multi));

    for (name, wrap) in wraps {
        let path = format!("{}/seed_{}.wrap", wrap_dir, name);
        wrap.write(&path)?;
        println!("✓ Generated: {}", path);
    }

    println!("\nGenerated seed files in {} and {}", unpack_dir, wrap_dir);
    Ok(())
}
