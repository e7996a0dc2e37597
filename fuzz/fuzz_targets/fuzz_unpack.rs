#![no_main]

use libfuzzer_sys::fuzz_target;
use tailwrap::{CodecConfig, Resolver};

fuzz_target!(|data: &[u8]| {
    // Top-level file and network records would touch the host
    if data.starts_with(b"~3") || data.starts_with(b"~5") {
        return;
    }

    let config = CodecConfig {
        max_payload_size: 1 << 20,
        ..CodecConfig::default()
    };

    // Must never panic
    let resolver = match Resolver::unpack_with(data, &config) {
        Ok(r) => r,
        Err(_) => return,
    };

    // Whatever parsed must walk and repack
    let _ = resolver.kinds();
    let _ = resolver.data();
    if resolver.iter().all(|layer| layer.kind() != tailwrap::ResolverKind::File) {
        let _ = resolver.pack();
    }
});
