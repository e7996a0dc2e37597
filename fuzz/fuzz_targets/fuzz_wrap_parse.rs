#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use tailwrap::{CodecConfig, Wrap};

fuzz_target!(|data: &[u8]| {
    let config = CodecConfig {
        max_payload_size: 1 << 20,
        ..CodecConfig::default()
    };

    // Validity check and parse must never panic
    let _ = Wrap::is_valid(Cursor::new(data));
    let wrap = match Wrap::read_from(Cursor::new(data), &config) {
        Ok(Some(w)) => w,
        Ok(None) | Err(_) => return,
    };

    for name in wrap.chunk_names() {
        if let Ok(chunk) = wrap.find_chunk(name) {
            let _ = chunk.data();
            let _ = chunk.password();
        }
    }
});
