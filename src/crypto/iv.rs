//! Initialization vector generation.
//!
//! IVs are random bytes of the cipher's block size with every 0x00 remapped
//! to 0x01, keeping them usable in zero-terminated fields.

use rand::rngs::OsRng;
use rand::RngCore;

/// Generate a fresh zero-free IV of `len` bytes
pub fn generate_iv(len: usize) -> Vec<u8> {
    let mut iv = vec![0u8; len];
    OsRng.fill_bytes(&mut iv);
    remap_zero_bytes(&mut iv);
    iv
}

/// Replace every 0x00 with 0x01
pub fn remap_zero_bytes(bytes: &mut [u8]) {
    for b in bytes.iter_mut().filter(|b| **b == 0) {
        *b = 1;
    }
}
