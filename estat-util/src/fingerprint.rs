//! FNV-1a fingerprint of a potential field, for project-file
//! reproducibility checks.
//!
//! The hash covers the 4-byte little-endian element count followed by
//! every φ value as little-endian float32 bytes; metadata is not
//! included. Rendered as 8 lowercase hex digits.

const FNV_OFFSET_BASIS: u32 = 0x811c9dc5;
const FNV_PRIME: u32 = 16777619;

pub fn phi_fingerprint(phi: &[f32]) -> String {
    let mut hash = FNV_OFFSET_BASIS;

    hash = fnv1a(hash, &(phi.len() as u32).to_le_bytes());
    for value in phi {
        hash = fnv1a(hash, &value.to_le_bytes());
    }

    format!("{hash:08x}")
}

fn fnv1a(mut hash: u32, bytes: &[u8]) -> u32 {
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
