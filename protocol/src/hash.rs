//! # Hashing Utilities
//!
//! BLAKE3 is the only hash function the token needs. It is used to derive
//! fresh, deterministic addresses (the contract's own address and the five
//! vault accounts) from human-readable labels, so that two deployments by
//! the same deployer always agree on where the vaults live.

/// Compute the BLAKE3 hash of the input data.
///
/// # Example
///
/// ```
/// use faireum_protocol::hash::blake3_hash;
///
/// let hash = blake3_hash(b"Faireum");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Hash a sequence of parts with length prefixes.
///
/// Each part is preceded by its length as a little-endian `u64`, so
/// `["ab", "c"]` and `["a", "bc"]` never collide.
pub fn blake3_hash_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}
