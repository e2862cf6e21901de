//! Keccak-256 and Starknet keccak

use sha3::{Digest, Keccak256};
use stark_primitives::Felt;

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 with the top 6 bits cleared, so the result is always a felt
pub fn starknet_keccak(data: &[u8]) -> Felt {
    let mut hash = keccak256(data);
    hash[0] &= 0x03;
    // 250 bits are always below the field prime
    Felt::from_bytes_be(&hash).unwrap_or(Felt::ZERO)
}

/// Selector of a function or event from its (unqualified) name
pub fn selector_from_name(name: &str) -> Felt {
    starknet_keccak(name.as_bytes())
}
