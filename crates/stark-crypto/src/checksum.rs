//! Checksummed address rendering

use stark_primitives::Felt;

use crate::hash::starknet_keccak;

/// Render an address as 64 hex digits with mixed-case checksum.
///
/// The checksum hashes the minimal big-endian bytes of the address with
/// Starknet keccak; a hex digit is uppercased when the matching nibble of the
/// hash is 8 or above. This is a display form only, decoding never applies it.
pub fn checksum_address(address: &Felt) -> String {
    let bytes = address.to_bytes_be();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(31);
    let hashed = starknet_keccak(&bytes[start..]).to_bytes_be();

    let mut chars: Vec<char> = hex::encode(bytes).chars().collect();
    for i in (0..chars.len()).step_by(2) {
        let byte = hashed[i >> 1];
        if byte >> 4 >= 8 {
            chars[i] = chars[i].to_ascii_uppercase();
        }
        if byte & 0x0f >= 8 {
            chars[i + 1] = chars[i + 1].to_ascii_uppercase();
        }
    }
    format!("0x{}", chars.into_iter().collect::<String>())
}
