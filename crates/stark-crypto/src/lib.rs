//! # stark-crypto
//!
//! Hashing helpers for Starknet ABIs.
//!
//! - Keccak-256 hashing
//! - Starknet keccak (Keccak-256 truncated to 250 bits)
//! - Function / event selectors
//! - Checksummed address rendering

#![warn(missing_docs)]
#![warn(clippy::all)]

mod checksum;
mod hash;

pub use checksum::checksum_address;
pub use hash::{keccak256, selector_from_name, starknet_keccak};
