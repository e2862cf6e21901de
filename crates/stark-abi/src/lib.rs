//! # stark-abi
//!
//! ABI-directed codec for Starknet contract calls, call results and events.
//!
//! ## Features
//!
//! - **Codec**: encoder and decoder bound to one contract ABI
//! - **Type classifier**: maps ABI type names to a closed set of categories
//! - **Byte strings**: 31-byte word packing of `ByteArray` text
//! - **Events**: key/data split, decoding and subscription key filters
//! - **Multicall**: splitting and joining flat multicall calldata
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use stark_abi::Codec;
//!
//! let codec = Codec::from_json(r#"[
//!     {"type": "function", "name": "transfer",
//!      "inputs": [
//!         {"name": "recipient", "type": "core::starknet::contract_address::ContractAddress"},
//!         {"name": "amount", "type": "core::integer::u256"}
//!      ],
//!      "outputs": [{"type": "core::bool"}],
//!      "state_mutability": "external"}
//! ]"#).unwrap();
//!
//! let calldata = codec.encode_inputs("transfer", &[json!("0x123"), json!(1000)]).unwrap();
//! assert_eq!(calldata.len(), 3);
//!
//! let result = codec.decode_outputs("transfer", &[stark_primitives::Felt::ONE]).unwrap();
//! assert_eq!(result[0].to_json(), json!(true));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod byte_array;
mod codec;
mod config;
pub mod contract;
mod error;
pub mod event;
pub mod multicall;

pub use abi::{Category, Value};
pub use byte_array::ByteArray;
pub use codec::{Codec, FunctionSignature};
pub use config::CodecConfig;
pub use contract::Abi;
pub use error::AbiError;
pub use event::{DecodedEvent, EventLayout};
pub use multicall::{join_calls, split_calls, Call};

// Re-export primitives for convenience
pub use stark_crypto::{checksum_address, selector_from_name};
pub use stark_primitives::{sanitized_hex_eq, Felt};

/// Parse hex or decimal strings into felts
pub fn parse_felts<S: AsRef<str>>(values: &[S]) -> Result<Vec<Felt>, AbiError> {
    values
        .iter()
        .map(|v| Felt::parse(v.as_ref()).map_err(AbiError::from))
        .collect()
}

/// Render felts as minimal hex strings
pub fn to_hex_strings(felts: &[Felt]) -> Vec<String> {
    felts.iter().map(Felt::to_hex).collect()
}
