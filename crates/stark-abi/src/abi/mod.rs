//! Type-directed encoding and decoding of Starknet wire values
//!
//! This module provides:
//! - Classification of ABI type names into a closed [`Category`] set
//! - Decoding felts into structured [`Value`]s
//! - Encoding JSON-shaped input into felts
//!
//! # Example
//!
//! ```rust
//! use stark_abi::abi::{Category, Decoder, TypeRegistry, Value};
//! use stark_abi::{Abi, CodecConfig};
//! use stark_primitives::{Felt, U256};
//!
//! let config = CodecConfig::default();
//! let registry = TypeRegistry::from_abi(&Abi::default(), config.max_depth).unwrap();
//! let category = registry.classify("core::integer::u256").unwrap();
//! assert_eq!(category, Category::U256);
//!
//! // low = 10, high = 0
//! let data = [Felt::from(10u8), Felt::ZERO];
//! let (value, consumed) = Decoder::new(&registry, &config).decode(&category, &data, 0).unwrap();
//! assert_eq!(value, Value::Uint(U256::from(10)));
//! assert_eq!(consumed, 2);
//! ```

mod classify;
mod decode;
mod encode;
mod types;

pub use classify::{
    classify_with, parse_generic_args, split_generic, split_top_level, DeclKind, EnumDef, Member,
    StructDef, TypeRegistry,
};
pub use decode::Decoder;
pub use encode::{parse_bool, Encoder};
pub use types::{AddressKind, Category, IntegerKind, Value, MAX_SAFE_INTEGER};
