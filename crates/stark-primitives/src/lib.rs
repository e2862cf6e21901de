//! # stark-primitives
//!
//! Primitive types for Starknet contract ABIs.
//!
//! This crate provides the field element (`Felt`) that every wire value is
//! made of, plus a few helpers for comparing hex-encoded values.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod felt;
mod sanitize;

pub use felt::{Felt, FeltError};
pub use sanitize::{sanitize_hex, sanitized_hex_eq};

// Re-export primitive-types for the wide integers
pub use primitive_types::{U256, U512};
