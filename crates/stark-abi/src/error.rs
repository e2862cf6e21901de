//! Codec error types

use stark_primitives::FeltError;
use thiserror::Error;

/// ABI codec error type
#[derive(Debug, Error)]
pub enum AbiError {
    /// Type name matches no built-in pattern and no declaration
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// Fewer wire elements than the type requires, or an impossible wire value
    #[error("Malformed wire data: {0}")]
    MalformedWire(String),

    /// Structured input does not fit the declared type
    #[error("Shape mismatch for {ty}: {reason}")]
    ShapeMismatch {
        /// Declared type
        ty: String,
        /// What was wrong with the input
        reason: String,
    },

    /// OR-filter candidates cannot be aligned position by position
    #[error("Unsupported filter pattern for {member}: {reason}")]
    UnsupportedFilterPattern {
        /// Event member name
        member: String,
        /// Why the filter cannot be composed
        reason: String,
    },

    /// Type nesting deeper than the configured ceiling
    #[error("Recursion limit of {0} exceeded")]
    RecursionLimit(usize),

    /// Function not present in the ABI
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Event not present in the ABI
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// Several events share the requested short name
    #[error("Ambiguous event: {0}")]
    AmbiguousEvent(String),

    /// Invalid numeric text
    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] FeltError),

    /// ABI document is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),
}

impl AbiError {
    pub(crate) fn shape(ty: impl Into<String>, reason: impl Into<String>) -> Self {
        AbiError::ShapeMismatch {
            ty: ty.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn short_wire(needed: usize, offset: usize, available: usize) -> Self {
        AbiError::MalformedWire(format!(
            "Insufficient data: need {} felts at offset {}, have {}",
            needed, offset, available
        ))
    }
}

impl From<toml::de::Error> for AbiError {
    fn from(e: toml::de::Error) -> Self {
        AbiError::Config(e.to_string())
    }
}
