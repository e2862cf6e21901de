//! Type categories and structured values

use primitive_types::{U256, U512};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as Json};
use stark_primitives::Felt;

/// Largest integer a JSON consumer can hold without precision loss (2^53 - 1)
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Fixed-width integer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerKind {
    /// Bit width (8, 16, 32, 64 or 128)
    pub bits: u16,
    /// Two's-range signed integer, encoded as `P - |v|` when negative
    pub signed: bool,
}

impl IntegerKind {
    /// Unsigned integer of the given width
    pub const fn unsigned(bits: u16) -> Self {
        Self { bits, signed: false }
    }

    /// Signed integer of the given width
    pub const fn signed(bits: u16) -> Self {
        Self { bits, signed: true }
    }

    /// Whether the width needs big-integer arithmetic in a JSON consumer
    pub fn is_wide(&self) -> bool {
        self.bits >= 64
    }

    /// Check that an unsigned value fits the width
    pub fn fits_unsigned(&self, value: &U256) -> bool {
        !self.signed && value.bits() <= self.bits as usize
    }

    /// Check that a signed value fits the width
    pub fn fits_signed(&self, value: i128) -> bool {
        if !self.signed {
            return false;
        }
        if self.bits >= 128 {
            return true;
        }
        let bound = 1i128 << (self.bits - 1);
        value >= -bound && value < bound
    }
}

/// Address-like scalar kinds, all one felt on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Contract address
    Contract,
    /// Ethereum (L1) address
    Eth,
    /// Class hash
    ClassHash,
    /// Storage address
    Storage,
}

/// Semantic category of a type reference.
///
/// Produced once by the classifier, then dispatched on by the decoder,
/// the encoder and the filter composer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// Scalar field element
    Felt,
    /// Boolean
    Bool,
    /// Fixed-width integer up to 128 bits
    Integer(IntegerKind),
    /// 256-bit unsigned integer, two 128-bit limbs
    U256,
    /// 512-bit unsigned integer, four 128-bit limbs
    U512,
    /// Address-like scalar
    Address(AddressKind),
    /// Short string packed into one felt
    Bytes31,
    /// Length-prefixed byte string
    ByteArray,
    /// Empty tuple
    Unit,
    /// Fixed-size tuple
    Tuple(Vec<Category>),
    /// Variable-length array (or span)
    Array(Box<Category>),
    /// Option of a type
    Option(Box<Category>),
    /// Result of an ok and an error type
    Result(Box<Category>, Box<Category>),
    /// Declared struct, by fully qualified name
    Struct(String),
    /// Declared enum, by fully qualified name
    Enum(String),
    /// Type that could not be resolved, decoded as a raw felt
    Unresolved(String),
}

impl Category {
    /// Whether this is a single-felt scalar
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Category::Felt
                | Category::Bool
                | Category::Integer(_)
                | Category::Address(_)
                | Category::Bytes31
        )
    }

    /// Whether this is an array or span
    pub fn is_array(&self) -> bool {
        matches!(self, Category::Array(_))
    }
}

/// A decoded (or to-be-encoded) structured value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Scalar field element
    Felt(Felt),
    /// Boolean
    Bool(bool),
    /// Unsigned integer, any width up to 256 bits
    Uint(U256),
    /// Signed integer
    Int(i128),
    /// 512-bit unsigned integer
    U512(U512),
    /// Address-like scalar
    Address(Felt),
    /// Text from a byte string or short string
    String(String),
    /// Empty tuple
    Unit,
    /// Tuple members in order
    Tuple(Vec<Value>),
    /// Array elements in order
    Array(Vec<Value>),
    /// Struct members by name, in declared order
    Struct(Vec<(String, Value)>),
    /// Selected variant of an enum, option or result
    Enum {
        /// Variant name
        variant: String,
        /// Payload, `None` for zero-sized variants
        value: Option<Box<Value>>,
    },
    /// Undecodable member passed through as raw felts
    Raw(Vec<Felt>),
}

impl Value {
    /// Build an enum value
    pub fn variant(name: impl Into<String>, payload: Option<Value>) -> Self {
        Value::Enum {
            variant: name.into(),
            value: payload.map(Box::new),
        }
    }

    /// Look up a struct member by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Numeric value as U256, for unsigned integers and felts
    pub fn as_u256(&self) -> Option<U256> {
        match self {
            Value::Uint(v) => Some(*v),
            Value::Felt(f) | Value::Address(f) => Some(f.as_u256()),
            _ => None,
        }
    }

    /// Text content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether any part of this value degraded to raw felts
    pub fn has_raw(&self) -> bool {
        match self {
            Value::Raw(_) => true,
            Value::Tuple(items) | Value::Array(items) => items.iter().any(Value::has_raw),
            Value::Struct(fields) => fields.iter().any(|(_, v)| v.has_raw()),
            Value::Enum { value, .. } => value.as_ref().map_or(false, |v| v.has_raw()),
            _ => false,
        }
    }

    /// Render as display JSON.
    ///
    /// Integers within `±(2^53 - 1)` become JSON numbers, larger ones decimal
    /// strings. Felts are minimal hex and addresses 66-character hex. Tuples
    /// are objects keyed by position, enums one-entry objects mapping the
    /// variant name to its payload (or `true` when there is none).
    pub fn to_json(&self) -> Json {
        match self {
            Value::Felt(f) => Json::String(f.to_hex()),
            Value::Bool(b) => Json::Bool(*b),
            Value::Uint(v) => {
                if *v <= U256::from(MAX_SAFE_INTEGER) {
                    json!(v.low_u64())
                } else {
                    Json::String(v.to_string())
                }
            }
            Value::Int(v) => {
                if v.unsigned_abs() <= MAX_SAFE_INTEGER as u128 {
                    json!(*v as i64)
                } else {
                    Json::String(v.to_string())
                }
            }
            Value::U512(v) => {
                if *v <= U512::from(MAX_SAFE_INTEGER) {
                    json!(v.low_u64())
                } else {
                    Json::String(v.to_string())
                }
            }
            Value::Address(f) => Json::String(f.to_fixed_hex()),
            Value::String(s) => Json::String(s.clone()),
            Value::Unit => Json::Null,
            Value::Tuple(items) => Json::Object(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v.to_json()))
                    .collect(),
            ),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Struct(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(name, v)| (name.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Enum { variant, value } => {
                let payload = match value.as_deref() {
                    None | Some(Value::Unit) => Json::Bool(true),
                    Some(v) => v.to_json(),
                };
                let mut map = Map::new();
                map.insert(variant.clone(), payload);
                Json::Object(map)
            }
            Value::Raw(felts) => {
                Json::Array(felts.iter().map(|f| Json::String(f.to_hex())).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<U256> for Value {
    fn from(v: U256) -> Self {
        Value::Uint(v)
    }
}
