//! Starknet field element (felt252)

use std::fmt;
use std::str::FromStr;

use primitive_types::U256;
use thiserror::Error;

/// Field element parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeltError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid decimal string
    #[error("invalid decimal string: {0}")]
    InvalidDecimal(String),
    /// More than 32 significant bytes
    #[error("invalid felt length: expected at most 32 bytes, got {0}")]
    InvalidLength(usize),
    /// Value is not below the field prime
    #[error("value {0} is not a valid field element")]
    OutOfRange(String),
}

/// A Starknet field element, an integer in `[0, P)` with
/// `P = 2^251 + 17 * 2^192 + 1`.
///
/// Every wire value (call arguments, call results, event keys and data) is a
/// sequence of these.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Felt(U256);

impl Felt {
    /// Size of a felt in bytes
    pub const LEN: usize = 32;

    /// The field prime
    pub const PRIME: U256 = U256([1, 0, 0, 0x0800_0000_0000_0011]);

    /// Zero
    pub const ZERO: Felt = Felt(U256([0, 0, 0, 0]));

    /// One
    pub const ONE: Felt = Felt(U256([1, 0, 0, 0]));

    /// Largest field element (`P - 1`)
    pub const MAX: Felt = Felt(U256([0, 0, 0, 0x0800_0000_0000_0011]));

    /// Create a felt from a U256, rejecting values `>= P`
    pub fn from_u256(value: U256) -> Result<Self, FeltError> {
        if value >= Self::PRIME {
            return Err(FeltError::OutOfRange(value.to_string()));
        }
        Ok(Felt(value))
    }

    /// Create a felt from big-endian bytes (at most 32)
    pub fn from_bytes_be(bytes: &[u8]) -> Result<Self, FeltError> {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        let significant = &bytes[start..];
        if significant.len() > Self::LEN {
            return Err(FeltError::InvalidLength(significant.len()));
        }
        Self::from_u256(U256::from_big_endian(significant))
    }

    /// Build a felt from up to 31 big-endian bytes. Longer input keeps only
    /// its last 31 bytes, so the result is always below the prime.
    pub fn from_word_bytes(bytes: &[u8]) -> Self {
        let tail = &bytes[bytes.len().saturating_sub(31)..];
        Felt(U256::from_big_endian(tail))
    }

    /// Parse from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, FeltError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(FeltError::InvalidHex(s.to_string()));
        }
        let bytes = if digits.len() % 2 == 1 {
            hex::decode(format!("0{}", digits))
        } else {
            hex::decode(digits)
        }
        .map_err(|e| FeltError::InvalidHex(format!("{}: {}", s, e)))?;
        Self::from_bytes_be(&bytes)
    }

    /// Parse from an unsigned decimal string
    pub fn from_dec_str(s: &str) -> Result<Self, FeltError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FeltError::InvalidDecimal(s.to_string()));
        }
        let value =
            U256::from_dec_str(s).map_err(|_| FeltError::InvalidDecimal(s.to_string()))?;
        Self::from_u256(value)
    }

    /// Parse textual input: `0x`-prefixed means hex, anything else is tried
    /// as decimal. A leading `-` yields the field negation.
    pub fn parse(s: &str) -> Result<Self, FeltError> {
        let s = s.trim();
        if let Some(magnitude) = s.strip_prefix('-') {
            let abs = Self::parse(magnitude)?;
            return Ok(abs.neg());
        }
        if s.starts_with("0x") || s.starts_with("0X") {
            Self::from_hex(s)
        } else {
            Self::from_dec_str(s)
        }
    }

    /// Encode a signed integer: negatives become `P - |value|`
    pub fn from_i128(value: i128) -> Self {
        let abs = Felt(U256::from(value.unsigned_abs()));
        if value < 0 {
            abs.neg()
        } else {
            abs
        }
    }

    /// Field negation
    pub fn neg(&self) -> Self {
        if self.is_zero() {
            *self
        } else {
            Felt(Self::PRIME - self.0)
        }
    }

    /// Interpret as a signed integer, treating values above `P / 2` as
    /// negative. Returns `None` when the magnitude does not fit an `i128`.
    pub fn to_i128(&self) -> Option<i128> {
        let half = Self::PRIME >> 1;
        if self.0 > half {
            let magnitude = Self::PRIME - self.0;
            if magnitude.bits() > 128 {
                return None;
            }
            let magnitude = magnitude.low_u128();
            if magnitude == 1u128 << 127 {
                Some(i128::MIN)
            } else if magnitude < 1u128 << 127 {
                Some(-(magnitude as i128))
            } else {
                None
            }
        } else if self.0.bits() < 128 {
            Some(self.0.low_u128() as i128)
        } else {
            None
        }
    }

    /// Get the underlying integer
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Value as u64, if it fits
    pub fn to_u64(&self) -> Option<u64> {
        (self.0.bits() <= 64).then(|| self.0.low_u64())
    }

    /// Value as u128, if it fits
    pub fn to_u128(&self) -> Option<u128> {
        (self.0.bits() <= 128).then(|| self.0.low_u128())
    }

    /// Value as usize, if it fits
    pub fn to_usize(&self) -> Option<usize> {
        self.to_u64().and_then(|v| usize::try_from(v).ok())
    }

    /// Number of significant bits
    pub fn bits(&self) -> usize {
        self.0.bits()
    }

    /// Check if this is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// 32-byte big-endian representation
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_big_endian(&mut bytes);
        bytes
    }

    /// Minimal hex with 0x prefix (`0x0` for zero)
    pub fn to_hex(&self) -> String {
        let full = hex::encode(self.to_bytes_be());
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }

    /// Zero-padded 64-digit lowercase hex with 0x prefix
    pub fn to_fixed_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes_be()))
    }
}

impl fmt::Debug for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Felt({})", self.to_hex())
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Felt {
    type Err = FeltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<bool> for Felt {
    fn from(value: bool) -> Self {
        if value {
            Felt::ONE
        } else {
            Felt::ZERO
        }
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Felt {
                fn from(value: $t) -> Self {
                    Felt(U256::from(value))
                }
            }
        )*
    };
}

impl_from_unsigned!(u8, u16, u32, u64, u128, usize);

impl TryFrom<U256> for Felt {
    type Error = FeltError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        Felt::from_u256(value)
    }
}

impl From<Felt> for U256 {
    fn from(felt: Felt) -> Self {
        felt.0
    }
}

// Serde implementation (behind feature flag)
#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::de::{self, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Felt {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    struct FeltVisitor;

    impl<'de> Visitor<'de> for FeltVisitor {
        type Value = Felt;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a hex or decimal field element")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Felt, E> {
            Felt::parse(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Felt, E> {
            Ok(Felt::from(v))
        }
    }

    impl<'de> Deserialize<'de> for Felt {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(FeltVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Parsing ====================

    #[test]
    fn test_felt_from_hex() {
        let felt = Felt::from_hex("0x2702").unwrap();
        assert_eq!(felt, Felt::from(9986u64));

        let unprefixed = Felt::from_hex("2702").unwrap();
        assert_eq!(felt, unprefixed);
    }

    #[test]
    fn test_felt_from_hex_odd_length() {
        assert_eq!(Felt::from_hex("0x1").unwrap(), Felt::ONE);
        assert_eq!(Felt::from_hex("0x001").unwrap(), Felt::ONE);
    }

    #[test]
    fn test_felt_from_hex_only_prefix() {
        assert!(matches!(Felt::from_hex("0x"), Err(FeltError::InvalidHex(_))));
    }

    #[test]
    fn test_felt_from_hex_invalid_chars() {
        assert!(matches!(Felt::from_hex("0xzz"), Err(FeltError::InvalidHex(_))));
    }

    #[test]
    fn test_felt_from_dec_str() {
        assert_eq!(Felt::from_dec_str("9987").unwrap(), Felt::from(9987u64));
        assert!(Felt::from_dec_str("12a").is_err());
        assert!(Felt::from_dec_str("").is_err());
    }

    #[test]
    fn test_felt_parse_dispatches_on_prefix() {
        assert_eq!(Felt::parse("10").unwrap(), Felt::from(10u8));
        assert_eq!(Felt::parse("0x10").unwrap(), Felt::from(16u8));
        assert_eq!(Felt::parse(" 7 ").unwrap(), Felt::from(7u8));
    }

    #[test]
    fn test_felt_rejects_prime() {
        assert!(matches!(
            Felt::from_u256(Felt::PRIME),
            Err(FeltError::OutOfRange(_))
        ));
        assert!(Felt::from_u256(Felt::PRIME - U256::one()).is_ok());
    }

    #[test]
    fn test_felt_from_bytes_too_long() {
        let bytes = [0xffu8; 33];
        assert!(matches!(
            Felt::from_bytes_be(&bytes),
            Err(FeltError::InvalidLength(33))
        ));
    }

    // ==================== Signed values ====================

    #[test]
    fn test_felt_signed_roundtrip() {
        for v in [0i128, 1, -1, 127, -128, i64::MIN as i128, i128::MAX, i128::MIN] {
            assert_eq!(Felt::from_i128(v).to_i128(), Some(v), "value {}", v);
        }
    }

    #[test]
    fn test_felt_minus_one_is_prime_minus_one() {
        assert_eq!(Felt::from_i128(-1), Felt::MAX);
        assert_eq!(Felt::parse("-1").unwrap(), Felt::MAX);
    }

    // ==================== Formatting ====================

    #[test]
    fn test_felt_to_hex() {
        assert_eq!(Felt::ZERO.to_hex(), "0x0");
        assert_eq!(Felt::from(11u8).to_hex(), "0xb");
        assert_eq!(format!("{}", Felt::from(0x2703u64)), "0x2703");
    }

    #[test]
    fn test_felt_to_fixed_hex() {
        let hex = Felt::ONE.to_fixed_hex();
        assert_eq!(hex.len(), 66);
        assert!(hex.ends_with("01"));
        assert!(hex.starts_with("0x0000"));
    }

    #[test]
    fn test_felt_from_word_bytes() {
        assert_eq!(Felt::from_word_bytes(b"hello world").to_hex(), "0x68656c6c6f20776f726c64");
        let long = [0xffu8; 40];
        assert_eq!(Felt::from_word_bytes(&long).bits(), 248);
    }

    #[test]
    fn test_felt_narrow_conversions() {
        assert_eq!(Felt::from(5u8).to_u64(), Some(5));
        assert_eq!(Felt::MAX.to_u64(), None);
        assert_eq!(Felt::from(u128::MAX).to_u128(), Some(u128::MAX));
    }
}
