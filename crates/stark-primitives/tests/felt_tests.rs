//! Tests for the Felt type

use stark_primitives::{Felt, FeltError, U256};

// =============================================================================
// Constants tests
// =============================================================================

mod constants {
    use super::*;

    #[test]
    fn zero_constant_is_zero() {
        assert!(Felt::ZERO.is_zero());
    }

    #[test]
    fn one_constant_value() {
        let bytes = Felt::ONE.to_bytes_be();
        assert_eq!(bytes[31], 1);
        for (i, &byte) in bytes.iter().take(31).enumerate() {
            assert_eq!(byte, 0, "byte {} should be 0", i);
        }
    }

    #[test]
    fn max_is_prime_minus_one() {
        assert_eq!(Felt::MAX.as_u256() + U256::one(), Felt::PRIME);
    }

    #[test]
    fn prime_hex_value() {
        let prime_hex = "0x0800000000000011000000000000000000000000000000000000000000000001";
        let max = Felt::from_hex("0x800000000000011000000000000000000000000000000000000000000000000")
            .unwrap();
        assert_eq!(max, Felt::MAX);
        assert!(Felt::from_hex(prime_hex).is_err());
    }
}

// =============================================================================
// Parsing tests
// =============================================================================

mod parsing {
    use super::*;

    #[test]
    fn hex_and_decimal_agree() {
        assert_eq!(Felt::parse("255").unwrap(), Felt::parse("0xff").unwrap());
        assert_eq!(Felt::parse("0xFF").unwrap(), Felt::from(255u8));
    }

    #[test]
    fn leading_zero_bytes_are_accepted() {
        let padded = format!("0x{}01", "00".repeat(40));
        assert_eq!(Felt::from_hex(&padded).unwrap(), Felt::ONE);
    }

    #[test]
    fn invalid_decimal_is_rejected() {
        assert!(matches!(
            Felt::parse("1e5"),
            Err(FeltError::InvalidDecimal(_))
        ));
    }

    #[test]
    fn from_str_uses_parse() {
        let felt: Felt = "0x64b48806902a367c8598f4f95c305e8c1a1acba5f082d294a43793113115691"
            .parse()
            .unwrap();
        assert_eq!(
            felt.to_hex(),
            "0x64b48806902a367c8598f4f95c305e8c1a1acba5f082d294a43793113115691"
        );
        assert_eq!(
            felt.to_fixed_hex(),
            "0x064b48806902a367c8598f4f95c305e8c1a1acba5f082d294a43793113115691"
        );
    }
}

// =============================================================================
// Signed tests
// =============================================================================

mod signed {
    use super::*;

    #[test]
    fn negative_values_wrap_around_prime() {
        let minus_five = Felt::from_i128(-5);
        assert_eq!(minus_five.as_u256() + U256::from(5u8), Felt::PRIME);
        assert_eq!(minus_five.to_i128(), Some(-5));
    }

    #[test]
    fn large_positive_is_not_i128() {
        let big = Felt::from_u256(U256::one() << 200).unwrap();
        assert_eq!(big.to_i128(), None);
    }

    #[test]
    fn negation_of_zero_is_zero() {
        assert_eq!(Felt::ZERO.neg(), Felt::ZERO);
    }
}

// =============================================================================
// Serde tests
// =============================================================================

#[cfg(feature = "serde")]
mod serialization {
    use super::*;

    #[test]
    fn serializes_as_minimal_hex() {
        let felt = Felt::from(9986u64);
        assert_eq!(serde_json::to_string(&felt).unwrap(), "\"0x2702\"");
        assert_eq!(serde_json::from_str::<Felt>("\"0x2702\"").unwrap(), felt);
    }

    #[test]
    fn deserializes_decimal_text_and_numbers() {
        let felt = Felt::from(9986u64);
        assert_eq!(serde_json::from_str::<Felt>("\"9986\"").unwrap(), felt);
        assert_eq!(serde_json::from_str::<Felt>("9986").unwrap(), felt);
    }

    #[test]
    fn rejects_values_outside_the_field() {
        let prime = format!("\"0x{:x}\"", Felt::PRIME);
        assert!(serde_json::from_str::<Felt>(&prime).is_err());
        assert!(serde_json::from_str::<Felt>("true").is_err());
    }
}
