//! Byte string codec
//!
//! A `ByteArray` travels as `[word count, full words..., pending word,
//! pending length]`. Full words hold exactly 31 bytes; the pending word holds
//! the remaining `0..=30` bytes, of which only `pending length` are
//! significant.

use stark_primitives::Felt;

use crate::AbiError;

/// Bytes carried by one full word
pub const BYTES_PER_WORD: usize = 31;

/// Unpacked form of a byte string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteArray {
    /// Full 31-byte words
    pub data: Vec<Felt>,
    /// Trailing partial word
    pub pending_word: Felt,
    /// Significant bytes in the pending word
    pub pending_word_len: usize,
}

impl ByteArray {
    /// Pack text into words
    pub fn pack(text: &str) -> Self {
        let bytes = text.as_bytes();
        let full = bytes.len() / BYTES_PER_WORD;
        let data = bytes
            .chunks_exact(BYTES_PER_WORD)
            .map(Felt::from_word_bytes)
            .collect();
        let rest = &bytes[full * BYTES_PER_WORD..];
        Self {
            data,
            pending_word: Felt::from_word_bytes(rest),
            pending_word_len: rest.len(),
        }
    }

    /// Reassemble the text, replacing invalid UTF-8
    pub fn unpack(&self) -> String {
        unpack(&self.data, self.pending_word, self.pending_word_len)
    }

    /// Wire form
    pub fn to_felts(&self) -> Vec<Felt> {
        let mut out = Vec::with_capacity(self.data.len() + 3);
        out.push(Felt::from(self.data.len()));
        out.extend_from_slice(&self.data);
        out.push(self.pending_word);
        out.push(Felt::from(self.pending_word_len));
        out
    }

    /// Read from wire form, returning the number of felts consumed.
    ///
    /// Never fails: a word count larger than the available input is clamped
    /// and missing trailing elements read as zero, so short input yields
    /// partial or empty text.
    pub fn from_felts(felts: &[Felt]) -> (Self, usize) {
        let Some(count) = felts.first() else {
            return (Self::default(), 0);
        };
        let available = felts.len() - 1;
        let words = count.to_usize().map_or(available, |c| c.min(available));
        if count.to_usize() != Some(words) {
            tracing::debug!(
                declared = %count,
                available,
                "byte array word count exceeds input"
            );
        }

        let mut pos = 1 + words;
        let data = felts[1..pos].to_vec();
        let pending_word = match felts.get(pos) {
            Some(word) => {
                pos += 1;
                *word
            }
            None => Felt::ZERO,
        };
        let pending_word_len = match felts.get(pos) {
            Some(len) => {
                pos += 1;
                len.to_usize().map_or(0, |l| l.min(BYTES_PER_WORD))
            }
            None => 0,
        };

        (
            Self {
                data,
                pending_word,
                pending_word_len,
            },
            pos,
        )
    }
}

/// Pack text into its wire words
pub fn pack(text: &str) -> ByteArray {
    ByteArray::pack(text)
}

/// Reassemble text from full words and the pending word.
///
/// The pending word is dropped only when its length is zero; a zero-valued
/// word with nonzero length contributes that many NUL bytes.
pub fn unpack(full_words: &[Felt], pending_word: Felt, pending_word_len: usize) -> String {
    let mut bytes = Vec::with_capacity(full_words.len() * BYTES_PER_WORD + pending_word_len);
    for word in full_words {
        if word.as_u256().bits() > BYTES_PER_WORD * 8 {
            tracing::debug!(%word, "byte array word wider than 31 bytes, high byte dropped");
        }
        bytes.extend_from_slice(&word.to_bytes_be()[32 - BYTES_PER_WORD..]);
    }
    let len = pending_word_len.min(BYTES_PER_WORD);
    if len > 0 {
        bytes.extend_from_slice(&pending_word.to_bytes_be()[32 - len..]);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Encode at most 31 bytes of text as one felt
pub fn encode_short_string(text: &str) -> Result<Felt, AbiError> {
    if text.len() > BYTES_PER_WORD {
        return Err(AbiError::shape(
            "short string",
            format!("{} bytes exceed {}", text.len(), BYTES_PER_WORD),
        ));
    }
    Ok(Felt::from_word_bytes(text.as_bytes()))
}

/// Decode a felt as a short string, skipping leading zero bytes
pub fn decode_short_string(felt: &Felt) -> String {
    let bytes = felt.to_bytes_be();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[start..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(felts: &[Felt]) -> Vec<String> {
        felts.iter().map(Felt::to_hex).collect()
    }

    #[test]
    fn test_pack_hello_world() {
        let packed = pack("hello world");
        assert_eq!(
            hex(&packed.to_felts()),
            vec!["0x0", "0x68656c6c6f20776f726c64", "0xb"]
        );
    }

    #[test]
    fn test_pack_long_string() {
        let packed = pack("Long string, more than 31 characters.");
        assert_eq!(
            hex(&packed.to_felts()),
            vec![
                "0x1",
                "0x4c6f6e6720737472696e672c206d6f7265207468616e203331206368617261",
                "0x63746572732e",
                "0x6"
            ]
        );
    }

    #[test]
    fn test_pack_empty() {
        let packed = pack("");
        assert_eq!(hex(&packed.to_felts()), vec!["0x0", "0x0", "0x0"]);
        assert_eq!(packed.unpack(), "");
    }

    #[test]
    fn test_pack_exact_word_has_empty_pending() {
        let text = "a".repeat(31);
        let packed = pack(&text);
        assert_eq!(packed.data.len(), 1);
        assert_eq!(packed.pending_word, Felt::ZERO);
        assert_eq!(packed.pending_word_len, 0);
        assert_eq!(packed.unpack(), text);
    }

    #[test]
    fn test_unpack_zero_word_with_length_is_kept() {
        assert_eq!(unpack(&[], Felt::ZERO, 2), "\0\0");
        assert_eq!(unpack(&[], Felt::ZERO, 0), "");
    }

    #[test]
    fn test_unpack_wide_word_keeps_low_bytes() {
        let word = Felt::parse(&format!("0x01{}", "61".repeat(31))).unwrap();
        assert_eq!(unpack(&[word], Felt::ZERO, 0), "a".repeat(31));
    }

    #[test]
    fn test_unpack_multibyte_across_words() {
        let text = format!("{}é", "x".repeat(30));
        assert_eq!(pack(&text).unpack(), text);
    }

    #[test]
    fn test_from_felts_consumes_exactly() {
        let mut wire = pack("Long string, more than 31 characters.").to_felts();
        wire.push(Felt::from(99u8));
        let (decoded, consumed) = ByteArray::from_felts(&wire);
        assert_eq!(consumed, 4);
        assert_eq!(decoded.unpack(), "Long string, more than 31 characters.");
    }

    #[test]
    fn test_from_felts_short_input() {
        let (decoded, consumed) = ByteArray::from_felts(&[]);
        assert_eq!(consumed, 0);
        assert_eq!(decoded.unpack(), "");

        let wire = [Felt::from(5u8), Felt::from_word_bytes(&[b'a'; 31])];
        let (decoded, consumed) = ByteArray::from_felts(&wire);
        assert_eq!(consumed, 2);
        assert_eq!(decoded.unpack(), "a".repeat(31));
    }

    #[test]
    fn test_short_string() {
        let felt = encode_short_string("123").unwrap();
        assert_eq!(felt.to_hex(), "0x313233");
        assert_eq!(decode_short_string(&felt), "123");
        assert!(encode_short_string(&"x".repeat(32)).is_err());
    }
}
