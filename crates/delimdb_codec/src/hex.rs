//! Fixed-width hexadecimal coding for byte-sequence fields.
//!
//! Every byte becomes exactly two uppercase digits with no separators, so
//! `[0x11, 0x12, 0x13, 0x14]` is stored as `11121314`.

use crate::error::{CodecError, CodecResult};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Renders bytes as uppercase hex. Empty input yields empty text.
#[must_use]
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
        out.push(HEX_DIGITS[usize::from(byte & 0x0F)] as char);
    }
    out
}

/// Parses hex text back into bytes.
///
/// Empty or whitespace-only text yields an empty sequence. Digits are read
/// in pairs; a trailing unpaired digit is dropped. Lowercase is accepted.
///
/// # Errors
///
/// Returns `InvalidHex` when a pair contains a non-hex character.
pub fn hex_to_bytes(text: &str) -> CodecResult<Vec<u8>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw = text.as_bytes();
    let mut out = Vec::with_capacity(raw.len() / 2);
    for (pair_index, pair) in raw.chunks_exact(2).enumerate() {
        let position = pair_index * 2;
        let high = digit_value(pair[0], position)?;
        let low = digit_value(pair[1], position + 1)?;
        out.push((high << 4) | low);
    }
    Ok(out)
}

fn digit_value(byte: u8, position: usize) -> CodecResult<u8> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        _ => Err(CodecError::InvalidHex {
            digit: char::from(byte),
            position,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_known_bytes() {
        assert_eq!(bytes_to_hex(&[0x11, 0x12, 0x13, 0x14]), "11121314");
        assert_eq!(bytes_to_hex(&[0x00, 0xAB, 0xFF]), "00ABFF");
    }

    #[test]
    fn encode_empty() {
        assert_eq!(bytes_to_hex(&[]), "");
    }

    #[test]
    fn decode_known_text() {
        assert_eq!(hex_to_bytes("11121314").unwrap(), vec![0x11, 0x12, 0x13, 0x14]);
        assert_eq!(hex_to_bytes("00abFF").unwrap(), vec![0x00, 0xAB, 0xFF]);
    }

    #[test]
    fn decode_blank_is_empty() {
        assert!(hex_to_bytes("").unwrap().is_empty());
        assert!(hex_to_bytes("   ").unwrap().is_empty());
    }

    #[test]
    fn decode_odd_length_truncates() {
        assert_eq!(hex_to_bytes("ABC").unwrap(), vec![0xAB]);
        assert!(hex_to_bytes("A").unwrap().is_empty());
    }

    #[test]
    fn decode_rejects_non_hex() {
        let err = hex_to_bytes("12G4").unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidHex {
                digit: 'G',
                position: 2
            }
        );
    }

    proptest! {
        #[test]
        fn hex_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let text = bytes_to_hex(&bytes);
            prop_assert_eq!(text.len(), bytes.len() * 2);
            prop_assert!(!text.chars().any(|c| c.is_ascii_lowercase()));
            prop_assert_eq!(hex_to_bytes(&text).unwrap(), bytes);
        }
    }
}
