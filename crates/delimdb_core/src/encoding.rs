//! Text encodings for stored files.

use crate::error::{CoreError, CoreResult};

/// UTF-8 byte order mark.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text encoding of the main and child files.
///
/// A leading UTF-8 byte order mark is always skipped on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8 without byte order mark.
    #[default]
    Utf8,
    /// UTF-8, with a byte order mark written at the start of new files.
    Utf8Bom,
    /// ISO-8859-1; every byte is one character.
    Latin1,
}

impl TextEncoding {
    /// Returns the encoding name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf8Bom => "UTF-8 (BOM)",
            TextEncoding::Latin1 => "ISO-8859-1",
        }
    }

    /// Decodes file content.
    ///
    /// # Errors
    ///
    /// Returns an encoding error for invalid UTF-8.
    pub fn decode(self, bytes: &[u8]) -> CoreResult<String> {
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        match self {
            TextEncoding::Utf8 | TextEncoding::Utf8Bom => String::from_utf8(body.to_vec())
                .map_err(|e| CoreError::encoding(self.name(), e.to_string())),
            TextEncoding::Latin1 => Ok(body.iter().copied().map(char::from).collect()),
        }
    }

    /// Encodes text. `at_start` marks text that begins a file, which gets
    /// the byte order mark under [`TextEncoding::Utf8Bom`].
    ///
    /// # Errors
    ///
    /// Returns an encoding error for characters Latin-1 cannot represent.
    pub fn encode(self, text: &str, at_start: bool) -> CoreResult<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Utf8Bom => {
                let mut out = Vec::with_capacity(text.len() + UTF8_BOM.len());
                if at_start {
                    out.extend_from_slice(UTF8_BOM);
                }
                out.extend_from_slice(text.as_bytes());
                Ok(out)
            }
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        CoreError::encoding(self.name(), format!("character {c:?} out of range"))
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_roundtrip() {
        let bytes = TextEncoding::Utf8.encode("Zoë|1", true).unwrap();
        assert_eq!(TextEncoding::Utf8.decode(&bytes).unwrap(), "Zoë|1");
    }

    #[test]
    fn bom_written_only_at_start() {
        let head = TextEncoding::Utf8Bom.encode("a", true).unwrap();
        assert_eq!(&head[..3], UTF8_BOM);
        let tail = TextEncoding::Utf8Bom.encode("a", false).unwrap();
        assert_eq!(tail, b"a");
    }

    #[test]
    fn bom_skipped_on_read() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Id|Name");
        assert_eq!(TextEncoding::Utf8.decode(&bytes).unwrap(), "Id|Name");
    }

    #[test]
    fn invalid_utf8_fails() {
        assert!(matches!(
            TextEncoding::Utf8.decode(&[0x66, 0xFF]),
            Err(CoreError::Encoding { .. })
        ));
    }

    #[test]
    fn latin1_maps_bytes() {
        let bytes = TextEncoding::Latin1.encode("café", true).unwrap();
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(TextEncoding::Latin1.decode(&bytes).unwrap(), "café");
        assert!(TextEncoding::Latin1.encode("€", true).is_err());
    }
}
