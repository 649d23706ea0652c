//! Byte-order-mark detection and text decoding
//!
//! Documents are read with their encoding detected from the BOM and written
//! back in the same encoding, so a UTF-16 or BOM-prefixed file survives a
//! push untouched apart from the rewritten block interior. Files without a BOM
//! must be valid UTF-8; anything else is refused rather than decoded lossily.

use std::fmt;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Text encoding of a document on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8 without a byte-order mark
    #[default]
    Utf8,
    /// UTF-8 with a leading `EF BB BF`
    Utf8Bom,
    /// UTF-16 little endian, `FF FE` mark
    Utf16Le,
    /// UTF-16 big endian, `FE FF` mark
    Utf16Be,
}

impl TextEncoding {
    /// Detect the encoding from the leading bytes. Defaults to UTF-8.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(UTF8_BOM) {
            Self::Utf8Bom
        } else if bytes.starts_with(UTF16_LE_BOM) {
            Self::Utf16Le
        } else if bytes.starts_with(UTF16_BE_BOM) {
            Self::Utf16Be
        } else {
            Self::Utf8
        }
    }

    /// The byte-order mark written for this encoding (empty for plain UTF-8).
    pub fn bom(self) -> &'static [u8] {
        match self {
            Self::Utf8 => &[],
            Self::Utf8Bom => UTF8_BOM,
            Self::Utf16Le => UTF16_LE_BOM,
            Self::Utf16Be => UTF16_BE_BOM,
        }
    }

    /// Decode raw file bytes (BOM included) into text without the BOM.
    pub fn decode(self, bytes: &[u8]) -> std::result::Result<String, String> {
        let body = &bytes[self.bom().len().min(bytes.len())..];
        match self {
            Self::Utf8 | Self::Utf8Bom => {
                String::from_utf8(body.to_vec()).map_err(|e| e.to_string())
            }
            Self::Utf16Le | Self::Utf16Be => {
                if body.len() % 2 != 0 {
                    return Err(format!("odd byte count {} for UTF-16", body.len()));
                }
                let units: Vec<u16> = body
                    .chunks_exact(2)
                    .map(|pair| match self {
                        Self::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                        _ => u16::from_be_bytes([pair[0], pair[1]]),
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| e.to_string())
            }
        }
    }

    /// Encode text into file bytes, prefixing the BOM.
    pub fn encode(self, text: &str) -> Vec<u8> {
        let mut out = self.bom().to_vec();
        match self {
            Self::Utf8 | Self::Utf8Bom => out.extend_from_slice(text.as_bytes()),
            Self::Utf16Le => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
            }
            Self::Utf16Be => {
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
        }
        out
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Utf8 => "UTF-8",
            Self::Utf8Bom => "UTF-8 BOM",
            Self::Utf16Le => "UTF-16 LE",
            Self::Utf16Be => "UTF-16 BE",
        };
        f.write_str(name)
    }
}

/// Decoded document text together with the encoding it was stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub text: String,
    pub encoding: TextEncoding,
}

impl TextFile {
    pub fn new(text: impl Into<String>, encoding: TextEncoding) -> Self {
        Self {
            text: text.into(),
            encoding,
        }
    }

    /// Same encoding, different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self::new(text, self.encoding)
    }

    /// Bytes to put on disk.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.encoding.encode(&self.text)
    }
}
