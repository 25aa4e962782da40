//! XML Encoding Detection
//!
//! Picks the representation for a raw byte document from its byte-order mark
//! or first bytes, and turns UTF-16 bytes into code units for the UTF-16
//! reader. No transcoding to UTF-8 happens here: each representation is
//! tokenized natively.

use super::unit::Unit;
use crate::error::{Error, Result};

/// Detect the encoding of XML input based on BOM or byte patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return XmlEncoding::Utf8;
        }

        match (input[0], input[1]) {
            // UTF-16 LE BOM: 0xFF 0xFE
            (0xFF, 0xFE) => XmlEncoding::Utf16Le,
            // UTF-16 BE BOM: 0xFE 0xFF
            (0xFE, 0xFF) => XmlEncoding::Utf16Be,
            // No BOM - '<' next to a NUL byte
            (0x00, b'<') => XmlEncoding::Utf16Be,
            (b'<', 0x00) => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        }
    }

    pub fn is_utf16(self) -> bool {
        !matches!(self, XmlEncoding::Utf8)
    }
}

/// Pair up UTF-16 bytes into code units. The BOM, if any, is kept.
pub fn utf16_units(input: &[u8], encoding: XmlEncoding) -> Result<Vec<u16>> {
    if input.len() % 2 != 0 {
        return Err(Error::Encoding {
            position: input.len() - 1,
        });
    }
    let from_bytes: fn([u8; 2]) -> u16 = match encoding {
        XmlEncoding::Utf16Be => u16::from_be_bytes,
        _ => u16::from_le_bytes,
    };
    Ok(input
        .chunks_exact(2)
        .map(|pair| from_bytes([pair[0], pair[1]]))
        .collect())
}

/// Drop a leading byte-order mark
#[inline]
pub fn strip_bom<U: Unit>(input: &[U]) -> &[U] {
    input.strip_prefix(U::BOM).unwrap_or(input)
}
