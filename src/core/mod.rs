//! Core XML lexing primitives
//!
//! This module contains the building blocks shared by the reader and the writer:
//! - Unit: the u8 / u16 abstraction every algorithm is written against
//! - Scalar: strict UTF-8 and UTF-16 scalar decoding
//! - Chars: XML character classes (names, whitespace, pubid, encoding names)
//! - Scanner: production scanners using memchr for delimiter search
//! - Entities: predefined and caller-supplied entity lookup, character references
//! - Normalize: two-pass attribute/text normalization with zero-copy fast path
//! - Encoding: BOM detection and UTF-16 byte pairing

pub mod chars;
pub mod encoding;
pub mod entities;
pub mod normalize;
pub mod scalar;
pub mod scanner;
pub mod unit;
