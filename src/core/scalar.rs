//! Unicode scalar decoding
//!
//! Decodes exactly one scalar value from the head of a UTF-8 byte slice or a
//! UTF-16 code-unit slice. Overlong forms, surrogates and values above
//! U+10FFFF are rejected.

/// Outcome of decoding one scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A scalar and the number of source units it occupied
    Done(char, usize),
    /// The input ends inside a sequence (or is empty)
    Incomplete,
    /// Malformed sequence
    Invalid,
}

impl Decoded {
    /// The scalar and its length, if decoding succeeded
    #[inline]
    pub fn ok(self) -> Option<(char, usize)> {
        match self {
            Decoded::Done(c, len) => Some((c, len)),
            _ => None,
        }
    }
}

/// Decode one scalar from UTF-8 bytes
#[inline]
pub fn decode_utf8(src: &[u8]) -> Decoded {
    let Some(&first) = src.first() else {
        return Decoded::Incomplete;
    };
    if first < 0x80 {
        return Decoded::Done(first as char, 1);
    }

    let (len, min, mut cp) = match first {
        0xC2..=0xDF => (2, 0x80, (first & 0x1F) as u32),
        0xE0..=0xEF => (3, 0x800, (first & 0x0F) as u32),
        0xF0..=0xF4 => (4, 0x1_0000, (first & 0x07) as u32),
        _ => return Decoded::Invalid,
    };

    for i in 1..len {
        let Some(&b) = src.get(i) else {
            return Decoded::Incomplete;
        };
        if b & 0xC0 != 0x80 {
            return Decoded::Invalid;
        }
        cp = (cp << 6) | (b & 0x3F) as u32;
    }

    if cp < min {
        return Decoded::Invalid;
    }
    // from_u32 rejects surrogates and anything past U+10FFFF
    match char::from_u32(cp) {
        Some(c) => Decoded::Done(c, len),
        None => Decoded::Invalid,
    }
}

/// Decode one scalar from UTF-16 code units
#[inline]
pub fn decode_utf16(src: &[u16]) -> Decoded {
    let Some(&first) = src.first() else {
        return Decoded::Incomplete;
    };
    match first {
        0xD800..=0xDBFF => match src.get(1) {
            None => Decoded::Incomplete,
            Some(&second @ 0xDC00..=0xDFFF) => {
                let cp = 0x1_0000 + (((first as u32) - 0xD800) << 10) + ((second as u32) - 0xDC00);
                match char::from_u32(cp) {
                    Some(c) => Decoded::Done(c, 2),
                    None => Decoded::Invalid,
                }
            }
            Some(_) => Decoded::Invalid,
        },
        0xDC00..=0xDFFF => Decoded::Invalid,
        _ => match char::from_u32(first as u32) {
            Some(c) => Decoded::Done(c, 1),
            None => Decoded::Invalid,
        },
    }
}
