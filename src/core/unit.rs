//! Source units: the one abstraction both representations share
//!
//! Every scanner, the normalizer and the writer are written once against
//! [`Unit`] and instantiated for `u8` (UTF-8 bytes) and `u16` (UTF-16 code
//! units). The trait is sealed; these two are the only representations.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use memchr::{memchr, memmem};

use super::scalar::{decode_utf16, decode_utf8, Decoded};
use crate::memory::pool::{self, BufferPool};

/// A slice tagged with its representation, used to move data between
/// generic code and a concrete unit type without copying.
#[derive(Debug, Clone, Copy)]
pub enum Units<'s> {
    Utf8(&'s [u8]),
    Utf16(&'s [u16]),
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

pub trait Unit: Copy + Eq + Ord + Default + fmt::Debug + sealed::Sealed + 'static {
    /// Encoding name, for diagnostics
    const ENCODING: &'static str;
    /// Byte-order mark as it appears in this representation
    const BOM: &'static [Self];

    fn from_ascii(b: u8) -> Self;
    /// The unit as an ASCII byte, if it is one
    fn to_ascii(self) -> Option<u8>;

    fn decode(src: &[Self]) -> Decoded;
    fn encode(ch: char, buf: &mut [Self; 4]) -> &[Self];

    /// Position of the first unit equal to the ASCII byte `needle`
    fn find(haystack: &[Self], needle: u8) -> Option<usize>;
    /// Position of the first occurrence of an ASCII sequence
    fn find_seq(haystack: &[Self], needle: &[u8]) -> Option<usize>;

    fn view(units: &[Self]) -> Units<'_>;
    fn from_view(units: Units<'_>) -> Option<&[Self]>;

    /// Borrowing conversion where the representation allows it
    fn to_str(units: &[Self]) -> Option<Cow<'_, str>>;
    fn into_string(units: Vec<Self>) -> Option<String>;

    /// The calling thread's buffer pool for this unit type
    fn shared_pool() -> Rc<BufferPool<Self>>;

    #[inline]
    fn is(self, b: u8) -> bool {
        self == Self::from_ascii(b)
    }

    #[inline]
    fn starts_with_ascii(src: &[Self], lit: &[u8]) -> bool {
        src.len() >= lit.len() && src.iter().zip(lit).all(|(&u, &b)| u.is(b))
    }

    #[inline]
    fn eq_ascii(src: &[Self], lit: &[u8]) -> bool {
        src.len() == lit.len() && Self::starts_with_ascii(src, lit)
    }

    #[inline]
    fn encoded_len(ch: char) -> usize {
        let mut buf = [Self::default(); 4];
        Self::encode(ch, &mut buf).len()
    }
}

impl Unit for u8 {
    const ENCODING: &'static str = "UTF-8";
    const BOM: &'static [u8] = &[0xEF, 0xBB, 0xBF];

    #[inline]
    fn from_ascii(b: u8) -> Self {
        b
    }

    #[inline]
    fn to_ascii(self) -> Option<u8> {
        self.is_ascii().then_some(self)
    }

    #[inline]
    fn decode(src: &[u8]) -> Decoded {
        decode_utf8(src)
    }

    #[inline]
    fn encode(ch: char, buf: &mut [u8; 4]) -> &[u8] {
        ch.encode_utf8(buf).as_bytes()
    }

    #[inline]
    fn find(haystack: &[u8], needle: u8) -> Option<usize> {
        memchr(needle, haystack)
    }

    #[inline]
    fn find_seq(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        memmem::find(haystack, needle)
    }

    #[inline]
    fn view(units: &[u8]) -> Units<'_> {
        Units::Utf8(units)
    }

    #[inline]
    fn from_view(units: Units<'_>) -> Option<&[u8]> {
        match units {
            Units::Utf8(s) => Some(s),
            Units::Utf16(_) => None,
        }
    }

    fn to_str(units: &[u8]) -> Option<Cow<'_, str>> {
        std::str::from_utf8(units).ok().map(Cow::Borrowed)
    }

    fn into_string(units: Vec<u8>) -> Option<String> {
        String::from_utf8(units).ok()
    }

    fn shared_pool() -> Rc<BufferPool<u8>> {
        pool::utf8_pool()
    }
}

impl Unit for u16 {
    const ENCODING: &'static str = "UTF-16";
    const BOM: &'static [u16] = &[0xFEFF];

    #[inline]
    fn from_ascii(b: u8) -> Self {
        b as u16
    }

    #[inline]
    fn to_ascii(self) -> Option<u8> {
        (self < 0x80).then_some(self as u8)
    }

    #[inline]
    fn decode(src: &[u16]) -> Decoded {
        decode_utf16(src)
    }

    #[inline]
    fn encode(ch: char, buf: &mut [u16; 4]) -> &[u16] {
        ch.encode_utf16(buf)
    }

    #[inline]
    fn find(haystack: &[u16], needle: u8) -> Option<usize> {
        let needle = needle as u16;
        haystack.iter().position(|&u| u == needle)
    }

    fn find_seq(haystack: &[u16], needle: &[u8]) -> Option<usize> {
        let Some((&first, _)) = needle.split_first() else {
            return Some(0);
        };
        let mut from = 0;
        while let Some(i) = Self::find(&haystack[from..], first) {
            let at = from + i;
            if Self::starts_with_ascii(&haystack[at..], needle) {
                return Some(at);
            }
            from = at + 1;
        }
        None
    }

    #[inline]
    fn view(units: &[u16]) -> Units<'_> {
        Units::Utf16(units)
    }

    #[inline]
    fn from_view(units: Units<'_>) -> Option<&[u16]> {
        match units {
            Units::Utf16(s) => Some(s),
            Units::Utf8(_) => None,
        }
    }

    fn to_str(units: &[u16]) -> Option<Cow<'_, str>> {
        String::from_utf16(units).ok().map(Cow::Owned)
    }

    fn into_string(units: Vec<u16>) -> Option<String> {
        String::from_utf16(&units).ok()
    }

    fn shared_pool() -> Rc<BufferPool<u16>> {
        pool::utf16_pool()
    }
}

/// Reinterpret a slice as another unit type when both are the same type
#[inline]
pub fn cast<V: Unit, T: Unit>(units: &[V]) -> Option<&[T]> {
    T::from_view(V::view(units))
}

/// Length of the longest well-formed prefix
pub fn valid_up_to<U: Unit>(units: &[U]) -> usize {
    let mut i = 0;
    while let Decoded::Done(_, len) = U::decode(&units[i..]) {
        i += len;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_find_seq() {
        assert_eq!(u8::find_seq(b"a-->b", b"-->"), Some(1));
        assert_eq!(u16::find_seq(&utf16("ab]]x]]>"), b"]]>"), Some(5));
        assert_eq!(u16::find_seq(&utf16("abc"), b"?>"), None);
    }

    #[test]
    fn test_ascii_compare() {
        assert!(u16::starts_with_ascii(&utf16("<!--x"), b"<!--"));
        assert!(!u8::starts_with_ascii(b"<!", b"<!--"));
        assert!(u8::eq_ascii(b"amp", b"amp"));
        assert!(!u16::eq_ascii(&utf16("amps"), b"amp"));
    }

    #[test]
    fn test_cast_same_representation_only() {
        let bytes: &[u8] = b"abc";
        assert_eq!(cast::<u8, u8>(bytes), Some(bytes));
        assert!(cast::<u8, u16>(bytes).is_none());
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(u8::encoded_len('é'), 2);
        assert_eq!(u16::encoded_len('é'), 1);
        assert_eq!(u16::encoded_len('😀'), 2);
    }
}
