//! XML Entity and Character References
//!
//! Handles:
//! - Predefined entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - Caller-supplied entity tables via [`EntityLookup`]
//!
//! Unknown names are never passed through: every function here either
//! resolves a reference or fails.

use std::collections::HashMap;

use super::scanner::{digits_len, name_len, parse_digits};
use super::unit::Unit;
use crate::error::{Error, Result};

/// Name to replacement-text mapping used while resolving references
pub trait EntityLookup<U: Unit> {
    /// Replacement text for `name` (without '&' and ';'), if known
    fn resolve(&self, name: &[U]) -> Option<&str>;
}

impl<U: Unit, L: EntityLookup<U> + ?Sized> EntityLookup<U> for &L {
    #[inline]
    fn resolve(&self, name: &[U]) -> Option<&str> {
        (**self).resolve(name)
    }
}

/// The five entities every XML processor recognizes
#[derive(Debug, Clone, Copy, Default)]
pub struct PredefinedEntities;

impl<U: Unit> EntityLookup<U> for PredefinedEntities {
    #[inline]
    fn resolve(&self, name: &[U]) -> Option<&str> {
        predefined(name)
    }
}

const PREDEFINED: [(&[u8], &str); 5] = [
    (b"lt", "<"),
    (b"gt", ">"),
    (b"amp", "&"),
    (b"apos", "'"),
    (b"quot", "\""),
];

#[inline]
pub fn predefined<U: Unit>(name: &[U]) -> Option<&'static str> {
    PREDEFINED
        .iter()
        .find(|(n, _)| U::eq_ascii(name, n))
        .map(|&(_, text)| text)
}

/// Predefined entities plus caller-declared ones.
///
/// Replacement text is inserted literally; it is not scanned for further
/// references.
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    custom: HashMap<String, String>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.custom.insert(name.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }
}

impl<U: Unit> EntityLookup<U> for EntityTable {
    fn resolve(&self, name: &[U]) -> Option<&str> {
        if let Some(text) = predefined(name) {
            return Some(text);
        }
        let key = U::to_str(name)?;
        self.custom.get(key.as_ref()).map(String::as_str)
    }
}

/// What a reference stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replacement<'l> {
    Char(char),
    Text(&'l str),
}

impl Replacement<'_> {
    fn encoded_len<U: Unit>(self) -> usize {
        match self {
            Replacement::Char(c) => U::encoded_len(c),
            Replacement::Text(text) => text.chars().map(U::encoded_len).sum(),
        }
    }
}

/// Parse a character reference body; `src` starts just after "&#".
///
/// Returns the scalar and the units consumed, including the ';'.
pub fn parse_char_ref_body<U: Unit>(src: &[U]) -> Option<(char, usize)> {
    let (radix, start) = match src.first() {
        Some(u) if u.is(b'x') => (16, 1),
        _ => (10, 0),
    };
    let end = start + digits_len(&src[start..], radix);
    if end == start || !src.get(end)?.is(b';') {
        return None;
    }
    let value = parse_digits(&src[start..end], radix)?;
    Some((char::from_u32(value)?, end + 1))
}

/// Length of the well-formed reference at the head of `src`, without resolving it.
///
/// `src` must start with '&'. Character references are fully validated;
/// entity references only need a Name followed by ';'.
pub fn reference_len_unresolved<U: Unit>(src: &[U]) -> Option<usize> {
    let body = src.get(1..)?;
    if body.first()?.is(b'#') {
        let (_, len) = parse_char_ref_body(&body[1..])?;
        Some(len + 2)
    } else {
        let len = name_len(body)?;
        body.get(len)?.is(b';').then_some(len + 2)
    }
}

fn resolve_reference<'l, U: Unit, L: EntityLookup<U> + ?Sized>(
    src: &[U],
    lookup: &'l L,
) -> Option<(usize, Replacement<'l>)> {
    let body = src.get(1..)?;
    if body.first()?.is(b'#') {
        let (c, len) = parse_char_ref_body(&body[1..])?;
        return Some((len + 2, Replacement::Char(c)));
    }
    let len = name_len(body)?;
    if !body.get(len)?.is(b';') {
        return None;
    }
    let text = lookup.resolve(&body[..len])?;
    Some((len + 2, Replacement::Text(text)))
}

/// Length probe: units consumed from `src` and units the replacement needs
pub fn reference_len<U: Unit, L: EntityLookup<U> + ?Sized>(
    src: &[U],
    lookup: &L,
) -> Result<(usize, usize)> {
    let (consumed, replacement) =
        resolve_reference(src, lookup).ok_or(Error::Reference { offset: 0 })?;
    Ok((consumed, replacement.encoded_len::<U>()))
}

/// Resolve the reference at the head of `src` into `dst`.
///
/// Returns units consumed and units written.
pub fn write_reference<U: Unit, L: EntityLookup<U> + ?Sized>(
    src: &[U],
    lookup: &L,
    dst: &mut [U],
) -> Result<(usize, usize)> {
    let (consumed, replacement) =
        resolve_reference(src, lookup).ok_or(Error::Reference { offset: 0 })?;
    let needed = replacement.encoded_len::<U>();
    if needed > dst.len() {
        return Err(Error::Capacity {
            needed,
            available: dst.len(),
        });
    }
    let written = match replacement {
        Replacement::Char(c) => encode_into(c, dst),
        Replacement::Text(text) => text
            .chars()
            .fold(0, |at, c| at + encode_into(c, &mut dst[at..])),
    };
    Ok((consumed, written))
}

#[inline]
fn encode_into<U: Unit>(c: char, dst: &mut [U]) -> usize {
    let mut buf = [U::default(); 4];
    let encoded = U::encode(c, &mut buf);
    dst[..encoded.len()].copy_from_slice(encoded);
    encoded.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_predefined() {
        assert_eq!(predefined(&b"lt"[..]), Some("<"));
        assert_eq!(predefined(&wide("quot")[..]), Some("\""));
        assert_eq!(predefined(&b"nbsp"[..]), None);
    }

    #[test]
    fn test_char_ref_body() {
        assert_eq!(parse_char_ref_body(&b"65;"[..]), Some(('A', 3)));
        assert_eq!(parse_char_ref_body(&b"x1F600;"[..]), Some(('😀', 7)));
        assert_eq!(parse_char_ref_body(&b"x;"[..]), None);
        assert_eq!(parse_char_ref_body(&b"65"[..]), None);
        // surrogate code point
        assert_eq!(parse_char_ref_body(&b"xD800;"[..]), None);
        assert_eq!(parse_char_ref_body(&b"x110000;"[..]), None);
    }

    #[test]
    fn test_reference_len_unresolved() {
        assert_eq!(reference_len_unresolved(&b"&amp;rest"[..]), Some(5));
        assert_eq!(reference_len_unresolved(&b"&custom;"[..]), Some(8));
        assert_eq!(reference_len_unresolved(&b"&#x41;"[..]), Some(6));
        assert_eq!(reference_len_unresolved(&b"&amp"[..]), None);
        assert_eq!(reference_len_unresolved(&b"& amp;"[..]), None);
    }

    #[test]
    fn test_reference_len_and_write() {
        let lookup = PredefinedEntities;
        assert_eq!(reference_len(&b"&lt;"[..], &lookup).unwrap(), (4, 1));
        assert_eq!(reference_len(&b"&#xE9;"[..], &lookup).unwrap(), (6, 2));

        let mut dst = [0u8; 4];
        assert_eq!(write_reference(&b"&#xE9;"[..], &lookup, &mut dst).unwrap(), (6, 2));
        assert_eq!(&dst[..2], "é".as_bytes());
    }

    #[test]
    fn test_unknown_entity_fails() {
        let result = reference_len(&b"&unknown;"[..], &PredefinedEntities);
        assert!(matches!(result, Err(Error::Reference { .. })));
    }

    #[test]
    fn test_entity_table() {
        let table = EntityTable::new().with("copy", "©").with("me", "Jane Doe");
        assert_eq!(EntityLookup::<u8>::resolve(&table, b"amp"), Some("&"));
        assert_eq!(EntityLookup::<u8>::resolve(&table, b"copy"), Some("©"));

        let src = wide("&me;");
        let (consumed, produced) = reference_len(&src[..], &table).unwrap();
        assert_eq!((consumed, produced), (4, 8));
        let mut dst = vec![0u16; produced];
        write_reference(&src[..], &table, &mut dst).unwrap();
        assert_eq!(String::from_utf16(&dst).unwrap(), "Jane Doe");
    }

    #[test]
    fn test_write_reference_capacity() {
        let mut dst = [0u8; 1];
        let result = write_reference(&b"&#xE9;"[..], &PredefinedEntities, &mut dst);
        assert!(matches!(result, Err(Error::Capacity { needed: 2, .. })));
    }
}
