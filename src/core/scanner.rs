//! Lexical scanning over UTF-8 or UTF-16 input
//!
//! One `Scanner` implementation serves both representations through
//! [`Unit`]. Delimiter searches on byte input go through memchr:
//! - SSE2 (default x86_64)
//! - AVX2 (runtime detection)
//! - NEON (aarch64)
//!
//! Primitives consume input only on success. A failed primitive leaves the
//! position where it was, so callers can try an alternative production.

use super::chars::{is_name_char, is_name_start_char, is_pubid_char, is_whitespace};
use super::entities::reference_len_unresolved;
use super::scalar::Decoded;
use super::unit::Unit;

/// A quoted attribute value as it appears in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttValue<'a, U> {
    /// Content between the quotes
    pub raw: &'a [U],
    /// No references and no raw tab/CR/LF inside
    pub unchanged: bool,
}

/// Scanner for XML productions
pub struct Scanner<'a, U: Unit> {
    input: &'a [U],
    pos: usize,
    /// First offset where a malformed sequence stopped a primitive
    fault: Option<usize>,
}

impl<'a, U: Unit> Scanner<'a, U> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a [U]) -> Self {
        Scanner {
            input,
            pos: 0,
            fault: None,
        }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Get remaining units
    #[inline]
    pub fn remaining(&self) -> &'a [U] {
        &self.input[self.pos..]
    }

    /// Get a slice from start to end positions
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [U] {
        &self.input[start..end]
    }

    /// Peek at the current unit as ASCII, without advancing
    #[inline]
    pub fn peek_ascii(&self) -> Option<u8> {
        self.input.get(self.pos).and_then(|u| u.to_ascii())
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Check if input starts with an ASCII literal at current position
    #[inline]
    pub fn starts_with(&self, lit: &[u8]) -> bool {
        U::starts_with_ascii(self.remaining(), lit)
    }

    /// Consume an ASCII literal if present
    #[inline]
    pub fn eat(&mut self, lit: &[u8]) -> bool {
        if self.starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }

    /// Offset of a malformed sequence met by the last failed primitive
    #[inline]
    pub fn fault(&self) -> Option<usize> {
        self.fault
    }

    #[inline]
    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    #[inline]
    fn record_fault(&mut self, at: usize) {
        self.fault.get_or_insert(at);
    }

    /// Decode the scalar at an absolute offset
    fn decode_at(&mut self, at: usize) -> Option<(char, usize)> {
        match U::decode(&self.input[at..]) {
            Decoded::Done(c, len) => Some((c, len)),
            Decoded::Incomplete if at >= self.input.len() => None,
            _ => {
                self.record_fault(at);
                None
            }
        }
    }

    /// Skip whitespace characters (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) -> usize {
        let n = whitespace_len(self.remaining());
        self.pos += n;
        n
    }

    /// Whitespace that must be present
    #[inline]
    pub fn skip_whitespace1(&mut self) -> Option<usize> {
        match self.skip_whitespace() {
            0 => None,
            n => Some(n),
        }
    }

    /// Find next occurrence of an ASCII unit, as an absolute position
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        U::find(self.remaining(), needle).map(|i| self.pos + i)
    }

    /// Read until an ASCII sequence, returning the content and advancing past the sequence
    pub fn read_until(&mut self, closer: &[u8]) -> Option<&'a [U]> {
        let start = self.pos;
        let end = start + U::find_seq(&self.input[start..], closer)?;
        self.pos = end + closer.len();
        Some(&self.input[start..end])
    }

    /// Read an XML Name
    pub fn read_name(&mut self) -> Option<&'a [U]> {
        let start = self.pos;
        match scan_name(&self.input[start..]) {
            Ok(len) => {
                self.pos += len;
                Some(&self.input[start..start + len])
            }
            Err(fault) => {
                if let Some(offset) = fault {
                    self.record_fault(start + offset);
                }
                None
            }
        }
    }

    /// Eq ::= S? '=' S?
    pub fn read_eq(&mut self) -> bool {
        let start = self.pos;
        self.skip_whitespace();
        if self.eat(b"=") {
            self.skip_whitespace();
            true
        } else {
            self.pos = start;
            false
        }
    }

    /// Opening quote, returning the quote byte
    #[inline]
    fn open_quote(&self) -> Option<u8> {
        self.peek_ascii().filter(|&q| q == b'"' || q == b'\'')
    }

    /// SystemLiteral ::= ('"' [^"]* '"') | ("'" [^']* "'")
    pub fn read_system_literal(&mut self) -> Option<&'a [U]> {
        let quote = self.open_quote()?;
        let start = self.pos + 1;
        let len = U::find(&self.input[start..], quote)?;
        self.pos = start + len + 1;
        Some(&self.input[start..start + len])
    }

    /// PubidLiteral ::= '"' PubidChar* '"' | "'" (PubidChar - "'")* "'"
    pub fn read_pubid_literal(&mut self) -> Option<&'a [U]> {
        let quote = self.open_quote()?;
        let start = self.pos + 1;
        let mut i = start;
        loop {
            if self.input.get(i)?.is(quote) {
                break;
            }
            let (c, len) = self.decode_at(i)?;
            if !is_pubid_char(c) {
                return None;
            }
            i += len;
        }
        self.pos = i + 1;
        Some(&self.input[start..i])
    }

    /// AttValue without resolving references
    ///
    /// References are checked for shape only; `unchanged` is cleared by any
    /// reference or raw tab/CR/LF.
    pub fn read_att_value(&mut self) -> Option<AttValue<'a, U>> {
        let quote = self.open_quote()?;
        let start = self.pos + 1;
        let mut i = start;
        let mut unchanged = true;
        loop {
            let unit = *self.input.get(i)?;
            match unit.to_ascii() {
                Some(q) if q == quote => break,
                Some(b'<') => return None,
                Some(b'&') => {
                    i += reference_len_unresolved(&self.input[i..])?;
                    unchanged = false;
                }
                Some(b'\t' | b'\n' | b'\r') => {
                    i += 1;
                    unchanged = false;
                }
                _ => i += 1,
            }
        }
        self.pos = i + 1;
        Some(AttValue {
            raw: &self.input[start..i],
            unchanged,
        })
    }

    /// Digits in the given radix, at least one
    pub fn read_digits(&mut self, radix: u32) -> Option<&'a [U]> {
        let start = self.pos;
        let len = digits_len(&self.input[start..], radix);
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&self.input[start..start + len])
    }
}

/// Count of leading XML whitespace units
#[inline]
pub fn whitespace_len<U: Unit>(src: &[U]) -> usize {
    src.iter()
        .take_while(|u| u.to_ascii().is_some_and(is_whitespace))
        .count()
}

#[inline]
pub fn is_whitespace_unit<U: Unit>(u: U) -> bool {
    u.to_ascii().is_some_and(is_whitespace)
}

/// Length of the Name at the head of `src`.
///
/// `Err(Some(offset))` means a malformed sequence at `offset` ended the scan,
/// `Err(None)` that there is no name.
pub fn scan_name<U: Unit>(src: &[U]) -> Result<usize, Option<usize>> {
    let mut len = match U::decode(src) {
        Decoded::Done(c, n) if is_name_start_char(c) => n,
        Decoded::Done(..) => return Err(None),
        Decoded::Incomplete if src.is_empty() => return Err(None),
        _ => return Err(Some(0)),
    };
    loop {
        match U::decode(&src[len..]) {
            Decoded::Done(c, n) if is_name_char(c) => len += n,
            Decoded::Done(..) => return Ok(len),
            Decoded::Incomplete if len == src.len() => return Ok(len),
            _ => return Err(Some(len)),
        }
    }
}

#[inline]
pub fn name_len<U: Unit>(src: &[U]) -> Option<usize> {
    scan_name(src).ok()
}

#[inline]
pub fn digits_len<U: Unit>(src: &[U], radix: u32) -> usize {
    src.iter()
        .take_while(|u| u.to_ascii().is_some_and(|b| (b as char).is_digit(radix)))
        .count()
}

/// Parse a non-empty run of ASCII digits, failing on overflow
pub fn parse_digits<U: Unit>(digits: &[U], radix: u32) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0u32, |acc, u| {
        let d = (u.to_ascii()? as char).to_digit(radix)?;
        acc.checked_mul(radix)?.checked_add(d)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new(&b"element-name>"[..]);
        assert_eq!(scanner.read_name(), Some(&b"element-name"[..]));
        assert_eq!(scanner.position(), 12);
    }

    #[test]
    fn test_read_name_unicode_utf16() {
        let input = wide("名前=1");
        let mut scanner = Scanner::new(&input[..]);
        assert_eq!(scanner.read_name().map(|n| n.len()), Some(2));
        assert!(scanner.read_eq());
        assert_eq!(scanner.position(), 3);
    }

    #[test]
    fn test_read_name_rejects_digit_start() {
        let mut scanner = Scanner::new(&b"1abc"[..]);
        assert_eq!(scanner.read_name(), None);
        assert_eq!(scanner.position(), 0);
        assert_eq!(scanner.fault(), None);
    }

    #[test]
    fn test_read_name_reports_fault() {
        let mut scanner = Scanner::new(&[b'a', 0xFF, b'>'][..]);
        assert_eq!(scanner.read_name(), None);
        assert_eq!(scanner.fault(), Some(1));
    }

    #[test]
    fn test_skip_whitespace() {
        let mut scanner = Scanner::new(&b"  \t\n hello"[..]);
        assert_eq!(scanner.skip_whitespace(), 5);
        assert_eq!(scanner.skip_whitespace1(), None);
    }

    #[test]
    fn test_read_eq() {
        let mut scanner = Scanner::new(&b" = 'v'"[..]);
        assert!(scanner.read_eq());
        assert_eq!(scanner.position(), 3);

        let mut scanner = Scanner::new(&b" x"[..]);
        assert!(!scanner.read_eq());
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_att_value_unchanged() {
        let mut scanner = Scanner::new(&b"\"plain value\" rest"[..]);
        let value = scanner.read_att_value().unwrap();
        assert_eq!(value.raw, b"plain value");
        assert!(value.unchanged);
        assert_eq!(scanner.position(), 13);
    }

    #[test]
    fn test_att_value_with_reference() {
        let mut scanner = Scanner::new(&b"'1&amp;2'"[..]);
        let value = scanner.read_att_value().unwrap();
        assert_eq!(value.raw, b"1&amp;2");
        assert!(!value.unchanged);
    }

    #[test]
    fn test_att_value_rejects_lt_and_bad_reference() {
        assert!(Scanner::new(&b"\"a<b\""[..]).read_att_value().is_none());
        assert!(Scanner::new(&b"\"a&b\""[..]).read_att_value().is_none());
        assert!(Scanner::new(&b"\"a&#xZZ;\""[..]).read_att_value().is_none());
        assert!(Scanner::new(&b"\"unterminated"[..]).read_att_value().is_none());
    }

    #[test]
    fn test_att_value_tab_marks_changed() {
        let mut scanner = Scanner::new(&b"\"a\tb\""[..]);
        assert!(!scanner.read_att_value().unwrap().unchanged);
    }

    #[test]
    fn test_literals() {
        let mut scanner = Scanner::new(&b"'say \"hi\"'"[..]);
        assert_eq!(scanner.read_system_literal(), Some(&b"say \"hi\""[..]));

        let mut scanner = Scanner::new(&b"\"-//W3C//DTD XHTML 1.0//EN\""[..]);
        assert_eq!(
            scanner.read_pubid_literal(),
            Some(&b"-//W3C//DTD XHTML 1.0//EN"[..])
        );

        let mut scanner = Scanner::new(&b"\"tab\tnot allowed\""[..]);
        assert_eq!(scanner.read_pubid_literal(), None);
        assert_eq!(scanner.position(), 0);
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits(b"1234", 10), Some(1234));
        assert_eq!(parse_digits(b"1F600", 16), Some(0x1F600));
        assert_eq!(parse_digits(b"99999999999", 10), None);
        assert_eq!(parse_digits::<u8>(b"", 10), None);
    }

    #[test]
    fn test_read_until() {
        let mut scanner = Scanner::new(&b" c -->tail"[..]);
        assert_eq!(scanner.read_until(b"-->"), Some(&b" c "[..]));
        assert_eq!(scanner.remaining(), b"tail");
    }
}
