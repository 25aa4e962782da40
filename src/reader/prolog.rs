//! Prolog productions: XMLDecl and doctypedecl
//!
//! Both functions leave the scanner where scanning stopped when they fail,
//! so the caller can report how far the construct got.

use super::records::{DocTypeDecl, ExternalId, XmlDecl, XmlVersion};
use crate::core::chars::{is_enc_name_end, is_enc_name_middle, is_enc_name_start};
use crate::core::scanner::{parse_digits, Scanner};
use crate::core::unit::Unit;

/// XMLDecl ::= '<?xml' VersionInfo EncodingDecl? SDDecl? S? '?>'
pub fn read_xml_decl<'a, U: Unit>(s: &mut Scanner<'a, U>) -> Option<XmlDecl<'a, U>> {
    if !s.eat(b"<?xml") {
        return None;
    }
    let version = read_version_info(s)?;
    let encoding = read_pseudo_attribute(s, b"encoding", read_enc_name)?;
    let standalone = read_pseudo_attribute(s, b"standalone", read_yes_no)?;
    s.skip_whitespace();
    if !s.eat(b"?>") {
        return None;
    }
    Some(XmlDecl {
        version,
        encoding,
        standalone,
    })
}

/// VersionInfo ::= S 'version' Eq ("'" VersionNum "'" | '"' VersionNum '"')
fn read_version_info<U: Unit>(s: &mut Scanner<'_, U>) -> Option<XmlVersion> {
    s.skip_whitespace1()?;
    if !s.eat(b"version") || !s.read_eq() {
        return None;
    }
    let quote = open_quote(s)?;
    if !s.eat(b"1.") {
        return None;
    }
    let minor = parse_digits(s.read_digits(10)?, 10)?;
    close_quote(s, quote)?;
    Some(XmlVersion { minor })
}

/// S keyword Eq quoted-value, absent when the keyword does not follow.
///
/// Outer `None` is a failure, inner `None` an absent pseudo-attribute.
fn read_pseudo_attribute<'a, U: Unit, T>(
    s: &mut Scanner<'a, U>,
    keyword: &[u8],
    value: fn(&mut Scanner<'a, U>, u8) -> Option<T>,
) -> Option<Option<T>> {
    let start = s.position();
    if s.skip_whitespace() == 0 || !s.eat(keyword) {
        s.set_position(start);
        return Some(None);
    }
    if !s.read_eq() {
        return None;
    }
    let quote = open_quote(s)?;
    let parsed = value(s, quote)?;
    close_quote(s, quote)?;
    Some(Some(parsed))
}

/// EncName ::= [A-Za-z] ([A-Za-z0-9._] | '-')*, with no trailing '-'
fn read_enc_name<'a, U: Unit>(s: &mut Scanner<'a, U>, quote: u8) -> Option<&'a [U]> {
    let start = s.position();
    let end = s.find(quote)?;
    let name = s.slice(start, end);
    let (&first, rest) = name.split_first()?;
    if !is_enc_name_start(first.to_ascii()?) {
        return None;
    }
    if let Some((&last, middle)) = rest.split_last() {
        if !middle.iter().all(|u| u.to_ascii().is_some_and(is_enc_name_middle)) {
            return None;
        }
        if !is_enc_name_end(last.to_ascii()?) {
            return None;
        }
    }
    s.set_position(end);
    Some(name)
}

fn read_yes_no<U: Unit>(s: &mut Scanner<'_, U>, _quote: u8) -> Option<bool> {
    if s.eat(b"yes") {
        Some(true)
    } else if s.eat(b"no") {
        Some(false)
    } else {
        None
    }
}

fn open_quote<U: Unit>(s: &mut Scanner<'_, U>) -> Option<u8> {
    let quote = s.peek_ascii().filter(|&q| q == b'"' || q == b'\'')?;
    s.advance(1);
    Some(quote)
}

fn close_quote<U: Unit>(s: &mut Scanner<'_, U>, quote: u8) -> Option<()> {
    s.eat(&[quote]).then_some(())
}

/// doctypedecl ::= '<!DOCTYPE' S Name (S ExternalID)? S? '>'
///
/// An internal subset ('[' ... ']') is not supported and fails.
pub fn read_doctype_decl<'a, U: Unit>(s: &mut Scanner<'a, U>) -> Option<DocTypeDecl<'a, U>> {
    if !s.eat(b"<!DOCTYPE") {
        return None;
    }
    s.skip_whitespace1()?;
    let name = s.read_name()?;
    let mut external_id = None;
    if s.skip_whitespace() > 0 {
        if s.eat(b"SYSTEM") {
            s.skip_whitespace1()?;
            let system = s.read_system_literal()?;
            external_id = Some(ExternalId::System { system });
        } else if s.eat(b"PUBLIC") {
            s.skip_whitespace1()?;
            let public = s.read_pubid_literal()?;
            s.skip_whitespace1()?;
            let system = s.read_system_literal()?;
            external_id = Some(ExternalId::Public { public, system });
        }
        s.skip_whitespace();
    }
    if !s.eat(b">") {
        return None;
    }
    Some(DocTypeDecl { name, external_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(input: &str) -> Option<XmlDecl<'_, u8>> {
        read_xml_decl(&mut Scanner::new(input.as_bytes()))
    }

    fn doctype(input: &str) -> Option<DocTypeDecl<'_, u8>> {
        read_doctype_decl(&mut Scanner::new(input.as_bytes()))
    }

    #[test]
    fn test_minimal_decl() {
        let d = decl("<?xml version=\"1.0\"?>").unwrap();
        assert_eq!(d.version, XmlVersion::V1_0);
        assert_eq!(d.encoding, None);
        assert_eq!(d.standalone, None);
    }

    #[test]
    fn test_full_decl() {
        let d = decl("<?xml version='1.1' encoding=\"UTF-8\" standalone='no' ?>").unwrap();
        assert_eq!(d.version, XmlVersion::V1_1);
        assert_eq!(d.encoding, Some(&b"UTF-8"[..]));
        assert_eq!(d.standalone, Some(false));
    }

    #[test]
    fn test_standalone_without_encoding() {
        let d = decl("<?xml version=\"1.0\" standalone=\"yes\"?>").unwrap();
        assert_eq!(d.encoding, None);
        assert_eq!(d.standalone, Some(true));
    }

    #[test]
    fn test_bad_decls() {
        assert!(decl("<?xml version=\"2.0\"?>").is_none());
        assert!(decl("<?xml version=\"1.0'?>").is_none());
        assert!(decl("<?xml encoding=\"UTF-8\"?>").is_none());
        assert!(decl("<?xml version=\"1.0\" encoding=\"8bit\"?>").is_none());
        assert!(decl("<?xml version=\"1.0\" encoding=\"utf-\"?>").is_none());
        assert!(decl("<?xml version=\"1.0\" standalone=\"maybe\"?>").is_none());
        assert!(decl("<?xml version=\"1.0\" unknown=\"x\"?>").is_none());
    }

    #[test]
    fn test_doctype_plain() {
        let d = doctype("<!DOCTYPE html>").unwrap();
        assert_eq!(d.name, b"html");
        assert!(d.external_id.is_none());
    }

    #[test]
    fn test_doctype_system_and_public() {
        let d = doctype("<!DOCTYPE note SYSTEM \"note.dtd\">").unwrap();
        assert_eq!(d.external_id, Some(ExternalId::System { system: &b"note.dtd"[..] }));

        let d = doctype(
            "<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" 'xhtml1-strict.dtd' >",
        )
        .unwrap();
        assert_eq!(
            d.external_id,
            Some(ExternalId::Public {
                public: &b"-//W3C//DTD XHTML 1.0 Strict//EN"[..],
                system: &b"xhtml1-strict.dtd"[..],
            })
        );
    }

    #[test]
    fn test_doctype_internal_subset_rejected() {
        assert!(doctype("<!DOCTYPE note [<!ELEMENT note ANY>]>").is_none());
        assert!(doctype("<!DOCTYPE note SYSTEM \"n.dtd\" [ ]>").is_none());
    }
}
