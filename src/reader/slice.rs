//! Zero-copy pull reader over an in-memory slice
//!
//! One algorithm for both representations: `Utf8Reader` walks bytes,
//! `Utf16Reader` walks UTF-16 code units. Each `advance` consumes exactly
//! one token. Payloads stay unresolved until an accessor asks for them.

use std::borrow::Cow;

use super::prolog::{read_doctype_decl, read_xml_decl};
use super::records::{Attribute, DocTypeDecl, NameValue, XmlDecl};
use super::token::{TokenKind, TokenStatus};
use crate::core::encoding::strip_bom;
use crate::core::entities::{EntityLookup, PredefinedEntities};
use crate::core::normalize::{check_encoding, normalize, normalize_to_string, Whitespace};
use crate::core::scanner::{is_whitespace_unit, Scanner};
use crate::core::unit::{valid_up_to, Unit};
use crate::error::{Construct, Error, Result};

/// Reader configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    check_end_tag_names: bool,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require each end tag to name the element it closes.
    ///
    /// Off by default: only nesting depth is tracked.
    pub fn check_end_tag_names(mut self, enabled: bool) -> Self {
        self.check_end_tag_names = enabled;
        self
    }
}

/// Forward-only XML tokenizer
pub struct SliceReader<'a, U: Unit> {
    scanner: Scanner<'a, U>,
    options: ReaderOptions,
    token: TokenKind,
    status: TokenStatus,
    depth: usize,
    decl_seen: bool,
    doctype_seen: bool,
    failed: bool,
    /// Tag name, attribute name or PI target of the current token
    name: &'a [U],
    /// Attribute value, PI body, or comment/text/CDATA content
    value: &'a [U],
    value_unchanged: bool,
    decl: Option<XmlDecl<'a, U>>,
    doctype: Option<DocTypeDecl<'a, U>>,
    /// Open element names, kept only when end tag names are checked
    open: Vec<&'a [U]>,
}

pub type Utf8Reader<'a> = SliceReader<'a, u8>;
pub type Utf16Reader<'a> = SliceReader<'a, u16>;

impl<'a, U: Unit> SliceReader<'a, U> {
    /// Create a reader; a leading byte-order mark is skipped
    pub fn new(input: &'a [U]) -> Self {
        Self::with_options(input, ReaderOptions::default())
    }

    pub fn with_options(input: &'a [U], options: ReaderOptions) -> Self {
        SliceReader {
            scanner: Scanner::new(strip_bom(input)),
            options,
            token: TokenKind::None,
            status: TokenStatus::empty(),
            depth: 0,
            decl_seen: false,
            doctype_seen: false,
            failed: false,
            name: &[],
            value: &[],
            value_unchanged: true,
            decl: None,
            doctype: None,
            open: Vec::new(),
        }
    }

    #[inline]
    pub fn token(&self) -> TokenKind {
        self.token
    }

    #[inline]
    pub fn status(&self) -> TokenStatus {
        self.status
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Units consumed so far, not counting a byte-order mark
    #[inline]
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Move to the next token. `Ok(false)` means the input is exhausted.
    ///
    /// Any error is terminal: later calls fail with `InvalidUse`.
    pub fn advance(&mut self) -> Result<bool> {
        if self.failed {
            return Err(Error::InvalidUse {
                operation: "advance",
                state: "failed reader",
            });
        }
        self.step().inspect_err(|err| {
            self.failed = true;
            log_debug!("{} reader failed: {}", U::ENCODING, err);
        })
    }

    fn step(&mut self) -> Result<bool> {
        self.scanner.clear_fault();
        if self.scanner.is_eof() {
            self.token = TokenKind::None;
            self.status = TokenStatus::empty();
            return Ok(false);
        }

        let mut status = if matches!(self.token, TokenKind::None | TokenKind::StartTagEnd) {
            TokenStatus::FIRST_CHILD
        } else {
            TokenStatus::empty()
        };

        let kind = if self.depth == 0 && !self.decl_seen && self.at_xml_decl() {
            self.read_xml_decl()?
        } else if self.depth == 0 && !self.doctype_seen && self.scanner.starts_with(b"<!DOCTYPE") {
            self.read_doctype()?
        } else if self.token.is_in_start_tag() {
            self.read_in_start_tag()?
        } else {
            self.read_content(&mut status)?
        };

        // the declaration may only open the document, the doctype only precede the root
        self.decl_seen = true;
        if kind == TokenKind::StartTagStart {
            self.doctype_seen = true;
        }
        if self.scanner.starts_with(b"</") {
            status |= TokenStatus::LAST_CHILD;
        }

        self.token = kind;
        self.status = status;
        log_trace!(
            "token {} depth={} position={}",
            kind.as_str(),
            self.depth,
            self.scanner.position()
        );
        Ok(true)
    }

    fn at_xml_decl(&self) -> bool {
        let rest = self.scanner.remaining();
        U::starts_with_ascii(rest, b"<?xml") && rest.get(5).is_some_and(|&u| is_whitespace_unit(u))
    }

    /// Error for a construct that failed to scan at the current position
    fn fail(&self, construct: Construct) -> Error {
        match self.scanner.fault() {
            Some(position) => Error::Encoding { position },
            None => Error::grammar(construct, self.scanner.position()),
        }
    }

    fn read_xml_decl(&mut self) -> Result<TokenKind> {
        self.decl_seen = true;
        let decl = read_xml_decl(&mut self.scanner).ok_or_else(|| self.fail(Construct::XmlDecl))?;
        self.decl = Some(decl);
        Ok(TokenKind::XmlDecl)
    }

    fn read_doctype(&mut self) -> Result<TokenKind> {
        self.doctype_seen = true;
        let doctype =
            read_doctype_decl(&mut self.scanner).ok_or_else(|| self.fail(Construct::DocTypeDecl))?;
        self.doctype = Some(doctype);
        Ok(TokenKind::DocTypeDecl)
    }

    /// Attributes and the terminator of an open start tag
    fn read_in_start_tag(&mut self) -> Result<TokenKind> {
        let ws = self.scanner.skip_whitespace();
        if self.scanner.eat(b"/>") {
            self.close_element();
            return Ok(TokenKind::EmptyTag);
        }
        if self.scanner.eat(b">") {
            return Ok(TokenKind::StartTagEnd);
        }
        if ws == 0 {
            return Err(self.fail(Construct::StartTagEnd));
        }

        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.fail(Construct::Attribute))?;
        if !self.scanner.read_eq() {
            return Err(self.fail(Construct::Attribute));
        }
        let value = self
            .scanner
            .read_att_value()
            .ok_or_else(|| self.fail(Construct::Attribute))?;

        self.name = name;
        self.value = value.raw;
        self.value_unchanged = value.unchanged;
        Ok(TokenKind::Attribute)
    }

    fn read_content(&mut self, status: &mut TokenStatus) -> Result<TokenKind> {
        if !self.scanner.starts_with(b"<") {
            return self.read_text(status);
        }

        if self.scanner.eat(b"<!--") {
            self.value = self
                .scanner
                .read_until(b"-->")
                .ok_or_else(|| self.fail(Construct::Comment))?;
            return Ok(TokenKind::Comment);
        }

        if self.scanner.eat(b"<![CDATA[") {
            self.value = self
                .scanner
                .read_until(b"]]>")
                .ok_or_else(|| self.fail(Construct::CData))?;
            return Ok(TokenKind::CData);
        }

        if self.scanner.eat(b"<?") {
            return self.read_processing_instruction();
        }

        if self.scanner.eat(b"</") {
            return self.read_end_tag();
        }

        self.scanner.advance(1);
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.fail(Construct::StartTagStart))?;
        self.name = name;
        self.depth += 1;
        if self.options.check_end_tag_names {
            self.open.push(name);
        }
        Ok(TokenKind::StartTagStart)
    }

    /// PI ::= '<?' PITarget (S body)? '?>'
    fn read_processing_instruction(&mut self) -> Result<TokenKind> {
        let target = self
            .scanner
            .read_name()
            .ok_or_else(|| self.fail(Construct::ProcessingInstruction))?;
        let here = self.scanner.position();
        let body = if self.scanner.eat(b"?>") {
            self.scanner.slice(here, here)
        } else {
            self.scanner
                .skip_whitespace1()
                .ok_or_else(|| self.fail(Construct::ProcessingInstruction))?;
            self.scanner
                .read_until(b"?>")
                .ok_or_else(|| self.fail(Construct::ProcessingInstruction))?
        };
        self.name = target;
        self.value = body;
        Ok(TokenKind::ProcessingInstruction)
    }

    /// ETag ::= '</' Name S? '>'
    fn read_end_tag(&mut self) -> Result<TokenKind> {
        let start = self.scanner.position() - 2;
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| self.fail(Construct::EndTag))?;
        self.scanner.skip_whitespace();
        if !self.scanner.eat(b">") {
            return Err(self.fail(Construct::EndTag));
        }
        if self.depth == 0 {
            return Err(Error::grammar(Construct::EndTag, start));
        }
        if self.options.check_end_tag_names && self.open.last() != Some(&name) {
            return Err(Error::grammar(Construct::EndTag, start));
        }
        self.close_element();
        self.name = name;
        Ok(TokenKind::EndTag)
    }

    fn close_element(&mut self) {
        self.depth -= 1;
        if self.options.check_end_tag_names {
            self.open.pop();
        }
    }

    fn read_text(&mut self, status: &mut TokenStatus) -> Result<TokenKind> {
        let start = self.scanner.position();
        match self.scanner.find(b'<') {
            Some(end) => {
                self.value = self.scanner.slice(start, end);
                self.scanner.set_position(end);
            }
            None if self.depth == 0 => {
                // trailing content after the root element
                self.value = self.scanner.remaining();
                self.scanner.advance(self.value.len());
                *status |= TokenStatus::LAST_CHILD;
            }
            None => return Err(Error::grammar(Construct::Text, start)),
        }
        Ok(TokenKind::Text)
    }

    fn expect(&self, operation: &'static str, kinds: &[TokenKind]) -> Result<()> {
        if kinds.contains(&self.token) {
            Ok(())
        } else {
            log_debug!("{} called on {} token", operation, self.token.as_str());
            Err(Error::InvalidUse {
                operation,
                state: self.token.as_str(),
            })
        }
    }

    pub fn xml_decl(&self) -> Result<XmlDecl<'a, U>> {
        self.expect("xml_decl", &[TokenKind::XmlDecl])?;
        self.decl.ok_or(Error::InvalidUse {
            operation: "xml_decl",
            state: TokenKind::None.as_str(),
        })
    }

    pub fn doctype_decl(&self) -> Result<DocTypeDecl<'a, U>> {
        self.expect("doctype_decl", &[TokenKind::DocTypeDecl])?;
        self.doctype.ok_or(Error::InvalidUse {
            operation: "doctype_decl",
            state: TokenKind::None.as_str(),
        })
    }

    /// Target and body of a PI, or name and unresolved value of an attribute
    pub fn raw_name_value(&self) -> Result<NameValue<'a, U>> {
        self.expect(
            "raw_name_value",
            &[TokenKind::ProcessingInstruction, TokenKind::Attribute],
        )?;
        Ok(NameValue::new(self.name, self.value))
    }

    /// Content of a comment, text or CDATA token, or the name of a tag
    pub fn raw_span(&self) -> Result<&'a [U]> {
        self.expect(
            "raw_span",
            &[
                TokenKind::Comment,
                TokenKind::Text,
                TokenKind::CData,
                TokenKind::StartTagStart,
                TokenKind::EndTag,
            ],
        )?;
        Ok(match self.token {
            TokenKind::StartTagStart | TokenKind::EndTag => self.name,
            _ => self.value,
        })
    }

    /// The current span with text references resolved.
    ///
    /// Text is normalized with the CDATA whitespace rule (each tab, CR or LF
    /// becomes a space); other spans are returned as they are.
    pub fn resolved(&self) -> Result<Cow<'a, [U]>> {
        self.resolved_with(&PredefinedEntities, Whitespace::Replace)
    }

    pub fn resolved_with<L: EntityLookup<U> + ?Sized>(
        &self,
        lookup: &L,
        mode: Whitespace,
    ) -> Result<Cow<'a, [U]>> {
        let span = self.raw_span()?;
        if self.token == TokenKind::Text {
            normalize(span, mode, lookup)
        } else {
            check_encoding(span)?;
            Ok(Cow::Borrowed(span))
        }
    }

    /// Like [`resolved`](Self::resolved), as a string
    pub fn resolved_str(&self) -> Result<Cow<'a, str>> {
        self.resolved_str_with(&PredefinedEntities, Whitespace::Replace)
    }

    pub fn resolved_str_with<L: EntityLookup<U> + ?Sized>(
        &self,
        lookup: &L,
        mode: Whitespace,
    ) -> Result<Cow<'a, str>> {
        let span = self.raw_span()?;
        if self.token == TokenKind::Text {
            normalize_to_string(span, mode, lookup)
        } else {
            U::to_str(span).ok_or_else(|| Error::Encoding {
                position: valid_up_to(span),
            })
        }
    }

    /// The current attribute with its value normalized.
    ///
    /// `is_cdata` selects the CDATA whitespace rule; otherwise whitespace is
    /// trimmed and collapsed.
    pub fn attribute(&self, is_cdata: bool) -> Result<Attribute<'a, U>> {
        self.attribute_with(is_cdata, &PredefinedEntities)
    }

    pub fn attribute_with<L: EntityLookup<U> + ?Sized>(
        &self,
        is_cdata: bool,
        lookup: &L,
    ) -> Result<Attribute<'a, U>> {
        self.expect("attribute", &[TokenKind::Attribute])?;
        let value = if self.value_unchanged && is_cdata {
            check_encoding(self.value)?;
            Cow::Borrowed(self.value)
        } else {
            normalize(self.value, Whitespace::for_attribute(is_cdata), lookup)?
        };
        Ok(Attribute {
            name: self.name,
            value,
        })
    }
}

impl<'a, U: Unit> Iterator for SliceReader<'a, U> {
    type Item = Result<TokenKind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.advance() {
            Ok(true) => Some(Ok(self.token)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
