//! Incremental XML writer
//!
//! `Writer` tracks the last token written and the element depth, and
//! refuses calls that would produce a malformed token order. Attribute and
//! start-tag-end writes are legal only right after a start tag start or an
//! attribute; every other write is illegal there. Legality is checked before
//! anything reaches the sink, and state only moves after a successful write.
//!
//! Input can come in either representation. Data whose representation
//! differs from the sink's is re-encoded scalar by scalar.

pub mod escape;
pub mod sink;

use crate::core::unit::Unit;
use crate::error::{Error, Result};
use crate::reader::{DocTypeDecl, ExternalId, NameValue, TokenKind, XmlDecl};
use escape::{format_decimal, write_escaped, write_raw, Context};

pub use sink::{Sink, SliceSink, StreamSink, TextSink};

pub struct Writer<S: Sink> {
    sink: S,
    last: TokenKind,
    depth: usize,
}

impl<S: Sink> Writer<S> {
    pub fn new(sink: S) -> Self {
        Writer {
            sink,
            last: TokenKind::None,
            depth: 0,
        }
    }

    #[inline]
    pub fn last_token(&self) -> TokenKind {
        self.last
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    fn misuse(&self, operation: &'static str) -> Error {
        log_debug!("{} rejected after {}", operation, self.last.as_str());
        Error::InvalidUse {
            operation,
            state: self.last.as_str(),
        }
    }

    /// Fail if a start tag is still open
    fn require_closed_tag(&self, operation: &'static str) -> Result<()> {
        if self.last.is_in_start_tag() {
            Err(self.misuse(operation))
        } else {
            Ok(())
        }
    }

    fn require_open_tag(&self, operation: &'static str) -> Result<()> {
        if self.last.is_in_start_tag() {
            Ok(())
        } else {
            Err(self.misuse(operation))
        }
    }

    pub fn write_xml_decl<V: Unit>(&mut self, decl: &XmlDecl<'_, V>) -> Result<()> {
        self.require_closed_tag("write_xml_decl")?;
        let mut digits = [0u8; 10];
        self.sink.commit_ascii(b"<?xml version=\"1.")?;
        self.sink
            .commit_ascii(format_decimal(decl.version.minor, &mut digits))?;
        self.sink.commit_ascii(b"\"")?;
        if let Some(encoding) = decl.encoding.filter(|e| !e.is_empty()) {
            self.sink.commit_ascii(b" encoding=\"")?;
            write_raw(&mut self.sink, encoding)?;
            self.sink.commit_ascii(b"\"")?;
        }
        match decl.standalone {
            Some(true) => self.sink.commit_ascii(b" standalone=\"yes\"")?,
            Some(false) => self.sink.commit_ascii(b" standalone=\"no\"")?,
            None => {}
        }
        self.sink.commit_ascii(b"?>")?;
        self.last = TokenKind::XmlDecl;
        Ok(())
    }

    pub fn write_doctype_decl<V: Unit>(&mut self, decl: &DocTypeDecl<'_, V>) -> Result<()> {
        self.require_closed_tag("write_doctype_decl")?;
        self.sink.commit_ascii(b"<!DOCTYPE ")?;
        write_raw(&mut self.sink, decl.name)?;
        if let Some(external_id) = decl.external_id {
            let system = match external_id {
                ExternalId::System { system } => {
                    self.sink.commit_ascii(b" SYSTEM")?;
                    system
                }
                ExternalId::Public { public, system } => {
                    self.sink.commit_ascii(b" PUBLIC \"")?;
                    write_raw(&mut self.sink, public)?;
                    self.sink.commit_ascii(b"\"")?;
                    system
                }
            };
            // a system literal cannot contain its own quote
            let quote: &[u8] = if system.iter().any(|u| u.is(b'"')) {
                b"'"
            } else {
                b"\""
            };
            self.sink.commit_ascii(b" ")?;
            self.sink.commit_ascii(quote)?;
            write_raw(&mut self.sink, system)?;
            self.sink.commit_ascii(quote)?;
        }
        self.sink.commit_ascii(b">")?;
        self.last = TokenKind::DocTypeDecl;
        Ok(())
    }

    pub fn write_processing_instruction<V: Unit>(&mut self, pi: NameValue<'_, V>) -> Result<()> {
        self.require_closed_tag("write_processing_instruction")?;
        self.sink.commit_ascii(b"<?")?;
        write_raw(&mut self.sink, pi.name)?;
        if !pi.value.is_empty() {
            self.sink.commit_ascii(b" ")?;
            write_raw(&mut self.sink, pi.value)?;
        }
        self.sink.commit_ascii(b"?>")?;
        self.last = TokenKind::ProcessingInstruction;
        Ok(())
    }

    pub fn write_comment<V: Unit>(&mut self, content: &[V]) -> Result<()> {
        self.require_closed_tag("write_comment")?;
        self.sink.commit_ascii(b"<!--")?;
        write_raw(&mut self.sink, content)?;
        self.sink.commit_ascii(b"-->")?;
        self.last = TokenKind::Comment;
        Ok(())
    }

    /// Escaped character data, or a verbatim CDATA section.
    ///
    /// CDATA content must not contain `]]>`; it is not checked.
    pub fn write_text<V: Unit>(&mut self, content: &[V], as_cdata: bool) -> Result<()> {
        self.require_closed_tag("write_text")?;
        if as_cdata {
            self.sink.commit_ascii(b"<![CDATA[")?;
            write_raw(&mut self.sink, content)?;
            self.sink.commit_ascii(b"]]>")?;
            self.last = TokenKind::CData;
        } else {
            write_escaped(&mut self.sink, content, Context::Text)?;
            self.last = TokenKind::Text;
        }
        Ok(())
    }

    pub fn write_start_tag_start<V: Unit>(&mut self, name: &[V]) -> Result<()> {
        self.require_closed_tag("write_start_tag_start")?;
        self.sink.commit_ascii(b"<")?;
        write_raw(&mut self.sink, name)?;
        self.last = TokenKind::StartTagStart;
        self.depth += 1;
        Ok(())
    }

    pub fn write_attribute<V: Unit>(&mut self, attribute: NameValue<'_, V>) -> Result<()> {
        self.require_open_tag("write_attribute")?;
        self.sink.commit_ascii(b" ")?;
        write_raw(&mut self.sink, attribute.name)?;
        self.sink.commit_ascii(b"=\"")?;
        write_escaped(&mut self.sink, attribute.value, Context::Attribute)?;
        self.sink.commit_ascii(b"\"")?;
        self.last = TokenKind::Attribute;
        Ok(())
    }

    pub fn write_start_tag_end(&mut self, is_empty: bool) -> Result<()> {
        self.require_open_tag("write_start_tag_end")?;
        if is_empty {
            self.sink.commit_ascii(b"/>")?;
            self.last = TokenKind::EmptyTag;
            self.depth -= 1;
        } else {
            self.sink.commit_ascii(b">")?;
            self.last = TokenKind::StartTagEnd;
        }
        Ok(())
    }

    /// Close the innermost element. The name is not checked against it.
    pub fn write_end_tag<V: Unit>(&mut self, name: &[V]) -> Result<()> {
        self.require_closed_tag("write_end_tag")?;
        if self.depth == 0 {
            log_debug!("write_end_tag rejected with no open element");
            return Err(Error::InvalidUse {
                operation: "write_end_tag",
                state: "no open element",
            });
        }
        self.sink.commit_ascii(b"</")?;
        write_raw(&mut self.sink, name)?;
        self.sink.commit_ascii(b">")?;
        self.last = TokenKind::EndTag;
        self.depth -= 1;
        Ok(())
    }

    /// Start tag start followed by attributes; the tag stays open
    pub fn write_start_tag<'v, V, I>(&mut self, name: &[V], attributes: I) -> Result<()>
    where
        V: Unit,
        I: IntoIterator<Item = NameValue<'v, V>>,
    {
        self.write_start_tag_start(name)?;
        for attribute in attributes {
            self.write_attribute(attribute)?;
        }
        Ok(())
    }

    pub fn write_empty_tag<'v, V, I>(&mut self, name: &[V], attributes: I) -> Result<()>
    where
        V: Unit,
        I: IntoIterator<Item = NameValue<'v, V>>,
    {
        self.write_start_tag(name, attributes)?;
        self.write_start_tag_end(true)
    }

    pub fn write_line(&mut self) -> Result<()> {
        self.require_closed_tag("write_line")?;
        self.sink.commit_ascii(b"\n")
    }

    pub fn write_space(&mut self, count: usize) -> Result<()> {
        self.require_closed_tag("write_space")?;
        const SPACES: &[u8; 16] = b"                ";
        let mut left = count;
        while left > 0 {
            let n = left.min(SPACES.len());
            self.sink.commit_ascii(&SPACES[..n])?;
            left -= n;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }
}
