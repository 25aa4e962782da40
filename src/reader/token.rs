//! Token kinds and status flags reported by the reader

use bitflags::bitflags;

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Nothing read yet, or input exhausted
    None,
    /// XML declaration: <?xml version="1.0"?>
    XmlDecl,
    /// DOCTYPE declaration without internal subset
    DocTypeDecl,
    /// Processing instruction: <?target data?>
    ProcessingInstruction,
    /// Comment: <!--...-->
    Comment,
    /// '<' and the element name; attributes follow as separate tokens
    StartTagStart,
    /// One name="value" pair inside a start tag, value unresolved
    Attribute,
    /// '>' closing a start tag that has content
    StartTagEnd,
    /// '/>' closing an empty element
    EmptyTag,
    /// Character data between markup
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Element end tag: </element>
    EndTag,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::None => "None",
            TokenKind::XmlDecl => "XMLDecl",
            TokenKind::DocTypeDecl => "DocTypeDecl",
            TokenKind::ProcessingInstruction => "ProcessingInstruction",
            TokenKind::Comment => "Comment",
            TokenKind::StartTagStart => "StartTagStart",
            TokenKind::Attribute => "Attribute",
            TokenKind::StartTagEnd => "StartTagEnd",
            TokenKind::EmptyTag => "EmptyTag",
            TokenKind::Text => "Text",
            TokenKind::CData => "CDATA",
            TokenKind::EndTag => "EndTag",
        }
    }

    /// Inside an open start tag, where only attributes or a terminator may follow
    #[inline]
    pub fn is_in_start_tag(self) -> bool {
        matches!(self, TokenKind::StartTagStart | TokenKind::Attribute)
    }
}

bitflags! {
    /// Where the current token sits among its siblings
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TokenStatus: u8 {
        /// First token after the stream start or after a non-empty start tag closed
        const FIRST_CHILD = 0b0000_0001;
        /// The input continues with an end tag
        const LAST_CHILD = 0b0000_0010;
    }
}
