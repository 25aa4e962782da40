//! XML Reader Module
//!
//! Pull tokenizer over an in-memory document:
//! - SliceReader: zero-copy reader, one token per `advance`
//! - Token: token kinds and sibling status flags
//! - Records: borrowed views handed out by the accessors
//! - Prolog: XML and DOCTYPE declaration productions

mod prolog;
pub mod records;
pub mod slice;
pub mod token;

pub use records::{Attribute, DocTypeDecl, ExternalId, NameValue, XmlDecl, XmlVersion};
pub use slice::{ReaderOptions, SliceReader, Utf16Reader, Utf8Reader};
pub use token::{TokenKind, TokenStatus};
