//! Error types shared by the reader, the normalizer and the writer.

use std::fmt;
use thiserror::Error;

/// The grammar production being attempted when a grammar error is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    XmlDecl,
    DocTypeDecl,
    Comment,
    CData,
    ProcessingInstruction,
    StartTagStart,
    StartTagEnd,
    Attribute,
    EndTag,
    Text,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Construct::XmlDecl => "XMLDecl",
            Construct::DocTypeDecl => "DocTypeDecl",
            Construct::Comment => "Comment",
            Construct::CData => "CDATA",
            Construct::ProcessingInstruction => "PI",
            Construct::StartTagStart => "STagStart",
            Construct::StartTagEnd => "STagEnd",
            Construct::Attribute => "Attribute",
            Construct::EndTag => "ETag",
            Construct::Text => "Text",
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed UTF-8 or UTF-16 sequence
    #[error("Invalid encoded data near position {position}")]
    Encoding { position: usize },
    /// Input does not match the production being scanned
    #[error("Cannot parse {construct} near position {position}")]
    Grammar {
        position: usize,
        construct: Construct,
    },
    /// An entity or character reference that cannot be resolved.
    ///
    /// `offset` is relative to the start of the value being materialized,
    /// since these surface lazily, long after tokenizing moved on.
    #[error("Unable to resolve reference at offset {offset}")]
    Reference { offset: usize },
    /// Caller contract violation: wrong accessor or out-of-order write
    #[error("{operation} is not valid in state {state}")]
    InvalidUse {
        operation: &'static str,
        state: &'static str,
    },
    #[error("Output buffer is full: {needed} units needed, {available} available")]
    Capacity { needed: usize, available: usize },
    #[error("I/O error")]
    Io(#[from] std::io::Error),
    #[error("Formatting error")]
    Fmt(#[from] fmt::Error),
}

impl Error {
    pub(crate) fn grammar(construct: Construct, position: usize) -> Self {
        Error::Grammar {
            position,
            construct,
        }
    }

    /// True for errors that leave a reader unusable
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::InvalidUse { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_message() {
        let err = Error::grammar(Construct::XmlDecl, 12);
        assert_eq!(err.to_string(), "Cannot parse XMLDecl near position 12");
    }

    #[test]
    fn test_invalid_use_not_fatal() {
        let err = Error::InvalidUse {
            operation: "attribute",
            state: "Comment",
        };
        assert!(!err.is_fatal());
        assert!(Error::Reference { offset: 0 }.is_fatal());
    }
}
