//! spanxml - Zero-copy XML tokenizer and ordering-checked writer
//!
//! Non-validating XML 1.x over in-memory UTF-8 bytes or UTF-16 code units:
//! - Reader: pull tokenizer, one token per `advance`, payloads borrowed from
//!   the input and resolved only on request
//! - Normalizer: reference resolution and whitespace handling that borrows
//!   when nothing changes and writes exactly once when something does
//! - Writer: incremental output that rejects out-of-order calls, over a
//!   fixed buffer, an `io::Write` stream or an `fmt::Write` sink
//! - Tree: owned nodes built from the reader and written by the writer
//!
//! ## Quick Start
//!
//! ```rust
//! use spanxml::{TokenKind, Utf8Reader};
//!
//! let mut reader = Utf8Reader::new(b"<a x=\"1&amp;2\">hi</a>");
//! while reader.advance()? {
//!     if reader.token() == TokenKind::Attribute {
//!         assert_eq!(&*reader.attribute(false)?.value, b"1&2");
//!     }
//! }
//! # Ok::<(), spanxml::Error>(())
//! ```
//!
//! ## Writing
//!
//! ```rust
//! use spanxml::writer::{SliceSink, Writer};
//!
//! let mut buf = [0u8; 64];
//! let mut writer = Writer::new(SliceSink::new(&mut buf));
//! writer.write_start_tag_start(b"greeting")?;
//! writer.write_start_tag_end(false)?;
//! writer.write_text(b"fish & chips", false)?;
//! writer.write_end_tag(b"greeting")?;
//! assert_eq!(writer.get_ref().written(), b"<greeting>fish &amp; chips</greeting>");
//! # Ok::<(), spanxml::Error>(())
//! ```

/// Logging macros - no-ops unless the logging feature is enabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

pub mod core;
mod error;
pub mod memory;
pub mod reader;
pub mod tree;
pub mod writer;

pub use crate::core::encoding::XmlEncoding;
pub use crate::core::entities::{EntityLookup, EntityTable, PredefinedEntities};
pub use crate::core::normalize::Whitespace;
pub use error::{Construct, Error, Result};
pub use reader::{ReaderOptions, SliceReader, TokenKind, TokenStatus, Utf16Reader, Utf8Reader};
pub use tree::Document;
pub use writer::Writer;
