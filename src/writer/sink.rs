//! Output sinks
//!
//! The writer's state machine and escaping are shared; a sink only knows how
//! to commit a run of units to its destination.

use std::fmt;
use std::io;
use std::marker::PhantomData;

use crate::core::unit::{cast, valid_up_to, Unit};
use crate::error::{Error, Result};

pub trait Sink {
    /// Representation the sink stores
    type Unit: Unit;

    fn commit(&mut self, units: &[Self::Unit]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Commit an ASCII literal
    fn commit_ascii(&mut self, lit: &[u8]) -> Result<()> {
        if let Some(same) = cast::<u8, Self::Unit>(lit) {
            return self.commit(same);
        }
        let mut buf = [Self::Unit::default(); 32];
        for chunk in lit.chunks(buf.len()) {
            for (dst, &b) in buf.iter_mut().zip(chunk) {
                *dst = Self::Unit::from_ascii(b);
            }
            self.commit(&buf[..chunk.len()])?;
        }
        Ok(())
    }

    fn commit_scalar(&mut self, ch: char) -> Result<()> {
        let mut buf = [Self::Unit::default(); 4];
        let encoded = Self::Unit::encode(ch, &mut buf);
        self.commit(encoded)
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    type Unit = S::Unit;

    #[inline]
    fn commit(&mut self, units: &[S::Unit]) -> Result<()> {
        (**self).commit(units)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Growable in-memory output
impl<U: Unit> Sink for Vec<U> {
    type Unit = U;

    #[inline]
    fn commit(&mut self, units: &[U]) -> Result<()> {
        self.extend_from_slice(units);
        Ok(())
    }
}

/// Fixed-capacity buffer supplied by the caller
#[derive(Debug)]
pub struct SliceSink<'b, U> {
    buf: &'b mut [U],
    len: usize,
}

impl<'b, U: Unit> SliceSink<'b, U> {
    pub fn new(buf: &'b mut [U]) -> Self {
        SliceSink { buf, len: 0 }
    }

    /// Units committed so far
    pub fn written(&self) -> &[U] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.len
    }
}

impl<U: Unit> Sink for SliceSink<'_, U> {
    type Unit = U;

    fn commit(&mut self, units: &[U]) -> Result<()> {
        let end = self.len + units.len();
        if end > self.buf.len() {
            return Err(Error::Capacity {
                needed: end,
                available: self.buf.len(),
            });
        }
        self.buf[self.len..end].copy_from_slice(units);
        self.len = end;
        Ok(())
    }
}

/// Byte stream output. UTF-16 output is written little-endian.
pub struct StreamSink<W, U = u8> {
    inner: W,
    _unit: PhantomData<U>,
}

impl<W: io::Write, U: Unit> StreamSink<W, U> {
    pub fn new(inner: W) -> Self {
        StreamSink {
            inner,
            _unit: PhantomData,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write, U: Unit> Sink for StreamSink<W, U> {
    type Unit = U;

    fn commit(&mut self, units: &[U]) -> Result<()> {
        if let Some(bytes) = cast::<U, u8>(units) {
            self.inner.write_all(bytes)?;
        } else if let Some(wide) = cast::<U, u16>(units) {
            let mut bytes = [0u8; 256];
            for chunk in wide.chunks(bytes.len() / 2) {
                for (pair, unit) in bytes.chunks_exact_mut(2).zip(chunk) {
                    pair.copy_from_slice(&unit.to_le_bytes());
                }
                self.inner.write_all(&bytes[..chunk.len() * 2])?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Text output through `fmt::Write`, e.g. a `String` or a `Formatter`
pub struct TextSink<W> {
    inner: W,
}

impl<W: fmt::Write> TextSink<W> {
    pub fn new(inner: W) -> Self {
        TextSink { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: fmt::Write> Sink for TextSink<W> {
    type Unit = u8;

    fn commit(&mut self, units: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(units).map_err(|_| Error::Encoding {
            position: valid_up_to(units),
        })?;
        self.inner.write_str(text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_sink_capacity() {
        let mut buf = [0u8; 4];
        let mut sink = SliceSink::new(&mut buf);
        sink.commit(b"<a").unwrap();
        let err = sink.commit(b"/>>").unwrap_err();
        assert!(matches!(
            err,
            Error::Capacity {
                needed: 5,
                available: 4
            }
        ));
        assert_eq!(sink.written(), b"<a");
        assert_eq!(sink.remaining(), 2);
    }

    #[test]
    fn test_commit_ascii_widens() {
        let mut out: Vec<u16> = Vec::new();
        out.commit_ascii(b"<?xml").unwrap();
        assert_eq!(String::from_utf16(&out).unwrap(), "<?xml");
    }

    #[test]
    fn test_commit_ascii_long_literal() {
        let lit = [b'x'; 70];
        let mut out: Vec<u16> = Vec::new();
        out.commit_ascii(&lit).unwrap();
        assert_eq!(out.len(), 70);
    }

    #[test]
    fn test_commit_scalar() {
        let mut out: Vec<u8> = Vec::new();
        out.commit_scalar('é').unwrap();
        assert_eq!(out, "é".as_bytes());
    }

    #[test]
    fn test_stream_sink_utf16_little_endian() {
        let mut sink: StreamSink<Vec<u8>, u16> = StreamSink::new(Vec::new());
        sink.commit_ascii(b"<a").unwrap();
        assert_eq!(sink.into_inner(), vec![b'<', 0, b'a', 0]);
    }

    #[test]
    fn test_text_sink() {
        let mut sink = TextSink::new(String::new());
        sink.commit("día".as_bytes()).unwrap();
        assert!(matches!(
            sink.commit(&[b'a', 0xFF]),
            Err(Error::Encoding { position: 1 })
        ));
        assert_eq!(sink.into_inner(), "día");
    }
}
