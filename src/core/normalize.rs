//! Reference resolution and whitespace normalization
//!
//! Always two passes over the same content: a measure pass computing the
//! exact output length, then a write pass into a buffer of that length.
//! Both passes run the same walker, so they cannot disagree. When the
//! measure pass reports no change the input is handed back as-is.

use std::borrow::Cow;

use super::chars::is_whitespace;
use super::entities::{reference_len, write_reference, EntityLookup};
use super::scalar::Decoded;
use super::scanner::whitespace_len;
use super::unit::{valid_up_to, Unit};
use crate::error::{Error, Result};
use crate::memory::scratch::Scratch;

/// Whitespace rule applied while normalizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whitespace {
    /// Non-CDATA attribute rule: strip leading and trailing whitespace,
    /// collapse every inner run to one space
    Collapse,
    /// CDATA attribute rule: each tab, CR or LF becomes one space, no collapsing
    Replace,
    /// Leave whitespace alone, resolve references only
    Preserve,
}

impl Whitespace {
    /// The attribute-value rule for a CDATA or non-CDATA attribute
    pub fn for_attribute(is_cdata: bool) -> Self {
        if is_cdata {
            Whitespace::Replace
        } else {
            Whitespace::Collapse
        }
    }
}

/// Result of the measure pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    /// Exact output length in units
    pub len: usize,
    /// Output would equal the input
    pub unchanged: bool,
}

trait Emit<U: Unit> {
    fn unit(&mut self, u: U) -> Result<()>;

    /// Resolve the reference at the head of `src`, returning units consumed
    fn reference<L: EntityLookup<U> + ?Sized>(&mut self, src: &[U], lookup: &L) -> Result<usize>;
}

struct Counter {
    len: usize,
}

impl<U: Unit> Emit<U> for Counter {
    #[inline]
    fn unit(&mut self, _: U) -> Result<()> {
        self.len += 1;
        Ok(())
    }

    #[inline]
    fn reference<L: EntityLookup<U> + ?Sized>(&mut self, src: &[U], lookup: &L) -> Result<usize> {
        let (consumed, produced) = reference_len(src, lookup)?;
        self.len += produced;
        Ok(consumed)
    }
}

struct Filler<'d, U> {
    dst: &'d mut [U],
    at: usize,
}

impl<U: Unit> Emit<U> for Filler<'_, U> {
    #[inline]
    fn unit(&mut self, u: U) -> Result<()> {
        let available = self.dst.len();
        let slot = self.dst.get_mut(self.at).ok_or(Error::Capacity {
            needed: self.at + 1,
            available,
        })?;
        *slot = u;
        self.at += 1;
        Ok(())
    }

    #[inline]
    fn reference<L: EntityLookup<U> + ?Sized>(&mut self, src: &[U], lookup: &L) -> Result<usize> {
        let (consumed, written) = write_reference(src, lookup, &mut self.dst[self.at..])?;
        self.at += written;
        Ok(consumed)
    }
}

/// Walk `src` once, emitting the normalized form. Returns the "unchanged" flag.
fn walk<U, L, E>(src: &[U], mode: Whitespace, lookup: &L, out: &mut E) -> Result<bool>
where
    U: Unit,
    L: EntityLookup<U> + ?Sized,
    E: Emit<U>,
{
    let space = U::from_ascii(b' ');
    let mut unchanged = true;
    let mut i = 0;

    if mode == Whitespace::Collapse {
        i = whitespace_len(src);
        if i > 0 {
            unchanged = false;
        }
    }

    while i < src.len() {
        let unit = src[i];
        match unit.to_ascii() {
            Some(b'&') => {
                i += out.reference(&src[i..], lookup).map_err(|e| at_offset(e, i))?;
                unchanged = false;
            }
            Some(b) if is_whitespace(b) => match mode {
                Whitespace::Collapse => {
                    let run = whitespace_len(&src[i..]);
                    if i + run == src.len() {
                        // trailing run is dropped
                        unchanged = false;
                        break;
                    }
                    if run != 1 || b != b' ' {
                        unchanged = false;
                    }
                    out.unit(space)?;
                    i += run;
                }
                Whitespace::Replace => {
                    if b != b' ' {
                        unchanged = false;
                    }
                    out.unit(space)?;
                    i += 1;
                }
                Whitespace::Preserve => {
                    out.unit(unit)?;
                    i += 1;
                }
            },
            Some(_) => {
                out.unit(unit)?;
                i += 1;
            }
            None => {
                let len = scalar_len(&src[i..]).ok_or(Error::Encoding { position: i })?;
                for &u in &src[i..i + len] {
                    out.unit(u)?;
                }
                i += len;
            }
        }
    }

    Ok(unchanged)
}

#[inline]
fn scalar_len<U: Unit>(src: &[U]) -> Option<usize> {
    match U::decode(src) {
        Decoded::Done(_, len) => Some(len),
        Decoded::Incomplete | Decoded::Invalid => None,
    }
}

/// Fail with the offset of the first malformed scalar, if any
pub fn check_encoding<U: Unit>(src: &[U]) -> Result<()> {
    let valid = valid_up_to(src);
    if valid == src.len() {
        Ok(())
    } else {
        Err(Error::Encoding { position: valid })
    }
}

fn at_offset(err: Error, offset: usize) -> Error {
    match err {
        Error::Reference { .. } => Error::Reference { offset },
        other => other,
    }
}

/// Measure pass: exact output length and the "no change" flag
pub fn measure<U: Unit, L: EntityLookup<U> + ?Sized>(
    src: &[U],
    mode: Whitespace,
    lookup: &L,
) -> Result<Measure> {
    let mut counter = Counter { len: 0 };
    let unchanged = walk(src, mode, lookup, &mut counter)?;
    Ok(Measure {
        len: counter.len,
        unchanged,
    })
}

/// Write pass: fills `dst`, returning the units written
pub fn write<U: Unit, L: EntityLookup<U> + ?Sized>(
    src: &[U],
    mode: Whitespace,
    lookup: &L,
    dst: &mut [U],
) -> Result<usize> {
    let mut filler = Filler { dst, at: 0 };
    walk(src, mode, lookup, &mut filler)?;
    Ok(filler.at)
}

/// Normalize into a caller buffer, failing without writing if it is too small
pub fn normalize_into<U: Unit, L: EntityLookup<U> + ?Sized>(
    src: &[U],
    mode: Whitespace,
    lookup: &L,
    dst: &mut [U],
) -> Result<usize> {
    let measured = measure(src, mode, lookup)?;
    if measured.len > dst.len() {
        return Err(Error::Capacity {
            needed: measured.len,
            available: dst.len(),
        });
    }
    write(src, mode, lookup, &mut dst[..measured.len])
}

/// Normalize, borrowing the input when nothing changes
pub fn normalize<'a, U: Unit, L: EntityLookup<U> + ?Sized>(
    src: &'a [U],
    mode: Whitespace,
    lookup: &L,
) -> Result<Cow<'a, [U]>> {
    let measured = measure(src, mode, lookup)?;
    if measured.unchanged {
        return Ok(Cow::Borrowed(src));
    }
    let mut out = vec![U::default(); measured.len];
    let written = write(src, mode, lookup, &mut out)?;
    debug_assert_eq!(written, measured.len);
    Ok(Cow::Owned(out))
}

/// Normalize straight to a string.
///
/// The write pass goes into scratch memory (stack or pool, chosen from the
/// measured length) and only the final string is allocated.
pub fn normalize_to_string<'a, U: Unit, L: EntityLookup<U> + ?Sized>(
    src: &'a [U],
    mode: Whitespace,
    lookup: &L,
) -> Result<Cow<'a, str>> {
    let measured = measure(src, mode, lookup)?;
    if measured.unchanged {
        return U::to_str(src).ok_or_else(|| Error::Encoding {
            position: valid_up_to(src),
        });
    }
    let mut scratch = Scratch::<U>::with_len(measured.len);
    write(src, mode, lookup, &mut scratch)?;
    match U::to_str(&scratch) {
        Some(s) => Ok(Cow::Owned(s.into_owned())),
        None => Err(Error::Encoding {
            position: valid_up_to(&scratch),
        }),
    }
}
