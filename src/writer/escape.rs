//! Escaping and transcoding on the way to a sink

use super::sink::Sink;
use crate::core::scalar::Decoded;
use crate::core::unit::{cast, Unit};
use crate::error::{Error, Result};

/// Where escaped data lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Text,
    /// Inside a double-quoted attribute value
    Attribute,
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Copy units to the sink, re-encoding scalar by scalar when the
/// representations differ
pub fn write_raw<V: Unit, S: Sink + ?Sized>(sink: &mut S, src: &[V]) -> Result<()> {
    if let Some(same) = cast::<V, S::Unit>(src) {
        return sink.commit(same);
    }
    let mut i = 0;
    while i < src.len() {
        match V::decode(&src[i..]) {
            Decoded::Done(ch, len) => {
                sink.commit_scalar(ch)?;
                i += len;
            }
            _ => return Err(Error::Encoding { position: i }),
        }
    }
    Ok(())
}

/// Write `src` with markup characters replaced by references.
///
/// Unchanged runs go to the sink in one piece.
pub fn write_escaped<V: Unit, S: Sink + ?Sized>(
    sink: &mut S,
    src: &[V],
    context: Context,
) -> Result<()> {
    let mut run = 0;
    let mut i = 0;
    while i < src.len() {
        let (ch, len) = match V::decode(&src[i..]) {
            Decoded::Done(ch, len) => (ch, len),
            _ => return Err(Error::Encoding { position: i }),
        };
        let replacement: Option<&[u8]> = match ch {
            '<' => Some(&b"&lt;"[..]),
            '&' => Some(&b"&amp;"[..]),
            '"' if context == Context::Attribute => Some(&b"&quot;"[..]),
            _ => None,
        };
        if replacement.is_some() || ch.is_control() {
            write_raw(sink, &src[run..i])?;
            match replacement {
                Some(lit) => sink.commit_ascii(lit)?,
                None => write_char_ref(sink, ch)?,
            }
            run = i + len;
        }
        i += len;
    }
    write_raw(sink, &src[run..])
}

/// `&#xH;` with uppercase hex digits
pub fn write_char_ref<S: Sink + ?Sized>(sink: &mut S, ch: char) -> Result<()> {
    let mut digits = [0u8; 6];
    let mut start = digits.len();
    let mut value = ch as u32;
    loop {
        start -= 1;
        digits[start] = HEX[(value & 0xF) as usize];
        value >>= 4;
        if value == 0 {
            break;
        }
    }
    sink.commit_ascii(b"&#x")?;
    sink.commit_ascii(&digits[start..])?;
    sink.commit_ascii(b";")
}

/// Decimal digits of `value`, written to the end of `buf`
pub fn format_decimal(mut value: u32, buf: &mut [u8; 10]) -> &[u8] {
    let mut start = buf.len();
    loop {
        start -= 1;
        buf[start] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    &buf[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(src: &str, context: Context) -> String {
        let mut out: Vec<u8> = Vec::new();
        write_escaped(&mut out, src.as_bytes(), context).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(escaped("a < b && c > \"d\"", Context::Text), "a &lt; b &amp;&amp; c > \"d\"");
    }

    #[test]
    fn test_attribute_escaping() {
        assert_eq!(escaped("say \"<hi>\"", Context::Attribute), "say &quot;&lt;hi>&quot;");
    }

    #[test]
    fn test_controls_become_char_refs() {
        assert_eq!(escaped("a\tb\u{1B}c\u{85}", Context::Text), "a&#x9;b&#x1B;c&#x85;");
        assert_eq!(escaped("\n", Context::Attribute), "&#xA;");
    }

    #[test]
    fn test_transcode_utf16_to_utf8() {
        let src: Vec<u16> = "日本 & 😀".encode_utf16().collect();
        let mut out: Vec<u8> = Vec::new();
        write_escaped(&mut out, &src, Context::Text).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "日本 &amp; 😀");
    }

    #[test]
    fn test_transcode_utf8_to_utf16() {
        let mut out: Vec<u16> = Vec::new();
        write_raw(&mut out, "héllo".as_bytes()).unwrap();
        assert_eq!(String::from_utf16(&out).unwrap(), "héllo");
    }

    #[test]
    fn test_invalid_input_reports_offset() {
        let mut out: Vec<u8> = Vec::new();
        let err = write_escaped(&mut out, &[b'o', b'k', 0xC0, 0x80][..], Context::Text).unwrap_err();
        assert!(matches!(err, Error::Encoding { position: 2 }));

        let mut wide: Vec<u16> = Vec::new();
        let err = write_raw(&mut wide, &[b'a', 0xFF][..]).unwrap_err();
        assert!(matches!(err, Error::Encoding { position: 1 }));
    }

    #[test]
    fn test_format_decimal() {
        let mut buf = [0u8; 10];
        assert_eq!(format_decimal(0, &mut buf), b"0");
        assert_eq!(format_decimal(4_294_967_295, &mut buf), b"4294967295");
    }
}
