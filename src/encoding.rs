use crate::error::EncodingError;
use crate::Encoding;

const BOM_UTF8: &[u8] = b"\xEF\xBB\xBF";
const BOM_UTF16LE: &[u8] = b"\xFF\xFE";
const BOM_UTF16BE: &[u8] = b"\xFE\xFF";
const BOM_UTF32LE: &[u8] = b"\xFF\xFE\x00\x00";
const BOM_UTF32BE: &[u8] = b"\x00\x00\xFE\xFF";

/// Determine the stream encoding from a byte order mark, or from the
/// null-byte pattern of the first character when no BOM is present.
///
/// Returns the detected encoding and the number of BOM bytes to skip. The
/// 4-byte marks are matched before the 2-byte marks they share a prefix
/// with, so `FF FE 00 00` resolves to UTF-32LE rather than UTF-16LE.
fn detect(bytes: &[u8]) -> (Encoding, usize) {
    if bytes.starts_with(BOM_UTF32BE) {
        (Encoding::Utf32Be, 4)
    } else if bytes.starts_with(BOM_UTF32LE) {
        (Encoding::Utf32Le, 4)
    } else if bytes.starts_with(BOM_UTF8) {
        (Encoding::Utf8, 3)
    } else if bytes.starts_with(BOM_UTF16BE) {
        (Encoding::Utf16Be, 2)
    } else if bytes.starts_with(BOM_UTF16LE) {
        (Encoding::Utf16Le, 2)
    } else {
        // No BOM. YAML streams begin with an ASCII character, so the
        // position of null bytes inside the first unit gives the width
        // and endianness away.
        match *bytes {
            [0, 0, 0, _, ..] => (Encoding::Utf32Be, 0),
            [_, 0, 0, 0, ..] => (Encoding::Utf32Le, 0),
            [0, _, ..] => (Encoding::Utf16Be, 0),
            [_, 0, ..] => (Encoding::Utf16Le, 0),
            _ => (Encoding::Utf8, 0),
        }
    }
}

/// Transcode an input byte stream into a single contiguous UTF-8 buffer.
///
/// The detected encoding is returned alongside the buffer; it plays no role
/// in parsing and is retained for diagnostics only.
pub(crate) fn decode(bytes: &[u8]) -> Result<(String, Encoding), EncodingError> {
    let (encoding, bom_len) = detect(bytes);
    let content = &bytes[bom_len..];
    let buffer = match encoding {
        Encoding::Utf8 => decode_utf8(content, bom_len)?,
        Encoding::Utf16Le => decode_utf16::<false>(content, bom_len)?,
        Encoding::Utf16Be => decode_utf16::<true>(content, bom_len)?,
        Encoding::Utf32Le => decode_utf32::<false>(content, bom_len)?,
        Encoding::Utf32Be => decode_utf32::<true>(content, bom_len)?,
    };
    Ok((buffer, encoding))
}

fn utf8_width_and_initial_value(initial: u8) -> (usize, u32) {
    let initial = initial as u32;
    if initial & 0x80 == 0 {
        (1, initial & 0x7f)
    } else if initial & 0xE0 == 0xC0 {
        (2, initial & 0x1f)
    } else if initial & 0xF0 == 0xE0 {
        (3, initial & 0x0f)
    } else if initial & 0xF8 == 0xF0 {
        (4, initial & 0x07)
    } else {
        (0, 0)
    }
}

fn decode_utf8(bytes: &[u8], base_offset: usize) -> Result<String, EncodingError> {
    let mut buffer = String::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let offset = base_offset + pos;
        let first = bytes[pos];
        let (width, mut value) = utf8_width_and_initial_value(first);
        if width == 0 {
            return Err(EncodingError::InvalidLeadingOctet {
                offset,
                value: first,
            });
        }
        if pos + width > bytes.len() {
            return Err(EncodingError::IncompleteUnit { offset });
        }
        for (i, trailing) in bytes[pos + 1..pos + width].iter().enumerate() {
            if trailing & 0xC0 != 0x80 {
                return Err(EncodingError::InvalidTrailingOctet {
                    offset: offset + 1 + i,
                    value: *trailing,
                });
            }
            value = (value << 6) | (*trailing as u32 & 0x3f);
        }
        if !(width == 1
            || width == 2 && value >= 0x80
            || width == 3 && value >= 0x800
            || width == 4 && value >= 0x10000)
        {
            return Err(EncodingError::OverlongSequence { offset });
        }
        let ch = char::from_u32(value)
            .ok_or(EncodingError::InvalidCodePoint { offset, value })?;
        push_content_char(&mut buffer, ch, offset)?;
        pos += width;
    }
    Ok(buffer)
}

fn decode_utf16<const BIG_ENDIAN: bool>(
    bytes: &[u8],
    base_offset: usize,
) -> Result<String, EncodingError> {
    let mut buffer = String::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let offset = base_offset + pos;
        if pos + 2 > bytes.len() {
            return Err(EncodingError::IncompleteUnit { offset });
        }
        let unit = [bytes[pos], bytes[pos + 1]];
        let high = if BIG_ENDIAN {
            u16::from_be_bytes(unit)
        } else {
            u16::from_le_bytes(unit)
        };
        if high & 0xFC00 == 0xDC00 {
            return Err(EncodingError::UnpairedSurrogate {
                offset,
                value: high,
            });
        }
        let (value, width) = if high & 0xFC00 == 0xD800 {
            if pos + 4 > bytes.len() {
                return Err(EncodingError::IncompleteUnit { offset });
            }
            let unit2 = [bytes[pos + 2], bytes[pos + 3]];
            let low = if BIG_ENDIAN {
                u16::from_be_bytes(unit2)
            } else {
                u16::from_le_bytes(unit2)
            };
            if low & 0xFC00 != 0xDC00 {
                return Err(EncodingError::UnpairedSurrogate {
                    offset: offset + 2,
                    value: low,
                });
            }
            let value =
                0x10000 + (((high as u32 & 0x3FF) << 10) | (low as u32 & 0x3FF));
            (value, 4)
        } else {
            (high as u32, 2)
        };
        let ch = char::from_u32(value)
            .ok_or(EncodingError::InvalidCodePoint { offset, value })?;
        push_content_char(&mut buffer, ch, offset)?;
        pos += width;
    }
    Ok(buffer)
}

fn decode_utf32<const BIG_ENDIAN: bool>(
    bytes: &[u8],
    base_offset: usize,
) -> Result<String, EncodingError> {
    let mut buffer = String::with_capacity(bytes.len() / 4);
    let mut pos = 0;
    while pos < bytes.len() {
        let offset = base_offset + pos;
        if pos + 4 > bytes.len() {
            return Err(EncodingError::IncompleteUnit { offset });
        }
        let unit = [bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]];
        let value = if BIG_ENDIAN {
            u32::from_be_bytes(unit)
        } else {
            u32::from_le_bytes(unit)
        };
        let ch = char::from_u32(value)
            .ok_or(EncodingError::InvalidCodePoint { offset, value })?;
        push_content_char(&mut buffer, ch, offset)?;
        pos += 4;
    }
    Ok(buffer)
}

/// Append a decoded character, rejecting code points the YAML character set
/// excludes (C0 controls other than tab and line breaks, C1 controls other
/// than NEL, and the surrogate-adjacent non-characters).
fn push_content_char(
    buffer: &mut String,
    ch: char,
    offset: usize,
) -> Result<(), EncodingError> {
    if !(ch == '\x09'
        || ch == '\x0A'
        || ch == '\x0D'
        || ch >= '\x20' && ch <= '\x7E'
        || ch == '\u{0085}'
        || ch >= '\u{00A0}' && ch <= '\u{D7FF}'
        || ch >= '\u{E000}' && ch <= '\u{FFFD}'
        || ch >= '\u{10000}' && ch <= '\u{10FFFF}')
    {
        return Err(EncodingError::DisallowedCharacter {
            offset,
            value: ch as u32,
        });
    }
    buffer.push(ch);
    Ok(())
}
