//! Text-family signatures

use super::{Detector, window};

pub(crate) const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
pub(crate) const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
pub(crate) const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];

/// Control bytes that never appear in text, per the WHATWG sniffing rules.
#[inline]
fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

/// Strips a UTF-8 byte-order mark, if any.
#[inline]
pub(crate) fn skip_utf8_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(UTF8_BOM).unwrap_or(data)
}

/// Plain text: a byte-order mark, or no binary control bytes in the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl Detector for Text {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        let data = window(raw, limit);
        if data.starts_with(UTF8_BOM)
            || data.starts_with(UTF16_BE_BOM)
            || data.starts_with(UTF16_LE_BOM)
        {
            return true;
        }
        !data.iter().copied().any(is_binary_byte)
    }
}

/// JSON object or array.
///
/// Validates structure up to the window edge; a document cut off by the
/// limit is accepted as long as what was seen is well formed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Detector for Json {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        let truncated = limit != 0 && raw.len() > limit as usize;
        let data = skip_utf8_bom(window(raw, limit));
        let data = data.trim_ascii_start();
        if !matches!(data.first(), Some(b'{' | b'[')) {
            return false;
        }
        scan_json(data, truncated)
    }
}

fn scan_json(data: &[u8], truncated: bool) -> bool {
    let mut stack: Vec<u8> = Vec::with_capacity(16);
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in data.iter().enumerate() {
        if in_string {
            match (escaped, b) {
                (true, _) => escaped = false,
                (false, b'\\') => escaped = true,
                (false, b'"') => in_string = false,
                (false, 0x00..=0x1F) => return false,
                _ => {}
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return false;
                }
                if stack.is_empty() {
                    return data[i + 1..].trim_ascii().is_empty();
                }
            }
            b',' | b':' | b' ' | b'\t' | b'\r' | b'\n' => {}
            b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E' => {}
            // Letters of the true/false/null literals.
            b'a' | b'l' | b'n' | b'r' | b's' | b't' | b'u' | b'f' => {}
            _ => return false,
        }
    }

    // Ran out of input with open brackets.
    truncated
}
