//! Character encoding sniffing for text-like results
//!
//! The [`CharsetTable`] maps a type family to the function that sniffs its
//! encoding. The table is built once and consulted after matching; only the
//! terminal type's entry is used.

use std::collections::HashMap;

use memchr::memmem;
use tracing::trace;

use crate::builtin::{HTML, TEXT, XML};
use crate::signatures::text::{UTF8_BOM, UTF16_BE_BOM, UTF16_LE_BOM};

/// Encoding sniffer for one type family. `None` means no override.
pub type CharsetFn = fn(&[u8]) -> Option<String>;

/// Number of leading bytes searched for in-document declarations.
const PRESCAN_LEN: usize = 1024;

/// Keyed dispatch from type family to encoding sniffer.
#[derive(Debug, Clone)]
pub struct CharsetTable {
    sniffers: HashMap<String, CharsetFn>,
}

impl CharsetTable {
    /// Creates an empty table. No result gets a charset.
    pub fn new() -> Self {
        Self {
            sniffers: HashMap::new(),
        }
    }

    /// Creates the table for plain text, HTML and XML.
    pub fn with_builtin() -> Self {
        let mut table = Self::new();
        table.register(TEXT, from_plain);
        table.register(HTML, from_html);
        table.register(XML, from_xml);
        table
    }

    /// Registers (or replaces) the sniffer for `family`.
    pub fn register(&mut self, family: &str, sniffer: CharsetFn) {
        self.sniffers.insert(family.to_string(), sniffer);
    }

    pub fn get(&self, family: &str) -> Option<CharsetFn> {
        self.sniffers.get(family).copied()
    }

    /// Runs the sniffer registered for `family` over the whole input.
    ///
    /// Empty labels are treated as no result.
    pub fn sniff(&self, family: &str, raw: &[u8]) -> Option<String> {
        let charset = self.get(family)?(raw).filter(|label| !label.is_empty())?;
        trace!(family = %family, charset = %charset, "charset detected");
        Some(charset)
    }

    pub fn len(&self) -> usize {
        self.sniffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sniffers.is_empty()
    }
}

impl Default for CharsetTable {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// Encoding declared by a byte-order mark.
pub fn from_bom(raw: &[u8]) -> Option<&'static str> {
    if raw.starts_with(UTF8_BOM) {
        Some("utf-8")
    } else if raw.starts_with(UTF16_BE_BOM) {
        Some("utf-16be")
    } else if raw.starts_with(UTF16_LE_BOM) {
        Some("utf-16le")
    } else {
        None
    }
}

/// Plain text: BOM, else `utf-8` for valid non-ASCII UTF-8.
///
/// Pure ASCII gets no label. A multi-byte sequence cut off at the end of the
/// input still counts as UTF-8, since readers hand over truncated prefixes.
pub fn from_plain(raw: &[u8]) -> Option<String> {
    if let Some(bom) = from_bom(raw) {
        return Some(bom.to_string());
    }
    if raw.is_ascii() {
        return None;
    }
    match std::str::from_utf8(raw) {
        Ok(_) => Some("utf-8".to_string()),
        Err(e) if e.error_len().is_none() => Some("utf-8".to_string()),
        Err(_) => None,
    }
}

/// HTML: BOM, else a `<meta>` declaration in the prescan window, else the
/// plain-text rule.
pub fn from_html(raw: &[u8]) -> Option<String> {
    if let Some(bom) = from_bom(raw) {
        return Some(bom.to_string());
    }
    let head = raw[..raw.len().min(PRESCAN_LEN)].to_ascii_lowercase();
    meta_charset(&head).or_else(|| from_plain(raw))
}

/// XML: BOM, else the `encoding` pseudo-attribute of the declaration, else
/// the plain-text rule.
pub fn from_xml(raw: &[u8]) -> Option<String> {
    if let Some(bom) = from_bom(raw) {
        return Some(bom.to_string());
    }
    let head = raw[..raw.len().min(PRESCAN_LEN)].to_ascii_lowercase();
    xml_encoding(&head).or_else(|| from_plain(raw))
}

/// Scans lower-cased `head` for `<meta charset>` or an http-equiv
/// content-type declaration.
fn meta_charset(head: &[u8]) -> Option<String> {
    for start in memmem::find_iter(head, b"<meta") {
        let rest = &head[start + 5..];
        if !matches!(rest.first(), Some(b' ' | b'\t' | b'\n' | b'\r' | b'/')) {
            continue;
        }
        let end = memchr::memchr(b'>', rest).unwrap_or(rest.len());
        let attrs = parse_attributes(&rest[..end]);

        let value = |name: &[u8]| {
            attrs
                .iter()
                .find(|(n, _)| n.as_slice() == name)
                .map(|(_, v)| v.as_slice())
        };

        if let Some(charset) = value(b"charset") {
            if let Some(label) = label(charset) {
                return Some(label);
            }
        }
        if value(b"http-equiv") == Some(&b"content-type"[..]) {
            if let Some(label) = value(b"content").and_then(charset_from_content) {
                return Some(label);
            }
        }
    }
    None
}

/// Extracts `charset=...` from a `content` attribute value.
fn charset_from_content(content: &[u8]) -> Option<String> {
    let pos = memmem::find(content, b"charset")?;
    let rest = content[pos + 7..].trim_ascii_start().strip_prefix(b"=")?;
    let rest = rest.trim_ascii_start();
    let value = match rest.first() {
        Some(&q) if q == b'"' || q == b'\'' => {
            let inner = &rest[1..];
            &inner[..memchr::memchr(q, inner)?]
        }
        _ => {
            let end = rest
                .iter()
                .position(|b| matches!(b, b';' | b' ' | b'\t' | b'\n' | b'\r'))
                .unwrap_or(rest.len());
            &rest[..end]
        }
    };
    label(value)
}

/// Reads the `encoding` value of a leading `<?xml ... ?>` declaration.
fn xml_encoding(head: &[u8]) -> Option<String> {
    let decl = head.trim_ascii_start().strip_prefix(b"<?xml")?;
    let end = memmem::find(decl, b"?>")?;
    let attrs = parse_attributes(&decl[..end]);
    attrs
        .iter()
        .find(|(name, _)| name.as_slice() == b"encoding")
        .and_then(|(_, value)| label(value))
}

fn label(value: &[u8]) -> Option<String> {
    let value = value.trim_ascii();
    if value.is_empty() {
        return None;
    }
    std::str::from_utf8(value).ok().map(str::to_string)
}

/// Minimal `name=value` attribute tokenizer for tag interiors.
///
/// Handles double-quoted, single-quoted and bare values, and valueless
/// attributes.
fn parse_attributes(mut s: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
    let is_space = |b: &u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'/' | 0x0C);
    let mut attrs = Vec::new();

    loop {
        let start = s.iter().position(|b| !is_space(b)).unwrap_or(s.len());
        s = &s[start..];
        if s.is_empty() {
            break;
        }

        let name_end = s
            .iter()
            .position(|b| *b == b'=' || is_space(b))
            .unwrap_or(s.len());
        let name = s[..name_end].to_vec();
        s = s[name_end..].trim_ascii_start();

        let Some(after_eq) = s.strip_prefix(b"=") else {
            attrs.push((name, Vec::new()));
            continue;
        };
        s = after_eq.trim_ascii_start();

        let value = match s.first() {
            Some(&q) if q == b'"' || q == b'\'' => {
                let inner = &s[1..];
                let close = memchr::memchr(q, inner).unwrap_or(inner.len());
                let value = inner[..close].to_vec();
                s = inner.get(close + 1..).unwrap_or_default();
                value
            }
            _ => {
                let end = s.iter().position(is_space).unwrap_or(s.len());
                let value = s[..end].to_vec();
                s = &s[end..];
                value
            }
        };
        attrs.push((name, value));
    }
    attrs
}
