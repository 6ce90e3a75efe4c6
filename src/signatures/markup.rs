//! Markup signatures (HTML, XML and XML dialects)
//!
//! HTML detection uses an anchored, ASCII-case-insensitive Aho-Corasick
//! automaton over the tag openers browsers sniff for.

use aho_corasick::{AhoCorasick, Anchored, Input, MatchKind, StartKind};
use memchr::memmem;

use super::text::skip_utf8_bom;
use super::{Detector, window};

const HTML_TAGS: &[&str] = &[
    "<!DOCTYPE HTML",
    "<HTML",
    "<HEAD",
    "<SCRIPT",
    "<IFRAME",
    "<H1",
    "<DIV",
    "<FONT",
    "<TABLE",
    "<A",
    "<STYLE",
    "<TITLE",
    "<B",
    "<BODY",
    "<BR",
    "<P",
    "<!--",
];

const XML_DECLARATION: &[u8] = b"<?xml";
const SVG_OPEN_TAG: &[u8] = b"<svg";

/// Leading whitespace as defined for sniffing (space, tab, CR, LF, FF).
#[inline]
fn skip_markup_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0C))
        .unwrap_or(data.len());
    &data[start..]
}

/// HTML document or fragment.
#[derive(Debug, Clone)]
pub struct Html {
    /// Anchored automaton over [`HTML_TAGS`]
    pattern_matcher: Option<AhoCorasick>,
}

impl Html {
    pub fn new() -> Self {
        let pattern_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .start_kind(StartKind::Anchored)
            .build(HTML_TAGS)
            .ok();
        Self { pattern_matcher }
    }

    /// Length of the tag opener at the start of `data`, if any.
    fn tag_len(&self, data: &[u8]) -> Option<usize> {
        match &self.pattern_matcher {
            Some(matcher) => matcher
                .find(Input::new(data).anchored(Anchored::Yes))
                .map(|m| m.end()),
            None => self.tag_len_linear(data),
        }
    }

    /// Fallback when the automaton could not be built.
    fn tag_len_linear(&self, data: &[u8]) -> Option<usize> {
        HTML_TAGS
            .iter()
            .filter(|tag| {
                data.len() >= tag.len() && data[..tag.len()].eq_ignore_ascii_case(tag.as_bytes())
            })
            .map(|tag| tag.len())
            .max()
    }
}

impl Default for Html {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for Html {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        let data = skip_markup_whitespace(skip_utf8_bom(window(raw, limit)));
        let Some(len) = self.tag_len(data) else {
            return false;
        };
        if data[..len].ends_with(b"--") {
            return true;
        }
        // The opener must be followed by a tag-terminating byte.
        matches!(data.get(len), Some(b' ' | b'>'))
    }
}

/// XML document with a leading declaration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xml;

impl Detector for Xml {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        skip_markup_whitespace(skip_utf8_bom(window(raw, limit))).starts_with(XML_DECLARATION)
    }
}

/// SVG image serialized as XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct Svg;

impl Detector for Svg {
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        memmem::find(window(raw, limit), SVG_OPEN_TAG).is_some()
    }
}
