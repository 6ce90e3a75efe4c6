//! Media type parsing and formatting.
//!
//! Implements the `type/subtype; name=value` grammar of RFC 2045 closely
//! enough for equality checks, registration strings and result rendering.
//! Types and parameter names are case-insensitive and normalized to lower
//! case; parameter values keep their case.

use std::collections::BTreeMap;

use crate::error::{MimeError, Result};

pub type Params = BTreeMap<String, String>;

const TSPECIALS: &[u8] = b"()<>@,;:\\\"/[]?=";

#[inline]
fn is_token_char(b: u8) -> bool {
    b > 0x20 && b < 0x7F && !TSPECIALS.contains(&b)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_token_char)
}

/// Splits off the leading run of token characters.
fn consume_token(s: &str) -> (&str, &str) {
    let end = s.bytes().position(|b| !is_token_char(b)).unwrap_or(s.len());
    s.split_at(end)
}

/// Consumes a token or a quoted string, returning the unescaped value.
fn consume_value(s: &str) -> Option<(String, &str)> {
    if !s.starts_with('"') {
        let (token, rest) = consume_token(s);
        if token.is_empty() {
            return None;
        }
        return Some((token.to_string(), rest));
    }

    let mut value = String::new();
    let mut chars = s.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((value, &s[i + 1..])),
            '\\' => match chars.next()? {
                (_, '\r' | '\n') => return None,
                (_, escaped) => value.push(escaped),
            },
            '\r' | '\n' => return None,
            _ => value.push(c),
        }
    }
    None
}

/// Consumes one `; name=value` pair.
fn consume_param(s: &str) -> Option<(String, String, &str)> {
    let rest = s.trim_start().strip_prefix(';')?.trim_start();
    let (name, rest) = consume_token(rest);
    if name.is_empty() {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let (value, rest) = consume_value(rest)?;
    Some((name.to_ascii_lowercase(), value, rest))
}

fn check_media_type(media_type: &str) -> Result<()> {
    let invalid = || MimeError::InvalidMediaType(media_type.to_string());

    let (major, rest) = consume_token(media_type);
    if major.is_empty() {
        return Err(invalid());
    }
    if rest.is_empty() {
        return Ok(());
    }
    let rest = rest.strip_prefix('/').ok_or_else(invalid)?;
    let (sub, rest) = consume_token(rest);
    if sub.is_empty() || !rest.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

/// Parses a media type string into its lower-cased bare type and parameters.
///
/// A well-formed type followed by malformed parameters yields
/// [`MimeError::InvalidParameter`]; [`parse_lenient`] recovers the bare type in
/// that case.
pub fn parse(input: &str) -> Result<(String, Params)> {
    let (media_type, params) = parse_parts(input);
    let media_type = media_type?;
    let params = params.map_err(|reason| MimeError::InvalidParameter {
        media_type: media_type.clone(),
        reason,
    })?;
    Ok((media_type, params))
}

/// Parses `input`, keeping whatever part of it is well-formed.
///
/// Returns the bare type (or `None` when even the type is malformed) together
/// with the parameters, which are empty whenever any of them failed to parse.
pub fn parse_lenient(input: &str) -> (Option<String>, Params) {
    match parse_parts(input) {
        (Ok(media_type), Ok(params)) => (Some(media_type), params),
        (Ok(media_type), Err(_)) => (Some(media_type), Params::new()),
        (Err(_), _) => (None, Params::new()),
    }
}

fn parse_parts(input: &str) -> (Result<String>, std::result::Result<Params, String>) {
    let base = input.split(';').next().unwrap_or_default();
    let media_type = base.trim().to_ascii_lowercase();
    if let Err(e) = check_media_type(&media_type) {
        return (Err(e), Ok(Params::new()));
    }

    let mut params = Params::new();
    let mut rest = &input[base.len()..];
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let Some((name, value, tail)) = consume_param(rest) else {
            if rest.trim() == ";" {
                // A single trailing semicolon is tolerated.
                break;
            }
            return (Ok(media_type), Err(format!("cannot parse {rest:?}")));
        };
        if params.contains_key(&name) {
            return (Ok(media_type), Err(format!("duplicate parameter {name:?}")));
        }
        params.insert(name, value);
        rest = tail;
    }

    (Ok(media_type), Ok(params))
}

/// Returns the bare type of `input`, or `input` trimmed when it does not
/// parse.
pub fn essence(input: &str) -> String {
    match parse_lenient(input) {
        (Some(media_type), _) => media_type,
        (None, _) => input.trim().to_string(),
    }
}

/// Renders a media type with its parameters in sorted order.
///
/// Values that are not tokens are quoted. Returns `None` when the type, a
/// parameter name or a value cannot be represented; CR and LF are not allowed
/// even inside quotes.
pub fn format(media_type: &str, params: &Params) -> Option<String> {
    let media_type = media_type.to_ascii_lowercase();
    match media_type.split_once('/') {
        Some((major, sub)) if is_token(major) && is_token(sub) => {}
        None if is_token(&media_type) => {}
        _ => return None,
    }

    let mut out = media_type;
    for (name, value) in params {
        if !is_token(name) || value.contains(['\r', '\n']) {
            return None;
        }
        out.push_str("; ");
        out.push_str(&name.to_ascii_lowercase());
        out.push('=');
        if is_token(value) {
            out.push_str(value);
        } else {
            out.push('"');
            for c in value.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
    }
    Some(out)
}
