//! Signature detectors
//!
//! Each built-in format is one [`Detector`] implementation, instantiated once
//! when the tree is built. Callers extending the tree may pass their own
//! implementations or plain closures.

pub(crate) mod binary;
mod markup;
pub(crate) mod text;

pub use binary::{Gif, Gzip, Jpeg, Magic, Pdf, Png, Zip};
pub use markup::{Html, Svg, Xml};
pub use text::{Json, Text};

/// A single signature test over the head of an input.
///
/// `limit` caps how many bytes the detector may inspect. Implementations must
/// tolerate inputs shorter than `limit`, must be deterministic and must not
/// hold on to `raw` after returning.
///
/// The trait is object-safe; the tree stores detectors as
/// `Box<dyn Detector>`.
pub trait Detector: Send + Sync {
    /// Returns `true` when `raw` satisfies this signature.
    fn detect(&self, raw: &[u8], limit: u32) -> bool;

    /// Human-readable name used in logs.
    ///
    /// Defaults to the short (unqualified) type name.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

impl<F> Detector for F
where
    F: Fn(&[u8], u32) -> bool + Send + Sync,
{
    fn detect(&self, raw: &[u8], limit: u32) -> bool {
        self(raw, limit)
    }
}

/// Detector of the tree root. Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Any;

impl Detector for Any {
    fn detect(&self, _raw: &[u8], _limit: u32) -> bool {
        true
    }
}

/// Returns the slice a detector may inspect. A limit of zero means unbounded.
#[inline]
pub(crate) fn window(raw: &[u8], limit: u32) -> &[u8] {
    if limit == 0 {
        return raw;
    }
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    &raw[..raw.len().min(limit)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_respects_limit() {
        assert_eq!(window(b"abcdef", 3), b"abc");
        assert_eq!(window(b"ab", 3), b"ab");
        assert_eq!(window(b"abcdef", 0), b"abcdef");
        assert_eq!(window(b"", 10), b"");
    }

    #[test]
    fn closures_are_detectors() {
        let starts_with_x = |raw: &[u8], _limit: u32| raw.first() == Some(&b'x');
        assert!(starts_with_x.detect(b"xyz", 10));
        assert!(!starts_with_x.detect(b"", 10));
    }

    #[test]
    fn default_name_is_short_type_name() {
        assert_eq!(Any.name(), "Any");
        assert_eq!(Png.name(), "Png");
    }

    #[test]
    fn detectors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Detector>();
        assert_send_sync::<Html>();
    }
}
