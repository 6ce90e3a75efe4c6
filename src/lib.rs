//! Content sniffing over a hierarchy of signature detectors.
//!
//! Inputs are classified by walking a tree of detectors from the generic
//! `application/octet-stream` root towards more specific types, taking the
//! first accepting child at every level. Text-family results carry a
//! detected `charset` parameter. Results are standalone copies of the matched
//! path, and the tree can be extended at runtime while other threads detect.
//!
//! ```
//! let mime = mimetree::detect(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a/>");
//! assert_eq!(mime.to_string(), "text/xml; charset=iso-8859-1");
//! assert!(mime.is("application/xml"));
//! ```

pub mod builtin;
pub mod charset;
pub mod config;
mod error;
pub mod matching;
pub mod mediatype;
mod mime;
mod node;
pub mod signatures;
mod sniffer;

use std::io::Read;
use std::path::Path;
use std::sync::{Arc, LazyLock};

pub use charset::{CharsetFn, CharsetTable};
pub use config::SnifferConfig;
pub use error::{MimeError, Result};
pub use mime::Mime;
pub use node::{Node, NodeBuilder};
pub use signatures::Detector;
pub use sniffer::Sniffer;

static DEFAULT: LazyLock<Sniffer> = LazyLock::new(Sniffer::new);

/// The process-wide sniffer used by the free functions of this crate.
pub fn default_sniffer() -> &'static Sniffer {
    &DEFAULT
}

/// Classifies `raw` with the process-wide tree.
pub fn detect(raw: &[u8]) -> Mime {
    DEFAULT.detect(raw)
}

/// Classifies the head of a stream with the process-wide tree.
pub fn detect_reader<R: Read>(reader: R) -> Result<Mime> {
    DEFAULT.detect_reader(reader)
}

/// Classifies the head of a file with the process-wide tree.
pub fn detect_file<P: AsRef<Path>>(path: P) -> Result<Mime> {
    DEFAULT.detect_file(path)
}

/// Sets the process-wide read limit (0 = unlimited).
pub fn set_limit(limit: u32) {
    DEFAULT.set_limit(limit);
}

/// Finds a node of the process-wide tree by type or alias.
pub fn lookup(identifier: &str) -> Option<Arc<Node>> {
    DEFAULT.lookup(identifier)
}

/// Registers a detector under the root of the process-wide tree.
pub fn extend(detector: impl Detector + 'static, mime_type: &str, extension: &str, aliases: &[&str]) {
    DEFAULT.extend(detector, mime_type, extension, aliases);
}

/// Whether `s` names the same media type as any of `candidates`.
///
/// Parameters, surrounding whitespace and case of the type are ignored.
pub fn equals_any(s: &str, candidates: &[&str]) -> bool {
    let s = mediatype::essence(s);
    candidates
        .iter()
        .any(|candidate| mediatype::essence(candidate) == s)
}
