//! Detection entry points over one canonical tree.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use crate::builtin;
use crate::charset::CharsetTable;
use crate::config::SnifferConfig;
use crate::error::Result;
use crate::matching::descend;
use crate::mediatype::{self, Params};
use crate::mime::Mime;
use crate::node::Node;
use crate::signatures::Detector;

/// Classifies inputs against a detector tree.
///
/// A `Sniffer` is `Send + Sync`; share it across threads and keep detecting
/// while other threads [`extend`](Self::extend) its tree.
#[derive(Debug)]
pub struct Sniffer {
    root: Arc<Node>,
    limit: AtomicU32,
    charsets: CharsetTable,
}

impl Sniffer {
    /// Creates a sniffer over the built-in tree with default options.
    pub fn new() -> Self {
        Self::with_config(SnifferConfig::default())
    }

    pub fn with_config(config: SnifferConfig) -> Self {
        Self::from_root(builtin::tree(), config)
    }

    /// Creates a sniffer over a caller-built tree.
    pub fn from_root(root: Arc<Node>, config: SnifferConfig) -> Self {
        Self {
            root,
            limit: AtomicU32::new(config.read_limit),
            charsets: config.charsets,
        }
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Current read limit (0 = unlimited).
    pub fn limit(&self) -> u32 {
        self.limit.load(Ordering::Relaxed)
    }

    /// Changes how many bytes detectors may inspect. Safe to call while
    /// other threads are detecting; calls already running keep the old
    /// limit.
    pub fn set_limit(&self, limit: u32) {
        self.limit.store(limit, Ordering::Relaxed);
    }

    /// Classifies `raw`. Never fails: unmatched input classifies as the
    /// root type.
    pub fn detect(&self, raw: &[u8]) -> Mime {
        let node = descend(&self.root, raw, self.limit());

        let mut params = Params::new();
        if let Some(charset) = self.charsets.sniff(node.mime_type(), raw) {
            params.insert("charset".to_string(), charset);
        }

        let mime = Mime::from_hierarchy(&node, params);
        debug!(len = raw.len(), mime = %mime, "detected");
        mime
    }

    /// Reads at most the read limit from `reader` (everything when the limit
    /// is 0) and classifies what was read.
    pub fn detect_reader<R: Read>(&self, mut reader: R) -> Result<Mime> {
        let limit = self.limit();
        let mut buf = Vec::new();
        if limit == 0 {
            reader.read_to_end(&mut buf)?;
        } else {
            buf.reserve(limit as usize);
            reader.take(u64::from(limit)).read_to_end(&mut buf)?;
        }
        Ok(self.detect(&buf))
    }

    /// Classifies the head of the file at `path`.
    pub fn detect_file<P: AsRef<Path>>(&self, path: P) -> Result<Mime> {
        let file = File::open(path.as_ref())?;
        self.detect_reader(file)
    }

    /// Finds a node by type or alias. Parameters and surrounding whitespace
    /// in `identifier` are ignored.
    pub fn lookup(&self, identifier: &str) -> Option<Arc<Node>> {
        self.root
            .lookup(identifier)
            .or_else(|| self.root.lookup(&mediatype::essence(identifier)))
    }

    /// Every node of the tree in preorder, root first.
    pub fn flatten(&self) -> Vec<Arc<Node>> {
        self.root.flatten()
    }

    /// Registers a detector directly under the root.
    ///
    /// To refine a deeper type, [`lookup`](Self::lookup) it and call
    /// [`Node::extend`] on the result.
    pub fn extend(
        &self,
        detector: impl Detector + 'static,
        mime_type: &str,
        extension: &str,
        aliases: &[&str],
    ) {
        self.root.extend(detector, mime_type, extension, aliases);
    }
}

impl Default for Sniffer {
    fn default() -> Self {
        Self::new()
    }
}
