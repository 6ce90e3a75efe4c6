//! Canonical detector tree
//!
//! Parents own their children through `Arc`; children point back through a
//! `Weak`, so the tree holds no reference cycles. Each node's children list is
//! an immutable snapshot behind an [`ArcSwap`]. Readers load the snapshot
//! without taking any lock; [`Node::extend`] builds a new list and stores it
//! while holding the node's extension mutex, which only writers take.

use std::fmt;
use std::sync::{Arc, Weak};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::Result;
use crate::mediatype::{self, Params};
use crate::mime::type_matches;
use crate::signatures::Detector;

type Children = Arc<Vec<Arc<Node>>>;

/// A node of the canonical tree.
///
/// Fields other than the children list never change after construction.
pub struct Node {
    mime_type: String,
    aliases: Vec<String>,
    params: Params,
    extension: String,
    detector: Box<dyn Detector>,
    children: ArcSwap<Vec<Arc<Node>>>,
    /// Serializes extensions of this node. Never taken by readers.
    extend_lock: Mutex<()>,
    parent: Weak<Node>,
    root: bool,
}

impl Node {
    /// Bare type, e.g. `text/html`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Parameters fixed at construction.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Extension with its leading dot, or empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Name of the detector, for logs.
    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    /// Runs this node's detector.
    pub fn detect(&self, raw: &[u8], limit: u32) -> bool {
        self.detector.detect(raw, limit)
    }

    /// The parent node, or `None` for the root.
    ///
    /// Also `None` once the tree owning this node has been dropped.
    pub fn parent(&self) -> Option<Arc<Node>> {
        self.parent.upgrade()
    }

    /// Whether this node was built as the root of its tree.
    ///
    /// Fixed at construction, unlike [`parent`](Self::parent).
    pub fn is_root(&self) -> bool {
        self.root
    }

    /// Current snapshot of the children, in priority order.
    ///
    /// The snapshot stays valid and unchanged even if the node is extended
    /// while it is held.
    pub fn children(&self) -> Children {
        self.children.load_full()
    }

    /// Whether `expected` names this node's type or one of its aliases.
    ///
    /// Parameters in `expected` are ignored; see [`crate::Mime::is`].
    pub fn is(&self, expected: &str) -> bool {
        type_matches(&self.mime_type, &self.aliases, expected)
    }

    /// Finds the first node in this subtree, preorder, whose type or alias
    /// equals `identifier` exactly.
    pub fn lookup(self: &Arc<Self>, identifier: &str) -> Option<Arc<Node>> {
        if self.aliases.iter().any(|a| a == identifier) || self.mime_type == identifier {
            return Some(Arc::clone(self));
        }
        self.children()
            .iter()
            .find_map(|child| child.lookup(identifier))
    }

    /// Every node of this subtree in preorder, starting with `self`.
    pub fn flatten(self: &Arc<Self>) -> Vec<Arc<Node>> {
        let mut out = vec![Arc::clone(self)];
        for child in self.children().iter() {
            out.extend(child.flatten());
        }
        out
    }

    /// Registers a sub-format detected by `detector` under this node.
    ///
    /// The new node is tried before every existing child, so it can refine or
    /// override earlier registrations; those still fire when it rejects. A
    /// malformed `mime_type` degrades to empty parameters (and to the raw
    /// string as type when even the type part is malformed). Use
    /// [`try_extend`](Self::try_extend) to reject such input instead.
    pub fn extend(
        self: &Arc<Self>,
        detector: impl Detector + 'static,
        mime_type: &str,
        extension: &str,
        aliases: &[&str],
    ) {
        let (parsed, params) = mediatype::parse_lenient(mime_type);
        let mime_type = match parsed {
            Some(parsed) => {
                if params.is_empty() && mime_type.contains(';') {
                    warn!(mime_type = %mime_type, "ignoring malformed parameters");
                }
                parsed
            }
            None => {
                warn!(mime_type = %mime_type, "registering unparseable media type verbatim");
                mime_type.trim().to_string()
            }
        };
        self.insert_child(Box::new(detector), mime_type, params, extension, aliases);
    }

    /// Like [`extend`](Self::extend), but fails on a malformed `mime_type`.
    pub fn try_extend(
        self: &Arc<Self>,
        detector: impl Detector + 'static,
        mime_type: &str,
        extension: &str,
        aliases: &[&str],
    ) -> Result<()> {
        let (mime_type, params) = mediatype::parse(mime_type)?;
        self.insert_child(Box::new(detector), mime_type, params, extension, aliases);
        Ok(())
    }

    fn insert_child(
        self: &Arc<Self>,
        detector: Box<dyn Detector>,
        mime_type: String,
        params: Params,
        extension: &str,
        aliases: &[&str],
    ) {
        let child = Arc::new(Node {
            mime_type,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            params,
            extension: extension.to_string(),
            detector,
            children: ArcSwap::from_pointee(Vec::new()),
            extend_lock: Mutex::new(()),
            parent: Arc::downgrade(self),
            root: false,
        });
        debug!(
            parent = %self.mime_type,
            child = %child.mime_type,
            detector = child.detector.name(),
            "extending detector tree"
        );

        let _guard = self.extend_lock.lock();
        let current = self.children.load();
        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(child);
        next.extend(current.iter().cloned());
        self.children.store(Arc::new(next));
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("mime_type", &self.mime_type)
            .field("aliases", &self.aliases)
            .field("params", &self.params)
            .field("extension", &self.extension)
            .field("detector", &self.detector.name())
            .field("children", &self.children.load().len())
            .finish()
    }
}

/// Blueprint for a subtree, turned into linked [`Node`]s by
/// [`build`](Self::build).
pub struct NodeBuilder {
    mime_type: String,
    params: Params,
    aliases: Vec<String>,
    extension: String,
    detector: Box<dyn Detector>,
    children: Vec<NodeBuilder>,
}

impl NodeBuilder {
    /// `mime_type` may carry default parameters, e.g.
    /// `text/plain; charset=utf-16le`.
    pub fn new(mime_type: &str, extension: &str, detector: impl Detector + 'static) -> Self {
        let (parsed, params) = mediatype::parse_lenient(mime_type);
        Self {
            mime_type: parsed.unwrap_or_else(|| mime_type.trim().to_string()),
            params,
            aliases: Vec::new(),
            extension: extension.to_string(),
            detector: Box::new(detector),
            children: Vec::new(),
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Appends a child; earlier children take priority.
    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Builds the subtree as a root (no parent).
    pub fn build(self) -> Arc<Node> {
        self.build_with_parent(None)
    }

    fn build_with_parent(self, parent: Option<Weak<Node>>) -> Arc<Node> {
        let NodeBuilder {
            mime_type,
            params,
            aliases,
            extension,
            detector,
            children,
        } = self;

        Arc::new_cyclic(|me| {
            let children: Vec<Arc<Node>> = children
                .into_iter()
                .map(|child| child.build_with_parent(Some(me.clone())))
                .collect();
            Node {
                mime_type,
                aliases,
                params,
                extension,
                detector,
                children: ArcSwap::from_pointee(children),
                extend_lock: Mutex::new(()),
                root: parent.is_none(),
                parent: parent.unwrap_or_default(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(_: &[u8], _: u32) -> bool {
        true
    }

    fn reject(_: &[u8], _: u32) -> bool {
        false
    }

    fn sample() -> Arc<Node> {
        NodeBuilder::new("application/octet-stream", "", accept)
            .child(
                NodeBuilder::new("text/plain", ".txt", accept)
                    .child(NodeBuilder::new("text/html", ".html", reject))
                    .child(NodeBuilder::new("text/xml", ".xml", reject).aliases(&["application/xml"])),
            )
            .child(NodeBuilder::new("image/png", ".png", reject))
            .build()
    }

    #[test]
    fn parents_are_linked() {
        let root = sample();
        assert!(root.is_root());
        let html = root.lookup("text/html").unwrap();
        let text = html.parent().unwrap();
        assert_eq!(text.mime_type(), "text/plain");
        assert!(Arc::ptr_eq(&text.parent().unwrap(), &root));
        assert!(!html.is_root());
    }

    #[test]
    fn builder_parses_default_params() {
        let root = NodeBuilder::new("Text/Plain; charset=UTF-16LE", ".txt", accept).build();
        assert_eq!(root.mime_type(), "text/plain");
        assert_eq!(root.params().get("charset").map(String::as_str), Some("UTF-16LE"));
    }

    #[test]
    fn lookup_by_type_and_alias() {
        let root = sample();
        assert_eq!(root.lookup("application/xml").unwrap().mime_type(), "text/xml");
        assert_eq!(root.lookup("image/png").unwrap().extension(), ".png");
        assert!(root.lookup("text/html; charset=utf-8").is_none());
        assert!(root.lookup("video/mp4").is_none());
    }

    #[test]
    fn flatten_is_preorder() {
        let types: Vec<String> = sample()
            .flatten()
            .iter()
            .map(|n| n.mime_type().to_string())
            .collect();
        assert_eq!(
            types,
            [
                "application/octet-stream",
                "text/plain",
                "text/html",
                "text/xml",
                "image/png"
            ]
        );
    }

    #[test]
    fn extend_prepends() {
        let root = sample();
        let text = root.lookup("text/plain").unwrap();
        text.extend(reject, "text/csv; header=present", ".csv", &["text/x-csv"]);

        let children = text.children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0].mime_type(), "text/csv");
        assert_eq!(children[0].params()["header"], "present");
        assert_eq!(children[0].aliases(), ["text/x-csv"]);
        assert!(Arc::ptr_eq(&children[0].parent().unwrap(), &text));
    }

    #[test]
    fn extend_leaves_old_snapshot_intact() {
        let root = sample();
        let before = root.children();
        root.extend(accept, "video/mp4", ".mp4", &[]);
        assert_eq!(before.len(), 2);
        assert_eq!(root.children().len(), 3);
        assert!(Arc::ptr_eq(&before[0], &root.children()[1]));
    }

    #[test]
    fn extend_degrades_malformed_input() {
        let root = sample();
        root.extend(reject, "text/x-thing; =oops", "", &[]);
        root.extend(reject, " not a type ", "", &[]);
        let children = root.children();
        assert_eq!(children[1].mime_type(), "text/x-thing");
        assert!(children[1].params().is_empty());
        assert_eq!(children[0].mime_type(), "not a type");
        assert!(children[0].is(" not a type "));
        assert!(root.lookup("not a type").is_some());
    }

    #[test]
    fn readers_do_not_wait_for_extension() {
        let root = sample();
        let _writer = root.extend_lock.lock();

        let reader = Arc::clone(&root);
        let (len, found) = std::thread::spawn(move || {
            let len = reader.children().len();
            let found = reader.lookup("text/html").is_some();
            (len, found)
        })
        .join()
        .unwrap();

        assert_eq!(len, 2);
        assert!(found);
        assert_eq!(root.flatten().len(), 5);
    }

    #[test]
    fn is_root_survives_dropped_tree() {
        let root = sample();
        let html = root.lookup("text/html").unwrap();
        let orphan = root.lookup("image/png").unwrap();
        orphan.extend(reject, "image/apng", ".apng", &[]);
        let apng = orphan.children()[0].clone();
        drop(orphan);
        drop(root);

        assert!(html.parent().is_none());
        assert!(!html.is_root());
        assert!(!apng.is_root());
    }

    #[test]
    fn try_extend_rejects_malformed_input() {
        let root = sample();
        assert!(root.try_extend(reject, "text/", "", &[]).is_err());
        assert!(root.try_extend(reject, "text/x; a", "", &[]).is_err());
        assert_eq!(root.children().len(), 2);
        assert!(root.try_extend(reject, "text/x; a=b", "", &[]).is_ok());
        assert_eq!(root.children().len(), 3);
    }

    #[test]
    fn is_ignores_params() {
        let root = sample();
        let xml = root.lookup("text/xml").unwrap();
        assert!(xml.is("text/xml; charset=utf-8"));
        assert!(xml.is("application/xml"));
        assert!(!xml.is("text/html"));
    }

    #[test]
    fn debug_shows_detector_name() {
        let root = NodeBuilder::new("image/png", ".png", crate::signatures::Png).build();
        let out = format!("{root:?}");
        assert!(out.contains("Png"));
        assert!(out.contains("image/png"));
    }
}
