//! Built-in detector tree
//!
//! The root accepts everything and classifies as `application/octet-stream`.
//! Binary formats are tried before `text/plain`, whose detector is the most
//! permissive of the root's children.

use std::sync::Arc;

use tracing::debug;

use crate::node::{Node, NodeBuilder};
use crate::signatures::{Any, Gif, Gzip, Html, Jpeg, Json, Pdf, Png, Svg, Text, Xml, Zip};

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const TEXT: &str = "text/plain";
pub const HTML: &str = "text/html";
pub const XML: &str = "text/xml";
pub const JSON: &str = "application/json";
pub const SVG: &str = "image/svg+xml";
pub const PNG: &str = "image/png";
pub const JPEG: &str = "image/jpeg";
pub const GIF: &str = "image/gif";
pub const PDF: &str = "application/pdf";
pub const ZIP: &str = "application/zip";
pub const GZIP: &str = "application/gzip";

/// Default number of bytes detectors may inspect.
pub const DEFAULT_READ_LIMIT: u32 = 3072;

/// Builds a fresh canonical tree.
pub fn tree() -> Arc<Node> {
    let root = NodeBuilder::new(OCTET_STREAM, "", Any)
        .child(NodeBuilder::new(PNG, ".png", Png))
        .child(NodeBuilder::new(JPEG, ".jpg", Jpeg))
        .child(NodeBuilder::new(GIF, ".gif", Gif))
        .child(NodeBuilder::new(PDF, ".pdf", Pdf).aliases(&["application/x-pdf"]))
        .child(
            NodeBuilder::new(ZIP, ".zip", Zip)
                .aliases(&["application/x-zip", "application/x-zip-compressed"]),
        )
        .child(
            NodeBuilder::new(GZIP, ".gz", Gzip)
                .aliases(&["application/x-gzip", "application/gzip-compressed"]),
        )
        .child(
            NodeBuilder::new(TEXT, ".txt", Text)
                .child(NodeBuilder::new(HTML, ".html", Html::new()))
                .child(
                    NodeBuilder::new(XML, ".xml", Xml)
                        .aliases(&["application/xml"])
                        .child(NodeBuilder::new(SVG, ".svg", Svg)),
                )
                .child(NodeBuilder::new(JSON, ".json", Json)),
        )
        .build();

    debug!(nodes = root.flatten().len(), "built detector tree");
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_octet_stream() {
        let root = tree();
        assert_eq!(root.mime_type(), OCTET_STREAM);
        assert!(root.parent().is_none());
        assert_eq!(root.extension(), "");
    }

    #[test]
    fn text_is_last_root_child() {
        let root = tree();
        let children = root.children();
        assert_eq!(children.last().map(|c| c.mime_type()), Some(TEXT));
    }

    #[test]
    fn node_count() {
        assert_eq!(tree().flatten().len(), 12);
    }

    #[test]
    fn svg_hangs_off_xml() {
        let root = tree();
        let svg = root.lookup(SVG).unwrap();
        let xml = svg.parent().unwrap();
        assert_eq!(xml.mime_type(), XML);
        assert_eq!(xml.parent().unwrap().mime_type(), TEXT);
    }

    #[test]
    fn trees_are_independent() {
        let a = tree();
        let b = tree();
        a.extend(|_: &[u8], _: u32| true, "text/x-extra", ".x", &[]);
        assert_eq!(a.flatten().len(), 13);
        assert_eq!(b.flatten().len(), 12);
    }
}
