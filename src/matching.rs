//! Depth-first, first-match descent over the detector tree.

use std::sync::Arc;

use tracing::trace;

use crate::node::Node;

/// Walks down from `root`, entering the first child whose detector accepts
/// the input, until no child of the current node accepts.
///
/// The root's own detector is never consulted. Siblings after the first
/// accepting child are never tried and the walk never backtracks.
pub fn descend(root: &Arc<Node>, raw: &[u8], limit: u32) -> Arc<Node> {
    let mut current = Arc::clone(root);
    loop {
        let next = current
            .children()
            .iter()
            .find(|child| child.detect(raw, limit))
            .cloned();
        match next {
            Some(child) => {
                trace!(from = current.mime_type(), to = child.mime_type(), "descending");
                current = child;
            }
            None => return current,
        }
    }
}
