//! Depth-first propagation of a channel change onto nested tokens.

use super::predicates::{clear_style, is_empty, is_style_token, set_style};
use crate::core::{Channel, NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode<'a> {
    Set(&'a str),
    Clear,
}

/// Visits element children of `node` (never its text), dropping empty ones,
/// restyling tokens and descending into children that have elements.
///
/// Children are snapshotted before each level is mutated.
pub fn walk(tree: &mut Tree, node: NodeId, channel: Channel, mode: WalkMode<'_>) {
    for child in tree.element_children(node) {
        if is_empty(tree, child, true) {
            tracing::trace!(?child, "dropping empty element");
            tree.detach(child);
            continue;
        }
        if is_style_token(tree, child) {
            match mode {
                WalkMode::Set(value) => set_style(tree, child, channel, value),
                WalkMode::Clear => clear_style(tree, child, channel),
            }
        }
        if tree.child_element_count(child) > 0 {
            walk(tree, child, channel, mode);
        }
    }
}

/// Removes empty descendants of `node`, zero-length text included, without
/// touching styles.
pub fn prune_empty(tree: &mut Tree, node: NodeId) {
    for child in tree.children(node).to_vec() {
        if is_empty(tree, child, true) {
            tree.detach(child);
        } else if tree.is_element(child) {
            prune_empty(tree, child);
        }
    }
}
