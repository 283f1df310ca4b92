//! Node classification, the token factory and the style applicator.

use crate::core::{Channel, ElementData, Marker, NodeData, NodeId, Tree};

/// Class scope shared by every element the colour tool creates.
pub const CLASS_SCOPE: &str = "ce-inline-tool--color";

/// Marker of a style token. Saved documents rely on it, so it never changes.
pub const TOKEN_MARKER: Marker = Marker::new_static("span", "ce-inline-tool--color__token");

/// Temporary element marking the split point during a reset.
pub const SPLIT_MARKER: Marker = Marker::new_static("span", "ce-inline-tool--color__empty");

/// Block container marker used when the host does not supply one.
pub const DEFAULT_BLOCK_MARKER: Marker = Marker::new_static("div", "cdx-block");

/// BEM-style class under [`CLASS_SCOPE`]: `css_class(Some("token"))` is
/// `ce-inline-tool--color__token`.
pub fn css_class(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{CLASS_SCOPE}__{name}"),
        None => CLASS_SCOPE.to_string(),
    }
}

pub fn is_marked(tree: &Tree, node: NodeId, marker: &Marker) -> bool {
    tree.element(node).is_some_and(|element| marker.matches(element))
}

pub fn is_style_token(tree: &Tree, node: NodeId) -> bool {
    is_marked(tree, node, &TOKEN_MARKER)
}

pub fn is_block_boundary(tree: &Tree, node: NodeId, block: &Marker) -> bool {
    is_marked(tree, node, block)
}

/// Empty means an element (or fragment) without children or text, or a
/// zero-length text node. A `br` counts as content when `skip_break` is set.
pub fn is_empty(tree: &Tree, node: NodeId, skip_break: bool) -> bool {
    match tree.data(node) {
        NodeData::Text(text) => text.is_empty(),
        NodeData::Element(element) if skip_break && element.is_tag("br") => false,
        NodeData::Element(_) | NodeData::Fragment => {
            !tree.has_child_nodes(node) || tree.text_content(node).is_empty()
        }
    }
}

/// Zero-length text node, as left behind when a range extraction empties
/// the node it started or ended in.
pub fn is_blank_text(tree: &Tree, node: NodeId) -> bool {
    tree.text(node).is_some_and(str::is_empty)
}

/// New unattached token with no style set.
pub fn create_token(tree: &mut Tree) -> NodeId {
    let element = ElementData::new(&TOKEN_MARKER.tag).with_class(TOKEN_MARKER.class.to_string());
    tree.create_element(element)
}

pub fn set_style(tree: &mut Tree, node: NodeId, channel: Channel, value: &str) {
    if let Some(element) = tree.element_mut(node)
        && element.style.get(channel) != Some(value)
    {
        element.style.set(channel, value);
    }
}

pub fn clear_style(tree: &mut Tree, node: NodeId, channel: Channel) {
    if let Some(element) = tree.element_mut(node) {
        element.style.clear(channel);
    }
}

pub fn style_of(tree: &Tree, node: NodeId, channel: Channel) -> Option<&str> {
    tree.element(node).and_then(|element| element.style.get(channel))
}

/// Nearest inclusive ancestor of `from` matching `marker`, never looking at
/// or past a `block` boundary.
pub fn nearest_matching(
    tree: &Tree,
    from: NodeId,
    marker: &Marker,
    block: &Marker,
) -> Option<NodeId> {
    std::iter::once(from)
        .chain(tree.ancestors(from))
        .take_while(|node| !is_block_boundary(tree, *node, block))
        .find(|node| is_marked(tree, *node, marker))
}

/// Highest inclusive ancestor of `from` matching `marker` below the block.
pub fn farthest_matching(
    tree: &Tree,
    from: NodeId,
    marker: &Marker,
    block: &Marker,
) -> Option<NodeId> {
    std::iter::once(from)
        .chain(tree.ancestors(from))
        .take_while(|node| !is_block_boundary(tree, *node, block))
        .filter(|node| is_marked(tree, *node, marker))
        .last()
}
