//! DOM-style ranges over a [`Tree`].
//!
//! A [`Range`] is a pair of boundary points. Offsets count bytes inside text
//! nodes and children everywhere else. The mutating operations
//! (`extract_contents`, `insert_node`, `surround_contents`) follow the DOM
//! range algorithms, including the bookkeeping they perform on the range
//! itself; other ranges are not live and must be rebuilt by the caller.

use super::{NodeId, RangeError, Tree};
use std::cmp::Ordering;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    pub fn collapsed(at: Boundary) -> Self {
        Self { start: at, end: at }
    }

    pub fn select_node(tree: &Tree, node: NodeId) -> Result<Self, RangeError> {
        let parent = tree.parent(node).ok_or(RangeError::InvalidState)?;
        let index = tree.index_of(node).ok_or(RangeError::NodeNotFound)?;
        Ok(Self::new(
            Boundary::new(parent, index),
            Boundary::new(parent, index + 1),
        ))
    }

    pub fn select_node_contents(tree: &Tree, node: NodeId) -> Self {
        Self::new(
            Boundary::new(node, 0),
            Boundary::new(node, tree.node_len(node)),
        )
    }

    /// Resolves grapheme offsets relative to `root` into a range.
    ///
    /// The start snaps to the beginning of the text node that follows it and
    /// the end to the end of the text node that precedes it, so a selection
    /// that exactly covers an element's text lands inside that element.
    pub fn from_grapheme_offsets(
        tree: &Tree,
        root: NodeId,
        start: usize,
        end: usize,
    ) -> Result<Self, RangeError> {
        if !tree.contains(root) {
            return Err(RangeError::NodeNotFound);
        }
        if start > end {
            return Err(RangeError::InvalidOffset);
        }

        let segments: Vec<(NodeId, Vec<usize>)> = tree
            .text_nodes(root)
            .into_iter()
            .filter_map(|node| {
                let text = tree.text(node)?;
                if text.is_empty() {
                    return None;
                }
                let mut bounds: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
                bounds.push(text.len());
                Some((node, bounds))
            })
            .collect();

        let total: usize = segments.iter().map(|(_, b)| b.len() - 1).sum();
        if end > total {
            return Err(RangeError::InvalidOffset);
        }

        let resolve_start = |offset: usize| -> Boundary {
            let mut cursor = 0;
            for (node, bounds) in &segments {
                let count = bounds.len() - 1;
                if offset < cursor + count {
                    return Boundary::new(*node, bounds[offset - cursor]);
                }
                cursor += count;
            }
            match segments.last() {
                Some((node, bounds)) => Boundary::new(*node, bounds[bounds.len() - 1]),
                None => Boundary::new(root, tree.node_len(root)),
            }
        };
        let resolve_end = |offset: usize| -> Boundary {
            let mut cursor = 0;
            for (node, bounds) in &segments {
                let count = bounds.len() - 1;
                if offset > cursor && offset <= cursor + count {
                    return Boundary::new(*node, bounds[offset - cursor]);
                }
                cursor += count;
            }
            match segments.first() {
                Some((node, _)) => Boundary::new(*node, 0),
                None => Boundary::new(root, 0),
            }
        };

        let start_point = resolve_start(start);
        if start == end {
            return Ok(Self::collapsed(start_point));
        }
        Ok(Self::new(start_point, resolve_end(end)))
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Both boundaries exist, share a root, sit within bounds and are ordered.
    pub fn is_valid(&self, tree: &Tree) -> bool {
        let in_bounds = |point: Boundary| {
            tree.contains(point.node)
                && point.offset <= tree.node_len(point.node)
                && tree
                    .text(point.node)
                    .is_none_or(|text| text.is_char_boundary(point.offset))
        };
        in_bounds(self.start)
            && in_bounds(self.end)
            && tree.root(self.start.node) == tree.root(self.end.node)
            && compare_points(tree, self.start, self.end) != Ordering::Greater
    }

    pub fn common_ancestor(&self, tree: &Tree) -> NodeId {
        let mut current = Some(self.start.node);
        while let Some(node) = current {
            if tree.is_inclusive_ancestor(node, self.end.node) {
                return node;
            }
            current = tree.parent(node);
        }
        tree.root(self.start.node)
    }

    /// START_TO_START comparison: how this range's start sits relative to
    /// `other`'s start.
    pub fn compare_start_to_start(&self, tree: &Tree, other: &Range) -> Ordering {
        compare_points(tree, self.start, other.start)
    }

    pub fn compare_end_to_end(&self, tree: &Tree, other: &Range) -> Ordering {
        compare_points(tree, self.end, other.end)
    }

    /// Text nodes touched by the range with the selected byte span of each.
    pub fn selected_text_nodes(&self, tree: &Tree) -> Vec<(NodeId, usize, usize)> {
        if self.is_collapsed() {
            return Vec::new();
        }
        if self.start.node == self.end.node && tree.is_text(self.start.node) {
            return vec![(self.start.node, self.start.offset, self.end.offset)];
        }
        let common = self.common_ancestor(tree);
        let mut out = Vec::new();
        for node in tree.text_nodes(common) {
            let len = tree.node_len(node);
            let lo = if node == self.start.node {
                self.start.offset
            } else if compare_points(tree, Boundary::new(node, 0), self.start) != Ordering::Less {
                0
            } else {
                len
            };
            let hi = if node == self.end.node {
                self.end.offset
            } else if compare_points(tree, Boundary::new(node, len), self.end)
                != Ordering::Greater
            {
                len
            } else {
                0
            };
            if lo < hi {
                out.push((node, lo, hi));
            }
        }
        out
    }

    /// Concatenated selected text, the equivalent of `Range.toString()`.
    pub fn text(&self, tree: &Tree) -> String {
        self.selected_text_nodes(tree)
            .into_iter()
            .filter_map(|(node, lo, hi)| tree.text(node).and_then(|text| text.get(lo..hi)))
            .collect()
    }

    /// Node is an inclusive ancestor of exactly one boundary node.
    pub fn partially_contains(&self, tree: &Tree, node: NodeId) -> bool {
        tree.is_inclusive_ancestor(node, self.start.node)
            != tree.is_inclusive_ancestor(node, self.end.node)
    }

    pub fn contains_node(&self, tree: &Tree, node: NodeId) -> bool {
        tree.root(node) == tree.root(self.start.node)
            && compare_points(tree, Boundary::new(node, 0), self.start) == Ordering::Greater
            && compare_points(tree, Boundary::new(node, tree.node_len(node)), self.end)
                == Ordering::Less
    }

    /// Moves the selected content into a new fragment and collapses the
    /// range where the content used to be. Partially selected elements are
    /// split: the original keeps the unselected part and a shallow clone
    /// carries the selected part.
    pub fn extract_contents(&mut self, tree: &mut Tree) -> Result<NodeId, RangeError> {
        let fragment = tree.create_fragment();
        if self.is_collapsed() {
            return Ok(fragment);
        }
        let Range { start, end } = *self;

        if start.node == end.node && tree.is_text(start.node) {
            let text = tree.substring(start.node, start.offset, end.offset)?;
            let clone = tree.clone_node(start.node, false);
            tree.set_text(clone, text);
            tree.append_child(fragment, clone)?;
            tree.delete_text(start.node, start.offset, end.offset)?;
            self.end = start;
            return Ok(fragment);
        }

        let common = self.common_ancestor(tree);
        let common_children = tree.children(common).to_vec();
        let first_partial = if tree.is_inclusive_ancestor(start.node, end.node) {
            None
        } else {
            common_children
                .iter()
                .copied()
                .find(|child| self.partially_contains(tree, *child))
        };
        let last_partial = if tree.is_inclusive_ancestor(end.node, start.node) {
            None
        } else {
            common_children
                .iter()
                .rev()
                .copied()
                .find(|child| self.partially_contains(tree, *child))
        };
        let contained: Vec<NodeId> = common_children
            .iter()
            .copied()
            .filter(|child| self.contains_node(tree, *child))
            .collect();

        let collapse_to = if tree.is_inclusive_ancestor(start.node, end.node) {
            start
        } else {
            let mut reference = start.node;
            loop {
                let parent = tree.parent(reference).ok_or(RangeError::InvalidState)?;
                if tree.is_inclusive_ancestor(parent, end.node) {
                    let index = tree.index_of(reference).ok_or(RangeError::NodeNotFound)?;
                    break Boundary::new(parent, index + 1);
                }
                reference = parent;
            }
        };

        if let Some(first) = first_partial {
            if tree.is_text(first) {
                let len = tree.node_len(first);
                let text = tree.substring(first, start.offset, len)?;
                let clone = tree.clone_node(first, false);
                tree.set_text(clone, text);
                tree.append_child(fragment, clone)?;
                tree.delete_text(first, start.offset, len)?;
            } else {
                let clone = tree.clone_node(first, false);
                tree.append_child(fragment, clone)?;
                let mut sub = Range::new(start, Boundary::new(first, tree.node_len(first)));
                let sub_fragment = sub.extract_contents(tree)?;
                tree.append_child(clone, sub_fragment)?;
            }
        }

        for child in contained {
            tree.append_child(fragment, child)?;
        }

        if let Some(last) = last_partial {
            if tree.is_text(last) {
                let text = tree.substring(last, 0, end.offset)?;
                let clone = tree.clone_node(last, false);
                tree.set_text(clone, text);
                tree.append_child(fragment, clone)?;
                tree.delete_text(last, 0, end.offset)?;
            } else {
                let clone = tree.clone_node(last, false);
                tree.append_child(fragment, clone)?;
                let mut sub = Range::new(Boundary::new(last, 0), end);
                let sub_fragment = sub.extract_contents(tree)?;
                tree.append_child(clone, sub_fragment)?;
            }
        }

        *self = Range::collapsed(collapse_to);
        Ok(fragment)
    }

    /// Inserts `node` at the start boundary, splitting a text node if the
    /// boundary falls inside one. A collapsed range grows to cover the
    /// inserted node (or the fragment's children).
    pub fn insert_node(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), RangeError> {
        let start = self.start;
        if start.node == node || tree.is_inclusive_ancestor(node, start.node) {
            return Err(RangeError::HierarchyRequest);
        }
        let (parent, mut reference) = if tree.is_text(start.node) {
            let parent = tree.parent(start.node).ok_or(RangeError::HierarchyRequest)?;
            let tail = tree.split_text(start.node, start.offset)?;
            if self.end.node == start.node && self.end.offset > start.offset {
                self.end = Boundary::new(tail, self.end.offset - start.offset);
            }
            (parent, Some(tail))
        } else {
            (start.node, tree.child(start.node, start.offset))
        };

        if reference == Some(node) {
            reference = tree.next_sibling(node);
        }
        tree.detach(node);

        let mut new_offset = match reference {
            Some(reference) => tree.index_of(reference).ok_or(RangeError::NodeNotFound)?,
            None => tree.node_len(parent),
        };
        new_offset += if tree.is_fragment(node) {
            tree.children(node).len()
        } else {
            1
        };

        let was_collapsed = self.is_collapsed();
        tree.insert_before(parent, node, reference)?;
        if was_collapsed {
            self.end = Boundary::new(parent, new_offset);
        }
        Ok(())
    }

    /// Wraps the selected content in `new_parent` and selects it.
    ///
    /// Fails when an element (not a text node) is only partially selected.
    pub fn surround_contents(
        &mut self,
        tree: &mut Tree,
        new_parent: NodeId,
    ) -> Result<(), RangeError> {
        if !tree.is_element(new_parent) {
            return Err(RangeError::InvalidState);
        }
        let common = self.common_ancestor(tree);
        for boundary in [self.start.node, self.end.node] {
            let splits_element = std::iter::once(boundary)
                .chain(tree.ancestors(boundary))
                .take_while(|node| *node != common)
                .any(|node| !tree.is_text(node) && self.partially_contains(tree, node));
            if splits_element {
                return Err(RangeError::InvalidState);
            }
        }

        let fragment = self.extract_contents(tree)?;
        for child in tree.children(new_parent).to_vec() {
            tree.detach(child);
        }
        self.insert_node(tree, new_parent)?;
        tree.append_child(new_parent, fragment)?;
        *self = Range::select_node(tree, new_parent)?;
        Ok(())
    }
}

/// Orders two boundary points in document order.
pub fn compare_points(tree: &Tree, a: Boundary, b: Boundary) -> Ordering {
    if a.node == b.node {
        return a.offset.cmp(&b.offset);
    }
    if tree.path(a.node) > tree.path(b.node) {
        return compare_points(tree, b, a).reverse();
    }
    if tree.is_inclusive_ancestor(a.node, b.node) {
        let mut child = b.node;
        while let Some(parent) = tree.parent(child) {
            if parent == a.node {
                break;
            }
            child = parent;
        }
        if tree.index_of(child).is_some_and(|index| index < a.offset) {
            return Ordering::Greater;
        }
    }
    Ordering::Less
}
