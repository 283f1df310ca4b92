//! Arena-backed inline content tree.
//!
//! This module provides the in-memory tree the colour operations edit:
//!
//! - [`Tree`] - node arena addressed by stable [`NodeId`]s
//! - [`NodeData`] and [`ElementData`] - text, element and fragment payloads
//! - [`Marker`] - tag + class pair identifying a family of elements
//! - [`range`] - DOM-style range algebra over the tree
//! - [`style`] - the two inline colour channels

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

pub mod range;
pub mod style;

pub use style::{Channel, InlineStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("node not found")]
    NodeNotFound,
    #[error("invalid offset")]
    InvalidOffset,
    #[error("hierarchy request error")]
    HierarchyRequest,
    #[error("invalid range state")]
    InvalidState,
}

/// Tag name plus class identifying a family of elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marker {
    pub tag: Cow<'static, str>,
    pub class: Cow<'static, str>,
}

impl Marker {
    pub const fn new_static(tag: &'static str, class: &'static str) -> Self {
        Self {
            tag: Cow::Borrowed(tag),
            class: Cow::Borrowed(class),
        }
    }

    pub fn new(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            tag: Cow::Owned(tag.into().to_ascii_lowercase()),
            class: Cow::Owned(class.into()),
        }
    }

    pub fn matches(&self, element: &ElementData) -> bool {
        element.tag.eq_ignore_ascii_case(&self.tag) && element.has_class(&self.class)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub classes: Vec<String>,
    pub style: InlineStyle,
    pub attributes: BTreeMap<String, String>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Detached container whose children move as a group when inserted.
    Fragment,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Saved copy of the nodes under one root plus the arena length. Restoring
/// it undoes any edit confined to that root.
#[derive(Debug, Clone)]
pub struct Snapshot {
    len: usize,
    nodes: Vec<(NodeId, Node)>,
}

/// Node arena. Removing a node only detaches it, so ids stay valid for the
/// lifetime of the tree.
///
/// Accessors panic when given an id minted by a different tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn len_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Copies the subtree under `root` only; detached nodes elsewhere in the
    /// arena are left out.
    pub fn snapshot(&self, root: NodeId) -> Snapshot {
        Snapshot {
            len: self.nodes.len(),
            nodes: self
                .descendants(root)
                .into_iter()
                .map(|id| (id, self.nodes[id.index()].clone()))
                .collect(),
        }
    }

    /// Drops nodes allocated after `snapshot` was taken and puts the saved
    /// nodes back.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.nodes.truncate(snapshot.len);
        for (id, node) in snapshot.nodes {
            self.nodes[id.index()] = node;
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, element: ElementData) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeData::Fragment)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()].data
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.index()].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.index()].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index()].data, NodeData::Text(_))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index()].data, NodeData::Element(_))
    }

    pub fn is_fragment(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index()].data, NodeData::Fragment)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    pub fn child_element_count(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .filter(|child| self.is_element(**child))
            .count()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        index
            .checked_sub(1)
            .and_then(|prev| self.child(parent, prev))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        self.child(parent, index + 1)
    }

    /// DOM node length: bytes for text, child count otherwise.
    pub fn node_len(&self, id: NodeId) -> usize {
        match &self.nodes[id.index()].data {
            NodeData::Text(text) => text.len(),
            _ => self.children(id).len(),
        }
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |node| self.parent(*node))
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        ancestor == of || self.ancestors(of).any(|node| node == ancestor)
    }

    pub fn root(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Inclusive descendants of `id` in tree order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|node| self.is_text(*node))
            .collect()
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Child-index path from the root, used for tree-order comparison.
    pub(crate) fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_of(current) {
            path.push(index);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let NodeData::Text(text) = &mut self.nodes[id.index()].data {
            *text = value.into();
        }
    }

    pub fn substring(&self, id: NodeId, start: usize, end: usize) -> Result<String, RangeError> {
        let text = self.text(id).ok_or(RangeError::InvalidState)?;
        text.get(start..end)
            .map(str::to_string)
            .ok_or(RangeError::InvalidOffset)
    }

    pub fn delete_text(&mut self, id: NodeId, start: usize, end: usize) -> Result<(), RangeError> {
        let NodeData::Text(text) = &mut self.nodes[id.index()].data else {
            return Err(RangeError::InvalidState);
        };
        if start > end
            || end > text.len()
            || !text.is_char_boundary(start)
            || !text.is_char_boundary(end)
        {
            return Err(RangeError::InvalidOffset);
        }
        text.replace_range(start..end, "");
        Ok(())
    }

    /// Splits a text node at `offset`, inserting the tail as the next sibling.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, RangeError> {
        let len = self.node_len(id);
        let tail = self.substring(id, offset, len)?;
        let new_node = self.create_text(tail);
        if let Some(parent) = self.parent(id) {
            let reference = self.next_sibling(id);
            self.insert_before(parent, new_node, reference)?;
        }
        self.delete_text(id, offset, len)?;
        Ok(new_node)
    }

    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let data = self.nodes[id.index()].data.clone();
        let clone = self.alloc(data);
        if deep {
            for child in self.children(id).to_vec() {
                let child_clone = self.clone_node(child, true);
                self.attach(clone, child_clone, None);
            }
        }
        clone
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()]
                .children
                .retain(|child| *child != id);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), RangeError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `child` before `reference` (or last). A fragment moves its
    /// children instead of itself.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), RangeError> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(RangeError::NodeNotFound);
        }
        if self.is_text(parent) || self.is_inclusive_ancestor(child, parent) {
            return Err(RangeError::HierarchyRequest);
        }
        if let Some(reference) = reference
            && self.parent(reference) != Some(parent)
        {
            return Err(RangeError::NodeNotFound);
        }
        let reference = if reference == Some(child) {
            self.next_sibling(child)
        } else {
            reference
        };

        if self.is_fragment(child) {
            for moved in self.children(child).to_vec() {
                self.detach(moved);
                self.attach(parent, moved, reference);
            }
        } else {
            self.detach(child);
            self.attach(parent, child, reference);
        }
        Ok(())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let position = reference
            .and_then(|reference| {
                self.children(parent)
                    .iter()
                    .position(|existing| *existing == reference)
            })
            .unwrap_or(self.children(parent).len());
        self.nodes[parent.index()].children.insert(position, child);
        self.nodes[child.index()].parent = Some(parent);
    }
}
