//! Inline content host model and the colour editing API.
//!
//! This module provides the host-facing half of the crate: the
//! [`StyleHost`] capability the editing algorithm depends on, the in-memory
//! [`Document`] implementing it, and the colour operations themselves.

use crate::core::range::Range;
use crate::core::{Channel, ElementData, Marker, NodeId, RangeError, Tree};

pub mod color_ops;
pub mod html;
pub mod predicates;
pub mod walker;

pub use color_ops::{apply_style, reset_style};
pub use html::ParseError;
pub use predicates::{DEFAULT_BLOCK_MARKER, TOKEN_MARKER};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("node not found")]
    NodeNotFound,
    #[error("invalid offset")]
    InvalidOffset,
    #[error("invalid grapheme boundary")]
    InvalidGraphemeBoundary,
    #[error("hierarchy request error")]
    HierarchyRequest,
    #[error("invalid range state")]
    InvalidState,
    #[error("structural inconsistency: {0}")]
    StructuralInconsistency(&'static str),
}

impl From<RangeError> for EditError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::NodeNotFound => EditError::NodeNotFound,
            RangeError::InvalidOffset => EditError::InvalidOffset,
            RangeError::HierarchyRequest => EditError::HierarchyRequest,
            RangeError::InvalidState => EditError::InvalidState,
        }
    }
}

/// What a colour operation did to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleOutcome {
    Unchanged,
    /// An existing token matching the selection was restyled in place.
    Restyled { token: NodeId },
    /// A text-only selection was surrounded by a new token.
    Wrapped { token: NodeId },
    /// A multi-node selection was moved into a token, new or reused.
    Merged { token: NodeId, reused: bool },
    /// A channel was cleared without splitting; `token` is the farthest
    /// token when the whole of it was selected.
    Cleared { token: Option<NodeId> },
    /// The farthest token was split around the selection.
    Split {
        before: Option<NodeId>,
        selected: NodeId,
        after: Option<NodeId>,
    },
}

impl StyleOutcome {
    /// Token created for this edit, which later channel changes in the same
    /// interaction should target directly.
    pub fn created_token(&self) -> Option<NodeId> {
        match self {
            StyleOutcome::Wrapped { token } | StyleOutcome::Merged { token, .. } => Some(*token),
            _ => None,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, StyleOutcome::Unchanged)
    }
}

/// Narrow capability interface the colour operations run against.
pub trait StyleHost {
    fn tree(&self) -> &Tree;

    fn tree_mut(&mut self) -> &mut Tree;

    /// Marker of the structural block container ancestor walks stop at.
    fn block_marker(&self) -> &Marker;

    /// Whether `node` is part of the live content. Ranges touching anything
    /// else are ignored.
    fn is_attached(&self, node: NodeId) -> bool {
        self.tree().contains(node)
    }

    /// Nearest inclusive ancestor of `from` matching `marker`, within the
    /// enclosing block.
    fn find_nearest_ancestor(&self, from: NodeId, marker: &Marker) -> Option<NodeId> {
        predicates::nearest_matching(self.tree(), from, marker, self.block_marker())
    }
}

/// In-memory host: one block container holding inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    tree: Tree,
    block: NodeId,
    block_marker: Marker,
}

impl Document {
    pub fn new() -> Self {
        Self::with_block_marker(DEFAULT_BLOCK_MARKER)
    }

    pub fn with_block_marker(block_marker: Marker) -> Self {
        let mut tree = Tree::new();
        let element = ElementData::new(&block_marker.tag).with_class(block_marker.class.to_string());
        let block = tree.create_element(element);
        Self {
            tree,
            block,
            block_marker,
        }
    }

    pub fn from_html(html: &str) -> Result<Self, ParseError> {
        let mut doc = Self::new();
        html::parse_into(&mut doc.tree, doc.block, html)?;
        Ok(doc)
    }

    pub fn block(&self) -> NodeId {
        self.block
    }

    /// Inner HTML of the block.
    pub fn to_html(&self) -> String {
        html::serialize_children(&self.tree, self.block)
    }

    pub fn text(&self) -> String {
        self.tree.text_content(self.block)
    }

    /// Range over grapheme offsets `start..end` of the block text.
    pub fn range(&self, start: usize, end: usize) -> Result<Range, EditError> {
        Range::from_grapheme_offsets(&self.tree, self.block, start, end).map_err(|err| match err {
            RangeError::InvalidOffset => EditError::InvalidGraphemeBoundary,
            other => other.into(),
        })
    }

    pub fn apply_style(
        &mut self,
        range: &mut Range,
        channel: Channel,
        color: &str,
    ) -> Result<StyleOutcome, EditError> {
        apply_style(self, range, channel, color)
    }

    pub fn reset_style(
        &mut self,
        range: &mut Range,
        channel: Channel,
    ) -> Result<StyleOutcome, EditError> {
        reset_style(self, range, channel)
    }

    /// Elements under the block with no meaningful content.
    pub fn empty_elements(&self) -> Vec<NodeId> {
        self.tree
            .descendants(self.block)
            .into_iter()
            .filter(|node| {
                *node != self.block
                    && self.tree.is_element(*node)
                    && predicates::is_empty(&self.tree, *node, true)
            })
            .collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleHost for Document {
    fn tree(&self) -> &Tree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    fn block_marker(&self) -> &Marker {
        &self.block_marker
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.tree.contains(node) && self.tree.is_inclusive_ancestor(self.block, node)
    }
}
