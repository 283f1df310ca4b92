//! inline-palette: two-channel inline colour styling for rich-text selections.
//!
//! Given a selection over a tree of inline content, the crate rewrites the
//! tree so that exactly the selected characters gain or lose a foreground
//! (`color`) or background (`background-color`) colour. Styling outside the
//! selection is preserved and no empty wrappers are left behind. It includes:
//!
//! - **Core model** - arena tree, DOM-style ranges and the colour channels
//! - **Document model** - host trait, in-memory document, HTML reader/writer
//!   and the colour operations
//! - **Tool** - action panel model and configuration for an editor toolbar
//!
//! # Quick Start
//!
//! ```rust
//! use inline_palette::{Channel, Document};
//!
//! let mut doc = Document::from_html("abcdef").unwrap();
//! let mut range = doc.range(2, 4).unwrap();
//! doc.apply_style(&mut range, Channel::Text, "green").unwrap();
//!
//! assert_eq!(
//!     doc.to_html(),
//!     "ab<span class=\"ce-inline-tool--color__token\" style=\"color: green;\">cd</span>ef"
//! );
//! ```

// Arena tree, ranges and styles
pub mod core;

// Host model and colour operations
pub mod doc;

// Toolbar facade and configuration
pub mod tool;

// Re-export core types
pub use core::range::{Boundary, Range};
pub use core::{Channel, ElementData, InlineStyle, Marker, NodeData, NodeId, RangeError, Tree};

// Re-export doc types
pub use doc::{
    Document, EditError, ParseError, StyleHost, StyleOutcome, TOKEN_MARKER, apply_style,
    reset_style,
};

// Re-export tool types
pub use tool::{
    ActionItem, ActionPanel, ActionSection, ColorChoice, ColorSource, ColorTool, ConfigError,
    PaletteConfig, PendingEdit, ToolConfig,
};
