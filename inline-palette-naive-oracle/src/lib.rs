//! A naive, per-character oracle for differential testing.
//!
//! Colours live on each grapheme directly, so applying or clearing a channel
//! over a span is a plain loop. The tree-based implementation must always
//! agree with it on the colour every grapheme ends up with.
use inline_palette::{Channel, Document, NodeId, StyleHost, TOKEN_MARKER, Tree};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharStyle {
    pub color: Option<String>,
    pub background_color: Option<String>,
}

impl CharStyle {
    pub fn get(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Text => self.color.as_deref(),
            Channel::Background => self.background_color.as_deref(),
        }
    }

    fn slot(&mut self, channel: Channel) -> &mut Option<String> {
        match channel {
            Channel::Text => &mut self.color,
            Channel::Background => &mut self.background_color,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    graphemes: Vec<(String, CharStyle)>,
}

impl StyledText {
    pub fn from_plain(text: &str) -> Self {
        Self {
            graphemes: text
                .graphemes(true)
                .map(|g| (g.to_string(), CharStyle::default()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.graphemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphemes.is_empty()
    }

    pub fn text(&self) -> String {
        self.graphemes.iter().map(|(g, _)| g.as_str()).collect()
    }

    pub fn apply(&mut self, start: usize, end: usize, channel: Channel, color: &str) {
        let end = end.min(self.graphemes.len());
        for (_, style) in self.graphemes.iter_mut().take(end).skip(start) {
            *style.slot(channel) = Some(color.to_string());
        }
    }

    pub fn reset(&mut self, start: usize, end: usize, channel: Channel) {
        let end = end.min(self.graphemes.len());
        for (_, style) in self.graphemes.iter_mut().take(end).skip(start) {
            *style.slot(channel) = None;
        }
    }

    pub fn styles(&self) -> Vec<CharStyle> {
        self.graphemes.iter().map(|(_, style)| style.clone()).collect()
    }
}

/// Colour each grapheme of `doc` displays: per channel, the value of the
/// innermost token that sets it.
///
/// Graphemes are counted per text node.
pub fn effective_styles(doc: &Document) -> Vec<CharStyle> {
    let tree = doc.tree();
    let mut out = Vec::new();
    for node in tree.text_nodes(doc.block()) {
        let Some(text) = tree.text(node) else {
            continue;
        };
        let style = style_at(tree, doc.block(), node);
        out.extend(text.graphemes(true).map(|_| style.clone()));
    }
    out
}

fn style_at(tree: &Tree, block: NodeId, node: NodeId) -> CharStyle {
    let mut style = CharStyle::default();
    for ancestor in tree.ancestors(node) {
        if ancestor == block {
            break;
        }
        let Some(element) = tree.element(ancestor) else {
            continue;
        };
        if !TOKEN_MARKER.matches(element) {
            continue;
        }
        for channel in Channel::ALL {
            let slot = style.slot(channel);
            if slot.is_none() {
                *slot = element.style.get(channel).map(str::to_string);
            }
        }
    }
    style
}
