//! Inline colour tool: the action panel model and the glue between a colour
//! click and the colour operations.

use crate::core::range::Range;
use crate::core::{Channel, NodeId};
use crate::doc::predicates::{TOKEN_MARKER, set_style};
use crate::doc::walker::{WalkMode, walk};
use crate::doc::{StyleHost, StyleOutcome, apply_style, reset_style};
use serde::Serialize;
use std::collections::BTreeMap;

pub mod config;

pub use config::{ColorSource, ConfigError, PaletteConfig, ToolConfig};

/// What a panel item asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum ColorChoice {
    Color(String),
    Clear,
}

/// Selection and token carried between clicks of one interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingEdit {
    pub range: Option<Range>,
    /// Token created by this interaction; later colour picks restyle it
    /// directly.
    pub token: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionItem {
    pub label: Option<String>,
    pub choice: ColorChoice,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSection {
    pub channel: Channel,
    pub label: String,
    pub items: Vec<ActionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPanel {
    pub hidden: bool,
    pub sections: Vec<ActionSection>,
}

impl ActionPanel {
    pub fn section(&self, channel: Channel) -> Option<&ActionSection> {
        self.sections.iter().find(|section| section.channel == channel)
    }
}

#[derive(Debug)]
pub struct ColorTool {
    config: PaletteConfig,
    pending: PendingEdit,
    show_actions: bool,
    panel: Option<ActionPanel>,
}

impl ColorTool {
    pub fn new(config: &ToolConfig) -> Self {
        Self::with_palette(config.resolve())
    }

    pub fn with_palette(config: PaletteConfig) -> Self {
        Self {
            config,
            pending: PendingEdit::default(),
            show_actions: false,
            panel: None,
        }
    }

    pub const fn is_inline() -> bool {
        true
    }

    /// Tags the host sanitizer must keep.
    pub fn sanitize_rules() -> BTreeMap<String, bool> {
        BTreeMap::from([(TOKEN_MARKER.tag.to_string(), true)])
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn shortcut(&self) -> &str {
        &self.config.shortcut
    }

    pub fn palette(&self) -> &PaletteConfig {
        &self.config
    }

    pub fn pending(&self) -> &PendingEdit {
        &self.pending
    }

    /// The tool is reported active while the selection is collapsed.
    pub fn check_state(&self, collapsed: bool) -> bool {
        collapsed
    }

    /// Starts a new interaction on `range`; a token from an earlier one is
    /// no longer targeted.
    pub fn surround(&mut self, range: Range) {
        self.toggle_actions(None);
        self.pending = PendingEdit {
            range: Some(range),
            token: None,
        };
    }

    /// Ends the interaction: the stored range and token are forgotten.
    pub fn clear(&mut self) {
        self.pending = PendingEdit::default();
        self.panel = None;
    }

    /// Shows or hides the panel. Hiding it ends the interaction.
    pub fn toggle_actions(&mut self, force: Option<bool>) {
        self.show_actions = force.unwrap_or(!self.show_actions);
        if let Some(panel) = &mut self.panel {
            panel.hidden = !self.show_actions;
        }
        if !self.show_actions {
            self.pending = PendingEdit::default();
        }
    }

    pub fn shows_actions(&self) -> bool {
        self.show_actions
    }

    pub fn panel(&self) -> Option<&ActionPanel> {
        self.panel.as_ref()
    }

    /// Builds the panel, hidden, with one section per enabled channel.
    pub fn render_actions(&mut self) -> &ActionPanel {
        let sections = Channel::ALL
            .into_iter()
            .filter_map(|channel| {
                let colors = self.config.colors(channel)?;
                let clear = ActionItem {
                    label: Some(self.config.default_item_label.clone()),
                    choice: ColorChoice::Clear,
                    active: false,
                };
                let swatch_label = match channel {
                    Channel::Text => Some("A".to_string()),
                    Channel::Background => None,
                };
                let items = std::iter::once(clear)
                    .chain(colors.iter().map(|color| ActionItem {
                        label: swatch_label.clone(),
                        choice: ColorChoice::Color(color.clone()),
                        active: false,
                    }))
                    .collect();
                Some(ActionSection {
                    channel,
                    label: self.config.label(channel).to_string(),
                    items,
                })
            })
            .collect();
        self.show_actions = false;
        self.panel.insert(ActionPanel {
            hidden: true,
            sections,
        })
    }

    /// A click on item `index` of the `channel` section: the item becomes
    /// the only active one in its section and the styling is dispatched.
    pub fn handle_color_change<H: StyleHost + ?Sized>(
        &mut self,
        host: &mut H,
        channel: Channel,
        index: usize,
    ) -> StyleOutcome {
        if self.panel.is_none() {
            self.render_actions();
        }
        let Some(section) = self
            .panel
            .as_mut()
            .and_then(|panel| panel.sections.iter_mut().find(|s| s.channel == channel))
        else {
            tracing::debug!(%channel, "no panel section for channel");
            return StyleOutcome::Unchanged;
        };
        let Some(choice) = section.items.get(index).map(|item| item.choice.clone()) else {
            tracing::debug!(%channel, index, "no panel item at index");
            return StyleOutcome::Unchanged;
        };
        for (position, item) in section.items.iter_mut().enumerate() {
            item.active = position == index;
        }
        self.handle_range_styling(host, &choice, channel)
    }

    /// Applies or clears `channel` over the pending range. Failures are
    /// logged and reported as [`StyleOutcome::Unchanged`].
    pub fn handle_range_styling<H: StyleHost + ?Sized>(
        &mut self,
        host: &mut H,
        choice: &ColorChoice,
        channel: Channel,
    ) -> StyleOutcome {
        let Some(mut range) = self.pending.range else {
            return StyleOutcome::Unchanged;
        };

        let result = match choice {
            ColorChoice::Clear => reset_style(host, &mut range, channel),
            ColorChoice::Color(color) => match self.pending.token {
                Some(token) if host.is_attached(token) => {
                    let tree = host.tree_mut();
                    set_style(tree, token, channel, color);
                    walk(tree, token, channel, WalkMode::Set(color));
                    Ok(StyleOutcome::Restyled { token })
                }
                _ => apply_style(host, &mut range, channel, color),
            },
        };

        match result {
            Ok(outcome) => {
                self.pending.range = Some(range);
                if let Some(token) = outcome.created_token() {
                    self.pending.token = Some(token);
                }
                outcome
            }
            Err(err) => {
                tracing::warn!(%err, %channel, "colour change failed");
                StyleOutcome::Unchanged
            }
        }
    }
}

impl Default for ColorTool {
    fn default() -> Self {
        Self::with_palette(PaletteConfig::default())
    }
}
