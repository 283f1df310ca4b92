//! Tool configuration.
//!
//! [`ToolConfig`] is what a host hands over (usually JSON); [`PaletteConfig`]
//! is the normalized form the action panel is rendered from. Unusable values
//! fall back to the built-in defaults with a warning instead of failing.

use crate::core::Channel;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

pub const DEFAULT_FRONT_COLORS: [&str; 11] = [
    "#8c8c8c", "#5c5c5c", "#a3431f", "#f06b05", "#dfab01", "#038766", "#0575c5", "#4a52c7",
    "#8831cc", "#c815b6", "#e91e2c",
];

pub const DEFAULT_BACKGROUND_COLORS: [&str; 11] = [
    "#f1f1f1", "#dedede", "#edd9d2", "#fce1cd", "#fcf4cc", "#cde7e0", "#cde3f3", "#dbdcf4",
    "#e7d6f5", "#f4d0f0", "#fbd2d5",
];

pub const DEFAULT_FRONT_COLOR_LABEL: &str = "front color";
pub const DEFAULT_BACKGROUND_COLOR_LABEL: &str = "background color";
pub const DEFAULT_ITEM_LABEL: &str = "clear";
pub const DEFAULT_SHORTCUT: &str = "Ctrl+J";
pub const DEFAULT_TITLE: &str = "pallette";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

type ColorReceiver = Box<dyn Fn(Vec<String>) -> Option<Vec<String>>>;

/// Where a channel's colour list comes from.
#[derive(Default)]
pub enum ColorSource {
    #[default]
    Default,
    /// The channel is switched off and gets no panel section.
    Disabled,
    List(Vec<String>),
    /// Called with a copy of the defaults; `None` disables the channel.
    Receiver(ColorReceiver),
    /// Anything else found in the input; resolves to the defaults.
    Invalid(Value),
}

impl ColorSource {
    pub fn receiver(receiver: impl Fn(Vec<String>) -> Option<Vec<String>> + 'static) -> Self {
        ColorSource::Receiver(Box::new(receiver))
    }

    pub fn resolve(&self, channel: Channel) -> Option<Vec<String>> {
        let defaults = || default_colors(channel).iter().map(|c| c.to_string()).collect();
        match self {
            ColorSource::Default => Some(defaults()),
            ColorSource::Disabled => None,
            ColorSource::List(colors) => Some(colors.clone()),
            ColorSource::Receiver(receiver) => receiver(defaults()),
            ColorSource::Invalid(value) => {
                tracing::warn!(%channel, %value, "unusable colour list, using defaults");
                Some(defaults())
            }
        }
    }
}

impl fmt::Debug for ColorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorSource::Default => f.write_str("Default"),
            ColorSource::Disabled => f.write_str("Disabled"),
            ColorSource::List(colors) => f.debug_tuple("List").field(colors).finish(),
            ColorSource::Receiver(_) => f.write_str("Receiver(..)"),
            ColorSource::Invalid(value) => f.debug_tuple("Invalid").field(value).finish(),
        }
    }
}

impl<'de> Deserialize<'de> for ColorSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null | Value::Bool(true) => ColorSource::Default,
            Value::Bool(false) => ColorSource::Disabled,
            Value::Array(items) if items.iter().all(Value::is_string) => ColorSource::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(color) => Some(color),
                        _ => None,
                    })
                    .collect(),
            ),
            other => ColorSource::Invalid(other),
        })
    }
}

pub fn default_colors(channel: Channel) -> &'static [&'static str] {
    match channel {
        Channel::Text => &DEFAULT_FRONT_COLORS,
        Channel::Background => &DEFAULT_BACKGROUND_COLORS,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolConfig {
    pub front_colors: ColorSource,
    pub background_colors: ColorSource,
    pub front_color_label: Option<String>,
    pub background_color_label: Option<String>,
    #[serde(alias = "defaultItemLable")]
    pub default_item_label: Option<String>,
    pub shortcut: Option<String>,
    pub title: Option<String>,
}

impl ToolConfig {
    /// Parses JSON config. A document that is not an object yields the
    /// defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            tracing::warn!(%value, "config is not an object, using defaults");
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn colors(&self, channel: Channel) -> &ColorSource {
        match channel {
            Channel::Text => &self.front_colors,
            Channel::Background => &self.background_colors,
        }
    }

    pub fn resolve(&self) -> PaletteConfig {
        let or_default = |value: &Option<String>, default: &str| {
            value.clone().unwrap_or_else(|| default.to_string())
        };
        PaletteConfig {
            front_colors: self.front_colors.resolve(Channel::Text),
            background_colors: self.background_colors.resolve(Channel::Background),
            front_color_label: or_default(&self.front_color_label, DEFAULT_FRONT_COLOR_LABEL),
            background_color_label: or_default(
                &self.background_color_label,
                DEFAULT_BACKGROUND_COLOR_LABEL,
            ),
            default_item_label: or_default(&self.default_item_label, DEFAULT_ITEM_LABEL),
            shortcut: or_default(&self.shortcut, DEFAULT_SHORTCUT),
            title: or_default(&self.title, DEFAULT_TITLE),
        }
    }
}

/// Normalized configuration. A `None` colour list means the channel is
/// disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteConfig {
    pub front_colors: Option<Vec<String>>,
    pub background_colors: Option<Vec<String>>,
    pub front_color_label: String,
    pub background_color_label: String,
    pub default_item_label: String,
    pub shortcut: String,
    pub title: String,
}

impl PaletteConfig {
    pub fn colors(&self, channel: Channel) -> Option<&[String]> {
        match channel {
            Channel::Text => self.front_colors.as_deref(),
            Channel::Background => self.background_colors.as_deref(),
        }
    }

    pub fn label(&self, channel: Channel) -> &str {
        match channel {
            Channel::Text => &self.front_color_label,
            Channel::Background => &self.background_color_label,
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        ToolConfig::default().resolve()
    }
}
