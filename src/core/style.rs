//! Inline colour channels and the style block carried by token elements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two independent colour attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "textColor")]
    Text,
    #[serde(rename = "backgroundColor")]
    Background,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Text, Channel::Background];

    pub fn css_property(self) -> &'static str {
        match self {
            Channel::Text => "color",
            Channel::Background => "background-color",
        }
    }

    fn from_css_property(property: &str) -> Option<Self> {
        match property.trim().to_ascii_lowercase().as_str() {
            "color" => Some(Channel::Text),
            "background-color" => Some(Channel::Background),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Text => f.write_str("textColor"),
            Channel::Background => f.write_str("backgroundColor"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyle {
    pub color: Option<String>,
    pub background_color: Option<String>,
}

impl InlineStyle {
    pub fn get(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Text => self.color.as_deref(),
            Channel::Background => self.background_color.as_deref(),
        }
    }

    pub fn set(&mut self, channel: Channel, value: impl Into<String>) {
        let value = Some(value.into());
        match channel {
            Channel::Text => self.color = value,
            Channel::Background => self.background_color = value,
        }
    }

    pub fn clear(&mut self, channel: Channel) {
        match channel {
            Channel::Text => self.color = None,
            Channel::Background => self.background_color = None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.background_color.is_none()
    }

    /// Renders the declarations the way a `style` attribute holds them.
    pub fn to_css(&self) -> String {
        Channel::ALL
            .iter()
            .filter_map(|channel| {
                self.get(*channel)
                    .map(|value| format!("{}: {};", channel.css_property(), value))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parses a `style` attribute; declarations other than the two colour
    /// channels are dropped.
    pub fn parse_css(css: &str) -> Self {
        let mut style = Self::default();
        for declaration in css.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if let Some(channel) = Channel::from_css_property(property) {
                style.set(channel, value);
            }
        }
        style
    }
}
