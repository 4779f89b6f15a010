//! Header strip display settings.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Font family used for the header title and clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFont {
    #[default]
    Sans,
    Serif,
    Mono,
    Georgia,
    Courier,
    Trebuchet,
    Comic,
    Times,
    Verdana,
}

impl HeaderFont {
    pub const ALL: [HeaderFont; 9] = [
        HeaderFont::Sans,
        HeaderFont::Serif,
        HeaderFont::Mono,
        HeaderFont::Georgia,
        HeaderFont::Courier,
        HeaderFont::Trebuchet,
        HeaderFont::Comic,
        HeaderFont::Times,
        HeaderFont::Verdana,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderFont::Sans => "sans",
            HeaderFont::Serif => "serif",
            HeaderFont::Mono => "mono",
            HeaderFont::Georgia => "georgia",
            HeaderFont::Courier => "courier",
            HeaderFont::Trebuchet => "trebuchet",
            HeaderFont::Comic => "comic",
            HeaderFont::Times => "times",
            HeaderFont::Verdana => "verdana",
        }
    }

    /// Human-readable family name
    pub fn display_name(&self) -> &'static str {
        match self {
            HeaderFont::Sans => "Sans-serif",
            HeaderFont::Serif => "Serif",
            HeaderFont::Mono => "Monospace",
            HeaderFont::Georgia => "Georgia",
            HeaderFont::Courier => "Courier New",
            HeaderFont::Trebuchet => "Trebuchet MS",
            HeaderFont::Comic => "Comic Sans MS",
            HeaderFont::Times => "Times New Roman",
            HeaderFont::Verdana => "Verdana",
        }
    }
}

impl fmt::Display for HeaderFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderFont {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|font| font.as_str() == s)
            .ok_or_else(|| format!("Unknown header font: {}", s))
    }
}

/// Unknown or malformed font names fall back to sans
fn deserialize_font_lenient<'de, D>(deserializer: D) -> Result<HeaderFont, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|name| name.parse().ok())
        .unwrap_or_default())
}

fn default_true() -> bool {
    true
}

/// Header visibility and font settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSettings {
    #[serde(default = "default_true")]
    pub show_title: bool,
    #[serde(default = "default_true")]
    pub show_clock: bool,
    #[serde(default = "default_true")]
    pub show_date: bool,
    #[serde(default, deserialize_with = "deserialize_font_lenient")]
    pub header_font: HeaderFont,
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            show_title: true,
            show_clock: true,
            show_date: true,
            header_font: HeaderFont::Sans,
        }
    }
}
