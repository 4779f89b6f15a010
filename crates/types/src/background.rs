//! Dashboard background configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Background mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BackgroundMode {
    /// Use the active theme's background
    #[serde(rename = "theme")]
    #[default]
    Theme,
    #[serde(rename = "solid")]
    Solid,
    #[serde(rename = "gradient")]
    Gradient,
    /// User-supplied image URL
    #[serde(rename = "custom")]
    Custom,
}

impl BackgroundMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundMode::Theme => "theme",
            BackgroundMode::Solid => "solid",
            BackgroundMode::Gradient => "gradient",
            BackgroundMode::Custom => "custom",
        }
    }
}

impl fmt::Display for BackgroundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackgroundMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "theme" => Ok(BackgroundMode::Theme),
            "solid" => Ok(BackgroundMode::Solid),
            "gradient" => Ok(BackgroundMode::Gradient),
            "custom" => Ok(BackgroundMode::Custom),
            other => Err(format!("Unknown background mode: {}", other)),
        }
    }
}

/// Payload of the active background mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BackgroundPayload {
    #[serde(rename = "theme")]
    Theme,
    #[serde(rename = "solid")]
    Solid { color: String },
    #[serde(rename = "gradient")]
    Gradient { preset: String },
    #[serde(rename = "custom")]
    Custom { url: String },
}

/// Default solid background color
pub const DEFAULT_BG_COLOR: &str = "#0f172a";

/// Default gradient preset key
pub const DEFAULT_BG_GRADIENT: &str = "midnight";

/// Background configuration.
///
/// Every mode keeps its own payload so switching modes does not lose the
/// other modes' values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackgroundConfig {
    pub mode: BackgroundMode,
    pub color: String,
    pub gradient: String,
    pub image_url: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            mode: BackgroundMode::Theme,
            color: DEFAULT_BG_COLOR.to_string(),
            gradient: DEFAULT_BG_GRADIENT.to_string(),
            image_url: String::new(),
        }
    }
}

impl BackgroundConfig {
    /// Payload for the current mode.
    ///
    /// A custom mode without an image URL falls back to the theme.
    pub fn active(&self) -> BackgroundPayload {
        match self.mode {
            BackgroundMode::Theme => BackgroundPayload::Theme,
            BackgroundMode::Solid => BackgroundPayload::Solid {
                color: self.color.clone(),
            },
            BackgroundMode::Gradient => BackgroundPayload::Gradient {
                preset: self.gradient.clone(),
            },
            BackgroundMode::Custom if self.image_url.trim().is_empty() => BackgroundPayload::Theme,
            BackgroundMode::Custom => BackgroundPayload::Custom {
                url: self.image_url.clone(),
            },
        }
    }
}

/// Returns true for `#rgb` and `#rrggbb` colors
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("gradient".parse::<BackgroundMode>(), Ok(BackgroundMode::Gradient));
        assert!("video".parse::<BackgroundMode>().is_err());
    }

    #[test]
    fn test_custom_without_url_uses_theme() {
        let config = BackgroundConfig {
            mode: BackgroundMode::Custom,
            ..Default::default()
        };
        assert_eq!(config.active(), BackgroundPayload::Theme);
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#0f172a"));
        assert!(is_hex_color("#FFF"));
        assert!(!is_hex_color("0f172a"));
        assert!(!is_hex_color("#12345g"));
    }
}
