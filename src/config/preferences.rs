//! Appearance and session preferences: theme, language, inactivity
//! timeout, card corner radius and background.

use log::{debug, error, warn};
use tunet_core::constants::{
    DEFAULT_CARD_BORDER_RADIUS, DEFAULT_INACTIVITY_TIMEOUT, DEFAULT_LANGUAGE, DEFAULT_THEME,
    KEY_BG_COLOR, KEY_BG_GRADIENT, KEY_BG_IMAGE, KEY_BG_MODE, KEY_CARD_BORDER_RADIUS,
    KEY_INACTIVITY_TIMEOUT, KEY_LANGUAGE, KEY_THEME,
};
use tunet_core::{ConfigStore, StoreError};
use tunet_types::background::is_hex_color;
use tunet_types::{BackgroundConfig, BackgroundMode};

use super::snapshot::{SnapshotSink, SnapshotUpdate};

/// Known themes, in toggle order
pub const THEMES: [&str; 3] = ["dark", "light", "contextual"];

/// Longest inactivity timeout offered, in seconds
pub const MAX_INACTIVITY_TIMEOUT: i64 = 300;

fn known_theme(theme: &str) -> Option<&'static str> {
    THEMES.iter().copied().find(|t| *t == theme)
}

/// Persisted user preferences
#[derive(Debug)]
pub struct Preferences {
    store: ConfigStore,
    theme: &'static str,
    language: String,
    inactivity_timeout: i64,
    card_border_radius: f64,
    background: BackgroundConfig,
    failed_writes: usize,
}

impl Preferences {
    pub const OWNED_KEYS: [&'static str; 8] = [
        KEY_THEME,
        KEY_LANGUAGE,
        KEY_INACTIVITY_TIMEOUT,
        KEY_CARD_BORDER_RADIUS,
        KEY_BG_MODE,
        KEY_BG_COLOR,
        KEY_BG_GRADIENT,
        KEY_BG_IMAGE,
    ];

    pub fn load(store: ConfigStore) -> Self {
        let mut prefs = Self {
            store,
            theme: DEFAULT_THEME,
            language: DEFAULT_LANGUAGE.to_string(),
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            card_border_radius: DEFAULT_CARD_BORDER_RADIUS,
            background: BackgroundConfig::default(),
            failed_writes: 0,
        };
        prefs.reload();
        prefs
    }

    pub fn reload(&mut self) {
        let store = &self.store;
        self.theme = store
            .read_string(KEY_THEME)
            .and_then(|t| known_theme(&t))
            .unwrap_or(DEFAULT_THEME);
        self.language = store
            .read_string(KEY_LANGUAGE)
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        self.inactivity_timeout = store
            .read_number_opt(KEY_INACTIVITY_TIMEOUT)
            .map(|secs| secs.trunc() as i64)
            .unwrap_or(DEFAULT_INACTIVITY_TIMEOUT);
        self.card_border_radius =
            store.read_number(KEY_CARD_BORDER_RADIUS, DEFAULT_CARD_BORDER_RADIUS);

        let defaults = BackgroundConfig::default();
        self.background = BackgroundConfig {
            mode: store
                .read_string(KEY_BG_MODE)
                .and_then(|m| m.parse().ok())
                .unwrap_or_default(),
            color: store.read_string(KEY_BG_COLOR).unwrap_or(defaults.color),
            gradient: store.read_string(KEY_BG_GRADIENT).unwrap_or(defaults.gradient),
            image_url: store.read_string(KEY_BG_IMAGE).unwrap_or(defaults.image_url),
        };
        debug!(
            "Preferences: theme {}, language {}, background {}",
            self.theme, self.language, self.background.mode
        );
    }

    fn record(&mut self, key: &str, result: Result<(), StoreError>) {
        if let Err(e) = result {
            error!("Failed to save {}: {}", key, e);
            self.failed_writes += 1;
        }
    }

    fn save_string(&mut self, key: &str, value: &str) {
        let result = self.store.write_string(key, value);
        self.record(key, result);
    }

    fn save_number(&mut self, key: &str, value: f64) {
        let result = self.store.write_number(key, value);
        self.record(key, result);
    }

    pub fn theme(&self) -> &str {
        self.theme
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Seconds before the dashboard dims; 0 disables it
    pub fn inactivity_timeout(&self) -> i64 {
        self.inactivity_timeout
    }

    pub fn card_border_radius(&self) -> f64 {
        self.card_border_radius
    }

    pub fn background(&self) -> &BackgroundConfig {
        &self.background
    }

    pub fn failed_writes(&self) -> usize {
        self.failed_writes
    }

    /// Switch theme; unknown names select the default theme
    pub fn set_theme(&mut self, theme: &str) {
        self.theme = known_theme(theme).unwrap_or_else(|| {
            warn!("Unknown theme {}, using {}", theme, DEFAULT_THEME);
            DEFAULT_THEME
        });
        self.save_string(KEY_THEME, self.theme);
    }

    /// Advance to the next theme; returns the new theme
    pub fn toggle_theme(&mut self) -> &str {
        let current = THEMES.iter().position(|t| *t == self.theme).unwrap_or(0);
        self.set_theme(THEMES[(current + 1) % THEMES.len()]);
        self.theme
    }

    pub fn set_language(&mut self, language: &str) {
        self.language = language.to_string();
        self.save_string(KEY_LANGUAGE, language);
    }

    pub fn set_inactivity_timeout(&mut self, seconds: i64) {
        self.inactivity_timeout = seconds.clamp(0, MAX_INACTIVITY_TIMEOUT);
        self.save_number(KEY_INACTIVITY_TIMEOUT, self.inactivity_timeout as f64);
    }

    pub fn set_card_border_radius(&mut self, radius: f64) {
        if !radius.is_finite() || radius < 0.0 {
            warn!("Ignoring invalid card border radius {}", radius);
            return;
        }
        self.card_border_radius = radius;
        self.save_number(KEY_CARD_BORDER_RADIUS, radius);
    }

    pub fn set_background_mode(&mut self, mode: BackgroundMode) {
        self.background.mode = mode;
        self.save_string(KEY_BG_MODE, mode.as_str());
    }

    /// Set the solid background color; returns false for a non-hex color
    pub fn set_background_color(&mut self, color: &str) -> bool {
        if !is_hex_color(color) {
            warn!("Ignoring invalid background color {}", color);
            return false;
        }
        self.background.color = color.to_string();
        self.save_string(KEY_BG_COLOR, color);
        true
    }

    pub fn set_background_gradient(&mut self, preset: &str) {
        self.background.gradient = preset.to_string();
        self.save_string(KEY_BG_GRADIENT, preset);
    }

    pub fn set_background_image(&mut self, url: &str) {
        self.background.image_url = url.trim().to_string();
        let url = self.background.image_url.clone();
        self.save_string(KEY_BG_IMAGE, &url);
    }
}

impl SnapshotSink for Preferences {
    fn apply_update(&mut self, update: &SnapshotUpdate) {
        match update {
            SnapshotUpdate::Theme(theme) => {
                self.theme = known_theme(theme).unwrap_or(DEFAULT_THEME)
            }
            SnapshotUpdate::Language(language) => self.language = language.clone(),
            SnapshotUpdate::InactivityTimeout(secs) => {
                self.inactivity_timeout = secs.trunc() as i64
            }
            SnapshotUpdate::CardBorderRadius(radius) => self.card_border_radius = *radius,
            SnapshotUpdate::BackgroundMode(mode) => {
                self.background.mode = mode.parse().unwrap_or_default()
            }
            SnapshotUpdate::BackgroundColor(color) => self.background.color = color.clone(),
            SnapshotUpdate::BackgroundGradient(preset) => {
                self.background.gradient = preset.clone()
            }
            SnapshotUpdate::BackgroundImage(url) => self.background.image_url = url.clone(),
            _ => {}
        }
    }
}
