//! Persisted key names, defaults and layout breakpoints.
//!
//! Key names must not change without a load-time migration: they address
//! data written by earlier releases.

pub const KEY_PAGES_CONFIG: &str = "tunet_pages_config";
pub const KEY_HIDDEN_CARDS: &str = "tunet_hidden_cards";
pub const KEY_CUSTOM_NAMES: &str = "tunet_custom_names";
pub const KEY_CUSTOM_ICONS: &str = "tunet_custom_icons";
pub const KEY_GRID_COLUMNS: &str = "tunet_grid_columns";
pub const KEY_GRID_GAP: &str = "tunet_grid_gap";
pub const KEY_HEADER_SCALE: &str = "tunet_header_scale";
pub const KEY_HEADER_TITLE: &str = "tunet_header_title";
pub const KEY_PAGE_SETTINGS: &str = "tunet_page_settings";
pub const KEY_CARD_SETTINGS: &str = "tunet_card_settings";
pub const KEY_HEADER_SETTINGS: &str = "tunet_header_settings";
pub const KEY_STATUS_PILLS_CONFIG: &str = "tunet_status_pills_config";
pub const KEY_CARD_BORDER_RADIUS: &str = "tunet_card_border_radius";
pub const KEY_THEME: &str = "tunet_theme";
pub const KEY_LANGUAGE: &str = "tunet_language";
pub const KEY_INACTIVITY_TIMEOUT: &str = "tunet_inactivity_timeout";
pub const KEY_BG_MODE: &str = "tunet_bg_mode";
pub const KEY_BG_COLOR: &str = "tunet_bg_color";
pub const KEY_BG_GRADIENT: &str = "tunet_bg_gradient";
pub const KEY_BG_IMAGE: &str = "tunet_bg_image";
pub const KEY_HA_URL: &str = "ha_url";
pub const KEY_HA_FALLBACK_URL: &str = "ha_fallback_url";
pub const KEY_HA_TOKEN: &str = "ha_token";

/// Every persisted key
pub const ALL_KEYS: [&str; 23] = [
    KEY_PAGES_CONFIG,
    KEY_HIDDEN_CARDS,
    KEY_CUSTOM_NAMES,
    KEY_CUSTOM_ICONS,
    KEY_GRID_COLUMNS,
    KEY_GRID_GAP,
    KEY_HEADER_SCALE,
    KEY_HEADER_TITLE,
    KEY_PAGE_SETTINGS,
    KEY_CARD_SETTINGS,
    KEY_HEADER_SETTINGS,
    KEY_STATUS_PILLS_CONFIG,
    KEY_CARD_BORDER_RADIUS,
    KEY_THEME,
    KEY_LANGUAGE,
    KEY_INACTIVITY_TIMEOUT,
    KEY_BG_MODE,
    KEY_BG_COLOR,
    KEY_BG_GRADIENT,
    KEY_BG_IMAGE,
    KEY_HA_URL,
    KEY_HA_FALLBACK_URL,
    KEY_HA_TOKEN,
];

pub const DEFAULT_GRID_COLUMNS: u32 = 3;
pub const DEFAULT_GRID_GAP: f64 = 32.0;
pub const DEFAULT_HEADER_SCALE: f64 = 1.0;
pub const DEFAULT_CARD_BORDER_RADIUS: f64 = 24.0;
pub const DEFAULT_THEME: &str = "dark";
pub const DEFAULT_LANGUAGE: &str = "nn";

/// Seconds of inactivity before the dashboard returns to its home page
pub const DEFAULT_INACTIVITY_TIMEOUT: i64 = 60;

/// Viewports narrower than this are treated as phones
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Compact cards are used for widths in `COMPACT_MIN_WIDTH..COMPACT_MAX_WIDTH`
pub const COMPACT_MIN_WIDTH: u32 = 480;
pub const COMPACT_MAX_WIDTH: u32 = 640;

/// Column band lower bounds
pub const DESKTOP_MIN_WIDTH: u32 = 1024;
pub const TABLET_MIN_WIDTH: u32 = 768;
pub const SMALL_MIN_WIDTH: u32 = 480;

/// Upper bound (exclusive) of the tablet portrait band used by dynamic columns
pub const TABLET_PORTRAIT_MAX_WIDTH: u32 = 900;

/// Column ceiling applied by dynamic columns mode
pub const DYNAMIC_MAX_COLUMNS: u32 = 4;
