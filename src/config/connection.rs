//! Home Assistant connection settings.

use log::{debug, info};
use thiserror::Error;
use tunet_core::constants::{KEY_HA_FALLBACK_URL, KEY_HA_TOKEN, KEY_HA_URL};
use tunet_core::{ConfigStore, StoreError};
use url::Url;

/// Problems with the connection settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("no server URL configured")]
    MissingUrl,

    #[error("no access token configured")]
    MissingToken,

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme {0}, expected http or https")]
    UnsupportedScheme(String),
}

/// Parse a server URL, accepting only http and https
pub fn parse_server_url(input: &str) -> Result<Url, ConnectionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConnectionError::MissingUrl);
    }
    let url = Url::parse(trimmed).map_err(|e| ConnectionError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConnectionError::UnsupportedScheme(other.to_string())),
    }
}

pub fn validate_url(input: &str) -> bool {
    parse_server_url(input).is_ok()
}

/// Drop one trailing `/`
fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Server URLs and access token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub url: String,
    pub fallback_url: String,
    pub token: String,
}

impl ConnectionConfig {
    pub const OWNED_KEYS: [&'static str; 3] = [KEY_HA_URL, KEY_HA_FALLBACK_URL, KEY_HA_TOKEN];

    pub fn load(store: &ConfigStore) -> Self {
        Self {
            url: store.read_string(KEY_HA_URL).unwrap_or_default(),
            fallback_url: store.read_string(KEY_HA_FALLBACK_URL).unwrap_or_default(),
            token: store.read_string(KEY_HA_TOKEN).unwrap_or_default(),
        }
    }

    /// Check the settings are complete enough to attempt a connection
    pub fn validate(&self) -> Result<(), ConnectionError> {
        parse_server_url(&self.url)?;
        if self.token.trim().is_empty() {
            return Err(ConnectionError::MissingToken);
        }
        Ok(())
    }

    /// URLs to try in order: the primary, then the fallback if set
    pub fn candidate_urls(&self) -> Vec<&str> {
        [self.url.as_str(), self.fallback_url.as_str()]
            .into_iter()
            .filter(|url| !url.trim().is_empty())
            .collect()
    }

    /// Save the settings after connecting through `url_used`.
    ///
    /// The fallback is only written when set.
    pub fn persist(&self, store: &ConfigStore, url_used: &str) -> Result<(), StoreError> {
        store.write_string(KEY_HA_URL, strip_trailing_slash(url_used))?;
        store.write_string(KEY_HA_TOKEN, &self.token)?;
        if !self.fallback_url.is_empty() {
            store.write_string(KEY_HA_FALLBACK_URL, strip_trailing_slash(&self.fallback_url))?;
        }
        info!("Saved connection settings for {}", strip_trailing_slash(url_used));
        debug!("Fallback URL set: {}", !self.fallback_url.is_empty());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("http://homeassistant.local:8123"));
        assert!(validate_url("https://ha.example.com"));
        assert!(!validate_url(""));
        assert!(!validate_url("ftp://example.com"));
        assert!(!validate_url("not-a-url"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_server_url("  "), Err(ConnectionError::MissingUrl));
        assert_eq!(
            parse_server_url("ws://ha.local"),
            Err(ConnectionError::UnsupportedScheme("ws".to_string()))
        );
    }

    #[test]
    fn test_validate_requires_token() {
        let config = ConnectionConfig {
            url: "http://ha.local:8123".to_string(),
            ..ConnectionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConnectionError::MissingToken));
    }

    #[test]
    fn test_candidate_urls() {
        let mut config = ConnectionConfig {
            url: "http://ha.local:8123".to_string(),
            ..ConnectionConfig::default()
        };
        assert_eq!(config.candidate_urls(), vec!["http://ha.local:8123"]);
        config.fallback_url = "https://ha.example.com".to_string();
        assert_eq!(config.candidate_urls().len(), 2);
    }

    #[test]
    fn test_persist_strips_trailing_slash() {
        let store = ConfigStore::in_memory();
        let config = ConnectionConfig {
            url: "http://ha.local:8123/".to_string(),
            fallback_url: String::new(),
            token: "abc".to_string(),
        };
        config.persist(&store, "https://ha.example.com/").unwrap();
        assert_eq!(store.read_string(KEY_HA_URL).as_deref(), Some("https://ha.example.com"));
        assert_eq!(store.read_string(KEY_HA_TOKEN).as_deref(), Some("abc"));
        assert!(!store.contains(KEY_HA_FALLBACK_URL));

        let loaded = ConnectionConfig::load(&store);
        assert_eq!(loaded.url, "https://ha.example.com");
    }
}
