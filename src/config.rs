//! Runtime configuration read from the environment (and `.env`).

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

pub const DEFAULT_FEED_URL: &str = "https://api.nasa.gov/neo/rest/v1/feed";

pub struct Config {
    pub api_key: String,
    pub feed_url: Url,
    /// Transport timeout; unset means the request may wait indefinitely.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Reads `NASA_API_KEY`, `NEO_FEED_URL` and `NEO_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("NASA_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("NASA_API_KEY must be set")?;

        let feed_url = lookup("NEO_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let feed_url = Url::parse(&feed_url).with_context(|| format!("invalid NEO_FEED_URL '{feed_url}'"))?;

        let timeout = lookup("NEO_HTTP_TIMEOUT_SECS")
            .map(|secs| {
                secs.parse::<u64>()
                    .with_context(|| format!("invalid NEO_HTTP_TIMEOUT_SECS '{secs}'"))
            })
            .transpose()?
            .map(Duration::from_secs);

        Ok(Self {
            api_key,
            feed_url,
            timeout,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("feed_url", &self.feed_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("NASA_API_KEY", "secret")])).unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.feed_url.as_str(), DEFAULT_FEED_URL);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("NASA_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("NASA_API_KEY", "secret"),
            ("NEO_FEED_URL", "http://localhost:8080/feed"),
            ("NEO_HTTP_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.feed_url.as_str(), "http://localhost:8080/feed");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup(&[("NASA_API_KEY", "k"), ("NEO_FEED_URL", "not a url")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[("NASA_API_KEY", "k"), ("NEO_HTTP_TIMEOUT_SECS", "soon")])).is_err()
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup(&[("NASA_API_KEY", "hunter2")])).unwrap();
        let debug = format!("{config:?}");

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
