//! Engine configuration.
//!
//! A [`Config`] is immutable for the process lifetime. It can be built
//! literally, or loaded from a TOML file:
//!
//! ```toml
//! port = 8080
//! lang = "en"
//! r404 = "/not-found"
//! client = true
//!
//! [env]
//! API_URL = "https://api.example.org"
//! DEBUG = false
//! ```

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Engine configuration. Every field has a default, so a partial TOML
/// file (or `Config::default()`) is always valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Values substituted as literals for `import.meta.env.KEY`
    /// occurrences in transformed scripts.
    pub env: FxHashMap<String, serde_json::Value>,

    /// Port the HTTP server binds on.
    pub port: u16,

    /// IETF language tag emitted on the `<html>` element.
    pub lang: String,

    /// Route every miss (unknown page, unknown static file) redirects to.
    /// Must itself be a registered page url.
    pub r404: String,

    /// Enables the partial-update protocol and provenance markup.
    pub client: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: FxHashMap::default(),
            port: 5000,
            lang: "en".into(),
            r404: "/".into(),
            client: false,
        }
    }
}

impl Config {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file `{}`", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file `{}`", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.lang, "en");
        assert_eq!(config.r404, "/");
        assert!(!config.client);
        assert!(config.env.is_empty());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.lang, "en");
        assert_eq!(config.r404, "/");
    }

    #[test]
    fn env_values_deserialize_as_json() {
        let config: Config = toml::from_str(
            r#"
            [env]
            API_URL = "https://api.example.org"
            DEBUG = false
            RETRIES = 3
            "#,
        )
        .unwrap();
        assert_eq!(
            config.env["API_URL"],
            serde_json::json!("https://api.example.org")
        );
        assert_eq!(config.env["DEBUG"], serde_json::json!(false));
        assert_eq!(config.env["RETRIES"], serde_json::json!(3));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = Config::from_file("/nonexistent/plinth.toml").unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config file"));
    }
}
