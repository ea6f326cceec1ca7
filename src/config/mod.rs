//! Configuration management for sheetfeed.
//!
//! Feed jobs and shared defaults are read from
//! `~/.config/sheetfeed/feeds.toml` unless another path is given.
//! `sheetfeed init` writes a commented starting point.

pub mod feed;
pub mod http;

pub use feed::{Defaults, FeedJob};
pub use http::HttpConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub defaults: Defaults,
    pub http: HttpConfig,
    #[serde(rename = "feed")]
    pub feeds: Vec<FeedJob>,
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// Missing fields fall back to their defaults. A missing file is an
    /// error; run `sheetfeed init` to create one.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            return Err(ConfigError::NotFound { path: config_path });
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get the default config file path: `~/.config/sheetfeed/feeds.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("sheetfeed").join("feeds.toml"))
    }

    /// Write the commented default config to `path`, refusing to overwrite.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    pub fn default_config_content() -> String {
        r##"# sheetfeed configuration
#
# Each [[feed]] turns one CSV document (a local file or a published
# Google Sheet) into an RSS 2.0 feed or a static HTML page.
#
# Recognised columns (matched case-insensitively, first non-empty wins):
#   title        Title
#   link         Link, URL
#   guid         GUID, ID (used only when it is itself an http(s) URL)
#   date         PubDate, Date, Publication Date, Published, Timestamp
#   description  Summary, Description, Article Summary
#   source       Source, Outlet, Publisher
#   image        Image, Image URL, Thumbnail

[defaults]
# Maximum items per feed (0 = unlimited)
limit = 0

# Read dates without a timezone as UTC; set false for local time
assume_utc = true

# Well-formedness check on RSS output: "off", "warn" or "strict"
validate = "warn"

# Output format: "rss" or "html"
format = "rss"

[defaults.channel]
language = "en-us"
ttl = 60

[http]
# Request timeout in seconds
timeout_secs = 10

# Retries for timeouts, connection errors and 429/5xx responses
max_retries = 3

# Cap for the exponential backoff between retries, in seconds
backoff_max_secs = 30

[[feed]]
name = "headlines"
source = "https://docs.google.com/spreadsheets/d/e/YOUR-SHEET-ID/pub?gid=0&single=true"
output = "public/feed.xml"

[feed.channel]
title = "Headlines"
link = "https://example.github.io/headlines/"
self_link = "https://example.github.io/headlines/feed.xml"
description = "Latest news summaries"

[[feed]]
name = "headlines-page"
source = "https://docs.google.com/spreadsheets/d/e/YOUR-SHEET-ID/pub?gid=0&single=true"
output = "public/index.html"
format = "html"

[feed.channel]
title = "Headlines"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Config file not found at {path} (run `sheetfeed init` to create one)")]
    NotFound { path: PathBuf },

    #[error("Config file already exists at {path}")]
    AlreadyExists { path: PathBuf },

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::OutputFormat;
    use crate::validate::ValidateMode;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config = Config::from_toml(&content).expect("Default config should be valid TOML");

        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.feeds[0].name, "headlines");
        assert_eq!(config.feeds[1].format, Some(OutputFormat::Html));
        assert_eq!(config.defaults.channel.language(), Some("en-us"));
        assert_eq!(config.defaults.validate, ValidateMode::Warn);
        assert_eq!(config.http.max_retries, 3);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_toml("").expect("Empty config should work");
        assert!(config.feeds.is_empty());
        assert_eq!(config.defaults.limit, 0);
        assert!(config.defaults.assume_utc);
    }

    #[test]
    fn test_invalid_validate_mode() {
        assert!(Config::from_toml("[defaults]\nvalidate = \"loud\"\n").is_err());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("feeds.toml");

        Config::write_default(&path).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.feeds.len(), 2);

        let err = Config::write_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}
