use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::ChannelMetadata;
use crate::render::OutputFormat;
use crate::validate::ValidateMode;

/// Settings shared by every feed unless a job overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Maximum items per feed; zero or negative means no limit
    pub limit: i64,

    /// Read dates without a zone as UTC (otherwise local time)
    pub assume_utc: bool,

    pub validate: ValidateMode,

    pub format: OutputFormat,

    /// Channel fields inherited by every feed
    pub channel: ChannelMetadata,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            limit: 0,
            assume_utc: true,
            validate: ValidateMode::Warn,
            format: OutputFormat::Rss,
            channel: ChannelMetadata::default(),
        }
    }
}

/// One `[[feed]]` entry: a CSV source rendered to one output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedJob {
    pub name: String,

    /// Local path or http(s) URL of the CSV document
    pub source: String,

    /// Output file; `-` writes to stdout
    pub output: PathBuf,

    #[serde(default)]
    pub format: Option<OutputFormat>,

    #[serde(default)]
    pub limit: Option<i64>,

    #[serde(default)]
    pub validate: Option<ValidateMode>,

    #[serde(default)]
    pub assume_utc: Option<bool>,

    #[serde(default)]
    pub channel: ChannelMetadata,
}

impl FeedJob {
    pub fn format(&self, defaults: &Defaults) -> OutputFormat {
        self.format.unwrap_or(defaults.format)
    }

    pub fn limit(&self, defaults: &Defaults) -> i64 {
        self.limit.unwrap_or(defaults.limit)
    }

    pub fn validate(&self, defaults: &Defaults) -> ValidateMode {
        self.validate.unwrap_or(defaults.validate)
    }

    pub fn assume_utc(&self, defaults: &Defaults) -> bool {
        self.assume_utc.unwrap_or(defaults.assume_utc)
    }

    /// Default channel fields overlaid with this job's own.
    pub fn channel(&self, defaults: &Defaults) -> ChannelMetadata {
        let mut channel = defaults.channel.clone();
        channel.merge(&self.channel);
        channel
    }
}
