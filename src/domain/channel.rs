use serde::{Deserialize, Serialize};

/// Channel-level metadata for a rendered feed.
///
/// Every field is optional; renderers emit only what is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelMetadata {
    pub title: Option<String>,
    pub link: Option<String>,
    pub self_link: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub ttl: Option<u32>,
}

impl ChannelMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn display_title(&self) -> &str {
        non_empty(&self.title).unwrap_or("Feed")
    }

    pub fn title(&self) -> Option<&str> {
        non_empty(&self.title)
    }

    pub fn link(&self) -> Option<&str> {
        non_empty(&self.link)
    }

    pub fn self_link(&self) -> Option<&str> {
        non_empty(&self.self_link)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    pub fn language(&self) -> Option<&str> {
        non_empty(&self.language)
    }

    /// Overlay any fields set in `other` onto `self`.
    pub fn merge(&mut self, other: &ChannelMetadata) {
        if other.title.is_some() {
            self.title = other.title.clone();
        }
        if other.link.is_some() {
            self.link = other.link.clone();
        }
        if other.self_link.is_some() {
            self.self_link = other.self_link.clone();
        }
        if other.description.is_some() {
            self.description = other.description.clone();
        }
        if other.language.is_some() {
            self.language = other.language.clone();
        }
        if other.ttl.is_some() {
            self.ttl = other.ttl;
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
