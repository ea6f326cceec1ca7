//! Feed document rendering.

pub mod escape;
pub mod html;
pub mod rss;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CanonicalItem, ChannelMetadata};

pub use html::HtmlRenderer;
pub use rss::RssRenderer;

/// Serializes a finalized item sequence into a document.
pub trait Renderer {
    /// `build_time` stamps `lastBuildDate` (or the page footer); everything
    /// else in the output depends only on `items` and `channel`.
    fn render(
        &self,
        items: &[CanonicalItem],
        channel: &ChannelMetadata,
        build_time: DateTime<Utc>,
    ) -> String;

    fn content_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Rss,
    Html,
}

impl OutputFormat {
    pub fn renderer(self) -> Box<dyn Renderer + Send + Sync> {
        match self {
            OutputFormat::Rss => Box::new(RssRenderer::new()),
            OutputFormat::Html => Box::new(HtmlRenderer::new()),
        }
    }

    /// Only XML output goes through the well-formedness check.
    pub fn is_xml(self) -> bool {
        matches!(self, OutputFormat::Rss)
    }
}

/// Description markup for an RSS item: optional image, the summary, then
/// an optional source line. `None` when there is nothing to show.
pub fn item_description_html(item: &CanonicalItem) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(image) = item.image.as_deref() {
        parts.push(format!(
            "<img src=\"{}\" alt=\"\" />",
            escape::escape_url(image)
        ));
    }
    if let Some(summary) = item.description.as_deref().filter(|s| !s.trim().is_empty()) {
        parts.push(summary.to_string());
    }
    if let Some(source) = item.source.as_deref() {
        parts.push(format!("<p>Source: {}</p>", escape::escape_text(source)));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn item() -> CanonicalItem {
        CanonicalItem::new(
            "T".into(),
            "https://x.test/1".into(),
            "https://x.test/1".into(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            0,
        )
    }

    #[test]
    fn test_description_absent_when_empty() {
        assert_eq!(item_description_html(&item()), None);
    }

    #[test]
    fn test_description_parts_in_order() {
        let mut entry = item();
        entry.image = Some("https://x.test/img.png".into());
        entry.description = Some("Body".into());
        entry.source = Some("AP & Co".into());
        assert_eq!(
            item_description_html(&entry).unwrap(),
            "<img src=\"https://x.test/img.png\" alt=\"\" />\nBody\n<p>Source: AP &amp; Co</p>"
        );
    }

    #[test]
    fn test_format_selects_renderer() {
        assert_eq!(OutputFormat::Rss.renderer().content_type(), "application/rss+xml");
        assert_eq!(OutputFormat::Html.renderer().content_type(), "text/html");
        assert!(OutputFormat::Rss.is_xml());
        assert!(!OutputFormat::Html.is_xml());
    }
}
