use chrono::{DateTime, Utc};

use crate::domain::{CanonicalItem, ChannelMetadata};
use crate::normalizer::{is_absolute_url, to_rfc822};
use crate::render::escape::{cdata, escape_text, escape_url};
use crate::render::{item_description_html, Renderer};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// RSS 2.0 document writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssRenderer;

impl RssRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_channel_header(out: &mut String, channel: &ChannelMetadata, build_time: DateTime<Utc>) {
        if let Some(title) = channel.title() {
            push_element(out, 2, "title", &escape_text(title));
        }
        if let Some(link) = channel.link() {
            push_element(out, 2, "link", &escape_url(link));
        }
        if let Some(self_link) = channel.self_link() {
            out.push_str(&format!(
                "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
                escape_url(self_link)
            ));
        }
        if let Some(description) = channel.description() {
            push_element(out, 2, "description", &escape_text(description));
        }
        if let Some(language) = channel.language() {
            push_element(out, 2, "language", &escape_text(language));
        }
        if let Some(ttl) = channel.ttl {
            push_element(out, 2, "ttl", &ttl.to_string());
        }
        push_element(out, 2, "lastBuildDate", &to_rfc822(&build_time));
    }

    fn write_item(out: &mut String, item: &CanonicalItem) {
        out.push_str("    <item>\n");
        push_element(out, 3, "title", &escape_text(&item.title));
        push_element(out, 3, "link", &escape_url(&item.link));
        out.push_str(&format!(
            "      <guid isPermaLink=\"{}\">{}</guid>\n",
            is_absolute_url(&item.guid),
            escape_url(&item.guid)
        ));
        push_element(out, 3, "pubDate", &to_rfc822(&item.pub_date));
        if let Some(description) = item_description_html(item) {
            push_element(out, 3, "description", &cdata(&description));
        }
        out.push_str("    </item>\n");
    }
}

impl Renderer for RssRenderer {
    fn render(
        &self,
        items: &[CanonicalItem],
        channel: &ChannelMetadata,
        build_time: DateTime<Utc>,
    ) -> String {
        let mut out = String::with_capacity(512 + items.len() * 512);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!("<rss version=\"2.0\" xmlns:atom=\"{}\">\n", ATOM_NS));
        out.push_str("  <channel>\n");

        Self::write_channel_header(&mut out, channel, build_time);
        for item in items {
            Self::write_item(&mut out, item);
        }

        out.push_str("  </channel>\n");
        out.push_str("</rss>\n");
        out
    }

    fn content_type(&self) -> &'static str {
        "application/rss+xml"
    }
}

fn push_element(out: &mut String, depth: usize, name: &str, body: &str) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("<{name}>{body}</{name}>\n"));
}
