use chrono::{DateTime, Utc};

use crate::domain::{CanonicalItem, ChannelMetadata};
use crate::normalizer::to_rfc822;
use crate::render::escape::{escape_attr, escape_text, escape_url};
use crate::render::Renderer;

const STYLESHEET: &str = r#"    body {
      font-family: system-ui, sans-serif;
      background-color: #f9f9f9;
      margin: 0 auto;
      padding: 2rem;
      max-width: 800px;
    }
    h1 {
      font-size: 2rem;
      margin-bottom: 2rem;
      color: #333;
    }
    .story {
      background: #fff;
      padding: 1rem 1.25rem;
      border-left: 4px solid #007acc;
      margin-bottom: 1.5rem;
      box-shadow: 0 1px 3px rgba(0,0,0,0.05);
    }
    .story h2 {
      margin: 0 0 0.4rem 0;
      font-size: 1.2rem;
      line-height: 1.4;
    }
    .story h2 a {
      text-decoration: none;
      color: #007acc;
    }
    .story h2 a:hover {
      text-decoration: underline;
    }
    .story img {
      max-width: 100%;
      margin-bottom: 0.5rem;
    }
    .meta {
      font-size: 0.85rem;
      color: #666;
      margin-bottom: 0.5rem;
    }
    .summary {
      font-size: 0.95rem;
      color: #333;
    }
    footer {
      font-size: 0.8rem;
      color: #999;
    }
"#;

/// Static page with one card per item.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_story(out: &mut String, item: &CanonicalItem) {
        out.push_str("  <div class=\"story\">\n");
        if let Some(image) = item.image.as_deref() {
            out.push_str(&format!(
                "    <img src=\"{}\" alt=\"\" loading=\"lazy\" />\n",
                escape_url(image)
            ));
        }
        out.push_str(&format!(
            "    <h2><a href=\"{}\">{}</a></h2>\n",
            escape_url(&item.link),
            escape_text(&item.title)
        ));

        let date = item.pub_date.format("%Y-%m-%d").to_string();
        let meta = match item.source.as_deref() {
            Some(source) => format!("{} &bull; {}", escape_text(source), date),
            None => date,
        };
        out.push_str(&format!("    <div class=\"meta\">{}</div>\n", meta));

        if let Some(summary) = item.description.as_deref() {
            out.push_str(&format!(
                "    <p class=\"summary\">{}</p>\n",
                escape_text(summary)
            ));
        }
        out.push_str("  </div>\n");
    }
}

impl Renderer for HtmlRenderer {
    fn render(
        &self,
        items: &[CanonicalItem],
        channel: &ChannelMetadata,
        build_time: DateTime<Utc>,
    ) -> String {
        let title = escape_text(channel.display_title());
        let lang = escape_attr(channel.language().unwrap_or("en"));

        let mut out = String::with_capacity(2048 + items.len() * 512);
        out.push_str("<!DOCTYPE html>\n");
        out.push_str(&format!("<html lang=\"{}\">\n", lang));
        out.push_str("<head>\n");
        out.push_str("  <meta charset=\"UTF-8\" />\n");
        out.push_str(
            "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n",
        );
        out.push_str(&format!("  <title>{}</title>\n", title));
        if let Some(description) = channel.description() {
            out.push_str(&format!(
                "  <meta name=\"description\" content=\"{}\" />\n",
                escape_attr(description)
            ));
        }
        if let Some(feed) = channel.self_link() {
            out.push_str(&format!(
                "  <link rel=\"alternate\" type=\"application/rss+xml\" href=\"{}\" />\n",
                escape_url(feed)
            ));
        }
        out.push_str("  <style>\n");
        out.push_str(STYLESHEET);
        out.push_str("  </style>\n");
        out.push_str("</head>\n");
        out.push_str("<body>\n");
        out.push_str(&format!("  <h1>{}</h1>\n", title));

        for item in items {
            Self::write_story(&mut out, item);
        }

        out.push_str(&format!(
            "  <footer>Updated {}</footer>\n",
            escape_text(&to_rfc822(&build_time))
        ));
        out.push_str("</body>\n");
        out.push_str("</html>\n");
        out
    }

    fn content_type(&self) -> &'static str {
        "text/html"
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn item() -> CanonicalItem {
        let mut item = CanonicalItem::new(
            "Rock & <Roll>".into(),
            "https://x.test/a?b=1&c=2".into(),
            "https://x.test/a?b=1&c=2".into(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            0,
        );
        item.source = Some("El País".into());
        item.description = Some("Prices <rose> & fell".into());
        item
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_story_card() {
        let html = HtmlRenderer.render(&[item()], &ChannelMetadata::new("LatAm Headlines"), now());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>LatAm Headlines</h1>"));
        assert!(html.contains(
            "<h2><a href=\"https://x.test/a?b=1&amp;c=2\">Rock &amp; &lt;Roll&gt;</a></h2>"
        ));
        assert!(html.contains("<div class=\"meta\">El País &bull; 2024-01-02</div>"));
        assert!(html.contains("<p class=\"summary\">Prices &lt;rose&gt; &amp; fell</p>"));
    }

    #[test]
    fn test_meta_without_source() {
        let mut entry = item();
        entry.source = None;
        let html = HtmlRenderer.render(&[entry], &ChannelMetadata::default(), now());
        assert!(html.contains("<div class=\"meta\">2024-01-02</div>"));
        assert!(html.contains("<title>Feed</title>"));
    }

    #[test]
    fn test_one_story_per_item() {
        let html = HtmlRenderer.render(&[item(), item(), item()], &ChannelMetadata::default(), now());
        assert_eq!(html.matches("class=\"story\"").count(), 3);
    }

    #[test]
    fn test_language_attribute() {
        let channel = ChannelMetadata {
            language: Some("es".into()),
            ..Default::default()
        };
        let html = HtmlRenderer.render(&[], &channel, now());
        assert!(html.contains("<html lang=\"es\">"));
    }
}
