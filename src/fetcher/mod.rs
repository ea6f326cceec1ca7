pub mod file_fetcher;
pub mod http_fetcher;
pub mod parallel;

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use url::Url;

use crate::app::{Result, SheetfeedError};

pub use file_fetcher::FileFetcher;
pub use http_fetcher::HttpFetcher;

/// Where a CSV document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Url(Url),
    Path(PathBuf),
}

impl SourceSpec {
    /// `http://` and `https://` inputs are URLs; anything else is a path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            if let Ok(url) = Url::parse(trimmed) {
                return SourceSpec::Url(url);
            }
        }
        SourceSpec::Path(PathBuf::from(trimmed))
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSpec::Url(url) => write!(f, "{}", url),
            SourceSpec::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[async_trait]
pub trait Fetcher {
    /// Raw bytes of the document at `source`.
    async fn fetch(&self, source: &SourceSpec) -> Result<Vec<u8>>;
}

/// Sends URLs to an [`HttpFetcher`] and paths to a [`FileFetcher`].
pub struct SourceFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceFetcher {
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            file: FileFetcher::new(),
        }
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, source: &SourceSpec) -> Result<Vec<u8>> {
        match source {
            SourceSpec::Url(_) => self.http.fetch(source).await,
            SourceSpec::Path(_) => self.file.fetch(source).await,
        }
    }
}

/// Fetch `source` and decode it as UTF-8 text.
pub async fn read_text(fetcher: &(dyn Fetcher + Send + Sync), source: &SourceSpec) -> Result<String> {
    let bytes = fetcher.fetch(source).await?;
    Ok(decode_text(bytes))
}

/// Lossy UTF-8 decode with any leading byte-order mark removed.
pub fn decode_text(bytes: Vec<u8>) -> String {
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Point a Google Sheets URL at its CSV export.
///
/// Published (`/pub`) links gain `output=csv` unless an `output` parameter
/// is already set. Editor (`/edit`) links become `/export?format=csv`,
/// keeping the sheet `gid`. Other URLs are returned unchanged.
pub fn spreadsheet_export_url(url: &Url) -> Url {
    if url.host_str() != Some("docs.google.com") || !url.path().starts_with("/spreadsheets/") {
        return url.clone();
    }

    let mut out = url.clone();
    let path = url.path().trim_end_matches('/').to_string();

    if let Some(base) = path
        .strip_suffix("/pubhtml")
        .or_else(|| path.strip_suffix("/pub"))
    {
        out.set_path(&format!("{}/pub", base));
        if !url.query_pairs().any(|(key, _)| key == "output") {
            out.query_pairs_mut().append_pair("output", "csv");
        }
    } else if let Some(idx) = path.find("/edit") {
        let gid = url
            .query_pairs()
            .find(|(key, _)| key == "gid")
            .map(|(_, value)| value.into_owned())
            .or_else(|| {
                url.fragment()
                    .and_then(|frag| frag.strip_prefix("gid="))
                    .map(String::from)
            });

        out.set_path(&format!("{}/export", &path[..idx]));
        out.set_fragment(None);
        out.set_query(None);
        {
            let mut query = out.query_pairs_mut();
            query.append_pair("format", "csv");
            if let Some(gid) = gid {
                query.append_pair("gid", &gid);
            }
        }
    }

    out
}

pub(crate) fn source_error(source: &SourceSpec, message: impl Into<String>) -> SheetfeedError {
    SheetfeedError::Source {
        source_name: source.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_source_spec_parse() {
        assert!(matches!(
            SourceSpec::parse("https://example.com/data.csv"),
            SourceSpec::Url(_)
        ));
        assert_eq!(
            SourceSpec::parse("data/feed.csv"),
            SourceSpec::Path(PathBuf::from("data/feed.csv"))
        );
        assert!(matches!(SourceSpec::parse("ftp://x/y.csv"), SourceSpec::Path(_)));
    }

    #[test]
    fn test_published_sheet_gains_output_csv() {
        let out = spreadsheet_export_url(&url(
            "https://docs.google.com/spreadsheets/d/e/2PACX-abc/pub?gid=477208386&single=true",
        ));
        assert_eq!(
            out.as_str(),
            "https://docs.google.com/spreadsheets/d/e/2PACX-abc/pub?gid=477208386&single=true&output=csv"
        );
    }

    #[test]
    fn test_published_sheet_with_output_untouched() {
        let input = "https://docs.google.com/spreadsheets/d/e/2PACX-abc/pub?gid=1&single=true&output=csv";
        assert_eq!(spreadsheet_export_url(&url(input)).as_str(), input);
    }

    #[test]
    fn test_pubhtml_is_rewritten() {
        let out = spreadsheet_export_url(&url(
            "https://docs.google.com/spreadsheets/d/e/2PACX-abc/pubhtml",
        ));
        assert_eq!(
            out.as_str(),
            "https://docs.google.com/spreadsheets/d/e/2PACX-abc/pub?output=csv"
        );
    }

    #[test]
    fn test_edit_link_becomes_export() {
        let out = spreadsheet_export_url(&url(
            "https://docs.google.com/spreadsheets/d/KEY123/edit#gid=42",
        ));
        assert_eq!(
            out.as_str(),
            "https://docs.google.com/spreadsheets/d/KEY123/export?format=csv&gid=42"
        );
    }

    #[test]
    fn test_other_hosts_untouched() {
        let input = "https://example.com/spreadsheets/d/x/pub";
        assert_eq!(spreadsheet_export_url(&url(input)).as_str(), input);
    }

    #[test]
    fn test_decode_text_strips_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFTitle".to_vec()), "Title");
        assert_eq!(decode_text(b"ok\xFF".to_vec()), "ok\u{fffd}");
    }
}
