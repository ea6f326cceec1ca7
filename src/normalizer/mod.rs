pub mod date;
pub mod link;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{CanonicalItem, RawRecord};
use crate::render::escape::strip_invalid_chars;

pub use date::{parse_date, to_rfc822};
pub use link::{is_absolute_url, sanitize_url};

/// Candidate columns per canonical field, in priority order. Matched
/// case-insensitively; the first non-empty value wins.
pub const TITLE_KEYS: &[&str] = &["title"];
pub const LINK_KEYS: &[&str] = &["link", "url"];
pub const GUID_KEYS: &[&str] = &["guid", "id"];
pub const DATE_KEYS: &[&str] = &["pubdate", "date", "publication date", "published", "timestamp"];
pub const DESCRIPTION_KEYS: &[&str] = &["summary", "description", "article summary"];
pub const SOURCE_KEYS: &[&str] = &["source", "outlet", "publisher"];
pub const IMAGE_KEYS: &[&str] = &["image", "image url", "thumbnail"];

/// Why a record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing title")]
    MissingTitle,

    #[error("invalid link: {0:?}")]
    InvalidLink(String),

    #[error("invalid guid: {0:?}")]
    InvalidGuid(String),

    #[error("bad pubDate: {0:?}")]
    BadPubDate(String),
}

/// Maps raw rows onto [`CanonicalItem`]s.
#[derive(Debug, Clone)]
pub struct Normalizer {
    assume_utc: bool,
    now: DateTime<Utc>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            assume_utc: true,
            now: Utc::now(),
        }
    }

    /// Read zone-less dates as local time instead of UTC.
    pub fn assume_utc(mut self, assume_utc: bool) -> Self {
        self.assume_utc = assume_utc;
        self
    }

    /// Fix the timestamp given to rows without a date.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Validate one row.
    ///
    /// A row with no date value is dated `now`; a row whose date is present
    /// but unparsable is rejected. The asymmetry is intentional.
    pub fn normalize(
        &self,
        record: &RawRecord,
        row_index: usize,
    ) -> Result<CanonicalItem, ValidationError> {
        let title = record
            .first_of(TITLE_KEYS)
            .map(|raw| strip_invalid_chars(raw).trim().to_string())
            .filter(|title| !title.is_empty())
            .ok_or(ValidationError::MissingTitle)?;

        let link = sanitize_url(record.first_of(LINK_KEYS).unwrap_or(""));
        if !is_absolute_url(&link) {
            return Err(ValidationError::InvalidLink(link));
        }

        let guid = record
            .first_of(GUID_KEYS)
            .map(sanitize_url)
            .filter(|candidate| is_absolute_url(candidate))
            .unwrap_or_else(|| link.clone());
        if !is_absolute_url(&guid) {
            return Err(ValidationError::InvalidGuid(guid));
        }

        let pub_date = match record.first_of(DATE_KEYS) {
            None => self.now,
            Some(text) => parse_date(text, self.assume_utc)
                .ok_or_else(|| ValidationError::BadPubDate(text.to_string()))?,
        };

        let mut item = CanonicalItem::new(title, link, guid, pub_date, row_index);
        item.description = record.first_of(DESCRIPTION_KEYS).map(String::from);
        item.source = record.first_of(SOURCE_KEYS).map(String::from);
        item.image = record
            .first_of(IMAGE_KEYS)
            .map(sanitize_url)
            .filter(|candidate| {
                let valid = is_absolute_url(candidate);
                if !valid {
                    tracing::debug!("Dropping invalid image URL on row {}: {}", row_index, candidate);
                }
                valid
            });

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::domain::HeaderIndex;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        let headers = Arc::new(HeaderIndex::new(pairs.iter().map(|(k, _)| *k)));
        RawRecord::new(headers, pairs.iter().map(|(_, v)| v.to_string()).collect())
    }

    fn normalizer() -> Normalizer {
        Normalizer::new().with_now(Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_guid_falls_back_to_link() {
        let item = normalizer()
            .normalize(
                &record(&[
                    ("Title", "A & B"),
                    ("URL", "https://x.test/1"),
                    ("Publication Date", "2024-01-02"),
                ]),
                0,
            )
            .unwrap();

        assert_eq!(item.title, "A & B");
        assert_eq!(item.link, "https://x.test/1");
        assert_eq!(item.guid, "https://x.test/1");
        assert_eq!(item.pub_date, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_url_guid_is_kept() {
        let item = normalizer()
            .normalize(
                &record(&[
                    ("title", "T"),
                    ("link", "https://x.test/1"),
                    ("guid", "https://x.test/permalink/1"),
                ]),
                0,
            )
            .unwrap();
        assert_eq!(item.guid, "https://x.test/permalink/1");
    }

    #[test]
    fn test_non_url_id_is_discarded() {
        let item = normalizer()
            .normalize(
                &record(&[("Title", "T"), ("Link", "https://x.test/1"), ("ID", "abc")]),
                0,
            )
            .unwrap();
        assert_eq!(item.guid, "https://x.test/1");
    }

    #[test]
    fn test_link_prefers_link_over_url() {
        let item = normalizer()
            .normalize(
                &record(&[
                    ("Title", "T"),
                    ("URL", "https://x.test/url"),
                    ("Link", "https://x.test/link"),
                ]),
                0,
            )
            .unwrap();
        assert_eq!(item.link, "https://x.test/link");
    }

    #[test]
    fn test_link_whitespace_is_stripped() {
        let item = normalizer()
            .normalize(
                &record(&[("Title", "T"), ("URL", " https://x.test/\r\nlong-path ")]),
                0,
            )
            .unwrap();
        assert_eq!(item.link, "https://x.test/long-path");
    }

    #[test]
    fn test_missing_title_rejected() {
        let err = normalizer()
            .normalize(&record(&[("Title", "  "), ("URL", "https://x.test/1")]), 0)
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingTitle);
        assert!(err.to_string().contains("missing title"));
    }

    #[test]
    fn test_title_of_only_control_chars_rejected() {
        let err = normalizer()
            .normalize(&record(&[("Title", "\u{1}\u{8}"), ("URL", "https://x.test/1")]), 0)
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingTitle);

        let item = normalizer()
            .normalize(&record(&[("Title", "\u{1}Real \u{1f}title"), ("URL", "https://x.test/1")]), 0)
            .unwrap();
        assert_eq!(item.title, "Real title");
    }

    #[test]
    fn test_invalid_link_rejected() {
        let err = normalizer()
            .normalize(&record(&[("Title", "T"), ("URL", "x.test/1")]), 0)
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLink(_)));

        let err = normalizer()
            .normalize(&record(&[("Title", "T")]), 0)
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidLink(_)));
    }

    #[test]
    fn test_present_but_bad_date_rejected() {
        let err = normalizer()
            .normalize(
                &record(&[
                    ("Title", "T"),
                    ("URL", "https://x.test/1"),
                    ("Publication Date", "not-a-date"),
                ]),
                0,
            )
            .unwrap_err();
        assert!(err.to_string().contains("bad pubDate"));
    }

    #[test]
    fn test_missing_date_defaults_to_now() {
        let n = normalizer();
        let item = n
            .normalize(
                &record(&[
                    ("Title", "T"),
                    ("URL", "https://x.test/1"),
                    ("Publication Date", ""),
                ]),
                3,
            )
            .unwrap();
        assert_eq!(item.pub_date, n.now());
        assert_eq!(item.source_row_index(), 3);
    }

    #[test]
    fn test_date_candidates_in_order() {
        let item = normalizer()
            .normalize(
                &record(&[
                    ("Title", "T"),
                    ("URL", "https://x.test/1"),
                    ("Timestamp", "2020-01-01"),
                    ("Date", "2024/3/4"),
                ]),
                0,
            )
            .unwrap();
        assert_eq!(item.pub_date, Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_description_source_and_image() {
        let item = normalizer()
            .normalize(
                &record(&[
                    ("Title", "T"),
                    ("URL", "https://x.test/1"),
                    ("Article Summary", "Fallback"),
                    ("Summary", "Primary"),
                    ("Source", "Reuters"),
                    ("Image", "not a url"),
                ]),
                0,
            )
            .unwrap();
        assert_eq!(item.description.as_deref(), Some("Primary"));
        assert_eq!(item.source.as_deref(), Some("Reuters"));
        assert_eq!(item.image, None);
    }
}
