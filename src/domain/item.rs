use chrono::{DateTime, Utc};
use serde::Serialize;

/// A validated, normalized feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalItem {
    pub title: String,
    pub link: String,
    pub guid: String,
    pub pub_date: DateTime<Utc>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub image: Option<String>,
    #[serde(skip)]
    pub(crate) source_row_index: usize,
}

impl CanonicalItem {
    pub fn new(
        title: String,
        link: String,
        guid: String,
        pub_date: DateTime<Utc>,
        source_row_index: usize,
    ) -> Self {
        Self {
            title,
            link,
            guid,
            pub_date,
            description: None,
            source: None,
            image: None,
            source_row_index,
        }
    }

    /// Key used to detect duplicate entries.
    pub fn dedup_key(&self) -> String {
        self.guid.to_lowercase()
    }

    pub fn source_row_index(&self) -> usize {
        self.source_row_index
    }

    pub fn display_description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn item(guid: &str) -> CanonicalItem {
        CanonicalItem::new(
            "Title".into(),
            "https://example.com/a".into(),
            guid.into(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            0,
        )
    }

    #[test]
    fn test_dedup_key_is_lowercased() {
        assert_eq!(
            item("https://Example.com/A").dedup_key(),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_display_description_empty_when_missing() {
        assert_eq!(item("https://example.com/a").display_description(), "");
    }

    #[test]
    fn test_row_index_not_serialized() {
        let json = serde_json::to_string(&item("https://example.com/a")).unwrap();
        assert!(!json.contains("source_row_index"));
        assert!(json.contains("\"guid\""));
    }
}
