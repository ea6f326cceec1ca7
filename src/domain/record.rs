use std::collections::HashMap;
use std::sync::Arc;

/// Header row of a parsed table, with a lowercase index for
/// case-insensitive lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    names: Vec<String>,
    lower: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .collect();

        let mut lower = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            // First column wins when two headers differ only by case
            lower.entry(name.to_lowercase()).or_insert(idx);
        }

        Self { names, lower }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column position for `key`, compared case-insensitively.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.lower.get(&key.to_lowercase()).copied()
    }
}

/// One data row keyed by the header row it was parsed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    headers: Arc<HeaderIndex>,
    values: Vec<String>,
}

impl RawRecord {
    /// Build a record, padding missing trailing columns with empty strings
    /// and dropping extra ones.
    pub fn new(headers: Arc<HeaderIndex>, mut values: Vec<String>) -> Self {
        values.resize(headers.len(), String::new());
        Self { headers, values }
    }

    pub fn headers(&self) -> &HeaderIndex {
        &self.headers
    }

    /// Value of the column named `key` (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .position(key)
            .and_then(|idx| self.values.get(idx))
            .map(String::as_str)
    }

    /// First non-empty value among `keys`, tried in order.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Column name / value pairs in header order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.trim().is_empty())
    }
}
