use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::CanonicalItem;

/// Result of deduplicating, sorting and truncating a batch of items.
#[derive(Debug, Clone, Default)]
pub struct Finalized {
    /// Items to emit, newest first.
    pub items: Vec<CanonicalItem>,
    /// Later occurrences of an already-seen guid, in input order.
    pub duplicates: Vec<CanonicalItem>,
    /// Number of items cut by the limit.
    pub truncated: usize,
}

/// Split `items` into first occurrences and duplicates by lowercased guid.
pub fn dedup(items: Vec<CanonicalItem>) -> (Vec<CanonicalItem>, Vec<CanonicalItem>) {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .partition(|item| seen.insert(item.dedup_key()))
}

/// Newest first; equal dates keep input order.
pub fn recency_order(a: &CanonicalItem, b: &CanonicalItem) -> Ordering {
    b.pub_date
        .cmp(&a.pub_date)
        .then_with(|| a.source_row_index.cmp(&b.source_row_index))
}

/// Deduplicate, sort by recency, then keep at most `limit` items.
/// A `limit` of zero or less means unbounded.
pub fn finalize(items: Vec<CanonicalItem>, limit: i64) -> Finalized {
    let (mut kept, duplicates) = dedup(items);
    kept.sort_by(recency_order);

    let mut truncated = 0;
    if let Ok(limit) = usize::try_from(limit) {
        if limit > 0 && kept.len() > limit {
            truncated = kept.len() - limit;
            kept.truncate(limit);
        }
    }

    Finalized {
        items: kept,
        duplicates,
        truncated,
    }
}
