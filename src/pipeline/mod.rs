//! Parse, normalize and finalize a CSV document into feed items.

pub mod finalize;

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::{CanonicalItem, RawRecord};
use crate::normalizer::{Normalizer, ValidationError};
use crate::parser;

pub use finalize::{dedup, finalize, recency_order, Finalized};

/// Why a row did not make it into the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Invalid(ValidationError),
    DuplicateGuid,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Invalid(err) => write!(f, "{}", err),
            SkipReason::DuplicateGuid => write!(f, "duplicate guid"),
        }
    }
}

/// A dropped row together with its original content.
#[derive(Debug, Clone)]
pub struct Skipped {
    pub row_index: usize,
    pub record: RawRecord,
    pub reason: SkipReason,
}

/// Receives one event per rejected or duplicate row.
pub trait SkipSink {
    fn skipped(&mut self, skip: Skipped);
}

impl<F: FnMut(Skipped)> SkipSink for F {
    fn skipped(&mut self, skip: Skipped) {
        self(skip)
    }
}

/// Collects skip events for later inspection.
#[derive(Debug, Default)]
pub struct SkipCollector {
    pub skipped: Vec<Skipped>,
}

impl SkipSink for SkipCollector {
    fn skipped(&mut self, skip: Skipped) {
        self.skipped.push(skip);
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub limit: i64,
    pub assume_utc: bool,
    /// Timestamp used for rows without a date. Defaults to process time.
    pub now: Option<DateTime<Utc>>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            limit: 0,
            assume_utc: true,
            now: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub items: Vec<CanonicalItem>,
    pub parsed: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub truncated: usize,
}

/// Run the whole item pipeline over raw CSV text.
///
/// Bad rows never abort the batch; each one is reported to `sink`.
pub fn run(raw_text: &str, options: &PipelineOptions, sink: &mut dyn SkipSink) -> BuildOutcome {
    let table = parser::parse(raw_text);

    let mut normalizer = Normalizer::new().assume_utc(options.assume_utc);
    if let Some(now) = options.now {
        normalizer = normalizer.with_now(now);
    }

    let mut rejected = 0;
    let mut items = Vec::with_capacity(table.len());
    for (row_index, record) in table.records.iter().enumerate() {
        match normalizer.normalize(record, row_index) {
            Ok(item) => items.push(item),
            Err(err) => {
                rejected += 1;
                sink.skipped(Skipped {
                    row_index,
                    record: record.clone(),
                    reason: SkipReason::Invalid(err),
                });
            }
        }
    }

    let finalized = finalize(items, options.limit);
    for duplicate in &finalized.duplicates {
        let row_index = duplicate.source_row_index();
        if let Some(record) = table.records.get(row_index) {
            sink.skipped(Skipped {
                row_index,
                record: record.clone(),
                reason: SkipReason::DuplicateGuid,
            });
        }
    }

    tracing::debug!(
        "Pipeline: {} parsed, {} rejected, {} duplicates, {} truncated",
        table.len(),
        rejected,
        finalized.duplicates.len(),
        finalized.truncated
    );

    BuildOutcome {
        parsed: table.len(),
        rejected,
        duplicates: finalized.duplicates.len(),
        truncated: finalized.truncated,
        items: finalized.items,
    }
}
