use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;

use crate::app::{AppContext, Result};
use crate::config::{Defaults, FeedJob};
use crate::domain::ChannelMetadata;
use crate::fetcher::{read_text, SourceSpec};
use crate::output::{write_output, OutputTarget};
use crate::pipeline::{self, PipelineOptions, Skipped};
use crate::render::OutputFormat;
use crate::validate::{self, ValidateMode};

/// Everything needed to turn one CSV source into one document.
#[derive(Debug, Clone)]
pub struct BuildSpec {
    pub name: String,
    pub source: SourceSpec,
    pub output: OutputTarget,
    pub format: OutputFormat,
    pub validate: ValidateMode,
    pub pipeline: PipelineOptions,
    pub channel: ChannelMetadata,
}

impl BuildSpec {
    pub fn from_job(job: &FeedJob, defaults: &Defaults) -> Self {
        Self {
            name: job.name.clone(),
            source: SourceSpec::parse(&job.source),
            output: OutputTarget::from_path(&job.output),
            format: job.format(defaults),
            validate: job.validate(defaults),
            pipeline: PipelineOptions {
                limit: job.limit(defaults),
                assume_utc: job.assume_utc(defaults),
                now: None,
            },
            channel: job.channel(defaults),
        }
    }
}

/// A skipped row in serializable form.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
    pub fields: BTreeMap<String, String>,
}

impl From<&Skipped> for SkippedRow {
    fn from(skip: &Skipped) -> Self {
        Self {
            row: skip.row_index,
            reason: skip.reason.to_string(),
            fields: skip
                .record
                .fields()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub name: String,
    pub source: String,
    pub output: String,
    pub format: OutputFormat,
    pub parsed: usize,
    pub emitted: usize,
    pub rejected: usize,
    pub duplicates: usize,
    pub truncated: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Acquire, transform, render, check and write one feed.
///
/// Nothing is written if acquisition fails or if a strict check rejects
/// the rendered document.
pub async fn build_feed(ctx: &AppContext, spec: &BuildSpec) -> Result<BuildReport> {
    let text = read_text(ctx.fetcher.as_ref(), &spec.source).await?;

    let mut skipped = Vec::new();
    let outcome = {
        let mut sink = |skip: Skipped| {
            tracing::warn!(
                "[{}] skipping row {}: {}",
                spec.name,
                skip.row_index + 1,
                skip.reason
            );
            skipped.push(SkippedRow::from(&skip));
        };
        pipeline::run(&text, &spec.pipeline, &mut sink)
    };

    let renderer = spec.format.renderer();
    let document = renderer.render(&outcome.items, &spec.channel, Utc::now());

    if spec.format.is_xml() {
        validate::enforce(spec.validate, &spec.name, &document)?;
    }

    write_output(&spec.output, &document).await?;

    tracing::info!(
        "[{}] wrote {} items to {} ({} rejected, {} duplicates)",
        spec.name,
        outcome.items.len(),
        spec.output,
        outcome.rejected,
        outcome.duplicates
    );

    Ok(BuildReport {
        name: spec.name.clone(),
        source: spec.source.to_string(),
        output: spec.output.to_string(),
        format: spec.format,
        parsed: outcome.parsed,
        emitted: outcome.items.len(),
        rejected: outcome.rejected,
        duplicates: outcome.duplicates,
        truncated: outcome.truncated,
        skipped,
    })
}
