use std::path::Path;
use std::sync::Arc;

use crate::app::{build_feed, AppContext, BuildReport, BuildSpec, Result, SheetfeedError};
use crate::cli::BuildArgs;
use crate::config::{Config, ConfigError, FeedJob};
use crate::domain::ChannelMetadata;
use crate::fetcher::parallel::ParallelBuilder;
use crate::output::OutputTarget;
use crate::validate::{check_rss_shape, check_well_formed};
use crate::watch::{WatchConfig, Watcher};

/// Load the config file. Without an explicit path a missing default file
/// just means built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match Config::load(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::NotFound { .. }) | Err(ConfigError::NoConfigDir) if path.is_none() => {
            Ok(Config::default())
        }
        Err(e) => Err(SheetfeedError::Config(e.to_string())),
    }
}

/// Turn `build` arguments into a job, inheriting config defaults.
pub fn job_from_args(args: &BuildArgs) -> FeedJob {
    FeedJob {
        name: "build".to_string(),
        source: args.source.clone(),
        output: args.output.clone(),
        format: args.format,
        limit: args.limit,
        validate: args.validate,
        assume_utc: if args.local_time { Some(false) } else { None },
        channel: ChannelMetadata {
            title: args.title.clone(),
            link: args.link.clone(),
            self_link: args.self_link.clone(),
            description: args.description.clone(),
            language: args.language.clone(),
            ttl: args.ttl,
        },
    }
}

pub async fn build(ctx: &AppContext, args: &BuildArgs) -> Result<()> {
    let spec = BuildSpec::from_job(&job_from_args(args), &ctx.defaults);
    let report = build_feed(ctx, &spec).await?;

    if args.report {
        eprintln!("{}", report_json(&report)?);
    }
    if spec.output != OutputTarget::Stdout {
        print_summary(&report);
    }
    Ok(())
}

pub async fn run_all(ctx: Arc<AppContext>, config: &Config, workers: usize, report: bool) -> Result<()> {
    if config.feeds.is_empty() {
        println!("No feeds configured");
        return Ok(());
    }

    let specs: Vec<BuildSpec> = config
        .feeds
        .iter()
        .map(|job| BuildSpec::from_job(job, &ctx.defaults))
        .collect();

    println!("Building {} feeds...", specs.len());
    let results = ParallelBuilder::with_workers(ctx, workers).build_all(specs).await;

    let mut errors = 0;
    for (name, result) in results {
        match result {
            Ok(built) => {
                print_summary(&built);
                if report {
                    println!("{}", report_json(&built)?);
                }
            }
            Err(e) => {
                errors += 1;
                eprintln!("  Error building {}: {}", name, e);
            }
        }
    }

    if errors > 0 {
        return Err(SheetfeedError::Other(format!("{} feed(s) failed to build", errors)));
    }
    Ok(())
}

pub fn check(path: &Path) -> Result<()> {
    let xml = std::fs::read_to_string(path)?;

    check_well_formed(&xml)
        .map_err(|issue| SheetfeedError::MalformedXml(format!("{}: {}", path.display(), issue)))?;

    match check_rss_shape(&xml) {
        Ok(count) => println!("{}: well-formed, {} items", path.display(), count),
        Err(issue) => println!("{}: well-formed, but {}", path.display(), issue),
    }
    Ok(())
}

pub async fn watch(
    ctx: Arc<AppContext>,
    config: &Config,
    interval: &str,
    no_initial_build: bool,
    workers: usize,
) -> Result<()> {
    let interval_secs = WatchConfig::parse_interval(interval).map_err(SheetfeedError::Config)?;

    let specs: Vec<BuildSpec> = config
        .feeds
        .iter()
        .map(|job| BuildSpec::from_job(job, &ctx.defaults))
        .collect();
    if specs.is_empty() {
        return Err(SheetfeedError::Config("No feeds configured".to_string()));
    }

    let watch_config = WatchConfig {
        interval_secs,
        build_on_start: !no_initial_build,
        workers,
    };
    Watcher::new(ctx, specs, watch_config).run().await
}

pub fn init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_config_path().map_err(|e| SheetfeedError::Config(e.to_string()))?,
    };

    Config::write_default(&path).map_err(|e| SheetfeedError::Config(e.to_string()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn report_json(report: &BuildReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| SheetfeedError::Other(e.to_string()))
}

fn print_summary(report: &BuildReport) {
    println!(
        "  {}: {} items -> {} ({} rejected, {} duplicates)",
        report.name, report.emitted, report.output, report.rejected, report.duplicates
    );
}
