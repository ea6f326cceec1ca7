pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::fetcher::parallel::DEFAULT_WORKERS;
use crate::render::OutputFormat;
use crate::validate::ValidateMode;

#[derive(Parser)]
#[command(name = "sheetfeed")]
#[command(about = "Turn a CSV or published spreadsheet into an RSS feed or HTML page", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/sheetfeed/feeds.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build one feed from a CSV file or URL
    Build(BuildArgs),
    /// Build every feed in the config file
    Run {
        /// Number of feeds to build concurrently
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// Print a JSON report for each feed
        #[arg(long)]
        report: bool,
    },
    /// Check an existing RSS document for well-formedness
    Check {
        /// Path to the XML file
        path: PathBuf,
    },
    /// Rebuild every configured feed on an interval
    Watch {
        /// Rebuild interval (e.g., "1h", "30m", "6h", "1d")
        #[arg(short, long, default_value = "1h")]
        interval: String,

        /// Skip the initial build on start
        #[arg(long)]
        no_initial_build: bool,

        /// Number of feeds to build concurrently
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,
    },
    /// Write a commented default config file
    Init,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// CSV source: a local path or an http(s) URL
    pub source: String,

    /// Output file, or "-" for stdout
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Keep only the N most recent items (0 = all)
    #[arg(short, long)]
    pub limit: Option<i64>,

    /// Well-formedness check on RSS output
    #[arg(long, value_enum)]
    pub validate: Option<ValidateMode>,

    /// Read dates without a timezone as local time instead of UTC
    #[arg(long)]
    pub local_time: bool,

    /// Channel title
    #[arg(long)]
    pub title: Option<String>,

    /// Channel site link
    #[arg(long)]
    pub link: Option<String>,

    /// Public URL of the feed itself
    #[arg(long)]
    pub self_link: Option<String>,

    /// Channel description
    #[arg(long)]
    pub description: Option<String>,

    /// Channel language (e.g., "en-us")
    #[arg(long)]
    pub language: Option<String>,

    /// Channel time-to-live in minutes
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Print a JSON build report to stderr
    #[arg(long)]
    pub report: bool,
}
