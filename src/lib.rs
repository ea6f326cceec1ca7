//! # sheetfeed
//!
//! Turns a CSV document (typically a published Google Sheet) into an
//! RSS 2.0 feed or a static HTML page.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Parser → Normalizer → Finalize → Renderer → Validate → Output
//! ```
//!
//! - [`fetcher`]: acquires CSV text from a URL (with retries) or a path
//! - [`parser`]: splits text into header-keyed records
//! - [`normalizer`]: maps records onto validated feed items
//! - [`pipeline`]: deduplicates, sorts and truncates; reports skipped rows
//! - [`render`]: RSS and HTML output
//! - [`validate`]: optional well-formedness check
//!
//! ## Quick Start
//!
//! ```bash
//! # Build a feed from a published sheet
//! sheetfeed build "https://docs.google.com/spreadsheets/d/e/.../pub?gid=0" \
//!     -o public/feed.xml --title "Headlines" --limit 50
//!
//! # Build every feed in ~/.config/sheetfeed/feeds.toml
//! sheetfeed run
//!
//! # Check an existing document
//! sheetfeed check public/feed.xml
//! ```

/// Application context, build orchestration and error types.
///
/// [`build_feed`](app::build_feed) runs one source through the whole
/// pipeline and writes the result.
pub mod app;

/// Command-line interface using clap.
///
/// - `build <source>` - Build one feed
/// - `run` - Build every configured feed
/// - `check <file>` - Check an RSS document
/// - `watch` - Rebuild on an interval
/// - `init` - Write a default config
pub mod cli;

/// Configuration loaded from `~/.config/sheetfeed/feeds.toml`.
pub mod config;

/// Core data model: raw records, canonical items, channel metadata.
pub mod domain;

/// CSV acquisition.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for acquiring raw bytes
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based, retries with backoff
/// - [`FileFetcher`](fetcher::FileFetcher): local files
/// - [`ParallelBuilder`](fetcher::parallel::ParallelBuilder): builds many feeds concurrently
pub mod fetcher;

/// Maps raw rows to canonical items, with URL and date sanitization.
pub mod normalizer;

/// Output sink: file (written atomically) or stdout.
pub mod output;

/// CSV and TSV parsing.
pub mod parser;

/// Parse → normalize → dedup/sort, with a skip channel for dropped rows.
pub mod pipeline;

/// RSS 2.0 and HTML renderers plus shared escaping.
pub mod render;

/// Advisory XML well-formedness checks.
pub mod validate;

/// Periodic rebuilds for `sheetfeed watch`.
pub mod watch;
