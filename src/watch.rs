//! Periodic rebuilds of every configured feed.
//!
//! Runs in the foreground until SIGINT/SIGTERM, so it can sit under a
//! process supervisor or in a terminal without any scheduler setup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;

use crate::app::{AppContext, BuildSpec, Result};
use crate::fetcher::parallel::ParallelBuilder;

/// Watch loop configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Rebuild interval in seconds (default: 3600 = 1 hour)
    pub interval_secs: u64,
    /// Whether to build immediately on start
    pub build_on_start: bool,
    pub workers: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            build_on_start: true,
            workers: crate::fetcher::parallel::DEFAULT_WORKERS,
        }
    }
}

impl WatchConfig {
    /// Parse an interval such as "90", "45s", "30m", "6h" or "1d" into seconds.
    pub fn parse_interval(s: &str) -> std::result::Result<u64, String> {
        let s = s.trim().to_lowercase();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);

        let multiplier = match unit {
            "" | "s" => 1,
            "m" => 60,
            "h" => 3600,
            "d" => 86400,
            _ => return Err(format!("Unknown interval unit in {s:?}; use s, m, h or d")),
        };
        let secs = digits
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .ok_or_else(|| format!("Invalid interval: {s:?}"))?;

        if secs == 0 {
            return Err("Interval must be greater than zero".to_string());
        }
        Ok(secs)
    }

    /// Largest whole unit that represents `secs` exactly.
    pub fn format_interval(secs: u64) -> String {
        let (size, unit) = [(86400, 'd'), (3600, 'h'), (60, 'm')]
            .into_iter()
            .find(|(size, _)| secs >= *size && secs % size == 0)
            .unwrap_or((1, 's'));
        format!("{}{}", secs / size, unit)
    }
}

pub struct Watcher {
    builder: ParallelBuilder,
    specs: Vec<BuildSpec>,
    config: WatchConfig,
    running: Arc<AtomicBool>,
}

impl Watcher {
    pub fn new(ctx: Arc<AppContext>, specs: Vec<BuildSpec>, config: WatchConfig) -> Self {
        Self {
            builder: ParallelBuilder::with_workers(ctx, config.workers),
            specs,
            config,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let running = self.running.clone();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;
            let running = running.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = sigint.recv() => {},
                }
                running.store(false, Ordering::SeqCst);
            });
        }

        #[cfg(windows)]
        {
            let running = running.clone();
            tokio::spawn(async move {
                let _ = tokio::signal::ctrl_c().await;
                running.store(false, Ordering::SeqCst);
            });
        }

        tracing::info!(
            "Watching {} feeds (interval: {})",
            self.specs.len(),
            WatchConfig::format_interval(self.config.interval_secs)
        );

        if self.config.build_on_start {
            self.run_cycle().await;
        }

        let mut timer = interval(Duration::from_secs(self.config.interval_secs));
        timer.tick().await;

        while running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = timer.tick() => {}
                _ = wait_for_stop(&running) => break,
            }
            if !running.load(Ordering::SeqCst) {
                break;
            }
            self.run_cycle().await;
        }

        tracing::info!("Watch stopped");
        Ok(())
    }

    /// Build every feed once. Returns (built, failed).
    pub async fn run_cycle(&self) -> (usize, usize) {
        let start = Utc::now();
        let results = self.builder.build_all(self.specs.clone()).await;

        let mut built = 0;
        let mut failed = 0;
        for (name, result) in results {
            match result {
                Ok(_) => built += 1,
                Err(e) => {
                    failed += 1;
                    tracing::error!("[{}] build failed: {}", name, e);
                }
            }
        }

        let elapsed = Utc::now().signed_duration_since(start);
        tracing::info!(
            "Build cycle complete: {} built, {} failed ({:.1}s)",
            built,
            failed,
            elapsed.num_milliseconds() as f64 / 1000.0
        );
        (built, failed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

async fn wait_for_stop(running: &AtomicBool) {
    while running.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
