use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::{build_feed, AppContext, BuildReport, BuildSpec, Result};

pub const DEFAULT_WORKERS: usize = 4;

/// Builds many feeds at once, with at most `workers` in flight.
pub struct ParallelBuilder {
    ctx: Arc<AppContext>,
    semaphore: Arc<Semaphore>,
}

impl ParallelBuilder {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self::with_workers(ctx, DEFAULT_WORKERS)
    }

    pub fn with_workers(ctx: Arc<AppContext>, workers: usize) -> Self {
        Self {
            ctx,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Build every job; results come back in input order. One feed failing
    /// does not affect the others.
    pub async fn build_all(&self, specs: Vec<BuildSpec>) -> Vec<(String, Result<BuildReport>)> {
        let mut handles = Vec::new();

        for spec in specs {
            let ctx = self.ctx.clone();
            let semaphore = self.semaphore.clone();
            let name = spec.name.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                build_feed(&ctx, &spec).await
            });

            handles.push((name, handle));
        }

        let mut results = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(result) => results.push((name, result)),
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        results
    }
}
