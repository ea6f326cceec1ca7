use std::sync::Arc;

use crate::app::error::Result;
use crate::config::{Config, Defaults};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::{Fetcher, SourceFetcher};

pub struct AppContext {
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub defaults: Defaults,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let http = HttpFetcher::new(&config.http)?;
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(SourceFetcher::new(http));

        Ok(Self {
            fetcher,
            defaults: config.defaults.clone(),
        })
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher + Send + Sync>, defaults: Defaults) -> Self {
        Self { fetcher, defaults }
    }
}
