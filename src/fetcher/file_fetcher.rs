use async_trait::async_trait;

use crate::app::Result;
use crate::fetcher::{source_error, Fetcher, SourceSpec};

/// Reads CSV documents from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, source: &SourceSpec) -> Result<Vec<u8>> {
        let SourceSpec::Path(path) = source else {
            return Err(source_error(source, "not a local path"));
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| source_error(source, e.to_string()))?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }
}
