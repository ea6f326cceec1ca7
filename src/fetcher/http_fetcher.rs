use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::app::Result;
use crate::config::HttpConfig;
use crate::fetcher::{source_error, spreadsheet_export_url, Fetcher, SourceSpec};

pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_max_secs: u64,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            backoff_max_secs: config.backoff_max_secs,
        })
    }
}

/// Statuses worth another attempt.
pub fn should_retry_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    match err.status() {
        Some(status) => should_retry_status(status),
        None => err.is_request(),
    }
}

/// `2^attempt` seconds, capped at `max_secs`.
pub fn compute_backoff(attempt: u32, max_secs: u64) -> Duration {
    let secs = 1u64
        .checked_shl(attempt)
        .unwrap_or(u64::MAX)
        .min(max_secs);
    Duration::from_secs(secs)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, source: &SourceSpec) -> Result<Vec<u8>> {
        let SourceSpec::Url(url) = source else {
            return Err(source_error(source, "not an http(s) URL"));
        };
        let url = spreadsheet_export_url(url);
        if url.as_str() != source.to_string() {
            tracing::debug!("Rewrote spreadsheet URL to {}", url);
        }

        let max_attempts = self.max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.bytes().await?.to_vec();
                        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
                        return Ok(body);
                    }
                    last_error = format!("HTTP {}", status);
                    if !should_retry_status(status) {
                        break;
                    }
                }
                Err(e) => {
                    last_error = e.to_string();
                    if !should_retry_error(&e) {
                        break;
                    }
                }
            }

            if attempt < max_attempts {
                let backoff = compute_backoff(attempt, self.backoff_max_secs);
                tracing::warn!(
                    "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                    attempt,
                    max_attempts,
                    url,
                    last_error,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }
        }

        Err(source_error(source, last_error))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::app::SheetfeedError;

    /// Serves `responses` in order, one per connection.
    async fn serve(responses: Vec<&'static str>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = vec![0u8; 4096];
                let mut read = 0;
                while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf[read..]).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    read += n;
                }
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        (format!("http://{}/sheet.csv", addr), hits)
    }

    fn fast_config(max_retries: u32) -> HttpConfig {
        HttpConfig {
            max_retries,
            backoff_max_secs: 0,
            ..Default::default()
        }
    }

    const UNAVAILABLE: &str =
        "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    const OK: &str =
        "HTTP/1.1 200 OK\r\nContent-Length: 11\r\nConnection: close\r\n\r\nTitle,URL\r\n";

    #[test]
    fn test_backoff_is_capped() {
        assert_eq!(compute_backoff(1, 30), Duration::from_secs(2));
        assert_eq!(compute_backoff(3, 30), Duration::from_secs(8));
        assert_eq!(compute_backoff(10, 30), Duration::from_secs(30));
        assert_eq!(compute_backoff(80, 30), Duration::from_secs(30));
    }

    #[test]
    fn test_retry_statuses() {
        assert!(should_retry_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(should_retry_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!should_retry_status(StatusCode::NOT_FOUND));
        assert!(!should_retry_status(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn test_retries_transient_failure() {
        let (url, hits) = serve(vec![UNAVAILABLE, OK]).await;
        let fetcher = HttpFetcher::new(&fast_config(2)).unwrap();

        let body = fetcher.fetch(&SourceSpec::parse(&url)).await.unwrap();
        assert_eq!(body, b"Title,URL\r\n");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let (url, hits) = serve(vec![NOT_FOUND, OK]).await;
        let fetcher = HttpFetcher::new(&fast_config(3)).unwrap();

        let err = fetcher.fetch(&SourceSpec::parse(&url)).await.unwrap_err();
        assert!(matches!(err, SheetfeedError::Source { .. }));
        assert!(err.to_string().contains("404"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (url, hits) = serve(vec![UNAVAILABLE, UNAVAILABLE]).await;
        let fetcher = HttpFetcher::new(&fast_config(1)).unwrap();

        let err = fetcher.fetch(&SourceSpec::parse(&url)).await.unwrap_err();
        assert!(err.to_string().contains("503"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
