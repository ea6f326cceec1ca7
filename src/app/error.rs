use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetfeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to acquire {source_name}: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SheetfeedError>;
