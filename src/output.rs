use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::app::Result;

/// Where a rendered document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `-` means stdout; anything else is a file path.
    pub fn from_path(path: &Path) -> Self {
        if path.as_os_str() == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(path.to_path_buf())
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => write!(f, "<stdout>"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Write `contents` to `target`.
///
/// Files are written to a temporary sibling and renamed into place, so a
/// failed run never leaves a truncated document behind.
pub async fn write_output(target: &OutputTarget, contents: &str) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(contents.as_bytes()).await?;
            stdout.flush().await?;
        }
        OutputTarget::File(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            let tmp = temp_path(path);
            tokio::fs::write(&tmp, contents).await?;
            if let Err(e) = tokio::fs::rename(&tmp, path).await {
                let _ = tokio::fs::remove_file(&tmp).await;
                return Err(e.into());
            }
            tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
        }
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_is_stdout() {
        assert_eq!(OutputTarget::from_path(Path::new("-")), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_path(Path::new("out/feed.xml")),
            OutputTarget::File(PathBuf::from("out/feed.xml"))
        );
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_path(Path::new("public/feed.xml")),
            PathBuf::from("public/.feed.xml.tmp")
        );
    }

    #[tokio::test]
    async fn test_writes_file_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public").join("feed.xml");
        let target = OutputTarget::File(path.clone());

        write_output(&target, "<rss/>").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<rss/>");
        assert!(!dir.path().join("public").join(".feed.xml.tmp").exists());
    }
}
