use std::path::PathBuf;

use anyhow::Context;

use super::Publisher;

/// Writes reports into a local directory. Existing files are overwritten.
#[derive(Debug, Clone)]
pub struct FilePublisher {
    directory: PathBuf,
}

impl FilePublisher {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait::async_trait]
impl Publisher for FilePublisher {
    async fn send(&self, content: &[u8], name: &str) -> anyhow::Result<()> {
        if !self.directory.as_os_str().is_empty() {
            tokio::fs::create_dir_all(&self.directory)
                .await
                .with_context(|| format!("Unable to create {}", self.directory.display()))?;
        }

        let path = self.directory.join(name);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Unable to write {}", path.display()))?;

        tracing::info!(path = %path.display(), bytes = content.len(), "Report written");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_writes_into_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports/2022");
        let publisher = FilePublisher::new(&target);

        assert_ok!(publisher.send(b"content", "Report_202201.xlsx").await);
        let written = std::fs::read(target.join("Report_202201.xlsx")).unwrap();
        assert_eq!(written, b"content");

        assert_ok!(publisher.send(b"again", "Report_202201.xlsx").await);
        let written = std::fs::read(target.join("Report_202201.xlsx")).unwrap();
        assert_eq!(written, b"again");
    }

    #[tokio::test]
    async fn test_unusable_directory_fails_on_send() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let publisher = FilePublisher::new(blocker.join("reports"));
        assert_err!(publisher.send(b"content", "report.xlsx").await);
    }
}
