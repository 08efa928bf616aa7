//! Filesystem-backed object store: `<root>/<bucket>/<path>`.

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use super::{ObjectError, ObjectStore, check_location};

/// Stores objects as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    /// Creates a store rooted at `root`, publishing URLs under `base_url`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    fn file_path(&self, bucket: &str, path: &str) -> Result<PathBuf, ObjectError> {
        check_location(bucket, path)?;
        Ok(self.root.join(bucket).join(path))
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalObjectStore {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<(), ObjectError> {
        let file = self.file_path(bucket, path)?;
        if let Some(dir) = file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let mut out = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file)
            .await
        {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ObjectError::AlreadyExists {
                    bucket: bucket.to_string(),
                    path: path.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        out.write_all(&bytes).await?;
        out.flush().await?;
        tracing::debug!(bucket, path, "object stored");
        Ok(())
    }

    async fn read(&self, bucket: &str, path: &str) -> Result<Vec<u8>, ObjectError> {
        let file = self.file_path(bucket, path)?;
        match tokio::fs::read(&file).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ObjectError::NotFound {
                bucket: bucket.to_string(),
                path: path.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), ObjectError> {
        for path in paths {
            let file = self.file_path(bucket, path)?;
            match tokio::fs::remove_file(&file).await {
                Ok(()) => tracing::debug!(bucket, path = %path, "object removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
