//! In-memory object store for tests.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{ObjectError, ObjectStore, check_location};

/// Keeps objects in a map keyed by `(bucket, path)`.
#[derive(Debug)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryObjectStore {
    /// Creates an empty store publishing URLs under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// `true` when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<(), ObjectError> {
        check_location(bucket, path)?;
        let key = (bucket.to_string(), path.to_string());
        let mut objects = self.objects.write().await;
        if objects.contains_key(&key) {
            return Err(ObjectError::AlreadyExists {
                bucket: key.0,
                path: key.1,
            });
        }
        objects.insert(key, bytes);
        Ok(())
    }

    async fn read(&self, bucket: &str, path: &str) -> Result<Vec<u8>, ObjectError> {
        check_location(bucket, path)?;
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| ObjectError::NotFound {
                bucket: bucket.to_string(),
                path: path.to_string(),
            })
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), ObjectError> {
        let mut objects = self.objects.write().await;
        for path in paths {
            objects.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }
}
