//! In-process object store
//!
//! Holds objects in a sorted map and records every put, so push/pull can be
//! exercised without a bucket.

use crate::error::{Result, SyncError};
use crate::store::ObjectStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    puts: Arc<Mutex<Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing put bookkeeping
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.lock_objects().insert(key.into(), body.into());
    }

    /// Current body of an object
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock_objects().get(key).cloned()
    }

    /// All keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.lock_objects().keys().cloned().collect()
    }

    /// Keys in the order they were put
    pub fn put_log(&self) -> Vec<String> {
        self.puts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lock_objects(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record_put(&self, key: &str, body: Vec<u8>) {
        self.lock_objects().insert(key.to_string(), body);
        self.puts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn location(&self, key: &str) -> String {
        format!("memory://{}", key)
    }

    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.record_put(key, body);
        Ok(())
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        let body = tokio::fs::read(path)
            .await
            .map_err(|e| SyncError::io("read", path, e))?;
        self.record_put(key, body);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .lock_objects()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.object(key)
            .ok_or_else(|| SyncError::store("get_object", key, "NoSuchKey"))
    }

    async fn download_to(&self, key: &str, dest: &Path) -> Result<u64> {
        let body = self.get_object(key).await?;
        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| SyncError::io("write", dest, e))?;
        Ok(body.len() as u64)
    }
}
