//! Object store capability
//!
//! Minimal put/get/list surface the uploader and downloader need. Keys are
//! full object keys; namespacing is done by [`crate::keys`].

pub mod memory;
pub mod s3;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Object store operations used by push and pull
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human-readable location of a key, for log lines (e.g. `s3://bucket/key`)
    fn location(&self, key: &str) -> String;

    /// Upload an in-memory body
    async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()>;

    /// Upload a local file without buffering it in memory
    async fn put_file(&self, key: &str, path: &Path) -> Result<()>;

    /// List every key starting with `prefix`, across all result pages
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Fetch a whole object body into memory
    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    /// Stream an object body into `dest`, returning the bytes written
    ///
    /// `dest` is created or truncated; its parent must exist.
    async fn download_to(&self, key: &str, dest: &Path) -> Result<u64>;
}

pub use memory::MemoryStore;
pub use s3::S3Store;
