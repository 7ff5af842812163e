// Durable string key/value storage and the resume vault built on top of it.
// Backends are swapped at startup from STORAGE_BACKEND; everything above this module
// only sees `Arc<dyn KvStore>`.

pub mod file;
pub mod memory;
pub mod redis_store;
pub mod vault;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::{Config, StorageBackend};

pub use vault::ResumeVault;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage task failed: {0}")]
    Task(String),
}

/// String-keyed, string-valued durable store.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites any previous value for `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Opens the backend selected in `config`.
pub async fn open_store(config: &Config) -> Result<Arc<dyn KvStore>> {
    let store: Arc<dyn KvStore> = match &config.storage_backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage (data is lost on exit)");
            Arc::new(memory::MemoryStore::new())
        }
        StorageBackend::File { data_dir } => {
            info!("Using file storage in {}", data_dir.display());
            Arc::new(file::FileStore::open(data_dir).await?)
        }
        StorageBackend::Redis { url, key_prefix } => {
            info!("Using redis storage (prefix '{key_prefix}')");
            Arc::new(redis_store::RedisStore::new(url, key_prefix)?)
        }
    };
    Ok(store)
}
