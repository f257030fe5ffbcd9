use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::client::StateStore;

/// Minimal ordered key-value surface the registry needs from a backend.
#[async_trait]
pub trait KeyValue: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;

    /// Store `value` only if `key` is absent. Returns `false` when the key already exists.
    async fn put_if_absent(&self, key: &str, value: &[u8]) -> anyhow::Result<bool>;

    /// All pairs under `prefix`, in key order.
    async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>>;

    fn backend_name(&self) -> &'static str;
}

#[async_trait]
impl KeyValue for StateStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        StateStore::get(self, key).await
    }

    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        StateStore::put(self, key, value).await
    }

    // SlateDB has no conditional write: two writers can both see the key missing.
    async fn put_if_absent(&self, key: &str, value: &[u8]) -> anyhow::Result<bool> {
        if StateStore::get(self, key).await?.is_some() {
            return Ok(false);
        }
        StateStore::put(self, key, value).await?;
        Ok(true)
    }

    async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        StateStore::list_prefix(self, prefix).await
    }

    fn backend_name(&self) -> &'static str {
        "slatedb"
    }
}

/// In-process backend. Nothing survives a restart.
///
/// Writes are serialized by one lock, so `put_if_absent` is atomic here.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValue for MemoryKv {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &[u8]) -> anyhow::Result<bool> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
