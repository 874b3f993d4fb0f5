//! Storage adapter seam for CEL event logs (§4.10, §5). A per-asset lock is
//! held only for the duration of an append, matching the "readers never block
//! writers across assets" concurrency note.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use originals_core::OriginalsError;
use tokio::sync::Mutex;

use crate::event::CelEvent;

#[async_trait]
pub trait CelStore: Send + Sync {
    /// Append one event to an asset's log. Implementations must serialize
    /// concurrent appends to the same `asset_id`.
    async fn append(&self, asset_id: &str, event: CelEvent) -> Result<(), OriginalsError>;

    /// Load the full event log for an asset, in sequence order.
    async fn load(&self, asset_id: &str) -> Result<Vec<CelEvent>, OriginalsError>;
}

/// Process-local store, useful for tests and for `did:peer`-only workflows
/// that never persist past the process lifetime.
#[derive(Default)]
pub struct InMemoryStore {
    logs: Mutex<HashMap<String, Vec<CelEvent>>>,
}

#[async_trait]
impl CelStore for InMemoryStore {
    async fn append(&self, asset_id: &str, event: CelEvent) -> Result<(), OriginalsError> {
        let mut logs = self.logs.lock().await;
        logs.entry(asset_id.to_string()).or_default().push(event);
        Ok(())
    }

    async fn load(&self, asset_id: &str) -> Result<Vec<CelEvent>, OriginalsError> {
        let logs = self.logs.lock().await;
        Ok(logs.get(asset_id).cloned().unwrap_or_default())
    }
}

/// One JSONL file per asset under `base_dir`, appended to under a per-asset
/// lock so concurrent migrations on different assets never contend.
pub struct FilesystemStore {
    base_dir: PathBuf,
    asset_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FilesystemStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into(), asset_locks: Mutex::new(HashMap::new()) }
    }

    fn path_for(&self, asset_id: &str) -> PathBuf {
        self.base_dir.join(format!("{asset_id}.jsonl"))
    }

    async fn lock_for(&self, asset_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.asset_locks.lock().await;
        locks.entry(asset_id.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

#[async_trait]
impl CelStore for FilesystemStore {
    async fn append(&self, asset_id: &str, event: CelEvent) -> Result<(), OriginalsError> {
        let lock = self.lock_for(asset_id).await;
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| OriginalsError::Storage(e.to_string()))?;

        let mut line = serde_json::to_string(&event).map_err(|e| OriginalsError::Serialization(e.to_string()))?;
        line.push('\n');

        use tokio::io::AsyncWriteExt;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(asset_id))
            .await
            .map_err(|e| OriginalsError::Storage(e.to_string()))?;
        file.write_all(line.as_bytes()).await.map_err(|e| OriginalsError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn load(&self, asset_id: &str) -> Result<Vec<CelEvent>, OriginalsError> {
        let path = self.path_for(asset_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| OriginalsError::Storage(e.to_string()))?;
        contents
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(|e| OriginalsError::Serialization(e.to_string())))
            .collect()
    }
}
