//! The checkpoint store (§4.12, §5): a process-wide, TTL-indexed map of
//! migration snapshots. A checkpoint is taken before `IN_PROGRESS` work
//! begins and released on `COMPLETED`; on `FAILED` the snapshot drives
//! rollback. Checkpoints are persisted conceptually (this map stands in for
//! whatever durable store a deployment wires in) and are never held while a
//! network await is in flight (§5).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use originals_core::{LayerBindings, Layer, OriginalsError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Default checkpoint TTL (§4.12): 24 hours.
pub const DEFAULT_TTL: Duration = Duration::hours(24);

/// A snapshot of everything a rollback needs to undo a migration attempt:
/// the CEL tail hash, bindings, and credential count at the moment the
/// attempt was checkpointed (§4.12).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub asset_id: String,
    pub cel_tail_hash: [u8; 32],
    pub bindings: LayerBindings,
    pub credential_count: usize,
    pub from_layer: Layer,
    pub to_layer: Layer,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Storage object keys uploaded under this checkpoint's id, for webvh
    /// rollback to delete on `FAILED` (§4.12).
    pub tagged_object_keys: Vec<String>,
}

impl Checkpoint {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Default)]
pub struct CheckpointStore {
    checkpoints: Mutex<HashMap<String, Checkpoint>>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the asset's current state and return a fresh checkpoint id (§4.12).
    pub async fn create(
        &self,
        asset_id: &str,
        cel_tail_hash: [u8; 32],
        bindings: LayerBindings,
        credential_count: usize,
        from_layer: Layer,
        to_layer: Layer,
        now: DateTime<Utc>,
    ) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let checkpoint = Checkpoint {
            id: id.clone(),
            asset_id: asset_id.to_string(),
            cel_tail_hash,
            bindings,
            credential_count,
            from_layer,
            to_layer,
            created_at: now,
            expires_at: now + DEFAULT_TTL,
            tagged_object_keys: Vec::new(),
        };
        self.checkpoints.lock().await.insert(id.clone(), checkpoint);
        id
    }

    /// Record an object key uploaded during `IN_PROGRESS` so it can be
    /// deleted on rollback (§4.12).
    pub async fn tag_object_key(&self, checkpoint_id: &str, object_key: String) -> Result<(), OriginalsError> {
        let mut checkpoints = self.checkpoints.lock().await;
        let checkpoint = checkpoints
            .get_mut(checkpoint_id)
            .ok_or_else(|| OriginalsError::CheckpointNotFound(checkpoint_id.to_string()))?;
        checkpoint.tagged_object_keys.push(object_key);
        Ok(())
    }

    pub async fn get(&self, checkpoint_id: &str, now: DateTime<Utc>) -> Result<Checkpoint, OriginalsError> {
        let checkpoints = self.checkpoints.lock().await;
        let checkpoint = checkpoints
            .get(checkpoint_id)
            .ok_or_else(|| OriginalsError::CheckpointNotFound(checkpoint_id.to_string()))?;
        if checkpoint.is_expired(now) {
            return Err(OriginalsError::CheckpointNotFound(checkpoint_id.to_string()));
        }
        Ok(checkpoint.clone())
    }

    /// Release a checkpoint on successful completion (§4.12 `COMPLETED`).
    pub async fn release(&self, checkpoint_id: &str) {
        self.checkpoints.lock().await.remove(checkpoint_id);
    }

    /// Sweep expired checkpoints; returns how many were removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut checkpoints = self.checkpoints.lock().await;
        let before = checkpoints.len();
        checkpoints.retain(|_, c| !c.is_expired(now));
        before - checkpoints.len()
    }

    pub async fn len(&self) -> usize {
        self.checkpoints.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = CheckpointStore::new();
        let now = Utc::now();
        let id = store.create("asset-1", [0u8; 32], LayerBindings::default(), 0, Layer::Peer, Layer::Webvh, now).await;
        let checkpoint = store.get(&id, now).await.unwrap();
        assert_eq!(checkpoint.asset_id, "asset-1");
    }

    #[tokio::test]
    async fn expired_checkpoint_is_not_found() {
        let store = CheckpointStore::new();
        let now = Utc::now();
        let id = store.create("asset-1", [0u8; 32], LayerBindings::default(), 0, Layer::Peer, Layer::Webvh, now).await;
        let later = now + Duration::hours(25);
        assert!(store.get(&id, later).await.is_err());
    }

    #[tokio::test]
    async fn release_removes_checkpoint() {
        let store = CheckpointStore::new();
        let now = Utc::now();
        let id = store.create("asset-1", [0u8; 32], LayerBindings::default(), 0, Layer::Peer, Layer::Webvh, now).await;
        store.release(&id).await;
        assert!(store.get(&id, now).await.is_err());
    }

    #[tokio::test]
    async fn sweep_expired_clears_stale_entries() {
        let store = CheckpointStore::new();
        let now = Utc::now();
        store.create("asset-1", [0u8; 32], LayerBindings::default(), 0, Layer::Peer, Layer::Webvh, now).await;
        let later = now + Duration::hours(25);
        let removed = store.sweep_expired(later).await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn tagged_object_keys_accumulate() {
        let store = CheckpointStore::new();
        let now = Utc::now();
        let id = store.create("asset-1", [0u8; 32], LayerBindings::default(), 0, Layer::Peer, Layer::Webvh, now).await;
        store.tag_object_key(&id, "example.com/a/resources/z1".into()).await.unwrap();
        let checkpoint = store.get(&id, now).await.unwrap();
        assert_eq!(checkpoint.tagged_object_keys.len(), 1);
    }
}
