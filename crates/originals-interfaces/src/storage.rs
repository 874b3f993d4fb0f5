//! Storage adapter contract (§4.7, §6): content-addressed put/get/delete over
//! an opaque backend. Object keys are always constructed as
//! `<domain>/<slug>/resources/<multibase(hash)>`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use originals_core::OriginalsError;
use tokio::sync::Mutex;

/// Build the canonical object key for a resource published at `domain/slug`
/// (§4.7, §6). `multibase_hash` is the resource's content hash already
/// encoded as a multibase string (callers typically pass
/// `multibase::encode(Base::Base58Btc, hash.as_bytes())`).
pub fn object_key(domain: &str, slug: &str, multibase_hash: &str) -> String {
    format!("{domain}/{slug}/resources/{multibase_hash}")
}

/// Reject any key containing a `..` path-traversal segment (§4.7).
pub fn reject_path_traversal(key: &str) -> Result<(), OriginalsError> {
    let path = Path::new(key);
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(OriginalsError::ValidationFailed(format!(
            "object key contains a path-traversal segment: {key}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Store `bytes` under `object_key`, returning a publicly reachable URL.
    async fn put(&self, object_key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, OriginalsError>;

    /// Fetch an object, or `None` if it does not exist.
    async fn get(&self, object_key: &str) -> Result<Option<StoredObject>, OriginalsError>;

    /// Remove an object. Returns whether it existed.
    async fn delete(&self, object_key: &str) -> Result<bool, OriginalsError>;
}

/// Process-local store, useful for tests and the `did:peer`-only demo path.
#[derive(Default)]
pub struct InMemoryStorageAdapter {
    objects: Mutex<HashMap<String, StoredObject>>,
    base_url: String,
}

impl InMemoryStorageAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { objects: Mutex::new(HashMap::new()), base_url: base_url.into() }
    }
}

#[async_trait]
impl StorageAdapter for InMemoryStorageAdapter {
    async fn put(&self, object_key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, OriginalsError> {
        reject_path_traversal(object_key)?;
        let content_type = content_type.to_string();
        self.objects.lock().await.insert(object_key.to_string(), StoredObject { bytes, content_type });
        Ok(format!("{}/{object_key}", self.base_url.trim_end_matches('/')))
    }

    async fn get(&self, object_key: &str) -> Result<Option<StoredObject>, OriginalsError> {
        reject_path_traversal(object_key)?;
        Ok(self.objects.lock().await.get(object_key).cloned())
    }

    async fn delete(&self, object_key: &str) -> Result<bool, OriginalsError> {
        reject_path_traversal(object_key)?;
        Ok(self.objects.lock().await.remove(object_key).is_some())
    }
}

/// Filesystem-backed store rooted at `base_dir`, with a sibling `.meta` file
/// per object recording its declared content type.
pub struct FilesystemStorageAdapter {
    base_dir: PathBuf,
    base_url: String,
}

impl FilesystemStorageAdapter {
    pub fn new(base_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self { base_dir: base_dir.into(), base_url: base_url.into() }
    }

    fn paths_for(&self, object_key: &str) -> (PathBuf, PathBuf) {
        let data = self.base_dir.join(object_key);
        let meta = self.base_dir.join(format!("{object_key}.meta"));
        (data, meta)
    }
}

#[async_trait]
impl StorageAdapter for FilesystemStorageAdapter {
    async fn put(&self, object_key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, OriginalsError> {
        reject_path_traversal(object_key)?;
        let (data_path, meta_path) = self.paths_for(object_key);
        if let Some(parent) = data_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| OriginalsError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&data_path, &bytes).await.map_err(|e| OriginalsError::Storage(e.to_string()))?;
        tokio::fs::write(&meta_path, content_type).await.map_err(|e| OriginalsError::Storage(e.to_string()))?;
        Ok(format!("{}/{object_key}", self.base_url.trim_end_matches('/')))
    }

    async fn get(&self, object_key: &str) -> Result<Option<StoredObject>, OriginalsError> {
        reject_path_traversal(object_key)?;
        let (data_path, meta_path) = self.paths_for(object_key);
        if !data_path.exists() {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&data_path).await.map_err(|e| OriginalsError::Storage(e.to_string()))?;
        let content_type = tokio::fs::read_to_string(&meta_path)
            .await
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        Ok(Some(StoredObject { bytes, content_type }))
    }

    async fn delete(&self, object_key: &str) -> Result<bool, OriginalsError> {
        reject_path_traversal(object_key)?;
        let (data_path, meta_path) = self.paths_for(object_key);
        let existed = data_path.exists();
        let _ = tokio::fs::remove_file(&data_path).await;
        let _ = tokio::fs::remove_file(&meta_path).await;
        Ok(existed)
    }
}
