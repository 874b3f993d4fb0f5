//! Resource data model (§3).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OriginalsError;

/// Stable logical id of a resource, unique within an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub String);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(s: &str) -> Self {
        ResourceId(s.to_string())
    }
}

/// SHA-256 content hash: 32 bytes, formatted as 64 lowercase hex characters.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn from_bytes(content: &[u8]) -> Self {
        use sha2::Digest;
        let digest = sha2::Sha256::digest(content);
        Self(digest.into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = OriginalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 {
            return Err(OriginalsError::InvalidHashLength(s.len() / 2));
        }
        let bytes = hex::decode(s).map_err(|e| OriginalsError::ValidationFailed(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| OriginalsError::InvalidHashLength(v.len()))?;
        Ok(ContentHash(arr))
    }
}

impl TryFrom<String> for ContentHash {
    type Error = OriginalsError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ContentHash> for String {
    fn from(h: ContentHash) -> Self {
        h.to_hex()
    }
}

/// Immutable content descriptor (§3). A new version of a resource is a new
/// `Resource` value with the same `id`, `version = prev.version + 1`,
/// `previous_version_hash = Some(prev.hash)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    /// Opaque media category, e.g. "image".
    pub resource_type: String,
    pub content_type: String,
    pub hash: ContentHash,
    pub size_bytes: Option<u64>,
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<u8>>,
    pub version: u32,
    pub previous_version_hash: Option<ContentHash>,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// Build the first version (`version = 1`) of a resource from inline content.
    pub fn new_initial(
        id: impl Into<ResourceId>,
        resource_type: impl Into<String>,
        content_type: impl Into<String>,
        content: Vec<u8>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let hash = ContentHash::from_bytes(&content);
        let size_bytes = Some(content.len() as u64);
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            content_type: content_type.into(),
            hash,
            size_bytes,
            url: None,
            content: Some(content),
            version: 1,
            previous_version_hash: None,
            created_at,
        }
    }

    /// Build the next version of this resource from new content (§3, scenario 2).
    pub fn new_version(&self, content: Vec<u8>, created_at: DateTime<Utc>) -> Result<Self, OriginalsError> {
        let hash = ContentHash::from_bytes(&content);
        if hash == self.hash {
            return Err(OriginalsError::ValidationFailed(
                "new version must hash differently from the previous version".into(),
            ));
        }
        Ok(Self {
            id: self.id.clone(),
            resource_type: self.resource_type.clone(),
            content_type: self.content_type.clone(),
            hash,
            size_bytes: Some(content.len() as u64),
            url: None,
            content: Some(content),
            version: self.version + 1,
            previous_version_hash: Some(self.hash.clone()),
            created_at,
        })
    }

    /// Verify `hash == SHA-256(content)` when inline content is present (§3 invariant).
    pub fn verify_hash(&self) -> Result<(), OriginalsError> {
        if let Some(content) = &self.content {
            let computed = ContentHash::from_bytes(content);
            if computed != self.hash {
                return Err(OriginalsError::ValidationFailed(format!(
                    "resource {} hash mismatch: declared {}, computed {}",
                    self.id, self.hash, computed
                )));
            }
        }
        Ok(())
    }
}

impl From<String> for ResourceId {
    fn from(s: String) -> Self {
        ResourceId(s)
    }
}
