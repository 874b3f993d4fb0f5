//! The method-driver seam (§4.3): each DID method plugs in its own resolution
//! and (where applicable) creation strategy behind one async trait.

use async_trait::async_trait;
use originals_core::{DidDocument, DidUrl, Method, OriginalsError};

#[async_trait]
pub trait DidDriver: Send + Sync {
    fn method(&self) -> Method;

    /// Resolve a DID URL to its current DID document.
    async fn resolve(&self, did: &DidUrl) -> Result<DidDocument, OriginalsError>;
}
