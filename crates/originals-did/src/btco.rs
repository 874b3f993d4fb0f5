//! `did:btco` driver (§4.3): resolves a DID document from the content of the
//! most recent inscription on its satoshi. Inscription lookup is delegated to
//! an `InscriptionSource` so this crate does not depend on `originals-bitcoin`
//! or any particular ordinals indexer.

use async_trait::async_trait;
use originals_core::{BtcoNetwork, DidDocument, DidUrl, Method, MethodId, OriginalsError};

use crate::driver::DidDriver;

/// The legacy deactivation sentinel content (§4.3): a satoshi whose most
/// recent inscription carries this exact body, rather than a CBOR-encoded
/// document, is treated as deactivated regardless of the `deactivated` field.
pub const DEACTIVATION_SENTINEL: &[u8] = "\u{1f525}".as_bytes();

/// Minimal surface this driver needs from a Bitcoin/ordinals backend: the
/// latest inscription content recorded on a given satoshi, if any.
#[async_trait]
pub trait InscriptionSource: Send + Sync {
    async fn latest_inscription_content(
        &self,
        network: BtcoNetwork,
        satoshi: u64,
    ) -> Result<Vec<u8>, OriginalsError>;
}

pub struct BtcoDriver<S: InscriptionSource> {
    source: S,
}

impl<S: InscriptionSource> BtcoDriver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: InscriptionSource> DidDriver for BtcoDriver<S> {
    fn method(&self) -> Method {
        Method::Btco
    }

    async fn resolve(&self, did: &DidUrl) -> Result<DidDocument, OriginalsError> {
        let MethodId::Btco { network, satoshi } = &did.method_id else {
            return Err(OriginalsError::InvalidDid("not a did:btco identifier".into()));
        };
        let content = self.source.latest_inscription_content(*network, *satoshi).await?;

        // Legacy deactivation marker: the inscription carries no document at
        // all, just the sentinel body. Resolution still succeeds, marked.
        if content == DEACTIVATION_SENTINEL {
            let mut document = DidDocument::new(did.did());
            document.deactivated = true;
            return Ok(document);
        }

        let mut document: DidDocument = originals_crypto::cbor::from_slice(&content)
            .map_err(|e| OriginalsError::InvalidDid(format!("inscription content is not a valid DID document: {e}")))?;
        if document.verification_method.is_empty() {
            return Err(OriginalsError::InvalidDid("inscription document has no verification methods".into()));
        }
        document.id = did.did();
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_core::VerificationMethod;

    struct MockSource {
        content: Vec<u8>,
    }

    #[async_trait]
    impl InscriptionSource for MockSource {
        async fn latest_inscription_content(&self, _network: BtcoNetwork, _satoshi: u64) -> Result<Vec<u8>, OriginalsError> {
            Ok(self.content.clone())
        }
    }

    #[tokio::test]
    async fn resolves_from_inscription_content() {
        let mut doc = DidDocument::new("did:btco:42");
        doc.verification_method.push(VerificationMethod::multikey("#key-1", "did:btco:42", "zfake"));
        let content = originals_crypto::cbor::to_vec(&doc).unwrap();
        let driver = BtcoDriver::new(MockSource { content });
        let did: DidUrl = "did:btco:42".parse().unwrap();
        let resolved = driver.resolve(&did).await.unwrap();
        assert_eq!(resolved.id, "did:btco:42");
    }

    #[tokio::test]
    async fn resolves_legacy_sentinel_as_deactivated() {
        let driver = BtcoDriver::new(MockSource { content: DEACTIVATION_SENTINEL.to_vec() });
        let did: DidUrl = "did:btco:42".parse().unwrap();
        let resolved = driver.resolve(&did).await.unwrap();
        assert!(resolved.deactivated);
    }

    #[tokio::test]
    async fn resolves_metadata_flag_as_deactivated() {
        let mut doc = DidDocument::new("did:btco:42");
        doc.verification_method.push(VerificationMethod::multikey("#key-1", "did:btco:42", "zfake"));
        doc.deactivated = true;
        let content = originals_crypto::cbor::to_vec(&doc).unwrap();
        let driver = BtcoDriver::new(MockSource { content });
        let did: DidUrl = "did:btco:42".parse().unwrap();
        let resolved = driver.resolve(&did).await.unwrap();
        assert!(resolved.deactivated);
    }

    #[tokio::test]
    async fn rejects_document_with_no_verification_methods() {
        let doc = DidDocument::new("did:btco:42");
        let content = originals_crypto::cbor::to_vec(&doc).unwrap();
        let driver = BtcoDriver::new(MockSource { content });
        let did: DidUrl = "did:btco:42".parse().unwrap();
        assert!(driver.resolve(&did).await.is_err());
    }
}
