//! `did:peer` numalgo-4 driver (§4.3): self-contained, resolvable entirely
//! offline from the DID string itself. No network, no storage.

use async_trait::async_trait;
use multibase::Base;
use originals_core::{DidDocument, DidUrl, Method, MethodId, OriginalsError};
use originals_crypto::canonical::canonicalize_jcs;

use crate::driver::DidDriver;

#[derive(Default)]
pub struct PeerDriver;

impl PeerDriver {
    /// Encode a draft document (its `id` is ignored and overwritten) into a
    /// `did:peer:4...` long form that embeds the whole document.
    pub fn create(document: &DidDocument) -> Result<(DidUrl, DidDocument), OriginalsError> {
        let mut draft = document.clone();
        draft.id = String::new();
        let canonical = canonicalize_jcs(&draft)?;
        let encoded = multibase::encode(Base::Base58Btc, canonical);
        let did = DidUrl {
            method: Method::Peer,
            method_id: MethodId::Peer { numalgo4: format!("4{encoded}") },
            path: None,
            query: None,
            fragment: None,
        };
        let mut resolved = draft;
        resolved.id = did.did();
        Ok((did, resolved))
    }
}

#[async_trait]
impl DidDriver for PeerDriver {
    fn method(&self) -> Method {
        Method::Peer
    }

    async fn resolve(&self, did: &DidUrl) -> Result<DidDocument, OriginalsError> {
        let MethodId::Peer { numalgo4 } = &did.method_id else {
            return Err(OriginalsError::InvalidDid("not a did:peer identifier".into()));
        };
        let body = numalgo4
            .strip_prefix('4')
            .ok_or_else(|| OriginalsError::InvalidDid("expected numalgo-4 prefix".into()))?;
        let (_, bytes) = multibase::decode(body).map_err(|e| OriginalsError::InvalidDid(e.to_string()))?;
        let mut document: DidDocument = serde_json::from_slice(&bytes)
            .map_err(|e| OriginalsError::InvalidDid(format!("embedded document is not valid JSON: {e}")))?;
        document.id = did.did();
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_core::VerificationMethod;

    #[tokio::test]
    async fn create_then_resolve_round_trips() {
        let mut draft = DidDocument::new("");
        draft.verification_method.push(VerificationMethod::multikey("#key-1", "", "zfake"));
        let (did, expected) = PeerDriver::create(&draft).unwrap();
        assert!(did.did().starts_with("did:peer:4z"));

        let resolved = PeerDriver.resolve(&did).await.unwrap();
        assert_eq!(resolved.id, expected.id);
        assert_eq!(resolved.verification_method.len(), 1);
    }
}
