//! The CEL engine (§4.10, §4.11): appends validated events and replays a
//! log back into an `OriginalsAsset`.

use std::sync::Arc;

use chrono::Utc;
use originals_core::{
    CEL_GENESIS_MARKER, DataIntegrityProof, FinalityStatus, Layer, OriginalsAsset, OriginalsError,
};
use originals_crypto::Signer;
use tracing::info;

use crate::event::{verify_chain, CelEvent, CelEventBody};
use crate::storage::CelStore;

pub struct CelEngine {
    store: Arc<dyn CelStore>,
}

/// The invariants checkable without full semantic migration validation
/// (§4.10): duplicate resource hash, append-after-deactivation,
/// append-after-finality. Shared by every append path so a new one can't
/// accidentally skip them.
fn check_appendable(asset: &OriginalsAsset, body: &CelEventBody) -> Result<(), OriginalsError> {
    if asset.deactivated {
        return Err(OriginalsError::AssetDeactivated);
    }
    if let CelEventBody::ResourceAdded { resource } = body {
        if asset.resources.iter().any(|r| r.hash == resource.hash) {
            return Err(OriginalsError::DuplicateResourceHash(resource.hash.to_hex()));
        }
    }
    if matches!(body, CelEventBody::ResourceMigrated { .. } | CelEventBody::ResourceUpdated { .. })
        && asset.finality == FinalityStatus::Final
        && asset.current_layer == Layer::Btco
    {
        return Err(OriginalsError::LayerFinalityViolation);
    }
    Ok(())
}

impl CelEngine {
    pub fn new(store: Arc<dyn CelStore>) -> Self {
        Self { store }
    }

    /// Append a new event to `asset_id`'s log after checking it against the
    /// invariants that don't require full replay. The envelope's own `proof`
    /// (§3 item 7) is left as an empty placeholder — callers that hold a
    /// signer should use [`CelEngine::append_signed`] instead, which is
    /// every caller outside this crate's own tests.
    pub async fn append(&self, asset_id: &str, body: CelEventBody) -> Result<CelEvent, OriginalsError> {
        let existing = self.store.load(asset_id).await?;
        let asset = replay(&existing)?;
        check_appendable(&asset, &body)?;

        let prev_event_id = existing.last().map(|e| e.event_id).unwrap_or(CEL_GENESIS_MARKER);
        let sequence = existing.len() as u64;
        let timestamp = Utc::now();
        let event_id = CelEvent::compute_event_id(prev_event_id, sequence, timestamp, &body)?;

        let event = CelEvent {
            event_id,
            prev_event_id,
            sequence,
            timestamp,
            body,
            proof: unsigned_placeholder_proof(timestamp),
        };

        self.store.append(asset_id, event.clone()).await?;
        info!(asset_id, sequence, "appended CEL event");
        Ok(event)
    }

    /// Append a new event whose envelope `proof` (§3 item 7) is a genuine
    /// Data-Integrity signature over the envelope bytes, produced by
    /// `signer` for `verification_method` — the event-log-level analogue of
    /// `append`. This is the path every protocol operation (`create_asset`,
    /// `add_resource_version`, migrations, transfers, deactivation) in
    /// `originals-sdk` actually uses.
    pub async fn append_signed(&self, asset_id: &str, body: CelEventBody, signer: &dyn Signer, verification_method: &str) -> Result<CelEvent, OriginalsError> {
        let existing = self.store.load(asset_id).await?;
        let asset = replay(&existing)?;
        check_appendable(&asset, &body)?;

        let prev_event_id = existing.last().map(|e| e.event_id).unwrap_or(CEL_GENESIS_MARKER);
        let sequence = existing.len() as u64;
        let timestamp = Utc::now();
        let signing_bytes = CelEvent::signing_bytes(prev_event_id, sequence, timestamp, &body)?;
        let proof_value = signer.sign(verification_method, &signing_bytes).await?;
        let event_id = CelEvent::compute_event_id(prev_event_id, sequence, timestamp, &body)?;

        let event = CelEvent {
            event_id,
            prev_event_id,
            sequence,
            timestamp,
            body,
            proof: DataIntegrityProof {
                type_: "DataIntegrityProof".to_string(),
                cryptosuite: "eddsa-jcs-2022".to_string(),
                created: timestamp,
                verification_method: verification_method.to_string(),
                proof_purpose: "assertionMethod".to_string(),
                proof_value,
            },
        };

        self.store.append(asset_id, event.clone()).await?;
        info!(asset_id, sequence, "appended signed CEL event");
        Ok(event)
    }

    pub async fn load_verified(&self, asset_id: &str) -> Result<Vec<CelEvent>, OriginalsError> {
        let events = self.store.load(asset_id).await?;
        verify_chain(&events)?;
        Ok(events)
    }

    pub async fn replay(&self, asset_id: &str) -> Result<OriginalsAsset, OriginalsError> {
        let events = self.load_verified(asset_id).await?;
        replay(&events)
    }
}

/// A placeholder Data-Integrity proof used only by `append`'s convenience
/// path (mainly this crate's own tests); real callers use `append_signed`.
fn unsigned_placeholder_proof(now: chrono::DateTime<Utc>) -> DataIntegrityProof {
    DataIntegrityProof {
        type_: "DataIntegrityProof".into(),
        cryptosuite: "eddsa-jcs-2022".into(),
        created: now,
        verification_method: String::new(),
        proof_purpose: "assertionMethod".into(),
        proof_value: String::new(),
    }
}

/// Fold a verified event sequence into an `OriginalsAsset` (§4.11).
pub fn replay(events: &[CelEvent]) -> Result<OriginalsAsset, OriginalsError> {
    let asset_id = events
        .first()
        .map(|e| match &e.body {
            CelEventBody::ResourceAdded { resource } => resource.id.to_string(),
            _ => "unknown".to_string(),
        })
        .unwrap_or_default();
    let mut asset = OriginalsAsset::new(asset_id);

    for event in events {
        match &event.body {
            CelEventBody::ResourceAdded { resource } | CelEventBody::ResourceUpdated { resource } => {
                asset.resources.push(resource.clone());
            }
            CelEventBody::ResourceMigrated { record } => {
                asset.current_layer = record.to;
                asset.bindings.set(record.to, record.target_did.clone(), record.timestamp);
                if record.to == Layer::Btco {
                    asset.finality = FinalityStatus::Final;
                }
                asset.migrations.push(record.clone());
            }
            CelEventBody::ResourceTransferred { record } => {
                asset.transfers.push(record.clone());
            }
            CelEventBody::ResourceDeactivated => {
                asset.deactivated = true;
            }
        }
    }
    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use originals_core::Resource;

    fn sample_resource(id: &str, content: &[u8]) -> Resource {
        Resource::new_initial(id, "text", "text/plain", content.to_vec(), Utc::now())
    }

    #[tokio::test]
    async fn append_then_replay_reconstructs_resource() {
        let engine = CelEngine::new(Arc::new(InMemoryStore::default()));
        engine
            .append("asset-1", CelEventBody::ResourceAdded { resource: sample_resource("r1", b"hello") })
            .await
            .unwrap();

        let asset = engine.replay("asset-1").await.unwrap();
        assert_eq!(asset.resources.len(), 1);
        assert_eq!(asset.get_current_resource("r1").unwrap().version, 1);
    }

    #[tokio::test]
    async fn duplicate_resource_hash_rejected() {
        let engine = CelEngine::new(Arc::new(InMemoryStore::default()));
        engine
            .append("asset-1", CelEventBody::ResourceAdded { resource: sample_resource("r1", b"hello") })
            .await
            .unwrap();
        let err = engine
            .append("asset-1", CelEventBody::ResourceAdded { resource: sample_resource("r2", b"hello") })
            .await
            .unwrap_err();
        assert!(matches!(err, OriginalsError::DuplicateResourceHash(_)));
    }

    struct StaticSigner;

    #[async_trait::async_trait]
    impl Signer for StaticSigner {
        async fn sign(&self, _verification_method: &str, _signing_bytes: &[u8]) -> Result<String, OriginalsError> {
            Ok("zstaticsignature".to_string())
        }
    }

    #[tokio::test]
    async fn append_signed_attaches_a_real_proof() {
        let engine = CelEngine::new(Arc::new(InMemoryStore::default()));
        let event = engine
            .append_signed(
                "asset-1",
                CelEventBody::ResourceAdded { resource: sample_resource("r1", b"hello") },
                &StaticSigner,
                "did:peer:4zfake#key-1",
            )
            .await
            .unwrap();

        assert_eq!(event.proof.verification_method, "did:peer:4zfake#key-1");
        assert_eq!(event.proof.proof_value, "zstaticsignature");
        assert!(verify_chain(&[event]).is_ok());
    }

    #[tokio::test]
    async fn deactivated_asset_rejects_further_appends() {
        let engine = CelEngine::new(Arc::new(InMemoryStore::default()));
        engine
            .append("asset-1", CelEventBody::ResourceAdded { resource: sample_resource("r1", b"hello") })
            .await
            .unwrap();
        engine.append("asset-1", CelEventBody::ResourceDeactivated).await.unwrap();
        let err = engine
            .append("asset-1", CelEventBody::ResourceAdded { resource: sample_resource("r2", b"world") })
            .await
            .unwrap_err();
        assert!(matches!(err, OriginalsError::AssetDeactivated));
    }

    fn sample_migration(to: Layer) -> CelEventBody {
        CelEventBody::ResourceMigrated {
            record: originals_core::MigrationRecord {
                from: Layer::Webvh,
                to,
                timestamp: Utc::now(),
                source_did: "did:webvh:example.com:alice".to_string(),
                target_did: "did:btco:42".to_string(),
                transaction_id: None,
                satoshi: Some(42),
                inscription_id: Some("i42".to_string()),
                commit_tx_id: Some("commit".to_string()),
                reveal_tx_id: Some("reveal".to_string()),
                fee_rate: Some(10),
                proof: unsigned_placeholder_proof(Utc::now()),
            },
        }
    }

    #[tokio::test]
    async fn finalized_btco_asset_rejects_updates_but_allows_transfers() {
        let engine = CelEngine::new(Arc::new(InMemoryStore::default()));
        engine
            .append("asset-1", CelEventBody::ResourceAdded { resource: sample_resource("r1", b"hello") })
            .await
            .unwrap();
        engine.append("asset-1", sample_migration(Layer::Btco)).await.unwrap();

        let err = engine
            .append("asset-1", CelEventBody::ResourceUpdated { resource: sample_resource("r1", b"hello v2") })
            .await
            .unwrap_err();
        assert!(matches!(err, OriginalsError::LayerFinalityViolation));

        engine
            .append(
                "asset-1",
                CelEventBody::ResourceTransferred {
                    record: originals_core::TransferRecord {
                        from: "did:btco:42".to_string(),
                        to: "bc1qrecipient".to_string(),
                        timestamp: Utc::now(),
                        transaction_id: "txid".to_string(),
                        proof: None,
                    },
                },
            )
            .await
            .unwrap();
    }
}
