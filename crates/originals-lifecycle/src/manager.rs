//! The migration orchestrator (§4.12): drives one migration attempt through
//! `VALIDATING -> CHECKPOINTED -> IN_PROGRESS -> COMPLETED | FAILED ->
//! QUARANTINE`, owning the checkpoint lifecycle and the CEL commit. The
//! layer-specific work of minting a target DID and (for `btco`) inscribing
//! is supplied by the caller as an `execute` closure — this crate only
//! knows the workflow, not how `did:webvh` or `did:btco` bindings are made.

use chrono::Utc;
use originals_cel::{CelEngine, CelEventBody};
use originals_checkpoint::CheckpointStore;
use originals_core::{CEL_GENESIS_MARKER, DataIntegrityProof, Layer, MigrationRecord, OriginalsError};
use originals_crypto::Signer;

use crate::state::{MigrationState, MigrationTracker};
use crate::validation::validate_migration;

/// What a layer-specific migration executor produces once it has minted the
/// target DID (and, for `btco`, broadcast the commit/reveal transactions).
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub target_did: String,
    pub transaction_id: Option<String>,
    pub satoshi: Option<u64>,
    pub inscription_id: Option<String>,
    pub commit_tx_id: Option<String>,
    pub reveal_tx_id: Option<String>,
    pub fee_rate: Option<u64>,
}

pub struct MigrationManager<'a> {
    cel: &'a CelEngine,
    checkpoints: &'a CheckpointStore,
}

impl<'a> MigrationManager<'a> {
    pub fn new(cel: &'a CelEngine, checkpoints: &'a CheckpointStore) -> Self {
        Self { cel, checkpoints }
    }

    /// Run one migration attempt end to end. `execute` performs the
    /// layer-specific target binding once the attempt is checkpointed; its
    /// failure moves the attempt to `FAILED` (retryable errors) or
    /// `QUARANTINE` (everything else — e.g. a broadcast already went out and
    /// a clean rollback is no longer possible).
    pub async fn migrate<F, Fut>(
        &self,
        tracker: &mut MigrationTracker,
        attempt_id: String,
        asset_id: &str,
        source_did: &str,
        from: Layer,
        to: Layer,
        proof: DataIntegrityProof,
        signer: &dyn Signer,
        verification_method: &str,
        execute: F,
    ) -> Result<MigrationRecord, OriginalsError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<MigrationOutcome, OriginalsError>>,
    {
        let now = Utc::now();
        let asset = self.cel.replay(asset_id).await?;

        tracker.start(attempt_id.clone(), asset_id.to_string(), from, to, now);

        let report = validate_migration(&asset, from, to);
        if !report.passed() {
            let reason = report.failure_reasons().join("; ");
            tracker.fail(&attempt_id, reason.clone(), now)?;
            return Err(OriginalsError::ValidationFailed(reason));
        }

        let events = self.cel.load_verified(asset_id).await?;
        let cel_tail_hash = events.last().map(|e| e.event_id).unwrap_or(CEL_GENESIS_MARKER);

        let checkpoint_id = self
            .checkpoints
            .create(asset_id, cel_tail_hash, asset.bindings.clone(), asset.credentials.len(), from, to, now)
            .await;
        tracker.transition(&attempt_id, MigrationState::Checkpointed, now)?;
        tracker.set_checkpoint(&attempt_id, checkpoint_id.clone())?;

        tracker.transition(&attempt_id, MigrationState::InProgress, now)?;

        let outcome = match execute().await {
            Ok(outcome) => outcome,
            Err(err) => {
                let now = Utc::now();
                tracker.fail(&attempt_id, err.to_string(), now)?;
                if !err.is_retryable() {
                    tracker.quarantine(&attempt_id, now)?;
                } else {
                    self.checkpoints.release(&checkpoint_id).await;
                }
                return Err(err);
            }
        };

        let now = Utc::now();
        let record = MigrationRecord {
            from,
            to,
            timestamp: now,
            source_did: source_did.to_string(),
            target_did: outcome.target_did,
            transaction_id: outcome.transaction_id,
            satoshi: outcome.satoshi,
            inscription_id: outcome.inscription_id,
            commit_tx_id: outcome.commit_tx_id,
            reveal_tx_id: outcome.reveal_tx_id,
            fee_rate: outcome.fee_rate,
            proof,
        };

        self.cel
            .append_signed(asset_id, CelEventBody::ResourceMigrated { record: record.clone() }, signer, verification_method)
            .await?;

        tracker.transition(&attempt_id, MigrationState::Completed, now)?;
        self.checkpoints.release(&checkpoint_id).await;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_cel::storage::InMemoryStore;
    use originals_core::Resource;
    use std::sync::Arc;

    fn sample_proof() -> DataIntegrityProof {
        DataIntegrityProof {
            type_: "DataIntegrityProof".into(),
            cryptosuite: "eddsa-jcs-2022".into(),
            created: Utc::now(),
            verification_method: "did:peer:4zfake#key-1".into(),
            proof_purpose: "assertionMethod".into(),
            proof_value: "zfake".into(),
        }
    }

    struct StubSigner;

    #[async_trait::async_trait]
    impl Signer for StubSigner {
        async fn sign(&self, _verification_method: &str, _signing_bytes: &[u8]) -> Result<String, OriginalsError> {
            Ok("zfake".to_string())
        }
    }

    async fn seeded_engine(asset_id: &str) -> CelEngine {
        let engine = CelEngine::new(Arc::new(InMemoryStore::default()));
        engine
            .append(asset_id, CelEventBody::ResourceAdded { resource: Resource::new_initial("r1", "text", "text/plain", b"hello".to_vec(), Utc::now()) })
            .await
            .unwrap();
        engine
    }

    #[tokio::test]
    async fn successful_migration_reaches_completed_and_appends_record() {
        let engine = seeded_engine("asset-1").await;
        let checkpoints = CheckpointStore::new();
        let manager = MigrationManager::new(&engine, &checkpoints);
        let mut tracker = MigrationTracker::new();

        let record = manager
            .migrate(&mut tracker, "m1".into(), "asset-1", "did:peer:4zsource", Layer::Peer, Layer::Webvh, sample_proof(), &StubSigner, "did:peer:4zsource#key-1", || async {
                Ok(MigrationOutcome {
                    target_did: "did:webvh:example.com:asset-1".into(),
                    transaction_id: None,
                    satoshi: None,
                    inscription_id: None,
                    commit_tx_id: None,
                    reveal_tx_id: None,
                    fee_rate: None,
                })
            })
            .await
            .unwrap();

        assert_eq!(record.to, Layer::Webvh);
        assert_eq!(tracker.get("m1").unwrap().state, MigrationState::Completed);
        assert_eq!(checkpoints.len().await, 0);

        let asset = engine.replay("asset-1").await.unwrap();
        assert_eq!(asset.current_layer, Layer::Webvh);
        assert_eq!(asset.migrations.len(), 1);
    }

    #[tokio::test]
    async fn invalid_transition_fails_at_validation_before_checkpointing() {
        let engine = seeded_engine("asset-1").await;
        let checkpoints = CheckpointStore::new();
        let manager = MigrationManager::new(&engine, &checkpoints);
        let mut tracker = MigrationTracker::new();

        let err = manager
            .migrate(&mut tracker, "m1".into(), "asset-1", "did:peer:4zsource", Layer::Webvh, Layer::Peer, sample_proof(), &StubSigner, "did:peer:4zsource#key-1", || async {
                unreachable!("execute must not run when validation fails")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OriginalsError::ValidationFailed(_)));
        assert_eq!(tracker.get("m1").unwrap().state, MigrationState::Failed);
        assert_eq!(checkpoints.len().await, 0);
    }

    #[tokio::test]
    async fn non_retryable_execute_failure_is_quarantined() {
        let engine = seeded_engine("asset-1").await;
        let checkpoints = CheckpointStore::new();
        let manager = MigrationManager::new(&engine, &checkpoints);
        let mut tracker = MigrationTracker::new();

        let err = manager
            .migrate(&mut tracker, "m1".into(), "asset-1", "did:peer:4zsource", Layer::Peer, Layer::Webvh, sample_proof(), &StubSigner, "did:peer:4zsource#key-1", || async {
                Err(OriginalsError::FrontRunningDetected(1_000_000_000))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OriginalsError::FrontRunningDetected(_)));
        assert_eq!(tracker.get("m1").unwrap().state, MigrationState::Quarantine);
    }

    #[tokio::test]
    async fn retryable_execute_failure_stays_failed_and_releases_checkpoint() {
        let engine = seeded_engine("asset-1").await;
        let checkpoints = CheckpointStore::new();
        let manager = MigrationManager::new(&engine, &checkpoints);
        let mut tracker = MigrationTracker::new();

        let err = manager
            .migrate(&mut tracker, "m1".into(), "asset-1", "did:peer:4zsource", Layer::Peer, Layer::Webvh, sample_proof(), &StubSigner, "did:peer:4zsource#key-1", || async {
                Err(OriginalsError::NetworkUnavailable("timeout".into()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, OriginalsError::NetworkUnavailable(_)));
        assert_eq!(tracker.get("m1").unwrap().state, MigrationState::Failed);
        assert_eq!(checkpoints.len().await, 0);
    }
}
