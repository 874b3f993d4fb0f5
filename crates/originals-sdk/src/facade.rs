//! The `Originals` facade (§1, §6): wires every protocol crate into one
//! entry point — create an asset, migrate it forward across layers,
//! transfer it, and replay its history back out of the CEL. Everything here
//! is orchestration; the actual rules live in the crates it calls.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use originals_bitcoin::BitcoinManager;
use originals_cel::{CelEngine, CelEventBody, InMemoryStore};
use originals_checkpoint::CheckpointStore;
use originals_core::{
    Attestation, BtcoNetwork, Credential, CredentialKind, DataIntegrityProof, DidDocument, DidUrl,
    Layer, OriginalsAsset, OriginalsError, Resource, TransferRecord, VerificationMethod,
};
use originals_credentials::{
    issue_final, issue_preliminary, sign_document, verify_asset, ArtifactManifest, CredentialManager, InternalSigner, Signer, VerificationReport,
};
use originals_did::{
    unsigned_entry, BtcoDriver, DereferenceResult, InscriptionSource, LogEntry, PeerDriver, Resolver, ResolutionResult, WebvhDriver,
};
use originals_interfaces::ordinals::{OrdinalsProvider, SimulatedOrdinalsProvider};
use originals_interfaces::storage::{object_key, InMemoryStorageAdapter, StorageAdapter};
use originals_lifecycle::{MigrationManager, MigrationOutcome, MigrationTracker};

use originals_crypto::ed25519::Ed25519KeyPair;

use crate::config::SdkConfig;

/// Bridges the broader `OrdinalsProvider` surface (commit-reveal, transfer,
/// lookup) into the narrower `InscriptionSource` the `did:btco` driver
/// needs: the document behind a satoshi is whatever its most recent
/// inscription carries, sentinel or CBOR document alike — interpreting that
/// content is the driver's job (§4.3).
struct ProviderAsInscriptionSource<P: OrdinalsProvider> {
    provider: Arc<P>,
}

#[async_trait]
impl<P: OrdinalsProvider> InscriptionSource for ProviderAsInscriptionSource<P> {
    async fn latest_inscription_content(&self, _network: BtcoNetwork, satoshi: u64) -> Result<Vec<u8>, OriginalsError> {
        let mut inscriptions = self.provider.get_inscriptions_by_satoshi(satoshi).await?;
        inscriptions.sort_by_key(|i| i.block_height.unwrap_or(u64::MAX));
        match inscriptions.pop() {
            Some(i) => Ok(i.content_bytes),
            None => Err(OriginalsError::NotFound(format!("no inscription content on satoshi {satoshi}"))),
        }
    }
}

#[derive(Serialize)]
struct MigrationProofPayload<'a> {
    asset_id: &'a str,
    from: Layer,
    to: Layer,
    source_did: &'a str,
    target_did: &'a str,
    timestamp: DateTime<Utc>,
}

/// What `create_asset` hands back: the newly minted `did:peer` identity and
/// the credential attesting its first resource version.
pub struct CreatedAsset {
    pub asset_id: String,
    pub did: String,
    pub verification_method: String,
    pub document: DidDocument,
    pub credential: Credential,
}

/// What a `peer -> webvh` migration produces.
pub struct WebvhMigrationSummary {
    pub target_did: String,
    pub log_entry: LogEntry,
    pub resource_urls: Vec<String>,
    pub attestation: Attestation,
}

/// What a `-> btco` migration produces.
pub struct BtcoMigrationSummary {
    pub target_did: String,
    pub satoshi: u64,
    pub inscription_id: String,
    pub commit_tx_id: String,
    pub reveal_tx_id: String,
    pub attestation: Attestation,
}

/// Everything a running deployment needs in one place: DID resolution, the
/// CEL, checkpoints, a signer, content storage, and the simulated Bitcoin
/// backend used by the demo binary and tests. A real deployment would swap
/// `storage`/`ordinals` for production adapters without touching anything
/// above this struct.
pub struct Originals {
    pub config: SdkConfig,
    pub resolver: Resolver,
    pub cel: CelEngine,
    pub checkpoints: CheckpointStore,
    pub signer: InternalSigner,
    pub storage: InMemoryStorageAdapter,
    pub ordinals: Arc<SimulatedOrdinalsProvider>,
}

impl Default for Originals {
    fn default() -> Self {
        Self::new("example.com")
    }
}

impl Originals {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self::with_config(public_base_url, SdkConfig::default())
    }

    /// Build an instance against an explicit [`SdkConfig`] rather than
    /// protocol defaults (§4.19) — the network the Bitcoin layer targets and
    /// the fee-rate ceiling both come from here instead of being hardcoded.
    pub fn with_config(public_base_url: impl Into<String>, config: SdkConfig) -> Self {
        let ordinals = Arc::new(SimulatedOrdinalsProvider::new());
        let resolver = Resolver::new()
            .with_driver(Box::new(PeerDriver))
            .with_driver(Box::new(WebvhDriver::default()))
            .with_driver(Box::new(BtcoDriver::new(ProviderAsInscriptionSource { provider: Arc::clone(&ordinals) })));

        Self {
            config,
            resolver,
            cel: CelEngine::new(Arc::new(InMemoryStore::default())),
            checkpoints: CheckpointStore::new(),
            signer: InternalSigner::new(),
            storage: InMemoryStorageAdapter::new(public_base_url),
            ordinals,
        }
    }

    pub async fn resolve(&self, did: &str) -> Result<DidDocument, OriginalsError> {
        let url: DidUrl = did.parse()?;
        self.resolver.resolve(&url).await
    }

    /// The uniform `{didDocument?, metadata, errors}` envelope (§4.4): a
    /// malformed DID URL itself surfaces as an `InvalidDid`-kind error in
    /// the envelope rather than a parse `Err`, matching `resolve_envelope`'s
    /// contract of never propagating a `Result`.
    pub async fn resolve_envelope(&self, did: &str) -> ResolutionResult {
        match did.parse::<DidUrl>() {
            Ok(url) => self.resolver.resolve_envelope(&url).await,
            Err(e) => ResolutionResult { did_document: None, metadata: Default::default(), errors: vec![originals_did::classify(&e)] },
        }
    }

    /// `dereference(didUrl) -> {dereferencedResource?, metadata, errors}`
    /// (§4.3, §4.4).
    pub async fn dereference(&self, did_url: &str) -> DereferenceResult {
        match did_url.parse::<DidUrl>() {
            Ok(url) => self.resolver.dereference(&url).await,
            Err(e) => DereferenceResult { dereferenced_resource: None, metadata: Default::default(), errors: vec![originals_did::classify(&e)] },
        }
    }

    pub async fn replay(&self, asset_id: &str) -> Result<OriginalsAsset, OriginalsError> {
        self.cel.replay(asset_id).await
    }

    /// `OriginalsAsset::verify() -> VerificationReport` (§4.11): re-checks
    /// chain integrity and every event's signature, folding in warnings for
    /// anything non-fatal a verifier should still see.
    pub async fn verify_asset(&self, asset_id: &str) -> Result<VerificationReport, OriginalsError> {
        let events = self.cel.load_verified(asset_id).await?;
        let asset = originals_cel::replay(&events)?;
        verify_asset(&asset, &events, &self.resolver).await
    }

    async fn sign_migration_proof(
        &self,
        verification_method: &str,
        asset_id: &str,
        source_did: &str,
        target_did: &str,
        from: Layer,
        to: Layer,
        now: DateTime<Utc>,
    ) -> Result<DataIntegrityProof, OriginalsError> {
        let payload = MigrationProofPayload { asset_id, from, to, source_did, target_did, timestamp: now };
        sign_document(&payload, &self.signer, verification_method, "assertionMethod", now).await
    }

    /// Mint a fresh `did:peer` identity and create the asset's first
    /// resource version (§4.3, §8 scenario 1).
    pub async fn create_asset(
        &mut self,
        resource_id: &str,
        resource_type: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<CreatedAsset, OriginalsError> {
        let now = Utc::now();
        let key = Ed25519KeyPair::generate();
        let public = key.public_multikey();

        let mut draft = DidDocument::new("");
        draft.verification_method.push(VerificationMethod::multikey("#key-1", "", &public));
        draft.assertion_method.push("#key-1".to_string());
        let (did, resolved) = PeerDriver::create(&draft)?;
        let vm_id = format!("{}#key-1", did.did());
        self.signer.insert_key(vm_id.clone(), key);

        let resource = Resource::new_initial(resource_id, resource_type, content_type, content, now);
        let hash_hex = resource.hash.to_hex();
        self.cel.append_signed(resource_id, CelEventBody::ResourceAdded { resource }, &self.signer, &vm_id).await?;

        let credential_manager = CredentialManager::new(&self.resolver);
        let subject = CredentialManager::issue_resource_created(resource_id, &hash_hex, content_type, now, &resolved.id);
        let credential = credential_manager
            .issue(CredentialKind::ResourceCreated, resolved.id.clone(), subject, &vm_id, &self.signer, now)
            .await?;

        Ok(CreatedAsset { asset_id: resource_id.to_string(), did: resolved.id.clone(), verification_method: vm_id, document: resolved, credential })
    }

    /// Add a new version of an existing resource (§3, §8 scenario 2).
    pub async fn add_resource_version(
        &self,
        asset_id: &str,
        did: &str,
        verification_method: &str,
        resource_id: &str,
        content: Vec<u8>,
    ) -> Result<Credential, OriginalsError> {
        let now = Utc::now();
        let asset = self.cel.replay(asset_id).await?;
        let current = asset
            .get_current_resource(resource_id)
            .ok_or_else(|| OriginalsError::NotFound(format!("resource {resource_id} not found on asset {asset_id}")))?;
        let previous_hash = current.hash.to_hex();
        let next = current.new_version(content, now)?;
        let new_hash = next.hash.to_hex();

        self.cel
            .append_signed(asset_id, CelEventBody::ResourceUpdated { resource: next }, &self.signer, verification_method)
            .await?;

        let credential_manager = CredentialManager::new(&self.resolver);
        let subject = CredentialManager::issue_resource_updated(resource_id, &previous_hash, &new_hash, now);
        credential_manager
            .issue(CredentialKind::ResourceUpdated, did.to_string(), subject, verification_method, &self.signer, now)
            .await
    }

    /// Publish an asset's current resources to `did:webvh` (§4.3, §8 scenario 3).
    /// `domain`/`slug` determine both the hosted resource URLs and the
    /// `did:webvh:<domain>:<slug>` target identity.
    pub async fn migrate_to_webvh(
        &mut self,
        asset_id: &str,
        source_did: &str,
        verification_method: &str,
        domain: &str,
        slug: &str,
    ) -> Result<WebvhMigrationSummary, OriginalsError> {
        let now = Utc::now();
        let asset = self.cel.replay(asset_id).await?;
        let target_did = format!("did:webvh:{domain}:{slug}");

        let source_document = self.resolve(source_did).await?;
        let mut webvh_document = DidDocument::new(target_did.clone());
        webvh_document.verification_method = source_document.verification_method;
        webvh_document.authentication = source_document.authentication;
        webvh_document.assertion_method = source_document.assertion_method;

        let mut resource_urls = Vec::new();
        for resource_id in distinct_resource_ids(&asset) {
            let resource = asset.get_current_resource(&resource_id).expect("just listed");
            if let Some(bytes) = &resource.content {
                let multibase_hash = multibase::encode(multibase::Base::Base58Btc, resource.hash.as_bytes());
                let key = object_key(domain, slug, &multibase_hash);
                let url = self.storage.put(&key, bytes.clone(), &resource.content_type).await?;
                resource_urls.push(url);
            }
        }

        let (version_id, signing_bytes) = unsigned_entry("", now, &serde_json::Value::Object(Default::default()), &webvh_document)?;
        let proof_value = self.signer.sign(verification_method, &signing_bytes).await?;
        let log_proof = DataIntegrityProof {
            type_: "DataIntegrityProof".into(),
            cryptosuite: "eddsa-jcs-2022".into(),
            created: now,
            verification_method: verification_method.to_string(),
            proof_purpose: "assertionMethod".into(),
            proof_value,
        };
        let log_entry = LogEntry {
            version_id,
            version_time: now,
            parameters: serde_json::Value::Object(Default::default()),
            state: webvh_document,
            proof: log_proof,
        };
        let log_bytes = serde_json::to_vec(&[&log_entry]).map_err(|e| OriginalsError::Serialization(e.to_string()))?;
        self.storage.put(&format!("{domain}/{slug}/{}", originals_core::WEBVH_LOG_FILENAME), log_bytes, "application/jsonl").await?;

        let proof = self
            .sign_migration_proof(verification_method, asset_id, source_did, &target_did, asset.current_layer, Layer::Webvh, now)
            .await?;
        let mut tracker = MigrationTracker::new();
        let manager = MigrationManager::new(&self.cel, &self.checkpoints);
        let attempt_id = format!("{asset_id}-webvh-{}", now.timestamp_nanos_opt().unwrap_or_default());
        let target_did_for_outcome = target_did.clone();
        let record = manager
            .migrate(&mut tracker, attempt_id, asset_id, source_did, asset.current_layer, Layer::Webvh, proof, &self.signer, verification_method, move || async move {
                Ok(MigrationOutcome {
                    target_did: target_did_for_outcome,
                    transaction_id: None,
                    satoshi: None,
                    inscription_id: None,
                    commit_tx_id: None,
                    reveal_tx_id: None,
                    fee_rate: None,
                })
            })
            .await?;

        let resources: Vec<Resource> = distinct_resource_ids(&asset)
            .into_iter()
            .filter_map(|id| asset.get_current_resource(&id).cloned())
            .collect();
        let manifest = ArtifactManifest::from_resources(asset_id, &resources, now);
        let candidate_hash = manifest.artifact_hash()?;
        let events = self.cel.load_verified(asset_id).await?;
        let cel_head_hash = hex::encode(events.last().expect("migration just appended an event").event_id);
        let attestation = issue_preliminary(source_did, &record.target_did, &cel_head_hash, &candidate_hash, verification_method, &self.signer, now).await?;

        Ok(WebvhMigrationSummary { target_did: record.target_did, log_entry, resource_urls, attestation })
    }

    /// Inscribe an asset's current state on Bitcoin (§4.13, §8 scenario 4).
    pub async fn migrate_to_btco(
        &mut self,
        asset_id: &str,
        source_did: &str,
        verification_method: &str,
        fee_rate: u64,
        max_fee_rate: u64,
    ) -> Result<BtcoMigrationSummary, OriginalsError> {
        let now = Utc::now();
        let asset = self.cel.replay(asset_id).await?;

        let source_document = self.resolve(source_did).await?;
        let mut document = DidDocument::new("");
        document.verification_method = source_document.verification_method;
        document.authentication = source_document.authentication;
        document.assertion_method = source_document.assertion_method;
        document.modified = Some(now);
        // The reveal payload is the document itself, CBOR-encoded (§4.13):
        // it is the deterministic materialization of the asset's did:btco
        // state, and its own `deactivated` field doubles as the metadata
        // flag a later resolution checks (§4.3).
        let content = originals_crypto::cbor::to_vec(&document)?;

        let bitcoin = BitcoinManager::new(self.ordinals.as_ref(), self.config.network);
        let proof = self
            .sign_migration_proof(verification_method, asset_id, source_did, "", asset.current_layer, Layer::Btco, now)
            .await?;

        let mut tracker = MigrationTracker::new();
        let manager = MigrationManager::new(&self.cel, &self.checkpoints);
        let attempt_id = format!("{asset_id}-btco-{}", now.timestamp_nanos_opt().unwrap_or_default());
        let record = manager
            .migrate(&mut tracker, attempt_id, asset_id, source_did, asset.current_layer, Layer::Btco, proof, &self.signer, verification_method, move || async move {
                let result = bitcoin.inscribe(content, "application/cbor", fee_rate, max_fee_rate).await?;
                Ok(MigrationOutcome {
                    target_did: format!("did:btco:{}", result.satoshi),
                    transaction_id: Some(result.reveal_tx_id.clone()),
                    satoshi: Some(result.satoshi),
                    inscription_id: Some(result.inscription_id.clone()),
                    commit_tx_id: Some(result.commit_tx_id.clone()),
                    reveal_tx_id: Some(result.reveal_tx_id),
                    fee_rate: Some(fee_rate),
                })
            })
            .await?;

        let resources: Vec<Resource> = distinct_resource_ids(&asset)
            .into_iter()
            .filter_map(|id| asset.get_current_resource(&id).cloned())
            .collect();
        let manifest = ArtifactManifest::from_resources(asset_id, &resources, now);
        let artifact_hash = manifest.artifact_hash()?;
        let events = self.cel.load_verified(asset_id).await?;
        let cel_head_hash = hex::encode(events.last().expect("migration just appended an event").event_id);
        let inscription_id = record.inscription_id.clone().unwrap_or_default();
        let txid = record.reveal_tx_id.clone().unwrap_or_default();
        let attestation = issue_final(source_did, &record.target_did, &cel_head_hash, &artifact_hash, &inscription_id, &txid, None, verification_method, &self.signer, now).await?;

        Ok(BtcoMigrationSummary {
            target_did: record.target_did,
            satoshi: record.satoshi.unwrap_or_default(),
            inscription_id,
            commit_tx_id: record.commit_tx_id.unwrap_or_default(),
            reveal_tx_id: record.reveal_tx_id.unwrap_or_default(),
            attestation,
        })
    }

    /// Transfer ownership of a `did:btco`-anchored asset to a new Bitcoin
    /// address (§4.13, §8 scenario 6). The DID identifier and satoshi are
    /// unchanged by a transfer; only custody of the underlying UTXO moves.
    pub async fn transfer(
        &mut self,
        asset_id: &str,
        owner_did: &str,
        inscription_id: &str,
        recipient_address: &str,
        fee_rate: u64,
        verification_method: &str,
    ) -> Result<TransferRecord, OriginalsError> {
        let now = Utc::now();
        let bitcoin = BitcoinManager::new(self.ordinals.as_ref(), self.config.network);
        let result = bitcoin.transfer(inscription_id, recipient_address, fee_rate).await?;

        let payload = MigrationProofPayload {
            asset_id,
            from: Layer::Btco,
            to: Layer::Btco,
            source_did: owner_did,
            target_did: recipient_address,
            timestamp: now,
        };
        let proof = sign_document(&payload, &self.signer, verification_method, "assertionMethod", now).await?;

        let record = TransferRecord {
            from: owner_did.to_string(),
            to: recipient_address.to_string(),
            timestamp: now,
            transaction_id: result.txid,
            proof: Some(proof),
        };
        self.cel
            .append_signed(asset_id, CelEventBody::ResourceTransferred { record: record.clone() }, &self.signer, verification_method)
            .await?;
        Ok(record)
    }

    /// Deactivate an asset (§4.3). No credential is issued for deactivation
    /// (§9 Open Question 2, DESIGN.md): it is a terminal CEL event, not a
    /// claim about content, and verifiers observe it directly on replay.
    pub async fn deactivate(&self, asset_id: &str, verification_method: &str) -> Result<(), OriginalsError> {
        self.cel
            .append_signed(asset_id, CelEventBody::ResourceDeactivated, &self.signer, verification_method)
            .await
            .map(|_| ())
    }
}

fn distinct_resource_ids(asset: &OriginalsAsset) -> Vec<String> {
    let mut seen = Vec::new();
    for resource in &asset.resources {
        let id = resource.id.to_string();
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}
