//! Asset-level data shapes materialized by CEL replay (§3, §4.11).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credential::{Credential, DataIntegrityProof};
use crate::did::Layer;
use crate::resource::Resource;

/// A single layer binding: the DID an asset is known by at one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerBinding {
    pub did: String,
    pub bound_at: DateTime<Utc>,
}

/// The set of layer bindings an asset has accumulated. Bindings are set on
/// migration and never unset (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerBindings {
    pub peer: Option<LayerBinding>,
    pub webvh: Option<LayerBinding>,
    pub btco: Option<LayerBinding>,
}

impl LayerBindings {
    pub fn get(&self, layer: Layer) -> Option<&LayerBinding> {
        match layer {
            Layer::Peer => self.peer.as_ref(),
            Layer::Webvh => self.webvh.as_ref(),
            Layer::Btco => self.btco.as_ref(),
        }
    }

    pub fn set(&mut self, layer: Layer, did: String, bound_at: DateTime<Utc>) {
        let binding = LayerBinding { did, bound_at };
        match layer {
            Layer::Peer => self.peer = Some(binding),
            Layer::Webvh => self.webvh = Some(binding),
            Layer::Btco => self.btco = Some(binding),
        }
    }
}

/// `{from, to, timestamp, sourceDID, targetDID, transactionId?, satoshi?,
/// inscriptionId?, commitTxId?, revealTxId?, feeRate?, proof}` (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub from: Layer,
    pub to: Layer,
    pub timestamp: DateTime<Utc>,
    pub source_did: String,
    pub target_did: String,
    pub transaction_id: Option<String>,
    pub satoshi: Option<u64>,
    pub inscription_id: Option<String>,
    pub commit_tx_id: Option<String>,
    pub reveal_tx_id: Option<String>,
    pub fee_rate: Option<u64>,
    pub proof: DataIntegrityProof,
}

/// `{from, to, timestamp, transactionId, proof}` (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<Utc>,
    pub transaction_id: String,
    pub proof: Option<DataIntegrityProof>,
}

/// Preliminary (webvh) vs. final (btco) signed attestation envelope (§4.14).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum Attestation {
    #[serde(rename = "provisional")]
    Preliminary {
        source_did: String,
        controller: String,
        cel_head_hash: String,
        candidate_artifact_hash: String,
        timestamp: DateTime<Utc>,
        proof: DataIntegrityProof,
    },
    #[serde(rename = "final")]
    Final {
        source_did: String,
        controller: String,
        cel_head_hash: String,
        artifact_hash: String,
        inscription_id: String,
        txid: String,
        block_height: Option<u64>,
        timestamp: DateTime<Utc>,
        proof: DataIntegrityProof,
    },
}

/// Whether an asset's current version has been anchored on Bitcoin (§3, §4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalityStatus {
    NotFinal,
    Final,
}

/// The in-memory representation of an asset, materialized by replaying its
/// CEL (§4.11). Read-only from the caller's perspective — all mutation
/// happens by appending to the CEL through the lifecycle manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalsAsset {
    /// Stable asset identity: the DID of the asset's very first (peer) binding.
    pub asset_id: String,
    pub current_layer: Layer,
    pub bindings: LayerBindings,
    /// All versions of every resource, in append order.
    pub resources: Vec<Resource>,
    pub credentials: Vec<Credential>,
    pub migrations: Vec<MigrationRecord>,
    pub transfers: Vec<TransferRecord>,
    pub attestations: Vec<Attestation>,
    pub finality: FinalityStatus,
    pub deactivated: bool,
}

impl OriginalsAsset {
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            current_layer: Layer::Peer,
            bindings: LayerBindings::default(),
            resources: Vec::new(),
            credentials: Vec::new(),
            migrations: Vec::new(),
            transfers: Vec::new(),
            attestations: Vec::new(),
            finality: FinalityStatus::NotFinal,
            deactivated: false,
        }
    }

    /// Every version ever recorded for `id`, oldest first.
    pub fn get_all_versions(&self, id: &str) -> Vec<&Resource> {
        self.resources.iter().filter(|r| r.id.0 == id).collect()
    }

    /// A specific version of a resource, if it exists.
    pub fn get_resource_version(&self, id: &str, version: u32) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id.0 == id && r.version == version)
    }

    /// The current (highest-versioned) resource for `id`.
    pub fn get_current_resource(&self, id: &str) -> Option<&Resource> {
        self.get_all_versions(id).into_iter().max_by_key(|r| r.version)
    }

    pub fn get_resource_history(&self, id: &str) -> Vec<&Resource> {
        let mut versions = self.get_all_versions(id);
        versions.sort_by_key(|r| r.version);
        versions
    }
}
