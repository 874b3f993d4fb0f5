//! Attestation manager (§4.14): preliminary (webvh, provisional) and final
//! (btco, final) signed artifacts. The final artifact's `artifactHash` is
//! always recomputed at finalization rather than reused from a preceding
//! preliminary attestation — an Open Question resolved as a MUST-recompute
//! (DESIGN.md).

use chrono::{DateTime, Utc};
use originals_core::{Attestation, OriginalsError, Resource};
use serde::Serialize;

use crate::signer::{sign_document, Signer};

/// The deterministic manifest an attestation's `artifactHash` covers:
/// `{assetId, resources:[{id, version, hash, contentType, url?}], timestamp}` (§4.14).
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactManifest {
    pub asset_id: String,
    pub resources: Vec<ManifestResource>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestResource {
    pub id: String,
    pub version: u32,
    pub hash: String,
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ArtifactManifest {
    pub fn from_resources(asset_id: impl Into<String>, resources: &[Resource], timestamp: DateTime<Utc>) -> Self {
        Self {
            asset_id: asset_id.into(),
            resources: resources
                .iter()
                .map(|r| ManifestResource {
                    id: r.id.to_string(),
                    version: r.version,
                    hash: r.hash.to_hex(),
                    content_type: r.content_type.clone(),
                    url: r.url.clone(),
                })
                .collect(),
            timestamp,
        }
    }

    pub fn artifact_hash(&self) -> Result<String, OriginalsError> {
        let bytes = originals_crypto::canonical::canonicalize_jcs(self)?;
        Ok(originals_crypto::hash::sha256_hex(&bytes))
    }
}

#[derive(Serialize)]
struct PreliminaryUnsigned<'a> {
    source_did: &'a str,
    controller: &'a str,
    cel_head_hash: &'a str,
    candidate_artifact_hash: &'a str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct FinalUnsigned<'a> {
    source_did: &'a str,
    controller: &'a str,
    cel_head_hash: &'a str,
    artifact_hash: &'a str,
    inscription_id: &'a str,
    txid: &'a str,
    block_height: Option<u64>,
    timestamp: DateTime<Utc>,
}

/// Build and sign a preliminary (webvh) attestation (§4.14).
#[allow(clippy::too_many_arguments)]
pub async fn issue_preliminary(
    source_did: &str,
    controller: &str,
    cel_head_hash: &str,
    candidate_artifact_hash: &str,
    verification_method: &str,
    signer: &dyn Signer,
    now: DateTime<Utc>,
) -> Result<Attestation, OriginalsError> {
    let unsigned = PreliminaryUnsigned { source_did, controller, cel_head_hash, candidate_artifact_hash, timestamp: now };
    let proof = sign_document(&unsigned, signer, verification_method, "assertionMethod", now).await?;
    Ok(Attestation::Preliminary {
        source_did: source_did.to_string(),
        controller: controller.to_string(),
        cel_head_hash: cel_head_hash.to_string(),
        candidate_artifact_hash: candidate_artifact_hash.to_string(),
        timestamp: now,
        proof,
    })
}

/// Build and sign a final (btco) attestation (§4.14). Consumers MUST NOT
/// treat a preliminary attestation as final — only this constructor ever
/// produces `status: "final"`.
#[allow(clippy::too_many_arguments)]
pub async fn issue_final(
    source_did: &str,
    controller: &str,
    cel_head_hash: &str,
    artifact_hash: &str,
    inscription_id: &str,
    txid: &str,
    block_height: Option<u64>,
    verification_method: &str,
    signer: &dyn Signer,
    now: DateTime<Utc>,
) -> Result<Attestation, OriginalsError> {
    let unsigned = FinalUnsigned {
        source_did,
        controller,
        cel_head_hash,
        artifact_hash,
        inscription_id,
        txid,
        block_height,
        timestamp: now,
    };
    let proof = sign_document(&unsigned, signer, verification_method, "assertionMethod", now).await?;
    Ok(Attestation::Final {
        source_did: source_did.to_string(),
        controller: controller.to_string(),
        cel_head_hash: cel_head_hash.to_string(),
        artifact_hash: artifact_hash.to_string(),
        inscription_id: inscription_id.to_string(),
        txid: txid.to_string(),
        block_height,
        timestamp: now,
        proof,
    })
}
