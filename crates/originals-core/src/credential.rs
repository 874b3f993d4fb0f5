//! Verifiable-credential data shapes (§4.6). Issuance and verification logic
//! lives in `originals-credentials`; this crate only owns the wire shape so
//! that `originals-cel`'s asset replay can hold a `Vec<Credential>` without
//! depending on the issuance pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::did::Layer;

/// The three protocol credential kinds (§4.6). No application-specific
/// credential schemas are in scope (§1 Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CredentialKind {
    ResourceCreated,
    ResourceUpdated,
    ResourceMigrated,
}

impl CredentialKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            CredentialKind::ResourceCreated => "ResourceCreated",
            CredentialKind::ResourceUpdated => "ResourceUpdated",
            CredentialKind::ResourceMigrated => "ResourceMigrated",
        }
    }
}

/// Data-Integrity proof attached to a credential, CEL event, or attestation
/// (§3, §4.5). The `eddsa-jcs-2022` cryptosuite is mandatory for anything
/// newly signed; `eddsa-rdfc-2022` is verification-only (§4.5, §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataIntegrityProof {
    #[serde(rename = "type")]
    pub type_: String,
    pub cryptosuite: String,
    pub created: DateTime<Utc>,
    pub verification_method: String,
    pub proof_purpose: String,
    pub proof_value: String,
}

/// The subject payload of a credential. Kept as a typed union rather than a
/// free-form JSON-LD map since only three kinds exist (§1 Non-goals).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CredentialSubject {
    ResourceCreated {
        resource_id: String,
        hash: String,
        content_type: String,
        created_at: DateTime<Utc>,
        creator: String,
    },
    ResourceUpdated {
        resource_id: String,
        previous_hash: String,
        new_hash: String,
        updated_at: DateTime<Utc>,
    },
    ResourceMigrated {
        from: Layer,
        to: Layer,
        source_did: String,
        target_did: String,
        migrated_at: DateTime<Utc>,
        transaction_id: Option<String>,
        inscription_id: Option<String>,
        satoshi: Option<u64>,
    },
}

/// A W3C Verifiable Credential (data model v2) bound to a Data-Integrity
/// proof — never a JWT (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub type_: Vec<String>,
    pub issuer: String,
    pub issuance_date: DateTime<Utc>,
    pub credential_subject: CredentialSubject,
    /// Present only on credentials issued by something other than this
    /// protocol's own flows; status checking against it is out of scope
    /// (§4.6) and surfaces as `VerificationWarning::StatusCheckSkipped`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<DataIntegrityProof>,
}

impl Credential {
    pub fn unsigned(kind: CredentialKind, issuer: impl Into<String>, issuance_date: DateTime<Utc>, subject: CredentialSubject) -> Self {
        Self {
            context: vec![
                "https://www.w3.org/ns/credentials/v2".to_string(),
                "https://originals.dev/contexts/v1".to_string(),
            ],
            type_: vec!["VerifiableCredential".to_string(), kind.type_name().to_string()],
            issuer: issuer.into(),
            issuance_date,
            credential_subject: subject,
            credential_status: None,
            proof: None,
        }
    }

    pub fn kind(&self) -> Option<CredentialKind> {
        if self.type_.iter().any(|t| t == "ResourceCreated") {
            Some(CredentialKind::ResourceCreated)
        } else if self.type_.iter().any(|t| t == "ResourceUpdated") {
            Some(CredentialKind::ResourceUpdated)
        } else if self.type_.iter().any(|t| t == "ResourceMigrated") {
            Some(CredentialKind::ResourceMigrated)
        } else {
            None
        }
    }
}
