//! Credential manager (§4.6): issues and verifies the three protocol
//! credential kinds, binding the issuer DID to a verification method
//! resolved at verify time.

use chrono::{DateTime, Duration, Utc};
use originals_core::{Credential, CredentialKind, CredentialSubject, Layer, OriginalsError};
use originals_did::Resolver;
use serde::Serialize;

use crate::signer::{sign_document, verify_proof, Signer};

/// Clock-skew tolerance applied to `issuanceDate <= now + skew` (§4.6).
pub const ISSUANCE_SKEW: Duration = Duration::minutes(5);

/// Non-fatal outcomes surfaced alongside a successful verification (§1, §4.6, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationWarning {
    /// `credentialStatus` is present; status checking is out of scope for v1.
    StatusCheckSkipped,
    /// A CEL event's signature was checked against the actor's *current* DID
    /// document rather than the document as it existed at event time, since
    /// historical resolution isn't implemented (§4.10, §9).
    HistoricalKeyAssumed,
    /// The asset has resources but no recorded issuance credential (§7) —
    /// not fatal, since the CEL itself is still the source of truth.
    MissingCredential,
}

#[derive(Serialize)]
struct UnsignedCredential<'a> {
    #[serde(rename = "@context")]
    context: &'a [String],
    #[serde(rename = "type")]
    type_: &'a [String],
    issuer: &'a str,
    issuance_date: DateTime<Utc>,
    credential_subject: &'a CredentialSubject,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_status: Option<&'a serde_json::Value>,
}

fn unsigned_view(credential: &Credential) -> UnsignedCredential<'_> {
    UnsignedCredential {
        context: &credential.context,
        type_: &credential.type_,
        issuer: &credential.issuer,
        issuance_date: credential.issuance_date,
        credential_subject: &credential.credential_subject,
        credential_status: credential.credential_status.as_ref(),
    }
}

pub struct CredentialManager<'a> {
    resolver: &'a Resolver,
}

impl<'a> CredentialManager<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        Self { resolver }
    }

    /// Issue a credential of `kind`, binding `issuer` to `verification_method`
    /// and signing with `signer` (§4.6).
    pub async fn issue(
        &self,
        kind: CredentialKind,
        issuer: impl Into<String>,
        subject: CredentialSubject,
        verification_method: &str,
        signer: &dyn Signer,
        now: DateTime<Utc>,
    ) -> Result<Credential, OriginalsError> {
        let mut credential = Credential::unsigned(kind, issuer, now, subject);
        let proof = sign_document(&unsigned_view(&credential), signer, verification_method, "assertionMethod", now).await?;
        credential.proof = Some(proof);
        Ok(credential)
    }

    pub fn issue_resource_created(
        resource_id: &str,
        hash: &str,
        content_type: &str,
        created_at: DateTime<Utc>,
        creator: &str,
    ) -> CredentialSubject {
        CredentialSubject::ResourceCreated {
            resource_id: resource_id.to_string(),
            hash: hash.to_string(),
            content_type: content_type.to_string(),
            created_at,
            creator: creator.to_string(),
        }
    }

    pub fn issue_resource_updated(resource_id: &str, previous_hash: &str, new_hash: &str, updated_at: DateTime<Utc>) -> CredentialSubject {
        CredentialSubject::ResourceUpdated {
            resource_id: resource_id.to_string(),
            previous_hash: previous_hash.to_string(),
            new_hash: new_hash.to_string(),
            updated_at,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn issue_resource_migrated(
        from: Layer,
        to: Layer,
        source_did: &str,
        target_did: &str,
        migrated_at: DateTime<Utc>,
        transaction_id: Option<String>,
        inscription_id: Option<String>,
        satoshi: Option<u64>,
    ) -> CredentialSubject {
        CredentialSubject::ResourceMigrated {
            from,
            to,
            source_did: source_did.to_string(),
            target_did: target_did.to_string(),
            migrated_at,
            transaction_id,
            inscription_id,
            satoshi,
        }
    }

    /// Verify `credential`: resolve the issuer DID, select the referenced
    /// verification method, re-canonicalize minus proof, verify the
    /// signature, check `issuer` matches the proof's controller, and check
    /// `issuanceDate <= now + skew` (§4.6).
    pub async fn verify(&self, credential: &Credential, now: DateTime<Utc>) -> Result<Vec<VerificationWarning>, OriginalsError> {
        let proof = credential
            .proof
            .as_ref()
            .ok_or_else(|| OriginalsError::InvalidProof("credential carries no proof".into()))?;

        if credential.issuance_date > now + ISSUANCE_SKEW {
            return Err(OriginalsError::ValidationFailed("issuanceDate is in the future beyond the allowed skew".into()));
        }

        let did_url: originals_core::DidUrl = credential
            .issuer
            .parse()
            .map_err(|_| OriginalsError::InvalidDid(credential.issuer.clone()))?;
        let document = self.resolver.resolve(&did_url).await?;

        if !proof.verification_method.starts_with(&credential.issuer) && !document.id.eq(&credential.issuer) {
            return Err(OriginalsError::InvalidProof("proof verification method does not belong to the stated issuer".into()));
        }
        let vm = document
            .find_verification_method(&proof.verification_method)
            .ok_or_else(|| OriginalsError::VerificationMethodNotFound(proof.verification_method.clone()))?;

        verify_proof(&unsigned_view(credential), proof, &vm.public_key_multibase, false)?;

        let mut warnings = Vec::new();
        if credential.credential_status.is_some() {
            warnings.push(VerificationWarning::StatusCheckSkipped);
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::InternalSigner;
    use originals_core::{DidDocument, VerificationMethod};
    use originals_crypto::ed25519::Ed25519KeyPair;
    use originals_did::{DidDriver, PeerDriver};

    fn build_resolver_with_peer() -> Resolver {
        Resolver::new().with_driver(Box::new(PeerDriver))
    }

    #[tokio::test]
    async fn issue_then_verify_resource_created_round_trips() {
        let key = Ed25519KeyPair::generate();
        let public = key.public_multikey();

        let mut draft = DidDocument::new("");
        draft.verification_method.push(VerificationMethod::multikey("#key-1", "", &public));
        draft.assertion_method.push("#key-1".to_string());
        let (did, resolved) = PeerDriver::create(&draft).unwrap();
        let vm_id = format!("{}#key-1", did.did());

        let signer = InternalSigner::new().with_key(vm_id.as_str(), key);
        let resolver = build_resolver_with_peer();
        let manager = CredentialManager::new(&resolver);

        let now = Utc::now();
        let subject = CredentialManager::issue_resource_created("r1", "deadbeef", "text/plain", now, &resolved.id);
        let credential = manager
            .issue(CredentialKind::ResourceCreated, resolved.id.clone(), subject, &vm_id, &signer, now)
            .await
            .unwrap();

        let warnings = manager.verify(&credential, now).await.unwrap();
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn future_issuance_date_rejected() {
        let key = Ed25519KeyPair::generate();
        let public = key.public_multikey();
        let mut draft = DidDocument::new("");
        draft.verification_method.push(VerificationMethod::multikey("#key-1", "", &public));
        let (did, resolved) = PeerDriver::create(&draft).unwrap();
        let vm_id = format!("{}#key-1", did.did());
        let signer = InternalSigner::new().with_key(vm_id.as_str(), key);
        let resolver = build_resolver_with_peer();
        let manager = CredentialManager::new(&resolver);

        let now = Utc::now();
        let future = now + Duration::hours(1);
        let subject = CredentialManager::issue_resource_created("r1", "deadbeef", "text/plain", future, &resolved.id);
        let credential = manager
            .issue(CredentialKind::ResourceCreated, resolved.id.clone(), subject, &vm_id, &signer, future)
            .await
            .unwrap();

        assert!(manager.verify(&credential, now).await.is_err());
    }

    #[tokio::test]
    async fn credential_status_present_surfaces_skip_warning() {
        let key = Ed25519KeyPair::generate();
        let public = key.public_multikey();
        let mut draft = DidDocument::new("");
        draft.verification_method.push(VerificationMethod::multikey("#key-1", "", &public));
        draft.assertion_method.push("#key-1".to_string());
        let (did, resolved) = PeerDriver::create(&draft).unwrap();
        let vm_id = format!("{}#key-1", did.did());
        let signer = InternalSigner::new().with_key(vm_id.as_str(), key);
        let resolver = build_resolver_with_peer();
        let manager = CredentialManager::new(&resolver);

        let now = Utc::now();
        let subject = CredentialManager::issue_resource_created("r1", "deadbeef", "text/plain", now, &resolved.id);
        let mut credential = manager
            .issue(CredentialKind::ResourceCreated, resolved.id.clone(), subject, &vm_id, &signer, now)
            .await
            .unwrap();
        credential.credential_status = Some(serde_json::json!({"type": "StatusList2021Entry"}));
        // credential_status is part of the signed view, so re-sign after setting it.
        let proof = sign_document(&unsigned_view(&credential), &signer, &vm_id, "assertionMethod", now).await.unwrap();
        credential.proof = Some(proof);

        let warnings = manager.verify(&credential, now).await.unwrap();
        assert_eq!(warnings, vec![VerificationWarning::StatusCheckSkipped]);
    }
}
