//! Signer / verifier (§4.5): an internal signer wrapping the crypto
//! primitives, plus the external-signer contract for HSM/KMS/wallet-backed
//! keys. Both sign over `canonicalize(document) || canonicalize(proof-without-proofValue)`
//! in conformance mode (JCS).

use std::collections::HashMap;

use async_trait::async_trait;
use originals_core::{DataIntegrityProof, OriginalsError};
use originals_crypto::canonical::canonicalize_jcs;
use originals_crypto::ed25519::Ed25519KeyPair;
use serde::Serialize;

pub const CONFORMANT_SUITE: &str = "eddsa-jcs-2022";
pub const LEGACY_SUITE: &str = "eddsa-rdfc-2022";

/// The external-signer contract (§4.5, §6) lives in `originals-crypto` so
/// that lower layers (the CEL engine, the webvh driver) can depend on it
/// without pulling in credential issuance/verification; re-exported here so
/// existing callers of `originals_credentials::Signer` keep working.
pub use originals_crypto::Signer;

/// An in-process signer holding Ed25519 keys keyed by verification method id.
/// This is the "internal signer" of §4.5 — selected when the verification
/// method references an Ed25519 key the caller holds directly.
#[derive(Default)]
pub struct InternalSigner {
    keys: HashMap<String, Ed25519KeyPair>,
}

impl InternalSigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, verification_method: impl Into<String>, key: Ed25519KeyPair) -> Self {
        self.keys.insert(verification_method.into(), key);
        self
    }

    pub fn insert_key(&mut self, verification_method: impl Into<String>, key: Ed25519KeyPair) {
        self.keys.insert(verification_method.into(), key);
    }
}

#[async_trait]
impl Signer for InternalSigner {
    async fn sign(&self, verification_method: &str, signing_bytes: &[u8]) -> Result<String, OriginalsError> {
        let key = self
            .keys
            .get(verification_method)
            .ok_or_else(|| OriginalsError::VerificationMethodNotFound(verification_method.to_string()))?;
        let signature = key.sign(signing_bytes);
        Ok(multibase::encode(multibase::Base::Base58Btc, signature))
    }
}

#[derive(Serialize)]
struct ProofWithoutValue<'a> {
    #[serde(rename = "type")]
    type_: &'a str,
    cryptosuite: &'a str,
    created: chrono::DateTime<chrono::Utc>,
    verification_method: &'a str,
    proof_purpose: &'a str,
}

/// The exact bytes a Data-Integrity proof signs: `canonicalize(document) ||
/// canonicalize(proof-without-proofValue)` (§4.5).
pub fn signing_bytes<T: Serialize>(
    document: &T,
    cryptosuite: &str,
    created: chrono::DateTime<chrono::Utc>,
    verification_method: &str,
    proof_purpose: &str,
) -> Result<Vec<u8>, OriginalsError> {
    let mut bytes = canonicalize_jcs(document)?;
    bytes.extend(canonicalize_jcs(&ProofWithoutValue {
        type_: "DataIntegrityProof",
        cryptosuite,
        created,
        verification_method,
        proof_purpose,
    })?);
    Ok(bytes)
}

/// Sign `document` and produce a conformant (`eddsa-jcs-2022`) Data-Integrity
/// proof bound to `verification_method`.
pub async fn sign_document<T: Serialize>(
    document: &T,
    signer: &dyn Signer,
    verification_method: &str,
    proof_purpose: &str,
    created: chrono::DateTime<chrono::Utc>,
) -> Result<DataIntegrityProof, OriginalsError> {
    let bytes = signing_bytes(document, CONFORMANT_SUITE, created, verification_method, proof_purpose)?;
    let proof_value = signer.sign(verification_method, &bytes).await?;
    Ok(DataIntegrityProof {
        type_: "DataIntegrityProof".to_string(),
        cryptosuite: CONFORMANT_SUITE.to_string(),
        created,
        verification_method: verification_method.to_string(),
        proof_purpose: proof_purpose.to_string(),
        proof_value,
    })
}

/// Verify `proof` over `document` against a resolved `public_key_multibase`.
/// Legacy `eddsa-rdfc-2022` proofs verify only when `legacy` is `true`
/// (§4.5, §9) — new signatures must always use `eddsa-jcs-2022`.
pub fn verify_proof<T: Serialize>(
    document: &T,
    proof: &DataIntegrityProof,
    public_key_multibase: &str,
    legacy: bool,
) -> Result<(), OriginalsError> {
    let canonicalizer = match proof.cryptosuite.as_str() {
        CONFORMANT_SUITE => canonicalize_jcs,
        LEGACY_SUITE if legacy => originals_crypto::canonical::canonicalize_legacy_rdfc,
        other => return Err(OriginalsError::UnsupportedCryptosuite(other.to_string())),
    };
    let mut bytes = canonicalizer(document)?;
    bytes.extend(canonicalizer(&ProofWithoutValue {
        type_: "DataIntegrityProof",
        cryptosuite: &proof.cryptosuite,
        created: proof.created,
        verification_method: &proof.verification_method,
        proof_purpose: &proof.proof_purpose,
    })?);

    verify_proof_bytes(&bytes, &proof.proof_value, public_key_multibase)
}

/// Verify a multibase-encoded signature over already-canonicalized bytes
/// against a resolved public key. Shared by [`verify_proof`] (which builds
/// `bytes` from a document + proof) and asset-level CEL verification (which
/// already has its own canonical signing bytes via `CelEvent::signing_bytes`).
pub fn verify_proof_bytes(bytes: &[u8], proof_value: &str, public_key_multibase: &str) -> Result<(), OriginalsError> {
    let (_, signature) = multibase::decode(proof_value).map_err(|e| OriginalsError::InvalidProof(e.to_string()))?;
    originals_crypto::ed25519::verify(public_key_multibase, bytes, &signature).map_err(|_| OriginalsError::ProofVerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[tokio::test]
    async fn sign_then_verify_round_trips() {
        let key = Ed25519KeyPair::generate();
        let vm = "did:peer:4zfake#key-1";
        let public = key.public_multikey();
        let signer = InternalSigner::new().with_key(vm, key);

        let document = json!({"hello": "world"});
        let now = Utc::now();
        let proof = sign_document(&document, &signer, vm, "assertionMethod", now).await.unwrap();
        verify_proof(&document, &proof, &public, false).unwrap();
    }

    #[tokio::test]
    async fn tampered_document_fails_verification() {
        let key = Ed25519KeyPair::generate();
        let vm = "did:peer:4zfake#key-1";
        let public = key.public_multikey();
        let signer = InternalSigner::new().with_key(vm, key);

        let document = json!({"hello": "world"});
        let now = Utc::now();
        let proof = sign_document(&document, &signer, vm, "assertionMethod", now).await.unwrap();
        let tampered = json!({"hello": "there"});
        assert!(verify_proof(&tampered, &proof, &public, false).is_err());
    }

    #[test]
    fn legacy_suite_rejected_without_flag() {
        let proof = DataIntegrityProof {
            type_: "DataIntegrityProof".into(),
            cryptosuite: LEGACY_SUITE.into(),
            created: Utc::now(),
            verification_method: "did:peer:4zfake#key-1".into(),
            proof_purpose: "assertionMethod".into(),
            proof_value: "zfake".into(),
        };
        let document = json!({"a": 1});
        let err = verify_proof(&document, &proof, "zfake", false).unwrap_err();
        assert!(matches!(err, OriginalsError::UnsupportedCryptosuite(_)));
    }
}
