//! `did:webvh` driver (§4.3): resolves an HTTPS-hosted, hash-chained JSONL
//! append log at `.well-known/did.jsonl` (or `<path>/did.jsonl` when the DID
//! carries path segments) into the current DID document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use originals_core::{DataIntegrityProof, DidDocument, DidUrl, Method, MethodId, OriginalsError};
use originals_crypto::canonical::canonicalize_jcs;
use originals_crypto::hash::sha256_hex;
use serde::{Deserialize, Serialize};

use crate::driver::DidDriver;

const CONFORMANT_SUITE: &str = "eddsa-jcs-2022";
const LEGACY_SUITE: &str = "eddsa-rdfc-2022";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub version_id: String,
    pub version_time: DateTime<Utc>,
    #[serde(default)]
    pub parameters: serde_json::Value,
    pub state: DidDocument,
    pub proof: DataIntegrityProof,
}

#[derive(Serialize)]
struct UnsignedEntry<'a> {
    previous_version_id: &'a str,
    version_time: DateTime<Utc>,
    parameters: &'a serde_json::Value,
    state: &'a DidDocument,
}

fn entry_hash(previous_version_id: &str, entry: &LogEntry) -> Result<String, OriginalsError> {
    let unsigned = UnsignedEntry {
        previous_version_id,
        version_time: entry.version_time,
        parameters: &entry.parameters,
        state: &entry.state,
    };
    Ok(sha256_hex(&canonicalize_jcs(&unsigned)?))
}

fn verify_entry_signature(entry: &LogEntry) -> Result<(), OriginalsError> {
    if entry.proof.cryptosuite != CONFORMANT_SUITE && entry.proof.cryptosuite != LEGACY_SUITE {
        return Err(OriginalsError::UnsupportedCryptosuite(entry.proof.cryptosuite.clone()));
    }
    let vm = entry
        .state
        .find_verification_method(&entry.proof.verification_method)
        .ok_or_else(|| OriginalsError::VerificationMethodNotFound(entry.proof.verification_method.clone()))?;

    // The signed payload excludes `proof` itself; `version_id` already commits
    // to the previous entry's hash so the signature transitively covers it.
    let signed_bytes = canonicalize_jcs(&EntryBody {
        version_id: &entry.version_id,
        version_time: entry.version_time,
        parameters: &entry.parameters,
        state: &entry.state,
    })?;

    let (_, signature) = multibase::decode(&entry.proof.proof_value)
        .map_err(|e| OriginalsError::InvalidProof(e.to_string()))?;
    originals_crypto::ed25519::verify(&vm.public_key_multibase, &signed_bytes, &signature)
        .map_err(|_| OriginalsError::ProofVerificationFailed)
}

#[derive(Serialize)]
struct EntryBody<'a> {
    version_id: &'a str,
    version_time: DateTime<Utc>,
    parameters: &'a serde_json::Value,
    state: &'a DidDocument,
}

/// Compute the `versionId` and the exact bytes a new entry's proof must sign,
/// without requiring a proof to exist yet (§4.3's log creation path, used by
/// the credentials crate once it has a signer in hand).
pub fn unsigned_entry(previous_version_id: &str, version_time: DateTime<Utc>, parameters: &serde_json::Value, state: &DidDocument) -> Result<(String, Vec<u8>), OriginalsError> {
    let hash = sha256_hex(&canonicalize_jcs(&UnsignedEntry { previous_version_id, version_time, parameters, state })?);
    let version_id = format!("{}-{hash}", previous_version_id.split('-').next().and_then(|n| n.parse::<u64>().ok()).unwrap_or(0) + 1);
    let signing_bytes = canonicalize_jcs(&EntryBody { version_id: &version_id, version_time, parameters, state })?;
    Ok((version_id, signing_bytes))
}

/// Verify the hash chain and signatures of a fully-fetched log, returning the
/// current (last) document on success.
pub fn verify_log(entries: &[LogEntry]) -> Result<DidDocument, OriginalsError> {
    if entries.is_empty() {
        return Err(OriginalsError::NotFound("did:webvh log has no entries".into()));
    }
    let mut previous_version_id = String::new();
    for (index, entry) in entries.iter().enumerate() {
        let expected_hash = entry_hash(&previous_version_id, entry)?;
        let expected_version_id = format!("{}-{expected_hash}", index + 1);
        if entry.version_id != expected_version_id {
            return Err(OriginalsError::ChainIntegrityViolation {
                index,
                reason: "versionId does not match recomputed entry hash".into(),
            });
        }
        verify_entry_signature(entry)?;
        previous_version_id = entry.version_id.clone();
    }
    Ok(entries.last().expect("checked non-empty above").state.clone())
}

fn log_url(domain: &str, path_segments: &[String]) -> String {
    if path_segments.is_empty() {
        format!("https://{domain}/.well-known/did.jsonl")
    } else {
        format!("https://{domain}/{}/did.jsonl", path_segments.join("/"))
    }
}

pub struct WebvhDriver {
    client: reqwest::Client,
}

impl Default for WebvhDriver {
    fn default() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl WebvhDriver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_log(&self, domain: &str, path_segments: &[String]) -> Result<Vec<LogEntry>, OriginalsError> {
        let url = log_url(domain, path_segments);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OriginalsError::NetworkUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(OriginalsError::NotFound(format!("did:webvh log not found at {url}")));
        }
        let body = response
            .text()
            .await
            .map_err(|e| OriginalsError::NetworkUnavailable(e.to_string()))?;
        body.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| OriginalsError::Serialization(e.to_string())))
            .collect()
    }
}

#[async_trait]
impl DidDriver for WebvhDriver {
    fn method(&self) -> Method {
        Method::Webvh
    }

    async fn resolve(&self, did: &DidUrl) -> Result<DidDocument, OriginalsError> {
        let MethodId::Webvh { domain, path_segments } = &did.method_id else {
            return Err(OriginalsError::InvalidDid("not a did:webvh identifier".into()));
        };
        let entries = self.fetch_log(domain, path_segments).await?;
        let mut document = verify_log(&entries)?;
        document.id = did.did();
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_url_without_path_uses_well_known() {
        assert_eq!(log_url("example.com", &[]), "https://example.com/.well-known/did.jsonl");
    }

    #[test]
    fn log_url_with_path_segments() {
        assert_eq!(
            log_url("example.com", &["alice".to_string()]),
            "https://example.com/alice/did.jsonl"
        );
    }

    #[test]
    fn genesis_entry_builds_and_verifies() {
        use originals_core::VerificationMethod;
        use originals_crypto::ed25519::Ed25519KeyPair;

        let key = Ed25519KeyPair::generate();
        let public = key.public_multikey();
        let mut document = DidDocument::new("did:webvh:example.com:alice");
        document.verification_method.push(VerificationMethod::multikey("#key-1", "did:webvh:example.com:alice", &public));
        document.assertion_method.push("#key-1".to_string());

        let now = Utc::now();
        let parameters = serde_json::json!({});
        let (version_id, signing_bytes) = unsigned_entry("", now, &parameters, &document).unwrap();
        assert!(version_id.starts_with("1-"));

        let signature = key.sign(&signing_bytes);
        let proof_value = multibase::encode(multibase::Base::Base58Btc, signature);
        let entry = LogEntry {
            version_id,
            version_time: now,
            parameters,
            state: document.clone(),
            proof: DataIntegrityProof {
                type_: "DataIntegrityProof".into(),
                cryptosuite: CONFORMANT_SUITE.into(),
                created: now,
                verification_method: "did:webvh:example.com:alice#key-1".into(),
                proof_purpose: "assertionMethod".into(),
                proof_value,
            },
        };

        let resolved = verify_log(&[entry]).unwrap();
        assert_eq!(resolved.id, document.id);
    }

    #[test]
    fn empty_log_is_rejected() {
        assert!(verify_log(&[]).is_err());
    }
}
