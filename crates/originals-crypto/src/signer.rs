//! The external-signer contract (§4.5, §6), placed in the crypto crate
//! rather than the credentials crate so that any layer signing bytes — the
//! CEL engine's event envelopes, webvh log entries, credentials, attestations
//! — can depend on the trait without pulling in the rest of the credential
//! issuance/verification machinery.

use async_trait::async_trait;
use originals_core::OriginalsError;

/// Opaque about key material: a real implementation might be a hardware
/// security module, a remote KMS, or a wallet provider. MUST return a
/// signature over exactly the bytes it is given — canonicalization happens
/// one layer up, by the caller.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign `signing_bytes` using the key referenced by `verification_method`,
    /// returning the multibase-encoded `proofValue`.
    async fn sign(&self, verification_method: &str, signing_bytes: &[u8]) -> Result<String, OriginalsError>;
}
