//! Asset-level verification (§4.10, §4.11): re-checks a CEL's hash-chain
//! integrity, re-verifies every event's signature, and folds in the
//! non-fatal outcomes a verifier should still be told about even though
//! they don't invalidate the asset.

use originals_cel::{verify_chain, CelEvent};
use originals_core::{DidUrl, OriginalsAsset, OriginalsError};
use originals_did::Resolver;

use crate::manager::VerificationWarning;
use crate::signer::verify_proof_bytes;

/// The outcome of [`verify_asset`]: the asset is either internally
/// consistent (this is `Ok`) or it isn't (an `Err`); everything in
/// `warnings` is something a verifier should know about without the asset
/// being considered invalid (§1, §7).
#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub events_checked: usize,
    pub warnings: Vec<VerificationWarning>,
}

/// Re-verify a replayed asset's CEL (§4.10 `verify(log)`, §4.11
/// `OriginalsAsset::verify()`). Checks, in order:
///
/// 1. Hash-chain integrity (`originals_cel::verify_chain`).
/// 2. Each event's Data-Integrity proof against the *current* DID document of
///    the actor named in its `verification_method` — this crate has no
///    historical-resolution capability (§9), so every asset with at least
///    one signed event carries a `HistoricalKeyAssumed` warning rather than
///    a true as-of-event-time check. Events with an empty
///    `verification_method` (the unsigned placeholder `originals-cel`'s own
///    tests use) are skipped rather than treated as a forged signature.
/// 3. Whether the asset has resources but no recorded credentials, which
///    surfaces as `MissingCredential` (§7) rather than failing verification —
///    a credential is evidence alongside the CEL, not a precondition for the
///    CEL itself being trustworthy.
pub async fn verify_asset(asset: &OriginalsAsset, events: &[CelEvent], resolver: &Resolver) -> Result<VerificationReport, OriginalsError> {
    verify_chain(events)?;

    let mut warnings = Vec::new();
    let mut any_signed = false;

    for event in events {
        if event.proof.verification_method.is_empty() {
            continue;
        }
        any_signed = true;

        let did_url: DidUrl = event
            .proof
            .verification_method
            .parse()
            .map_err(|_| OriginalsError::InvalidDid(event.proof.verification_method.clone()))?;
        let document = resolver.resolve(&did_url).await?;
        let vm = document
            .find_verification_method(&event.proof.verification_method)
            .ok_or_else(|| OriginalsError::VerificationMethodNotFound(event.proof.verification_method.clone()))?;

        let signing_bytes = CelEvent::signing_bytes(event.prev_event_id, event.sequence, event.timestamp, &event.body)?;
        verify_proof_bytes(&signing_bytes, &event.proof.proof_value, &vm.public_key_multibase)?;
    }

    if any_signed {
        warnings.push(VerificationWarning::HistoricalKeyAssumed);
    }
    if !asset.resources.is_empty() && asset.credentials.is_empty() {
        warnings.push(VerificationWarning::MissingCredential);
    }

    Ok(VerificationReport { events_checked: events.len(), warnings })
}
