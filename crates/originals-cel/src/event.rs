//! The cryptographic event log entry shape (§4.10): append-only, hash-chained,
//! JCS-canonicalized, Data-Integrity-proof-signed.

use chrono::{DateTime, Utc};
use originals_core::{
    CEL_GENESIS_MARKER, DataIntegrityProof, MigrationRecord, OriginalsError, Resource, TransferRecord,
};
use originals_crypto::canonical::canonicalize_jcs;
use originals_crypto::hash::sha256;
use serde::{Deserialize, Serialize};

/// The operation carried by one event. Everything an asset can ever do is one
/// of these five variants (§3, §4.10). `create`/`update` are accepted on
/// deserialization as legacy aliases for `ResourceAdded`/`ResourceUpdated`
/// (§3, §8) but are never written by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CelEventBody {
    #[serde(alias = "create")]
    ResourceAdded { resource: Resource },
    #[serde(alias = "update")]
    ResourceUpdated { resource: Resource },
    ResourceMigrated { record: MigrationRecord },
    ResourceTransferred { record: TransferRecord },
    ResourceDeactivated,
}

/// One link in the chain. `event_id` commits to both `prev_event_id` and the
/// canonicalized body, so altering any prior event invalidates everything
/// after it (§4.10 chain integrity).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelEvent {
    pub event_id: [u8; 32],
    pub prev_event_id: [u8; 32],
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub body: CelEventBody,
    pub proof: DataIntegrityProof,
}

#[derive(Serialize)]
struct UnsignedEvent<'a> {
    prev_event_id: String,
    sequence: u64,
    timestamp: DateTime<Utc>,
    body: &'a CelEventBody,
}

impl CelEvent {
    /// Build the canonical bytes this event's `event_id` and signature cover.
    pub fn signing_bytes(prev_event_id: [u8; 32], sequence: u64, timestamp: DateTime<Utc>, body: &CelEventBody) -> Result<Vec<u8>, OriginalsError> {
        canonicalize_jcs(&UnsignedEvent {
            prev_event_id: hex::encode(prev_event_id),
            sequence,
            timestamp,
            body,
        })
    }

    pub fn compute_event_id(prev_event_id: [u8; 32], sequence: u64, timestamp: DateTime<Utc>, body: &CelEventBody) -> Result<[u8; 32], OriginalsError> {
        Ok(sha256(&Self::signing_bytes(prev_event_id, sequence, timestamp, body)?))
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_event_id == CEL_GENESIS_MARKER
    }
}

/// Verify the hash chain of a full event sequence, without touching
/// signatures (signature verification is §4.5's concern, layered on top by
/// the credentials crate since it alone knows the active verification keys).
pub fn verify_chain(events: &[CelEvent]) -> Result<(), OriginalsError> {
    let mut expected_prev = CEL_GENESIS_MARKER;
    for (index, event) in events.iter().enumerate() {
        if event.sequence != index as u64 {
            return Err(OriginalsError::ChainIntegrityViolation {
                index,
                reason: format!("expected sequence {index}, got {}", event.sequence),
            });
        }
        if event.prev_event_id != expected_prev {
            return Err(OriginalsError::ChainIntegrityViolation {
                index,
                reason: "prev_event_id does not match the preceding event".into(),
            });
        }
        let recomputed = CelEvent::compute_event_id(event.prev_event_id, event.sequence, event.timestamp, &event.body)?;
        if recomputed != event.event_id {
            return Err(OriginalsError::ChainIntegrityViolation {
                index,
                reason: "event_id does not match recomputed hash of prev_event_id + body".into(),
            });
        }
        expected_prev = event.event_id;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use originals_core::ContentHash;

    fn sample_resource() -> Resource {
        Resource::new_initial("r1", "image", "image/png", b"payload".to_vec(), Utc::now())
    }

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

    fn genesis_event(body: CelEventBody, timestamp: DateTime<Utc>) -> CelEvent {
        let event_id = CelEvent::compute_event_id(CEL_GENESIS_MARKER, 0, timestamp, &body).unwrap();
        CelEvent { event_id, prev_event_id: CEL_GENESIS_MARKER, sequence: 0, timestamp, body, proof: sample_proof() }
    }

    #[test]
    fn single_genesis_event_chain_is_valid() {
        let now = Utc::now();
        let event = genesis_event(CelEventBody::ResourceAdded { resource: sample_resource() }, now);
        assert!(verify_chain(&[event]).is_ok());
    }

    #[test]
    fn tampered_body_breaks_chain() {
        let now = Utc::now();
        let mut event = genesis_event(CelEventBody::ResourceAdded { resource: sample_resource() }, now);
        if let CelEventBody::ResourceAdded { resource } = &mut event.body {
            resource.hash = ContentHash::from_bytes(b"different content");
        }
        assert!(verify_chain(&[event]).is_err());
    }

    #[test]
    fn out_of_order_sequence_is_rejected() {
        let now = Utc::now();
        let mut event = genesis_event(CelEventBody::ResourceAdded { resource: sample_resource() }, now);
        event.sequence = 5;
        assert!(matches!(verify_chain(&[event]), Err(OriginalsError::ChainIntegrityViolation { .. })));
    }
}
