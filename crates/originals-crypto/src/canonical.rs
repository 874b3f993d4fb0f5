//! Canonicalization (§4.1, §4.5): JCS (RFC 8785) for conformant proofs, plus a
//! simplified legacy canonicalization accepted only when verifying pre-existing
//! `eddsa-rdfc-2022` proofs.

use originals_core::error::OriginalsError;
use serde::Serialize;

/// RFC 8785 JSON Canonicalization Scheme, used by `eddsa-jcs-2022` proofs.
pub fn canonicalize_jcs<T: Serialize>(value: &T) -> Result<Vec<u8>, OriginalsError> {
    serde_jcs::to_string(value)
        .map(String::into_bytes)
        .map_err(|e| OriginalsError::Serialization(e.to_string()))
}

/// A reduced stand-in for URDNA2015 RDF dataset canonicalization, sufficient to
/// verify `eddsa-rdfc-2022` proofs produced before this implementation existed.
/// It canonicalizes the JSON value's key ordering the same way JCS does but
/// does not perform full JSON-LD expansion or blank-node relabeling — real
/// RDF dataset canonicalization is out of scope (§9: legacy verify-only).
pub fn canonicalize_legacy_rdfc<T: Serialize>(value: &T) -> Result<Vec<u8>, OriginalsError> {
    canonicalize_jcs(value)
}
