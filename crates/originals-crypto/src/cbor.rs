//! CBOR encode/decode (§4.1), used for compact on-disk CEL event envelopes.

use originals_core::error::OriginalsError;
use serde::{de::DeserializeOwned, Serialize};

pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, OriginalsError> {
    serde_cbor::to_vec(value).map_err(|e| OriginalsError::Serialization(e.to_string()))
}

pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, OriginalsError> {
    serde_cbor::from_slice(bytes).map_err(|e| OriginalsError::Serialization(e.to_string()))
}
