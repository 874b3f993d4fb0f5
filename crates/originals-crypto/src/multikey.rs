//! Multibase-over-multicodec key encoding (§4.1): a `z` (base58btc) multibase
//! prefix wrapping a multicodec-prefixed public key, e.g.
//! `z6Mk...` for Ed25519 or `zQ3s...` for secp256k1.

use originals_core::error::OriginalsError;

/// The three key algorithms this protocol understands (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Ed25519,
    Secp256k1,
    Bls12381G2,
}

impl KeyAlgorithm {
    /// Multicodec code for the *public key* variant, per the multicodec table.
    fn multicodec_code(self) -> u64 {
        match self {
            KeyAlgorithm::Ed25519 => 0xed,
            KeyAlgorithm::Secp256k1 => 0xe7,
            KeyAlgorithm::Bls12381G2 => 0xeb,
        }
    }

    fn from_multicodec_code(code: u64) -> Result<Self, OriginalsError> {
        match code {
            0xed => Ok(KeyAlgorithm::Ed25519),
            0xe7 => Ok(KeyAlgorithm::Secp256k1),
            0xeb => Ok(KeyAlgorithm::Bls12381G2),
            other => Err(OriginalsError::UnsupportedAlgorithm(format!(
                "unknown multicodec code: 0x{other:x}"
            ))),
        }
    }
}

/// Encode a raw public key as `z<multibase(multicodec-prefix || key bytes)>`.
pub fn encode_multikey(algorithm: KeyAlgorithm, public_key: &[u8]) -> String {
    let mut buf = unsigned_varint::encode::u64_buffer();
    let code_bytes = unsigned_varint::encode::u64(algorithm.multicodec_code(), &mut buf);
    let mut payload = Vec::with_capacity(code_bytes.len() + public_key.len());
    payload.extend_from_slice(code_bytes);
    payload.extend_from_slice(public_key);
    multibase::encode(multibase::Base::Base58Btc, payload)
}

/// Decode a `publicKeyMultibase` string back into its algorithm and raw key bytes.
pub fn decode_multikey(multikey: &str) -> Result<(KeyAlgorithm, Vec<u8>), OriginalsError> {
    let (base, data) = multibase::decode(multikey)
        .map_err(|e| OriginalsError::InvalidKeyEncoding(e.to_string()))?;
    if base != multibase::Base::Base58Btc {
        return Err(OriginalsError::InvalidKeyEncoding(
            "multikey must use base58btc ('z') multibase".into(),
        ));
    }
    let (code, rest) = unsigned_varint::decode::u64(&data)
        .map_err(|e| OriginalsError::InvalidKeyEncoding(e.to_string()))?;
    let algorithm = KeyAlgorithm::from_multicodec_code(code)?;
    Ok((algorithm, rest.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_ed25519_key() {
        let key = [7u8; 32];
        let encoded = encode_multikey(KeyAlgorithm::Ed25519, &key);
        assert!(encoded.starts_with('z'));
        let (alg, decoded) = decode_multikey(&encoded).unwrap();
        assert_eq!(alg, KeyAlgorithm::Ed25519);
        assert_eq!(decoded, key);
    }

    #[test]
    fn rejects_non_base58btc_multibase() {
        let err = decode_multikey("mZm9vYmFy").unwrap_err();
        assert!(matches!(err, OriginalsError::InvalidKeyEncoding(_)));
    }
}
