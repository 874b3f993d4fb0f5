use sha2::Digest;

/// SHA-256 of arbitrary bytes (§4.1). The sole hash function used by the
/// protocol for content hashes, event ids, and manifest/artifact hashes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = sha2::Sha256::digest(data);
    digest.into()
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
