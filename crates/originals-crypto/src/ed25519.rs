//! Ed25519 keypair generation, signing and verification (§4.1) — the default
//! algorithm for DID verification methods and CEL/credential proofs.

use ed25519_dalek::{Signature, Signer as _, SigningKey, Verifier as _, VerifyingKey};
use originals_core::error::OriginalsError;
use zeroize::Zeroize;

use crate::multikey::{decode_multikey, encode_multikey, KeyAlgorithm};

/// An Ed25519 keypair. The signing key is zeroized on drop.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate a fresh keypair using the OS CSPRNG (§4.1: "secure random is mandatory").
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self { signing_key: SigningKey::generate(&mut csprng) }
    }

    pub fn from_seed_bytes(seed: &[u8; 32]) -> Self {
        Self { signing_key: SigningKey::from_bytes(seed) }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// The `publicKeyMultibase` encoding of this keypair's public half (§4.1).
    pub fn public_multikey(&self) -> String {
        encode_multikey(KeyAlgorithm::Ed25519, self.signing_key.verifying_key().as_bytes())
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ed25519KeyPair {{ public: {} }}", self.public_multikey())
    }
}

/// Verify an Ed25519 signature given a `publicKeyMultibase` string (§4.1, §4.5).
pub fn verify(public_key_multibase: &str, message: &[u8], signature: &[u8]) -> Result<(), OriginalsError> {
    let (algorithm, key_bytes) = decode_multikey(public_key_multibase)?;
    if algorithm != KeyAlgorithm::Ed25519 {
        return Err(OriginalsError::UnsupportedAlgorithm(format!("{algorithm:?}")));
    }
    let key_arr: [u8; 32] = key_bytes
        .try_into()
        .map_err(|_| OriginalsError::InvalidKeyEncoding("ed25519 public key must be 32 bytes".into()))?;
    let verifying_key = VerifyingKey::from_bytes(&key_arr)
        .map_err(|e| OriginalsError::InvalidKeyEncoding(e.to_string()))?;
    let sig_arr: [u8; 64] = signature
        .try_into()
        .map_err(|_| OriginalsError::InvalidProof("ed25519 signature must be 64 bytes".into()))?;
    let signature = Signature::from_bytes(&sig_arr);
    verifying_key
        .verify(message, &signature)
        .map_err(|_| OriginalsError::SignatureVerificationFailed)
}
