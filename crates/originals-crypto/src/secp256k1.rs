//! secp256k1 keypair generation, signing and verification (§4.1) — used for
//! Bitcoin-facing operations (commit/reveal inputs, transfer PSBTs).

use bitcoin::secp256k1::{self, ecdsa, Message, PublicKey, Secp256k1, SecretKey};
use originals_core::error::OriginalsError;
use zeroize::Zeroize;

use crate::multikey::{decode_multikey, encode_multikey, KeyAlgorithm};

pub struct Secp256k1KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Secp256k1KeyPair {
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let mut csprng = rand::rngs::OsRng;
        let (secret_key, public_key) = secp.generate_keypair(&mut csprng);
        Self { secret_key, public_key }
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn public_multikey(&self) -> String {
        encode_multikey(KeyAlgorithm::Secp256k1, &self.public_key.serialize())
    }

    /// Sign a 32-byte message digest (ECDSA, low-S, per Bitcoin consensus rules).
    pub fn sign(&self, digest: &[u8; 32]) -> ecdsa::Signature {
        let secp = Secp256k1::new();
        let message = Message::from_digest(*digest);
        secp.sign_ecdsa(&message, &self.secret_key)
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

pub fn verify(public_key_multibase: &str, digest: &[u8; 32], signature: &ecdsa::Signature) -> Result<(), OriginalsError> {
    let (algorithm, key_bytes) = decode_multikey(public_key_multibase)?;
    if algorithm != KeyAlgorithm::Secp256k1 {
        return Err(OriginalsError::UnsupportedAlgorithm(format!("{algorithm:?}")));
    }
    let public_key = PublicKey::from_slice(&key_bytes)
        .map_err(|e| OriginalsError::InvalidKeyEncoding(e.to_string()))?;
    let secp = secp256k1::Secp256k1::verification_only();
    let message = Message::from_digest(*digest);
    secp.verify_ecdsa(&message, signature, &public_key)
        .map_err(|_| OriginalsError::SignatureVerificationFailed)
}
