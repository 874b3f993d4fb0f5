pub mod bls;
pub mod canonical;
pub mod cbor;
pub mod ed25519;
pub mod hash;
pub mod multikey;
pub mod secp256k1;
pub mod signer;

pub use bls::BlsKeyPair;
pub use ed25519::Ed25519KeyPair;
pub use hash::{sha256, sha256_hex};
pub use multikey::{decode_multikey, encode_multikey, KeyAlgorithm};
pub use secp256k1::Secp256k1KeyPair;
pub use signer::Signer;
