pub mod attestation;
pub mod manager;
pub mod signer;
pub mod verification;

pub use attestation::{issue_final, issue_preliminary, ArtifactManifest, ManifestResource};
pub use manager::{CredentialManager, VerificationWarning, ISSUANCE_SKEW};
pub use signer::{sign_document, verify_proof, InternalSigner, Signer, CONFORMANT_SUITE, LEGACY_SUITE};
pub use verification::{verify_asset, VerificationReport};
