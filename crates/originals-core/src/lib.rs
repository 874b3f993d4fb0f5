pub mod asset;
pub mod constants;
pub mod credential;
pub mod did;
pub mod document;
pub mod error;
pub mod resource;

pub use asset::{
    Attestation, FinalityStatus, LayerBinding, LayerBindings, MigrationRecord, OriginalsAsset,
    TransferRecord,
};
pub use constants::*;
pub use credential::{Credential, CredentialKind, CredentialSubject, DataIntegrityProof};
pub use did::{BtcoNetwork, DidUrl, Layer, Method, MethodId};
pub use document::{DidDocument, VerificationMethod};
pub use error::OriginalsError;
pub use resource::{ContentHash, Resource, ResourceId};
