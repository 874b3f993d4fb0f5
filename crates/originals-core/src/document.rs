//! W3C DID document shape (§3), method-agnostic.

use serde::{Deserialize, Serialize};

/// A single verification method, encoded as Multikey (multibase `z` +
/// multicodec prefix) per §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub controller: String,
    pub public_key_multibase: String,
}

impl VerificationMethod {
    pub fn multikey(id: impl Into<String>, controller: impl Into<String>, public_key_multibase: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_: "Multikey".to_string(),
            controller: controller.into(),
            public_key_multibase: public_key_multibase.into(),
        }
    }
}

/// A W3C-compliant DID document. For `did:btco`, every field except
/// `modified` is immutable after inscription (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DidDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<String>,
    /// Pass-through fields the core does not interpret (`service`,
    /// `alsoKnownAs`, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub additional_properties: serde_json::Map<String, serde_json::Value>,
    /// Present only on `did:btco` documents; the timestamp of the most
    /// recent inscription revision (§3: "all fields except `modified` are
    /// immutable after inscription").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<chrono::DateTime<chrono::Utc>>,
    /// Deactivation flag recognized by the btco driver (§4.3).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deactivated: bool,
}

impl DidDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            verification_method: Vec::new(),
            authentication: Vec::new(),
            assertion_method: Vec::new(),
            additional_properties: serde_json::Map::new(),
            modified: None,
            deactivated: false,
        }
    }

    /// Resolve a `verificationMethod` entry by its full id or bare `#fragment`.
    pub fn find_verification_method(&self, method_ref: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| {
            vm.id == method_ref || vm.id.ends_with(method_ref) || method_ref.ends_with(&vm.id)
        })
    }
}
