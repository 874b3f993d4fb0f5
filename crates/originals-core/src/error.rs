use thiserror::Error;

/// The single error type returned by every public `Result` in the workspace.
///
/// Every downstream crate re-exports this type rather than defining its own —
/// a caller embedding the SDK only ever has to match on one enum.
#[derive(Debug, Error)]
pub enum OriginalsError {
    // ── Validation ───────────────────────────────────────────────────────────
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidHashLength(usize),

    // ── DID resolution boundary (§4.4, §6) ──────────────────────────────────
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("representation not supported: {0}")]
    RepresentationNotSupported(String),

    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    // ── Crypto primitives (§4.1) ─────────────────────────────────────────────
    #[error("invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    // ── Signer / verifier (§4.5) ─────────────────────────────────────────────
    #[error("invalid proof: {0}")]
    InvalidProof(String),

    #[error("verification method not found: {0}")]
    VerificationMethodNotFound(String),

    #[error("unsupported cryptosuite: {0}")]
    UnsupportedCryptosuite(String),

    #[error("proof verification failed")]
    ProofVerificationFailed,

    // ── CEL / lifecycle invariants (§3, §4.10, §4.12) ────────────────────────
    #[error("layer finality violation: asset version is already finalized on btco")]
    LayerFinalityViolation,

    #[error("invalid transition: {from} -> {to} is not a forward migration")]
    InvalidTransition { from: String, to: String },

    #[error("chain integrity violation at index {index}: {reason}")]
    ChainIntegrityViolation { index: usize, reason: String },

    #[error("resource hash is not novel within this asset: {0}")]
    DuplicateResourceHash(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("asset is deactivated; no further events may append")]
    AssetDeactivated,

    // ── Bitcoin (§4.13) ──────────────────────────────────────────────────────
    #[error("insufficient funds: need {required} sats, have {available} sats")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("fee too low for target confirmation")]
    FeeTooLow,

    #[error("invalid fee rate: {0} sat/vB is outside [1, 10000]")]
    InvalidFeeRate(u64),

    #[error("invalid satoshi number: {0} is outside [0, 2^51)")]
    InvalidSatoshi(u128),

    #[error("invalid bitcoin address: {0}")]
    InvalidAddress(String),

    #[error("reveal payload too large: {size} bytes exceeds the 4 MiB limit")]
    RevealPayloadTooLarge { size: usize },

    #[error("satoshi {0} already carries a prior inscription")]
    FrontRunningDetected(u64),

    // ── Recovery / circuit breaker (§4.16, §7) ───────────────────────────────
    #[error("circuit open for {service}; retry after cooldown")]
    CircuitOpen { service: String },

    #[error("batch had {failed} failing item(s) out of {total}")]
    BatchPartialFailure { failed: usize, total: usize },

    #[error("quarantined: {reason}")]
    Quarantine { reason: String },

    #[error("checkpoint not found or expired: {0}")]
    CheckpointNotFound(String),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),

    // ── General ──────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl OriginalsError {
    /// Whether this error kind is retryable per §7's recovery policy table.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OriginalsError::NetworkUnavailable(_))
    }
}
