//! ─── Originals Protocol Constants ───────────────────────────────────────────
//!
//! Numeric and structural bounds referenced throughout the workspace. Kept in
//! one place so every crate validates against the same limits.

/// Genesis marker used as `prev_hash` for the first event in a CEL (§3).
pub const CEL_GENESIS_MARKER: [u8; 32] = [0u8; 32];

/// Upper bound (exclusive) on a valid ordinal satoshi number: 2^51 (§4.2, §4.13).
pub const MAX_SATOSHI: u128 = 1u128 << 51;

/// Inclusive fee-rate bounds in sat/vB (§4.9, §4.13).
pub const MIN_FEE_RATE_SAT_VB: u64 = 1;
pub const MAX_FEE_RATE_SAT_VB: u64 = 10_000;

/// Reveal inscription payload size ceiling (§4.13).
pub const MAX_REVEAL_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Default checkpoint time-to-live (§4.12).
pub const DEFAULT_CHECKPOINT_TTL_SECS: u64 = 24 * 60 * 60;

/// Default overall per-migration timeout (§5).
pub const DEFAULT_MIGRATION_TIMEOUT_SECS: u64 = 10 * 60;

/// Default retry policy (§7): 3 attempts, 1s -> 10s exponential backoff.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_BACKOFF_MS: u64 = 1_000;
pub const DEFAULT_RETRY_MAX_BACKOFF_MS: u64 = 10_000;

/// Fee escalation factor applied once on `FeeTooLow` (§4.16, §7).
pub const FEE_ESCALATION_FACTOR: f64 = 1.5;

/// Clock skew tolerance applied to credential `issuanceDate` checks (§4.6).
pub const CREDENTIAL_ISSUANCE_SKEW_SECS: i64 = 5 * 60;

/// Conformance claim string exposed when the SDK runs in conformance mode (§6).
pub const CONFORMANCE_CLAIM: &str = "Originals Protocol v1.1 compliant";

/// The only cryptosuite accepted for new signatures (§4.5, §9).
pub const CRYPTOSUITE_CONFORMANT: &str = "eddsa-jcs-2022";

/// Verification-only legacy cryptosuite, gated behind `legacy: true` (§4.5, §9).
pub const CRYPTOSUITE_LEGACY: &str = "eddsa-rdfc-2022";

/// Canonical `.well-known` path segment for a webvh DID log (§4.3, §6).
pub const WEBVH_LOG_FILENAME: &str = "did.jsonl";

/// Legacy-to-canonical CEL operation name mapping (§3, §8).
pub const LEGACY_OPERATION_CREATE: &str = "create";
pub const LEGACY_OPERATION_UPDATE: &str = "update";
