//! Configuration surface for the SDK (§4.19). `Originals` is a library, not
//! a long-running server, so there is no config file format to parse —
//! `SdkConfig` is built programmatically and passed to [`crate::Originals`]
//! as a plain `Serialize + Deserialize` struct with a full `Default` impl.

use originals_core::constants::{
    CONFORMANCE_CLAIM, DEFAULT_CHECKPOINT_TTL_SECS, DEFAULT_MIGRATION_TIMEOUT_SECS,
    DEFAULT_RETRY_BASE_BACKOFF_MS, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_BACKOFF_MS,
    MAX_FEE_RATE_SAT_VB,
};
use originals_core::BtcoNetwork;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicyConfig {
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            base_backoff_ms: DEFAULT_RETRY_BASE_BACKOFF_MS,
            max_backoff_ms: DEFAULT_RETRY_MAX_BACKOFF_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub cooldown_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, cooldown_ms: 30_000 }
    }
}

/// The SDK's single configuration surface (§4.19).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    pub network: BtcoNetwork,
    /// Exposes [`CONFORMANCE_CLAIM`] and forbids legacy cryptosuite
    /// verification unless a caller opts in per-call.
    pub conformance_mode: bool,
    pub max_fee_rate_sat_vb: u64,
    pub retry: RetryPolicyConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub checkpoint_ttl_secs: u64,
    pub migration_timeout_secs: u64,
    pub batch_concurrency: usize,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            network: BtcoNetwork::Mainnet,
            conformance_mode: true,
            max_fee_rate_sat_vb: MAX_FEE_RATE_SAT_VB,
            retry: RetryPolicyConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            checkpoint_ttl_secs: DEFAULT_CHECKPOINT_TTL_SECS,
            migration_timeout_secs: DEFAULT_MIGRATION_TIMEOUT_SECS,
            batch_concurrency: 1,
        }
    }
}

impl SdkConfig {
    /// The claim string to surface to callers while `conformance_mode` is on
    /// (§6); `None` once a deployment has opted out.
    pub fn conformance_claim(&self) -> Option<&'static str> {
        self.conformance_mode.then_some(CONFORMANCE_CLAIM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_bounds() {
        let config = SdkConfig::default();
        assert_eq!(config.network, BtcoNetwork::Mainnet);
        assert!(config.conformance_mode);
        assert_eq!(config.max_fee_rate_sat_vb, MAX_FEE_RATE_SAT_VB);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.checkpoint_ttl_secs, 24 * 60 * 60);
    }

    #[test]
    fn conformance_claim_is_none_when_disabled() {
        let config = SdkConfig { conformance_mode: false, ..SdkConfig::default() };
        assert!(config.conformance_claim().is_none());
    }
}
