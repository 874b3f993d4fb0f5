//! Fee oracle contract (§4.9, §6): dynamic fee-rate estimation with a
//! bounded fallback on failure.

use async_trait::async_trait;
use originals_core::{OriginalsError, MAX_FEE_RATE_SAT_VB, MIN_FEE_RATE_SAT_VB};

#[async_trait]
pub trait FeeOracle: Send + Sync {
    async fn estimate_fee_rate(&self, target_blocks: u32) -> Result<u64, OriginalsError>;
}

pub fn validate_fee_rate(sat_per_vb: u64) -> Result<(), OriginalsError> {
    if sat_per_vb < MIN_FEE_RATE_SAT_VB || sat_per_vb > MAX_FEE_RATE_SAT_VB {
        return Err(OriginalsError::InvalidFeeRate(sat_per_vb));
    }
    Ok(())
}

/// Wraps an inner oracle; on failure, falls back to `fallback_sat_per_vb`
/// (itself validated against `[1, 10_000]`) and the caller is expected to
/// record a warning event (§4.9).
pub struct BoundedFallbackOracle<O: FeeOracle> {
    inner: O,
    fallback_sat_per_vb: u64,
}

impl<O: FeeOracle> BoundedFallbackOracle<O> {
    pub fn new(inner: O, fallback_sat_per_vb: u64) -> Result<Self, OriginalsError> {
        validate_fee_rate(fallback_sat_per_vb)?;
        Ok(Self { inner, fallback_sat_per_vb })
    }

    /// Returns `(rate, used_fallback)`.
    pub async fn estimate_with_fallback(&self, target_blocks: u32) -> (u64, bool) {
        match self.inner.estimate_fee_rate(target_blocks).await {
            Ok(rate) if validate_fee_rate(rate).is_ok() => (rate, false),
            _ => (self.fallback_sat_per_vb, true),
        }
    }
}
