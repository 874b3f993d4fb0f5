//! Fee-too-low recovery (§4.16, §7): on a single `FeeTooLow` rejection, bump
//! the fee rate by 1.5x, capped at the caller's maximum. A second consecutive
//! rejection at the capped rate is not retried further; the error propagates.

use originals_core::OriginalsError;

/// Compute the next fee rate to retry an inscription or transfer at.
/// Returns `Err(FeeTooLow)` if the current rate is already at or above `max_fee_rate`.
pub fn bump_fee_rate(current_sat_per_vb: u64, max_fee_rate_sat_per_vb: u64) -> Result<u64, OriginalsError> {
    if current_sat_per_vb >= max_fee_rate_sat_per_vb {
        return Err(OriginalsError::FeeTooLow);
    }
    let bumped = (current_sat_per_vb as f64 * 1.5).ceil() as u64;
    Ok(bumped.min(max_fee_rate_sat_per_vb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumps_by_one_and_a_half_times() {
        assert_eq!(bump_fee_rate(10, 100).unwrap(), 15);
    }

    #[test]
    fn caps_at_max_fee_rate() {
        assert_eq!(bump_fee_rate(80, 100).unwrap(), 100);
    }

    #[test]
    fn already_at_cap_is_an_error() {
        assert!(bump_fee_rate(100, 100).is_err());
    }
}
