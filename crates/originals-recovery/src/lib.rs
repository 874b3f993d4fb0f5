//! Error recovery policy (§4.16, §7): backoff retry for transient network
//! failures, a circuit breaker per external dependency, and the bounded fee
//! bump for fee-too-low rejections.

pub mod backoff;
pub mod circuit_breaker;
pub mod fee_adjustment;

pub use backoff::{retry_with_backoff, RetryPolicy, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY};
pub use circuit_breaker::{call_guarded, CircuitBreaker};
pub use fee_adjustment::bump_fee_rate;
