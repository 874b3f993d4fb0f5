//! Per-service circuit breaker (§4.16, §7): after `failure_threshold`
//! consecutive failures a service trips open and short-circuits calls until
//! `cooldown` has elapsed, at which point a single probe call is let through
//! (half-open); success closes the breaker, failure re-opens it and resets
//! the cooldown clock.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use originals_core::OriginalsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    opened_at: Option<DateTime<Utc>>,
}

pub struct CircuitBreaker {
    service: String,
    failure_threshold: u32,
    cooldown: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(service: impl Into<String>, failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            service: service.into(),
            failure_threshold,
            cooldown,
            inner: Mutex::new(Inner { state: State::Closed, consecutive_failures: 0, opened_at: None }),
        }
    }

    /// Check whether a call may proceed right now, transitioning `Open` ->
    /// `HalfOpen` if the cooldown has elapsed.
    pub fn before_call(&self, now: DateTime<Utc>) -> Result<(), OriginalsError> {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        match inner.state {
            State::Closed => Ok(()),
            State::HalfOpen => Ok(()),
            State::Open => {
                let opened_at = inner.opened_at.expect("Open state always has opened_at set");
                if now - opened_at >= self.cooldown {
                    inner.state = State::HalfOpen;
                    Ok(())
                } else {
                    Err(OriginalsError::CircuitOpen { service: self.service.clone() })
                }
            }
        }
    }

    /// Record a successful call: closes the breaker and clears the failure count.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        inner.state = State::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a failed call. Trips the breaker open once
    /// `consecutive_failures` reaches `failure_threshold`, or immediately
    /// re-opens from `HalfOpen`.
    pub fn record_failure(&self, now: DateTime<Utc>) {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        match inner.state {
            State::HalfOpen => {
                inner.state = State::Open;
                inner.opened_at = Some(now);
            }
            State::Closed | State::Open => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold {
                    inner.state = State::Open;
                    inner.opened_at = Some(now);
                }
            }
        }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.before_call(now).is_err()
    }
}

/// Run `f` through the breaker: refuses the call while open, otherwise runs
/// it and records the outcome.
pub async fn call_guarded<F, Fut, T>(breaker: &CircuitBreaker, now: DateTime<Utc>, f: F) -> Result<T, OriginalsError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, OriginalsError>>,
{
    breaker.before_call(now)?;
    match f().await {
        Ok(value) => {
            breaker.record_success();
            Ok(value)
        }
        Err(err) => {
            breaker.record_failure(now);
            Err(err)
        }
    }
}
