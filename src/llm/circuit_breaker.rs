//! Circuit breaker guarding the external LLM endpoint. Adapted from the
//! teacher's `internals::retry::CircuitBreaker` shape, but with the exact
//! state machine this system requires: exactly one probe in `HalfOpen`,
//! and a cooldown that doubles (capped) on a failed probe rather than
//! resetting to the base value.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: CircuitState,
    failure_count: u32,
    last_transition: Option<Instant>,
    cooldown: Duration,
    half_open_probe_in_flight: bool,
}

pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    failure_threshold: u32,
    base_cooldown: Duration,
    max_cooldown: Duration,
}

/// Outcome of asking the breaker for permission to make a request.
pub enum Admission {
    Allowed,
    Rejected { retry_after: Duration },
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, base_cooldown: Duration, max_cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                last_transition: None,
                cooldown: base_cooldown,
                half_open_probe_in_flight: false,
            }),
            failure_threshold,
            base_cooldown,
            max_cooldown,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().expect("circuit breaker lock poisoned").state
    }

    pub fn admit(&self) -> Admission {
        let mut inner = self.inner.lock().expect("circuit breaker lock poisoned");
        match inner.state {
            CircuitState::Closed => Admission::Allowed,
            CircuitState::Open => {
                let elapsed = inner
                    .last_transition
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed >= inner.cooldown {
                    inner.state = CircuitState::HalfOpen;
                    inner.half_open_probe_in_flight = true;
                    crate::log_circuit_state_change!("open", "half_open", "cooldown elapsed");
                    Admission::Allowed
                } else {
                    Admission::Rejected {
                        retry_after: inner.cooldown - elapsed,
                    }
                }
            }
            CircuitState::HalfOpen => {
                if inner.half_open_probe_in_flight {
                    Admission::Rejected {
                        retry_after: inner.cooldown,
                    }
                } else {
                    inner.half_open_probe_in_flight = true;
                    Admission::Allowed
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker lock poisoned");
        match inner.state {
            CircuitState::HalfOpen => {
                crate::log_circuit_state_change!("half_open", "closed", "probe succeeded");
                inner.state = CircuitState::Closed;
                inner.failure_count = 0;
                inner.cooldown = self.base_cooldown;
                inner.half_open_probe_in_flight = false;
            }
            CircuitState::Closed => {
                inner.failure_count = 0;
            }
            CircuitState::Open => {
                inner.failure_count = 0;
                inner.half_open_probe_in_flight = false;
            }
        }
    }

    /// Cancellation releases the probe slot without counting as a failure,
    /// per the cancellation policy (§5): cancelled calls never trip or heal
    /// the breaker.
    pub fn release_without_counting(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker lock poisoned");
        if inner.state == CircuitState::HalfOpen {
            inner.half_open_probe_in_flight = false;
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker lock poisoned");
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.failure_threshold {
                    crate::log_circuit_state_change!("closed", "open", "failure threshold reached");
                    inner.state = CircuitState::Open;
                    inner.last_transition = Some(Instant::now());
                    inner.cooldown = self.base_cooldown;
                }
            }
            CircuitState::HalfOpen => {
                let doubled = inner.cooldown.saturating_mul(2);
                inner.cooldown = doubled.min(self.max_cooldown);
                crate::log_circuit_state_change!("half_open", "open", "probe failed");
                inner.state = CircuitState::Open;
                inner.last_transition = Some(Instant::now());
                inner.half_open_probe_in_flight = false;
            }
            CircuitState::Open => {
                inner.last_transition = Some(Instant::now());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let cb = CircuitBreaker::new(5, Duration::from_secs(60), Duration::from_secs(300));
        for _ in 0..4 {
            assert!(matches!(cb.admit(), Admission::Allowed));
            cb.record_failure();
        }
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(matches!(cb.admit(), Admission::Allowed));
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(matches!(cb.admit(), Admission::Rejected { .. }));
    }

    #[test]
    fn half_open_allows_exactly_one_probe() {
        let cb = CircuitBreaker::new(1, Duration::from_millis(1), Duration::from_secs(300));
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(cb.admit(), Admission::Allowed));
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(matches!(cb.admit(), Admission::Rejected { .. }));
    }

    #[test]
    fn failed_probe_doubles_cooldown_capped() {
        let cb = CircuitBreaker::new(1, Duration::from_millis(1), Duration::from_millis(3));
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(cb.admit(), Admission::Allowed));
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        // cooldown should be capped at max_cooldown (3ms), doubled from 1ms -> 2ms < cap.
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(cb.admit(), Admission::Allowed));
    }

    #[test]
    fn successful_probe_closes_and_resets_cooldown() {
        let cb = CircuitBreaker::new(1, Duration::from_millis(1), Duration::from_secs(300));
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(5));
        assert!(matches!(cb.admit(), Admission::Allowed));
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }
}
