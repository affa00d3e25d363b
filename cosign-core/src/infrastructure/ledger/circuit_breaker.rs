use crate::foundation::CIRCUIT_BREAKER_BASE_BACKOFF_SECS;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const MAX_BACKOFF_SHIFT: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// Cap on how long the circuit stays open before a trial request (seconds).
    pub open_duration_secs: u64,
    /// Half-open successes required to close again.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, open_duration_secs: 30, success_threshold: 2 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
enum State {
    Closed { failures: u32 },
    Open { until: Instant, reopen_count: u32 },
    HalfOpen { successes: u32, reopen_count: u32 },
}

/// Closed/Open/HalfOpen breaker shared by every call through one ledger adapter.
pub struct CircuitBreaker {
    name: &'static str,
    cfg: CircuitBreakerConfig,
    state: parking_lot::Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, cfg: CircuitBreakerConfig) -> Self {
        Self { name, cfg, state: parking_lot::Mutex::new(State::Closed { failures: 0 }) }
    }

    pub fn state(&self) -> BreakerState {
        match *self.state.lock() {
            State::Closed { .. } => BreakerState::Closed,
            State::Open { .. } => BreakerState::Open,
            State::HalfOpen { .. } => BreakerState::HalfOpen,
        }
    }

    pub fn allow(&self) -> bool {
        let mut guard = self.state.lock();
        if let State::Open { until, reopen_count } = *guard {
            let now = Instant::now();
            if now < until {
                debug!(
                    "circuit breaker denying call breaker={} remaining_ms={}",
                    self.name,
                    until.saturating_duration_since(now).as_millis()
                );
                return false;
            }
            info!("circuit breaker probing breaker={} transition=open->half_open reopen_count={}", self.name, reopen_count);
            *guard = State::HalfOpen { successes: 0, reopen_count };
        }
        true
    }

    pub fn record_success(&self) {
        let mut guard = self.state.lock();
        let next = match *guard {
            State::Closed { .. } => State::Closed { failures: 0 },
            State::HalfOpen { successes, reopen_count } => {
                let successes = successes.saturating_add(1);
                if successes >= self.cfg.success_threshold.max(1) {
                    info!("circuit breaker closed breaker={} successes={}", self.name, successes);
                    State::Closed { failures: 0 }
                } else {
                    State::HalfOpen { successes, reopen_count }
                }
            }
            // A late success from a call started before the circuit opened.
            State::Open { until, reopen_count } => State::Open { until, reopen_count },
        };
        *guard = next;
    }

    pub fn record_failure(&self) {
        let mut guard = self.state.lock();
        let next = match *guard {
            State::Closed { failures } => {
                let failures = failures.saturating_add(1);
                if failures >= self.cfg.failure_threshold.max(1) {
                    let open_for = self.open_interval(1);
                    warn!(
                        "circuit breaker opened breaker={} failures={} open_for_ms={}",
                        self.name,
                        failures,
                        open_for.as_millis()
                    );
                    State::Open { until: Instant::now() + open_for, reopen_count: 1 }
                } else {
                    debug!("circuit breaker failure breaker={} failures={} threshold={}", self.name, failures, self.cfg.failure_threshold);
                    State::Closed { failures }
                }
            }
            State::HalfOpen { reopen_count, .. } => {
                let reopen_count = reopen_count.saturating_add(1);
                let open_for = self.open_interval(reopen_count);
                warn!(
                    "circuit breaker re-opened breaker={} reopen_count={} open_for_ms={}",
                    self.name,
                    reopen_count,
                    open_for.as_millis()
                );
                State::Open { until: Instant::now() + open_for, reopen_count }
            }
            State::Open { until, reopen_count } => State::Open { until, reopen_count },
        };
        *guard = next;
    }

    /// Exponential backoff from `CIRCUIT_BREAKER_BASE_BACKOFF_SECS`, capped at `open_duration_secs`.
    fn open_interval(&self, reopen_count: u32) -> Duration {
        let cap = Duration::from_secs(self.cfg.open_duration_secs);
        let shift = reopen_count.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        let backoff = Duration::from_secs(CIRCUIT_BREAKER_BASE_BACKOFF_SECS.saturating_mul(1u64 << shift));
        backoff.min(cap)
    }
}
