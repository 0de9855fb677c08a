//! Consecutive-failure circuit breaker.
//!
//! ```text
//! Closed    -> Open      : `failure_threshold` consecutive failures
//! Open      -> Half-Open : first call after `cooldown`, admitted as the probe
//! Half-Open -> Closed    : the probe succeeds
//! Half-Open -> Open      : the probe fails or is dropped unfinished
//! ```
//!
//! While open, and while a probe is in flight, calls are rejected without
//! touching the network.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 10;
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit. Zero behaves like one.
    pub failure_threshold: u32,
    /// Time the circuit stays open before a probe is admitted.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
enum State {
    Closed { failures: u32 },
    Open { opened_at: Instant },
    /// The single probe is in flight.
    HalfOpen,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    name: &'static str,
    config: CircuitBreakerConfig,
    state: Mutex<State>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            config,
            state: Mutex::new(State::Closed { failures: 0 }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> CircuitState {
        match *self.state.lock() {
            State::Closed { .. } => CircuitState::Closed,
            State::Open { .. } => CircuitState::Open,
            State::HalfOpen => CircuitState::HalfOpen,
        }
    }

    /// Asks to make a call. `None` means the call must fail fast.
    ///
    /// The returned permit must be settled with [`Permit::success`] or
    /// [`Permit::failure`]; dropping it unsettled counts as a failure.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut state = self.state.lock();
        let probe = match *state {
            State::Closed { .. } => false,
            State::Open { opened_at } if opened_at.elapsed() >= self.config.cooldown => {
                *state = State::HalfOpen;
                tracing::info!(breaker = self.name, "circuit half-open, admitting probe");
                true
            }
            State::Open { .. } | State::HalfOpen => return None,
        };
        Some(Permit {
            breaker: self,
            probe,
            settled: false,
        })
    }

    fn record_success(&self, probe: bool) {
        let mut state = self.state.lock();
        match *state {
            State::HalfOpen if probe => {
                *state = State::Closed { failures: 0 };
                tracing::info!(breaker = self.name, "circuit closed");
            }
            State::Closed { .. } => *state = State::Closed { failures: 0 },
            // A late answer from before the circuit opened changes nothing.
            _ => {}
        }
    }

    fn record_failure(&self, probe: bool) {
        let mut state = self.state.lock();
        match *state {
            State::HalfOpen if probe => {
                *state = State::Open {
                    opened_at: Instant::now(),
                };
                metrics::counter!("circuit_breaker_opened_total", "breaker" => self.name)
                    .increment(1);
                tracing::warn!(breaker = self.name, "probe failed, circuit reopened");
            }
            State::Closed { failures } => {
                let failures = failures + 1;
                if failures >= self.config.failure_threshold.max(1) {
                    *state = State::Open {
                        opened_at: Instant::now(),
                    };
                    metrics::counter!("circuit_breaker_opened_total", "breaker" => self.name)
                        .increment(1);
                    tracing::warn!(breaker = self.name, failures, "circuit opened");
                } else {
                    *state = State::Closed { failures };
                }
            }
            _ => {}
        }
    }
}

/// Admission to make one call through a [`CircuitBreaker`].
#[derive(Debug)]
#[must_use = "an unsettled permit counts as a failure"]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl Permit<'_> {
    /// True when this call is the half-open probe.
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    pub fn success(mut self) {
        self.settled = true;
        self.breaker.record_success(self.probe);
    }

    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure(self.probe);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.record_failure(self.probe);
        }
    }
}
