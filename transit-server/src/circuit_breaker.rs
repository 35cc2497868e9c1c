//! Circuit breaker for outbound real-time calls.
//!
//! Each real-time source owns one breaker. After `failure_threshold`
//! consecutive failures the circuit opens and calls are refused without
//! touching the remote system. Once `reset_timeout` has elapsed the next
//! call is let through as a trial: success closes the circuit, failure
//! opens it again for another `reset_timeout`. Only one trial runs at a
//! time; other calls are refused while it is in flight.
//!
//! ```text
//! Closed ──[failure_threshold failures]──> Open
//!   ▲                                        │
//!   │                                        │ [reset_timeout elapsed, next call]
//!   │                                        ▼
//!   └────────────[trial succeeds]──────── HalfOpen
//!                 [trial fails] ──────────> Open
//! ```

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

/// Default number of consecutive failures before the circuit opens.
const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default time the circuit stays open before allowing a trial call.
const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures needed to open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial call.
    pub reset_timeout: Duration,
}

impl CircuitBreakerConfig {
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            reset_timeout,
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

/// State of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    /// Calls pass through.
    Closed,
    /// Calls are refused.
    Open,
    /// The next call decides whether the circuit closes again.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => f.write_str("closed"),
            CircuitState::Open => f.write_str("open"),
            CircuitState::HalfOpen => f.write_str("half-open"),
        }
    }
}

/// Error returned by [`CircuitBreaker::call`].
#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E> {
    /// The circuit is open; the call was not attempted.
    #[error("circuit breaker open")]
    Open,

    /// The call was attempted and failed.
    #[error("{0}")]
    Inner(E),
}

/// Read-only view of a breaker, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub current_state: CircuitState,
    pub fail_counter: u32,
    /// Reset timeout in seconds.
    pub reset_timeout: u64,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    fail_counter: u32,
    opened_at: Option<Instant>,
    /// A half-open trial call is running.
    trial_in_flight: bool,
}

/// How a call was admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permit {
    Normal,
    Trial,
}

/// Releases the trial slot if the trial call is dropped before completing.
struct TrialGuard<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.state.lock().trial_in_flight = false;
        }
    }
}

/// Circuit breaker guarding calls to a single remote system.
///
/// Safe to share between tasks; state updates are serialized behind a
/// mutex that is never held across an await point.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a closed breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                fail_counter: 0,
                opened_at: None,
                trial_in_flight: false,
            }),
        }
    }

    /// Current state, as last recorded. Does not trigger the
    /// open → half-open transition; only a call does that.
    pub fn current_state(&self) -> CircuitState {
        self.state.lock().state
    }

    /// Number of consecutive failures recorded.
    pub fn fail_counter(&self) -> u32 {
        self.state.lock().fail_counter
    }

    /// Snapshot for status reporting.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let state = self.state.lock();
        BreakerSnapshot {
            current_state: state.state,
            fail_counter: state.fail_counter,
            reset_timeout: self.config.reset_timeout.as_secs(),
        }
    }

    /// Run `f` through the breaker.
    ///
    /// Returns [`BreakerError::Open`] without calling `f` when the circuit
    /// is open, or half-open with a trial already running. Otherwise the
    /// outcome of `f` is recorded and returned.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(permit) = self.try_acquire() else {
            return Err(BreakerError::Open);
        };

        let mut guard = TrialGuard {
            breaker: self,
            armed: permit == Permit::Trial,
        };
        let outcome = f().await;
        guard.armed = false;

        match outcome {
            Ok(value) => {
                self.on_success(permit);
                Ok(value)
            }
            Err(e) => {
                self.on_failure(permit);
                Err(BreakerError::Inner(e))
            }
        }
    }

    /// Decide whether a call may go through, moving open → half-open when
    /// the reset timeout has elapsed.
    fn try_acquire(&self) -> Option<Permit> {
        let mut state = self.state.lock();
        match state.state {
            CircuitState::Closed => Some(Permit::Normal),
            CircuitState::HalfOpen if state.trial_in_flight => None,
            CircuitState::HalfOpen => {
                state.trial_in_flight = true;
                Some(Permit::Trial)
            }
            CircuitState::Open => {
                let elapsed = state.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed < self.config.reset_timeout {
                    return None;
                }
                debug!(breaker = %self.name, "circuit half-open, allowing trial call");
                state.state = CircuitState::HalfOpen;
                state.trial_in_flight = true;
                Some(Permit::Trial)
            }
        }
    }

    fn on_success(&self, permit: Permit) {
        let mut state = self.state.lock();
        if permit == Permit::Trial {
            debug!(breaker = %self.name, "trial call succeeded, circuit closed");
        }
        state.state = CircuitState::Closed;
        state.fail_counter = 0;
        state.opened_at = None;
        state.trial_in_flight = false;
    }

    fn on_failure(&self, permit: Permit) {
        let mut state = self.state.lock();
        state.fail_counter = state.fail_counter.saturating_add(1);
        if permit == Permit::Trial {
            state.trial_in_flight = false;
        }

        let trips = match (state.state, permit) {
            (CircuitState::HalfOpen, Permit::Trial) => true,
            (CircuitState::Closed, _) => state.fail_counter >= self.config.failure_threshold,
            // Calls admitted before another one opened the circuit.
            (CircuitState::HalfOpen, Permit::Normal) | (CircuitState::Open, _) => false,
        };

        if trips {
            warn!(
                breaker = %self.name,
                failures = state.fail_counter,
                reset_timeout_secs = self.config.reset_timeout.as_secs(),
                "circuit opened"
            );
            state.state = CircuitState::Open;
            state.opened_at = Some(Instant::now());
        }
    }
}
