//! Condition Poller
//!
//! Bounded waits over predicates that query a live application.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  await_condition(budget, predicate)                              │
//! │                                                                  │
//! │   start ──► evaluate ──► true? ──────────────► satisfied         │
//! │               ▲            │ no                                  │
//! │               │            ▼                                     │
//! │             sleep ◄── spent < budget? ── no ──► timed out        │
//! │   min(interval, remaining)                                       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Elapsed time is always clamped to the budget, so composed waits can
//! subtract it from the remaining budget without going negative. Errors
//! returned by a predicate count as "not yet" and never abort the loop.

use crate::clock::{SharedClock, SystemClock};
use crate::result::{AssayError, AssayResult};
use std::time::Duration;
use tracing::{debug, trace};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default session wait (5 seconds)
pub const DEFAULT_WAIT_SECS: f64 = 5.0;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Smallest interval the poller will sleep for
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// =============================================================================
// WAIT BUDGET
// =============================================================================

/// Maximum time a single poll may run, plus the interval between attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitBudget {
    seconds: f64,
    poll_interval: Duration,
}

impl WaitBudget {
    /// Create a budget of `seconds`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for negative, NaN or infinite values, and
    /// for values too large to be a [`Duration`]
    pub fn new(seconds: f64) -> AssayResult<Self> {
        validate_seconds(seconds)?;
        Ok(Self {
            seconds,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        })
    }

    /// Zero-wait budget: the predicate is evaluated exactly once
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            seconds: 0.0,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set the polling interval
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    /// Budget in seconds
    #[must_use]
    pub const fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Budget as a duration
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.seconds)
    }

    /// Interval between predicate evaluations
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether this budget allows no waiting at all
    #[must_use]
    pub fn is_immediate(&self) -> bool {
        self.seconds == 0.0
    }

    /// Budget left after `spent_seconds`, never negative
    #[must_use]
    pub fn remaining_after(&self, spent_seconds: f64) -> Self {
        Self {
            seconds: (self.seconds - spent_seconds).max(0.0),
            poll_interval: self.poll_interval,
        }
    }

    fn clamp(&self, spent: Duration) -> f64 {
        spent.as_secs_f64().min(self.seconds).max(0.0)
    }
}

fn validate_seconds(seconds: f64) -> AssayResult<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(AssayError::invalid_argument(
            "seconds",
            format!("wait budget must be a finite, non-negative number, got {seconds}"),
        ));
    }
    if Duration::try_from_secs_f64(seconds).is_err() {
        return Err(AssayError::invalid_argument(
            "seconds",
            format!("wait budget of {seconds} seconds is too large"),
        ));
    }
    Ok(())
}

// =============================================================================
// DEFAULT WAIT
// =============================================================================

/// Session-scoped default wait, shadowed by a per-element override
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultWait {
    seconds: f64,
}

impl DefaultWait {
    /// Create a default wait of `seconds`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for negative, NaN or infinite values
    pub fn new(seconds: f64) -> AssayResult<Self> {
        validate_seconds(seconds)?;
        Ok(Self { seconds })
    }

    /// Default wait in seconds
    #[must_use]
    pub const fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Pick the element override when present, else this default
    #[must_use]
    pub fn resolve(&self, element_override: Option<f64>) -> f64 {
        element_override.unwrap_or(self.seconds)
    }
}

impl Default for DefaultWait {
    fn default() -> Self {
        Self {
            seconds: DEFAULT_WAIT_SECS,
        }
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Result of one poller invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollOutcome {
    /// Whether the predicate held before the deadline
    pub satisfied: bool,
    /// Time spent, clamped to `[0, budget]`
    pub elapsed_seconds: f64,
}

impl PollOutcome {
    /// Create a satisfied outcome
    #[must_use]
    pub const fn satisfied(elapsed_seconds: f64) -> Self {
        Self {
            satisfied: true,
            elapsed_seconds,
        }
    }

    /// Create a timed-out outcome
    #[must_use]
    pub const fn timed_out(elapsed_seconds: f64) -> Self {
        Self {
            satisfied: false,
            elapsed_seconds,
        }
    }
}

/// Result of a prerequisite wait followed by a dependent wait
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainedOutcome {
    /// Outcome of the prerequisite stage
    pub prerequisite: PollOutcome,
    /// Outcome of the dependent stage, `None` when it was never invoked
    pub dependent: Option<PollOutcome>,
    /// Total budget both stages shared
    pub budget_seconds: f64,
}

impl ChainedOutcome {
    /// Both stages held
    #[must_use]
    pub fn satisfied(&self) -> bool {
        self.prerequisite.satisfied && self.dependent.is_some_and(|d| d.satisfied)
    }

    /// Whether the dependent stage was skipped
    #[must_use]
    pub const fn short_circuited(&self) -> bool {
        self.dependent.is_none()
    }

    /// Total elapsed time across both stages, clamped to the budget
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        match self.dependent {
            Some(dependent) => (self.prerequisite.elapsed_seconds + dependent.elapsed_seconds)
                .min(self.budget_seconds),
            None => self.budget_seconds,
        }
    }
}

// =============================================================================
// POLLER
// =============================================================================

/// Sleep-based poller driven by a [`Clock`](crate::clock::Clock)
#[derive(Debug, Clone)]
pub struct Poller {
    clock: SharedClock,
}

impl Poller {
    /// Create a poller on `clock`
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self { clock }
    }

    /// Create a poller on the wall clock
    #[must_use]
    pub fn system() -> Self {
        Self::new(SystemClock::shared())
    }

    /// Clock used to measure elapsed time
    #[must_use]
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Wait until `predicate` holds or `budget` runs out
    pub fn await_condition<F>(&self, budget: WaitBudget, mut predicate: F) -> PollOutcome
    where
        F: FnMut() -> bool,
    {
        self.await_fallible(budget, || Ok(predicate()))
    }

    /// Wait until `predicate` returns `Ok(true)` or `budget` runs out
    ///
    /// `Err` results are treated as "not yet satisfied".
    pub fn await_fallible<F>(&self, budget: WaitBudget, mut predicate: F) -> PollOutcome
    where
        F: FnMut() -> AssayResult<bool>,
    {
        let limit = budget.duration();
        let start = self.clock.now();
        let mut attempts = 0_u32;

        loop {
            attempts += 1;
            let holds = match predicate() {
                Ok(holds) => holds,
                Err(err) => {
                    trace!(error = %err, attempt = attempts, "predicate failed while polling");
                    false
                }
            };
            let spent = self.clock.now().saturating_sub(start);

            if holds {
                let elapsed = budget.clamp(spent);
                debug!(attempts, elapsed, "condition satisfied");
                return PollOutcome::satisfied(elapsed);
            }
            if spent >= limit {
                debug!(attempts, budget = budget.seconds(), "condition timed out");
                return PollOutcome::timed_out(budget.seconds());
            }

            self.clock.sleep(budget.poll_interval().min(limit - spent));
        }
    }

    /// Continue a chained wait that has already spent `spent_seconds`
    ///
    /// Returns `None` without evaluating `predicate` when a non-zero budget
    /// is already used up.
    pub fn await_after<F>(
        &self,
        budget: WaitBudget,
        spent_seconds: f64,
        predicate: F,
    ) -> Option<PollOutcome>
    where
        F: FnMut() -> AssayResult<bool>,
    {
        if !budget.is_immediate() && spent_seconds >= budget.seconds() {
            debug!(
                spent = spent_seconds,
                budget = budget.seconds(),
                "budget exhausted, dependent wait short-circuited"
            );
            return None;
        }
        Some(self.await_fallible(budget.remaining_after(spent_seconds), predicate))
    }

    /// Wait for `prerequisite`, then for `dependent` with whatever budget is left
    ///
    /// The dependent stage is never invoked when the prerequisite timed out,
    /// or when it used up a non-zero budget.
    pub fn await_chained<P, D>(
        &self,
        budget: WaitBudget,
        prerequisite: P,
        dependent: D,
    ) -> ChainedOutcome
    where
        P: FnMut() -> AssayResult<bool>,
        D: FnMut() -> AssayResult<bool>,
    {
        let first = self.await_fallible(budget, prerequisite);
        let second = if first.satisfied {
            self.await_after(budget, first.elapsed_seconds, dependent)
        } else {
            debug!(budget = budget.seconds(), "prerequisite timed out");
            None
        };
        ChainedOutcome {
            prerequisite: first,
            dependent: second,
            budget_seconds: budget.seconds(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
