//! Check Evaluator
//!
//! Every check follows one shape:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  expectation ──► preconditions ──► value wait ──► fetch ──► record  │
//! │  (described     (present, kind,    (budget left   (errors   (PASS / │
//! │   up front)      cell; FAIL +       after the      propagate) FAIL) │
//! │                  sentinel if        preconditions)                  │
//! │                  unmet)                                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`TestRun`] owns everything one test needs: the session config and
//! default wait, the poller and its clock, and the recorder with its error
//! counter. Check builders borrow it mutably for the duration of one check.
//!
//! Mismatches never return `Err`. Only malformed checks (bad pattern, bad
//! coordinates, invalid budget) and driver faults on the final fetch do.

pub mod compare;
mod element;
mod page;
mod response;

pub use compare::Pattern;
pub use element::{Contains, ElementCheck, ElementState, Equals, Excludes, Matches, StateCheck};
pub use page::PageCheck;
pub use response::{ResponseCheck, ResponseContains, ResponseEquals, ResponseMatches};

use crate::aggregator::Verdict;
use crate::clock::{SharedClock, SystemClock};
use crate::config::AssayConfig;
use crate::driver::{Capture, ElementResolver, PageResolver};
use crate::http::Response;
use crate::recorder::{CheckResult, Expectation, Recorder, Status};
use crate::reporter::Report;
use crate::result::AssayResult;
use crate::target::Element;
use crate::wait::{DefaultWait, Poller, WaitBudget};
use std::path::PathBuf;
use tracing::{info, warn};

/// What a value-level read observed
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Probe<T> {
    /// Raw value handed back to the caller
    pub value: T,
    /// Comparison outcome
    pub passed: bool,
    /// Actual description
    pub actual: String,
}

impl<T> Probe<T> {
    pub(crate) fn new(value: T, passed: bool, actual: impl Into<String>) -> Self {
        Self {
            value,
            passed,
            actual: actual.into(),
        }
    }
}

/// Context for one test execution
#[derive(Debug)]
pub struct TestRun {
    name: String,
    config: AssayConfig,
    default_wait: DefaultWait,
    poller: Poller,
    recorder: Recorder,
}

impl TestRun {
    /// Start a run on the wall clock
    ///
    /// # Errors
    ///
    /// Returns `Config` when `config` does not validate
    pub fn new(name: impl Into<String>, config: AssayConfig) -> AssayResult<Self> {
        Self::with_clock(name, config, SystemClock::shared())
    }

    /// Start a run on `clock`
    ///
    /// # Errors
    ///
    /// Returns `Config` when `config` does not validate
    pub fn with_clock(
        name: impl Into<String>,
        config: AssayConfig,
        clock: SharedClock,
    ) -> AssayResult<Self> {
        config.validate()?;
        let name = name.into();
        let default_wait = DefaultWait::new(config.default_wait_secs)?;
        info!(test = %name, default_wait = default_wait.seconds(), "test run started");
        Ok(Self {
            recorder: Recorder::new(name.clone()),
            name,
            default_wait,
            poller: Poller::new(clock),
            config,
        })
    }

    /// Test name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &AssayConfig {
        &self.config
    }

    /// Session default wait in seconds
    #[must_use]
    pub const fn default_wait(&self) -> f64 {
        self.default_wait.seconds()
    }

    /// Change the session default wait
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for negative, NaN or infinite values
    pub fn set_default_wait(&mut self, seconds: f64) -> AssayResult<()> {
        self.default_wait = DefaultWait::new(seconds)?;
        Ok(())
    }

    /// Check `element` immediately, without waiting
    pub fn check<'r, D>(&'r mut self, driver: &'r D, element: &'r Element) -> ElementCheck<'r, D>
    where
        D: ElementResolver + ?Sized,
    {
        ElementCheck::new(self, driver, element, 0.0)
    }

    /// Check `element`, waiting up to its own default wait or the session's
    pub fn wait_for<'r, D>(
        &'r mut self,
        driver: &'r D,
        element: &'r Element,
    ) -> ElementCheck<'r, D>
    where
        D: ElementResolver + ?Sized,
    {
        let seconds = self.default_wait.resolve(element.default_wait());
        ElementCheck::new(self, driver, element, seconds)
    }

    /// Check the page immediately, without waiting
    pub fn page<'r, D>(&'r mut self, driver: &'r D) -> PageCheck<'r, D>
    where
        D: PageResolver + ?Sized,
    {
        PageCheck::new(self, driver, 0.0)
    }

    /// Check the page, waiting up to the session default wait
    pub fn wait_for_page<'r, D>(&'r mut self, driver: &'r D) -> PageCheck<'r, D>
    where
        D: PageResolver + ?Sized,
    {
        let seconds = self.default_wait.seconds();
        PageCheck::new(self, driver, seconds)
    }

    /// Check an HTTP response
    pub fn response<'r>(&'r mut self, response: &'r Response) -> ResponseCheck<'r> {
        ResponseCheck::new(self, response)
    }

    /// Failures recorded so far
    #[must_use]
    pub const fn error_count(&self) -> u32 {
        self.recorder.error_count()
    }

    /// Report recorded so far
    #[must_use]
    pub const fn report(&self) -> &Report {
        self.recorder.report()
    }

    /// Merge the report of a sub-flow into this run
    pub fn absorb(&mut self, report: Report) {
        self.recorder.absorb(report);
    }

    /// Compare the error count against `expected_errors`
    #[must_use]
    pub const fn verdict(&self, expected_errors: u32) -> Verdict {
        self.recorder.errors().verdict(expected_errors)
    }

    /// End-of-test verdict
    ///
    /// # Errors
    ///
    /// Returns `ErrorCountMismatch` when the number of FAIL results differs
    /// from `expected_errors`
    pub fn finish(&self, expected_errors: u32) -> AssayResult<()> {
        let verdict = self.verdict(expected_errors);
        info!(
            test = %self.name,
            expected = verdict.expected,
            actual = verdict.actual,
            "test run finished"
        );
        verdict.into_result(&self.name)
    }

    /// Write the report to the configured directory and formats
    ///
    /// # Errors
    ///
    /// Returns error if a report file cannot be written
    pub fn write_reports(&self) -> AssayResult<Vec<PathBuf>> {
        self.report()
            .write_to(&self.config.output_dir, &self.config.formats)
    }

    /// Take the report
    #[must_use]
    pub fn into_report(self) -> Report {
        self.recorder.into_report()
    }

    pub(crate) fn budget(&self, seconds: f64) -> AssayResult<WaitBudget> {
        Ok(WaitBudget::new(seconds)?.with_poll_interval(self.config.poll_interval()))
    }

    pub(crate) const fn poller(&self) -> &Poller {
        &self.poller
    }

    pub(crate) fn expect(&self, check: String, budget: &WaitBudget) -> Expectation {
        self.recorder.expect(check, budget.seconds())
    }

    /// Record without a screenshot
    pub(crate) fn record(
        &mut self,
        expectation: Expectation,
        actual: &str,
        passed: bool,
        elapsed_seconds: f64,
    ) -> &CheckResult {
        self.recorder
            .record_actual(expectation, actual, Status::from_bool(passed), elapsed_seconds)
    }

    /// Record, capturing a screenshot when the policy asks for one
    pub(crate) fn record_captured<C>(
        &mut self,
        capture: &C,
        expectation: Expectation,
        actual: &str,
        passed: bool,
        elapsed_seconds: f64,
    ) -> &CheckResult
    where
        C: Capture + ?Sized,
    {
        let screenshot = if self.config.screenshots.wants(!passed) {
            match capture.screenshot() {
                Ok(png) => png,
                Err(err) => {
                    warn!(error = %err, "screenshot capture failed");
                    None
                }
            }
        } else {
            None
        };
        self.recorder.record_with_screenshot(
            expectation,
            actual,
            Status::from_bool(passed),
            elapsed_seconds,
            screenshot,
        )
    }
}
