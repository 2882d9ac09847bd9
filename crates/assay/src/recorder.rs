//! Result Recorder
//!
//! A check first states what it expects ([`Recorder::expect`]) and later
//! hands that [`Expectation`] back together with what it found
//! ([`Recorder::record_actual`]). The expectation is consumed, so every
//! check produces exactly one [`CheckResult`].
//!
//! The recorder never decides pass or fail. It appends the entry to the
//! report and bumps the error counter for each FAIL.

use crate::aggregator::ErrorCounter;
use crate::markup;
use crate::reporter::Report;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Classification of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Expected condition held
    Pass,
    /// Expected condition did not hold
    Fail,
}

impl Status {
    /// PASS when `passed`, FAIL otherwise
    #[must_use]
    pub const fn from_bool(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    /// Check if passed
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Check if failed
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// What a check is about to look for
#[derive(Debug, Clone, PartialEq)]
#[must_use = "an expectation must be completed with Recorder::record_actual"]
pub struct Expectation {
    check: String,
    budget_seconds: f64,
}

impl Expectation {
    /// Create an expectation; `check` reads as "to find ..." or "to see ..."
    pub fn new(check: impl Into<String>, budget_seconds: f64) -> Self {
        Self {
            check: check.into(),
            budget_seconds: budget_seconds.max(0.0),
        }
    }

    /// Action narration, present only when the check waits
    #[must_use]
    pub fn action(&self) -> Option<String> {
        (self.budget_seconds > 0.0).then(|| {
            format!(
                "Waiting up to {} seconds {}",
                format_seconds(self.budget_seconds),
                self.check
            )
        })
    }

    /// Expected description
    #[must_use]
    pub fn expected(&self) -> String {
        format!("Expected {}", self.check)
    }

    /// Wait budget of the check
    #[must_use]
    pub const fn budget_seconds(&self) -> f64 {
        self.budget_seconds
    }
}

/// One terminal report entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Unique id
    pub id: Uuid,
    /// Position in the report, starting at 1
    pub sequence: usize,
    /// Wait narration, if the check waited
    pub action: Option<String>,
    /// Expected description (may contain markup)
    pub expected: String,
    /// Actual description (may contain markup)
    pub actual: String,
    /// Classification
    pub status: Status,
    /// Time spent waiting
    pub elapsed_seconds: f64,
    /// Budget the check was given
    pub budget_seconds: f64,
    /// When the result was recorded
    pub timestamp: DateTime<Utc>,
    /// Base64 PNG captured for this check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

/// Narrate `actual`, prefixed with the wait when one happened
#[must_use]
pub fn narrate(actual: &str, elapsed_seconds: f64) -> String {
    if elapsed_seconds > 0.0 {
        format!(
            "After waiting for {} seconds, {}",
            format_seconds(elapsed_seconds),
            markup::decapitalize(actual)
        )
    } else {
        actual.to_string()
    }
}

/// Seconds with at most three decimals and no trailing zeros
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    let text = format!("{seconds:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Sink for check results plus the run's error counter
#[derive(Debug, Clone)]
pub struct Recorder {
    report: Report,
    errors: ErrorCounter,
}

impl Recorder {
    /// Create a recorder for `test_name`
    #[must_use]
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: Report::new(test_name),
            errors: ErrorCounter::new(),
        }
    }

    /// State what a check is about to look for
    pub fn expect(&self, check: impl Into<String>, budget_seconds: f64) -> Expectation {
        Expectation::new(check, budget_seconds)
    }

    /// Complete `expectation` with the outcome
    pub fn record_actual(
        &mut self,
        expectation: Expectation,
        actual: &str,
        status: Status,
        elapsed_seconds: f64,
    ) -> &CheckResult {
        self.record_with_screenshot(expectation, actual, status, elapsed_seconds, None)
    }

    /// Complete `expectation` with the outcome and an optional PNG
    pub fn record_with_screenshot(
        &mut self,
        expectation: Expectation,
        actual: &str,
        status: Status,
        elapsed_seconds: f64,
        screenshot: Option<Vec<u8>>,
    ) -> &CheckResult {
        let elapsed_seconds = elapsed_seconds.clamp(0.0, expectation.budget_seconds.max(0.0));
        let result = CheckResult {
            id: Uuid::new_v4(),
            sequence: self.report.total_count() + 1,
            action: expectation.action(),
            expected: expectation.expected(),
            actual: narrate(actual, elapsed_seconds),
            status,
            elapsed_seconds,
            budget_seconds: expectation.budget_seconds,
            timestamp: Utc::now(),
            screenshot: screenshot
                .map(|png| base64::engine::general_purpose::STANDARD.encode(png)),
        };

        match status {
            Status::Pass => {
                info!(sequence = result.sequence, elapsed = elapsed_seconds, "check passed");
            }
            Status::Fail => {
                self.errors.add_error();
                warn!(
                    sequence = result.sequence,
                    elapsed = elapsed_seconds,
                    errors = self.errors.error_count(),
                    expected = %markup::strip_tags(&result.expected),
                    actual = %markup::strip_tags(&result.actual),
                    "check failed"
                );
            }
        }

        self.report.push(result)
    }

    /// Merge a sub-report, carrying over its failures as a batch
    pub fn absorb(&mut self, other: Report) {
        let failures = u32::try_from(other.failed_count()).unwrap_or(u32::MAX);
        self.report.extend(other);
        self.errors.add_errors(failures);
    }

    /// Failures recorded so far
    #[must_use]
    pub const fn error_count(&self) -> u32 {
        self.errors.error_count()
    }

    /// Error counter
    #[must_use]
    pub const fn errors(&self) -> &ErrorCounter {
        &self.errors
    }

    /// Report recorded so far
    #[must_use]
    pub const fn report(&self) -> &Report {
        &self.report
    }

    /// Take the report
    #[must_use]
    pub fn into_report(self) -> Report {
        self.report
    }
}
