//! Error Aggregator
//!
//! One counter per test run. It only ever goes up; a fresh run starts a
//! fresh counter. At the end of the test the count is compared against
//! the number of failures the test declared it expects, which lets
//! negative tests assert that a check *did* fail.

use crate::result::{AssayError, AssayResult};
use serde::{Deserialize, Serialize};

/// Per-test failure counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCounter {
    count: u32,
}

impl ErrorCounter {
    /// Create a counter at zero
    #[must_use]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Count one failure
    pub fn add_error(&mut self) {
        self.add_errors(1);
    }

    /// Count a pre-tallied batch of failures
    pub fn add_errors(&mut self, n: u32) {
        self.count = self.count.saturating_add(n);
    }

    /// Failures counted so far
    #[must_use]
    pub const fn error_count(&self) -> u32 {
        self.count
    }

    /// Compare against the declared number of failures
    #[must_use]
    pub const fn verdict(&self, expected: u32) -> Verdict {
        Verdict {
            expected,
            actual: self.count,
        }
    }
}

/// Outcome of comparing the counted failures to the declared ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Declared failures
    pub expected: u32,
    /// Counted failures
    pub actual: u32,
}

impl Verdict {
    /// Whether the counts agree
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        self.expected == self.actual
    }

    /// Turn a disagreement into an error for `test`
    ///
    /// # Errors
    ///
    /// Returns `ErrorCountMismatch` when the counts differ
    pub fn into_result(self, test: &str) -> AssayResult<()> {
        if self.is_pass() {
            Ok(())
        } else {
            Err(AssayError::ErrorCountMismatch {
                test: test.to_string(),
                expected: self.expected,
                actual: self.actual,
            })
        }
    }
}
