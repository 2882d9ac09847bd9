//! Result and error types for Assay.
//!
//! Only malformed tests and infrastructure faults are errors. An application
//! that behaves unexpectedly produces a FAIL entry in the report, never an
//! `AssayError`.

use thiserror::Error;

/// Result type for Assay operations
pub type AssayResult<T> = Result<T, AssayError>;

/// Errors that can occur in Assay
#[derive(Debug, Error)]
pub enum AssayError {
    /// Locator could not be used to build a target
    #[error("Invalid locator: {message}")]
    InvalidLocator {
        /// Error message
        message: String,
    },

    /// Pattern supplied to a `matches` check does not compile
    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// Pattern as written by the test author
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// JSON key-path is empty or otherwise unusable
    #[error("Invalid JSON path: {message}")]
    InvalidJsonPath {
        /// Error message
        message: String,
    },

    /// A required argument was missing or out of range
    #[error("Invalid argument `{name}`: {message}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// Error message
        message: String,
    },

    /// Driver fault outside of a polling loop
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// HTTP transport failure
    #[error("HTTP request to {url} failed: {message}")]
    Http {
        /// Requested URL
        url: String,
        /// Error message
        message: String,
    },

    /// Configuration value rejected
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Final verdict did not match the declared error count
    #[error("Test `{test}` finished with {actual} errors, expected {expected}")]
    ErrorCountMismatch {
        /// Test name
        test: String,
        /// Declared error count
        expected: u32,
        /// Counted errors
        actual: u32,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl AssayError {
    /// Shorthand for a driver fault
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Shorthand for an invalid argument
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    /// Whether this error points at a bug in the test itself rather than
    /// at the environment it ran in
    #[must_use]
    pub const fn is_authoring_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLocator { .. }
                | Self::InvalidPattern { .. }
                | Self::InvalidJsonPath { .. }
                | Self::InvalidArgument { .. }
                | Self::Config { .. }
        )
    }
}
