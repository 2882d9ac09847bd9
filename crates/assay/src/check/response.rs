//! Response checks
//!
//! A response is already complete when it is checked, so these never wait
//! and always record an elapsed time of zero.

use super::compare::{self, Pattern};
use super::{Probe, TestRun};
use crate::http::Response;
use crate::markup::{bold, italic, json_block};
use crate::result::{AssayError, AssayResult};
use crate::target::{JsonPath, ResponseFacet};
use crate::wait::WaitBudget;
use serde_json::{Map, Value};

/// Pending checks against one response
#[derive(Debug)]
pub struct ResponseCheck<'r> {
    run: &'r mut TestRun,
    response: &'r Response,
}

impl<'r> ResponseCheck<'r> {
    pub(crate) fn new(run: &'r mut TestRun, response: &'r Response) -> Self {
        Self { run, response }
    }

    /// Equality checks
    pub fn equals(self) -> ResponseEquals<'r> {
        ResponseEquals(self)
    }

    /// Containment checks
    pub fn contains(self) -> ResponseContains<'r> {
        ResponseContains(self)
    }

    /// Pattern checks
    pub fn matches(self) -> ResponseMatches<'r> {
        ResponseMatches(self)
    }

    fn record<T>(self, check: String, probe: Probe<T>) -> T {
        let expectation = self.run.expect(check, &WaitBudget::immediate());
        self.run
            .record(expectation, &probe.actual, probe.passed, 0.0);
        probe.value
    }

    fn nested_value(&self, path: &JsonPath) -> Option<&'r Value> {
        self.response.json().and_then(|body| path.resolve(body))
    }
}

fn found(response: &Response) -> String {
    if let Some(body) = response.json() {
        format!("Found {}", json_block(body))
    } else if let Some(message) = response.message() {
        format!("Found {}", italic(message))
    } else {
        "Found an empty response".to_string()
    }
}

fn found_value(path: &JsonPath, value: Option<&Value>) -> String {
    match value {
        Some(value) => format!("Found {}", json_block(value)),
        None => format!("Found no value at {}", italic(&path.to_string())),
    }
}

fn found_message(message: Option<&str>) -> String {
    match message {
        Some(message) => format!("Found a response message of {}", bold(message)),
        None => "Found no response message".to_string(),
    }
}

fn size_suffix(size: Option<usize>) -> String {
    match size {
        Some(size) => format!(" which has a size of {}", italic(&size.to_string())),
        None => " which isn't an array".to_string(),
    }
}

fn require_object(expected: &Value) -> AssayResult<()> {
    if expected.is_object() {
        Ok(())
    } else {
        Err(AssayError::invalid_argument("expected", "must be a JSON object"))
    }
}

// =============================================================================
// EQUALS
// =============================================================================

/// Equality checks against a response
#[derive(Debug)]
pub struct ResponseEquals<'r>(ResponseCheck<'r>);

impl ResponseEquals<'_> {
    /// Status code equals `expected`
    pub fn code(self, expected: u16) -> AssayResult<u16> {
        let actual = self.0.response.code();
        let check = format!(
            "to find {} of {}",
            ResponseFacet::Code.describe(),
            bold(&expected.to_string())
        );
        let probe = Probe::new(
            actual,
            actual == expected,
            format!("Found a response code of {}", bold(&actual.to_string())),
        );
        Ok(self.0.record(check, probe))
    }

    /// Body is a JSON object equal to `expected`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `expected` is not an object
    pub fn object(self, expected: &Value) -> AssayResult<Option<Map<String, Value>>> {
        require_object(expected)?;
        let object = self.0.response.object_data().cloned();
        let passed = object
            .as_ref()
            .is_some_and(|o| compare::structurally_equal(&Value::Object(o.clone()), expected));
        let check = format!(
            "to find {} of {}",
            ResponseFacet::Object.describe(),
            json_block(expected)
        );
        let probe = Probe::new(object, passed, found(self.0.response));
        Ok(self.0.record(check, probe))
    }

    /// Body is a JSON array equal to `expected`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `expected` is not an array
    pub fn array(self, expected: &Value) -> AssayResult<Option<Vec<Value>>> {
        if !expected.is_array() {
            return Err(AssayError::invalid_argument("expected", "must be a JSON array"));
        }
        let array = self.0.response.array_data().cloned();
        let passed = array
            .as_ref()
            .is_some_and(|a| compare::structurally_equal(&Value::Array(a.clone()), expected));
        let check = format!(
            "to find {} of {}",
            ResponseFacet::Array.describe(),
            json_block(expected)
        );
        let probe = Probe::new(array, passed, found(self.0.response));
        Ok(self.0.record(check, probe))
    }

    /// Value at `path` equals `expected`
    pub fn nested(self, path: &JsonPath, expected: &Value) -> AssayResult<Option<Value>> {
        let value = self.0.nested_value(path);
        let passed = value.is_some_and(|v| compare::structurally_equal(v, expected));
        let check = format!(
            "to find {} with value of {}",
            ResponseFacet::Nested(path.clone()).describe(),
            json_block(expected)
        );
        let probe = Probe::new(value.cloned(), passed, found_value(path, value));
        Ok(self.0.record(check, probe))
    }

    /// Plain-text body equals `expected`
    pub fn message(self, expected: &str) -> AssayResult<Option<String>> {
        let message = self.0.response.message();
        let passed = message == Some(expected);
        let check = format!("to find {} of {}", ResponseFacet::Message.describe(), bold(expected));
        let probe = Probe::new(message.map(str::to_string), passed, found_message(message));
        Ok(self.0.record(check, probe))
    }

    /// Body is an array of `expected` items; `None` when it is not an array
    pub fn array_size(self, expected: usize) -> AssayResult<Option<usize>> {
        let size = self.0.response.array_data().map(Vec::len);
        let check = format!(
            "to find {} with a size of {}",
            ResponseFacet::Array.describe(),
            italic(&expected.to_string())
        );
        let actual = format!("{}{}", found(self.0.response), size_suffix(size));
        Ok(self.0.record(check, Probe::new(size, size == Some(expected), actual)))
    }

    /// Value at `path` is an array of `expected` items
    ///
    /// Returns `None` when the path does not resolve to an array.
    pub fn nested_array_size(self, path: &JsonPath, expected: usize) -> AssayResult<Option<usize>> {
        let value = self.0.nested_value(path);
        let size = value.and_then(Value::as_array).map(Vec::len);
        let check = format!(
            "to find {} to be an array with a size of {}",
            ResponseFacet::Nested(path.clone()).describe(),
            italic(&expected.to_string())
        );
        let actual = format!("{}{}", found_value(path, value), size_suffix(size));
        Ok(self.0.record(check, Probe::new(size, size == Some(expected), actual)))
    }
}

// =============================================================================
// CONTAINS
// =============================================================================

/// Containment checks against a response
#[derive(Debug)]
pub struct ResponseContains<'r>(ResponseCheck<'r>);

impl ResponseContains<'_> {
    /// Body is an object holding every key of `expected` with equal values
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `expected` is not an object
    pub fn object(self, expected: &Value) -> AssayResult<Option<Map<String, Value>>> {
        require_object(expected)?;
        let object = self.0.response.object_data().cloned();
        let passed = object
            .as_ref()
            .is_some_and(|o| compare::json_contains(&Value::Object(o.clone()), expected));
        let check = format!("to find a response containing {}", json_block(expected));
        let probe = Probe::new(object, passed, found(self.0.response));
        Ok(self.0.record(check, probe))
    }

    /// Value at `path` contains `expected`
    ///
    /// Objects contain sub-objects, arrays contain members and strings
    /// contain substrings.
    pub fn nested(self, path: &JsonPath, expected: &Value) -> AssayResult<Option<Value>> {
        let value = self.0.nested_value(path);
        let passed = value.is_some_and(|v| compare::json_contains(v, expected));
        let check = format!(
            "to find {} containing {}",
            ResponseFacet::Nested(path.clone()).describe(),
            json_block(expected)
        );
        let probe = Probe::new(value.cloned(), passed, found_value(path, value));
        Ok(self.0.record(check, probe))
    }

    /// Plain-text body contains `expected`
    pub fn message(self, expected: &str) -> AssayResult<Option<String>> {
        let message = self.0.response.message();
        let passed = message.is_some_and(|m| compare::contains(m, expected));
        let check = format!(
            "to find {} containing {}",
            ResponseFacet::Message.describe(),
            bold(expected)
        );
        let probe = Probe::new(message.map(str::to_string), passed, found_message(message));
        Ok(self.0.record(check, probe))
    }
}

// =============================================================================
// MATCHES
// =============================================================================

/// Pattern checks against a response
#[derive(Debug)]
pub struct ResponseMatches<'r>(ResponseCheck<'r>);

impl ResponseMatches<'_> {
    /// Plain-text body matches `pattern`
    pub fn message(self, pattern: &str) -> AssayResult<Option<String>> {
        let pattern = Pattern::new(pattern)?;
        let message = self.0.response.message();
        let passed = message.is_some_and(|m| pattern.matches(m));
        let check = format!(
            "to find {} matching {}",
            ResponseFacet::Message.describe(),
            bold(pattern.as_str())
        );
        let probe = Probe::new(message.map(str::to_string), passed, found_message(message));
        Ok(self.0.record(check, probe))
    }

    /// Text of the value at `path` matches `pattern`
    ///
    /// Strings match on their content, other values on their JSON text.
    pub fn nested(self, path: &JsonPath, pattern: &str) -> AssayResult<Option<Value>> {
        let pattern = Pattern::new(pattern)?;
        let value = self.0.nested_value(path);
        let passed = value.is_some_and(|v| pattern.matches(&compare::json_text(v)));
        let check = format!(
            "to find {} matching {}",
            ResponseFacet::Nested(path.clone()).describe(),
            bold(pattern.as_str())
        );
        let probe = Probe::new(value.cloned(), passed, found_value(path, value));
        Ok(self.0.record(check, probe))
    }
}
