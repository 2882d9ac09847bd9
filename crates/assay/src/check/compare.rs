//! Comparison policies
//!
//! Pure functions over actual and expected values. No markup, no driver
//! calls, no recording.

use crate::result::{AssayError, AssayResult};
use regex::Regex;
use serde_json::Value;

/// Whole-value regular expression
///
/// `Pattern::new("ab.")` matches `"abc"` but not `"xabc"`.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern`, anchored at both ends
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` when the expression does not compile
    pub fn new(pattern: &str) -> AssayResult<Self> {
        let regex =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| AssayError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Pattern as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the whole of `actual` matches
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        self.regex.is_match(actual)
    }
}

/// Exact, case-sensitive equality
#[must_use]
pub fn equals(actual: &str, expected: &str) -> bool {
    actual == expected
}

/// Substring containment
#[must_use]
pub fn contains(actual: &str, expected: &str) -> bool {
    actual.contains(expected)
}

/// Whitespace-separated class list contains `class`
#[must_use]
pub fn has_class(class_attribute: &str, class: &str) -> bool {
    class_attribute.split_whitespace().any(|c| c == class)
}

/// `expected` is one of `actual`
#[must_use]
pub fn is_member<S: AsRef<str>>(actual: &[S], expected: &str) -> bool {
    actual.iter().any(|a| a.as_ref() == expected)
}

/// Ordered list equality
#[must_use]
pub fn same_sequence<A: AsRef<str>, E: AsRef<str>>(actual: &[A], expected: &[E]) -> bool {
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected)
            .all(|(a, e)| a.as_ref() == e.as_ref())
}

/// Deep JSON equality
///
/// Arrays compare in order, objects by key set and values. Numbers
/// compare by value, so `5` equals `5.0`.
#[must_use]
pub fn structurally_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(e)) => numbers_equal(a, e),
        (Value::Array(a), Value::Array(e)) => {
            a.len() == e.len() && a.iter().zip(e).all(|(x, y)| structurally_equal(x, y))
        }
        (Value::Object(a), Value::Object(e)) => {
            a.len() == e.len()
                && e.iter()
                    .all(|(k, ev)| a.get(k).is_some_and(|av| structurally_equal(av, ev)))
        }
        _ => actual == expected,
    }
}

fn numbers_equal(a: &serde_json::Number, e: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), e.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), e.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), e.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// JSON containment
///
/// - object: every expected key is present with a structurally equal value
/// - array: expected is one of the members, or every member of an
///   expected array is one of the members
/// - string: substring
/// - anything else: structural equality
#[must_use]
pub fn json_contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => e
            .iter()
            .all(|(k, ev)| a.get(k).is_some_and(|av| structurally_equal(av, ev))),
        (Value::Array(a), Value::Array(e)) => e
            .iter()
            .all(|ev| a.iter().any(|av| structurally_equal(av, ev))),
        (Value::Array(a), _) => a.iter().any(|av| structurally_equal(av, expected)),
        (Value::String(a), Value::String(e)) => a.contains(e.as_str()),
        _ => structurally_equal(actual, expected),
    }
}

/// Compact text rendering of a JSON value for descriptions
#[must_use]
pub fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
