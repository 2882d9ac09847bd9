//! Target descriptors
//!
//! A check always operates on one of:
//!
//! - an [`Element`]: locator plus match index, optionally carrying its own
//!   default wait that shadows the session default
//! - a [`JsonPath`] into a response body
//! - a [`ResponseFacet`] such as the status code or the message
//!
//! Descriptors are immutable and validated on construction. A malformed
//! descriptor is an authoring error and surfaces as [`AssayError`].

use crate::markup;
use crate::result::{AssayError, AssayResult};
use crate::wait::DefaultWait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =============================================================================
// LOCATOR
// =============================================================================

/// Strategy used by the driver to find an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// `id` attribute
    Id(String),
    /// `name` attribute
    Name(String),
    /// CSS class name
    ClassName(String),
    /// CSS selector
    Css(String),
    /// XPath expression
    XPath(String),
    /// Exact link text
    LinkText(String),
    /// Partial link text
    PartialLinkText(String),
    /// Tag name
    TagName(String),
}

impl Locator {
    /// Build a locator from a strategy name and a value
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocator` for an unknown strategy
    pub fn parse(strategy: &str, value: impl Into<String>) -> AssayResult<Self> {
        let value = value.into();
        let normalized = strategy.to_ascii_lowercase().replace(['_', '-', ' '], "");
        let locator = match normalized.as_str() {
            "id" => Self::Id(value),
            "name" => Self::Name(value),
            "class" | "classname" => Self::ClassName(value),
            "css" | "cssselector" => Self::Css(value),
            "xpath" => Self::XPath(value),
            "linktext" => Self::LinkText(value),
            "partiallinktext" => Self::PartialLinkText(value),
            "tag" | "tagname" => Self::TagName(value),
            _ => {
                return Err(AssayError::InvalidLocator {
                    message: format!("unknown locator strategy `{strategy}`"),
                })
            }
        };
        Ok(locator)
    }

    /// Strategy name as shown in reports
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::ClassName(_) => "class name",
            Self::Css(_) => "css selector",
            Self::XPath(_) => "xpath",
            Self::LinkText(_) => "link text",
            Self::PartialLinkText(_) => "partial link text",
            Self::TagName(_) => "tag name",
        }
    }

    /// Raw locator value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Id(v)
            | Self::Name(v)
            | Self::ClassName(v)
            | Self::Css(v)
            | Self::XPath(v)
            | Self::LinkText(v)
            | Self::PartialLinkText(v)
            | Self::TagName(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

/// An element on the page: locator, match index and optional default wait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    locator: Locator,
    /// Zero-based index among all elements matching the locator
    #[serde(default)]
    index: usize,
    /// Human name used in report descriptions
    #[serde(default)]
    name: Option<String>,
    /// Per-element default wait in seconds
    #[serde(default)]
    default_wait: Option<f64>,
}

impl Element {
    /// Create an element from a locator
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocator` when the locator value is blank
    pub fn new(locator: Locator) -> AssayResult<Self> {
        if locator.value().trim().is_empty() {
            return Err(AssayError::InvalidLocator {
                message: format!("{} locator has an empty value", locator.strategy()),
            });
        }
        Ok(Self {
            locator,
            index: 0,
            name: None,
            default_wait: None,
        })
    }

    /// Element by `id`
    pub fn id(value: impl Into<String>) -> AssayResult<Self> {
        Self::new(Locator::Id(value.into()))
    }

    /// Element by `name`
    pub fn name(value: impl Into<String>) -> AssayResult<Self> {
        Self::new(Locator::Name(value.into()))
    }

    /// Element by CSS selector
    pub fn css(value: impl Into<String>) -> AssayResult<Self> {
        Self::new(Locator::Css(value.into()))
    }

    /// Element by XPath
    pub fn xpath(value: impl Into<String>) -> AssayResult<Self> {
        Self::new(Locator::XPath(value.into()))
    }

    /// Select the `index`-th match (zero-based)
    #[must_use]
    pub fn with_match(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Name shown in report descriptions
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the session default wait for this element
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for negative, NaN or infinite values
    pub fn with_default_wait(mut self, seconds: f64) -> AssayResult<Self> {
        self.default_wait = Some(DefaultWait::new(seconds)?.seconds());
        Ok(self)
    }

    /// Locator
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Zero-based match index
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Per-element default wait, if any
    #[must_use]
    pub const fn default_wait(&self) -> Option<f64> {
        self.default_wait
    }

    /// Description used mid-sentence in reports
    #[must_use]
    pub fn describe(&self) -> String {
        let base = match &self.name {
            Some(name) => format!(
                "{} ({} {})",
                markup::bold(name),
                self.locator.strategy(),
                markup::italic(self.locator.value())
            ),
            None => format!(
                "element with {} {}",
                self.locator.strategy(),
                markup::italic(self.locator.value())
            ),
        };
        if self.index > 0 {
            format!("{base} (match {})", self.index + 1)
        } else {
            base
        }
    }

    /// Description used at the start of a sentence
    #[must_use]
    pub fn describe_start(&self) -> String {
        markup::capitalize(&self.describe())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index > 0 {
            write!(f, "{}[{}]", self.locator, self.index)
        } else {
            write!(f, "{}", self.locator)
        }
    }
}

// =============================================================================
// JSON PATH
// =============================================================================

/// One step of a [`JsonPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonKey {
    /// Object field
    Field(String),
    /// Array index (zero-based)
    Index(usize),
}

impl From<&str> for JsonKey {
    fn from(value: &str) -> Self {
        Self::Field(value.to_string())
    }
}

impl From<String> for JsonKey {
    fn from(value: String) -> Self {
        Self::Field(value)
    }
}

impl From<usize> for JsonKey {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

/// Ordered key-path into a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JsonPath {
    keys: Vec<JsonKey>,
}

impl JsonPath {
    /// Build a path from keys
    ///
    /// # Errors
    ///
    /// Returns `InvalidJsonPath` for an empty path or an empty field name
    pub fn new<I, K>(keys: I) -> AssayResult<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<JsonKey>,
    {
        let keys: Vec<JsonKey> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(AssayError::InvalidJsonPath {
                message: "path has no keys".to_string(),
            });
        }
        if keys.iter().any(|k| matches!(k, JsonKey::Field(f) if f.is_empty())) {
            return Err(AssayError::InvalidJsonPath {
                message: "path contains an empty field name".to_string(),
            });
        }
        Ok(Self { keys })
    }

    /// Parse dotted notation such as `data.items[0].name`
    ///
    /// # Errors
    ///
    /// Returns `InvalidJsonPath` for empty segments or malformed indices
    pub fn parse(path: &str) -> AssayResult<Self> {
        let invalid = |message: String| AssayError::InvalidJsonPath { message };
        let mut keys = Vec::new();

        for segment in path.split('.') {
            let (field, mut rest) = match segment.find('[') {
                Some(pos) => segment.split_at(pos),
                None => (segment, ""),
            };
            if field.is_empty() && rest.is_empty() {
                return Err(invalid(format!("empty segment in `{path}`")));
            }
            if !field.is_empty() {
                keys.push(JsonKey::Field(field.to_string()));
            }
            while !rest.is_empty() {
                let close = rest
                    .find(']')
                    .ok_or_else(|| invalid(format!("unclosed `[` in `{path}`")))?;
                let index = rest[1..close]
                    .parse::<usize>()
                    .map_err(|_| invalid(format!("bad index `{}` in `{path}`", &rest[1..close])))?;
                keys.push(JsonKey::Index(index));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(invalid(format!("unexpected `{rest}` in `{path}`")));
                }
            }
        }

        Self::new(keys)
    }

    /// Keys in order
    #[must_use]
    pub fn keys(&self) -> &[JsonKey] {
        &self.keys
    }

    /// Walk `root` along this path
    ///
    /// Returns `None` as soon as a step meets a node of the wrong shape
    /// or a missing key.
    #[must_use]
    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        self.keys.iter().try_fold(root, |node, key| match (key, node) {
            (JsonKey::Field(name), Value::Object(map)) => map.get(name),
            (JsonKey::Index(i), Value::Array(items)) => items.get(*i),
            _ => None,
        })
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            match key {
                JsonKey::Field(name) if i == 0 => write!(f, "{name}")?,
                JsonKey::Field(name) => write!(f, ".{name}")?,
                JsonKey::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

// =============================================================================
// RESPONSE FACET
// =============================================================================

/// Named part of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFacet {
    /// Status code
    Code,
    /// Body parsed as a JSON object
    Object,
    /// Body parsed as a JSON array
    Array,
    /// Body as plain text
    Message,
    /// Value found at a key-path inside the body
    Nested(JsonPath),
}

impl ResponseFacet {
    /// Phrase used in report descriptions
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Code => "a response code".to_string(),
            Self::Object => "a response object".to_string(),
            Self::Array => "a response array".to_string(),
            Self::Message => "a response message".to_string(),
            Self::Nested(path) => format!("a value at {}", markup::italic(&path.to_string())),
        }
    }
}
