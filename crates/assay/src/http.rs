//! HTTP responses and a blocking client
//!
//! [`Response`] is the value response checks operate on. It can be built by
//! hand, parsed from a raw status and body, or fetched with [`HttpClient`]
//! when the `http` feature is enabled.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    code: u16,
    /// JSON object or array body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
    /// Body that was not JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    /// Lower-cased header names
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

impl Response {
    /// Response with `code` and no body
    #[must_use]
    pub fn new(code: u16) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// Response from a status and raw body text
    ///
    /// JSON objects and arrays become the body; anything else non-empty is
    /// kept as the message.
    #[must_use]
    pub fn from_raw(code: u16, text: &str) -> Self {
        let response = Self::new(code);
        if text.trim().is_empty() {
            return response;
        }
        match serde_json::from_str::<Value>(text) {
            Ok(json @ (Value::Object(_) | Value::Array(_))) => response.with_json(json),
            _ => response.with_message(text),
        }
    }

    /// Set the JSON body
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.message = None;
        self
    }

    /// Set a plain-text body
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self.body = None;
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Status code
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// JSON body, object or array
    #[must_use]
    pub const fn json(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Body as a JSON object
    #[must_use]
    pub fn object_data(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref().and_then(Value::as_object)
    }

    /// Body as a JSON array
    #[must_use]
    pub fn array_data(&self) -> Option<&Vec<Value>> {
        self.body.as_ref().and_then(Value::as_array)
    }

    /// Plain-text body
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Header value, case-insensitive
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// All headers
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Query parameters, headers and JSON payload for one request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Request {
    params: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    json: Option<Value>,
}

impl Request {
    /// Empty request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set a header for this request only
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the JSON payload
    #[must_use]
    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Query parameters in insertion order
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// JSON payload
    #[must_use]
    pub const fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }
}

/// Join `path` onto `base`; absolute URLs are returned unchanged
#[must_use]
pub fn build_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(feature = "http")]
pub use client::HttpClient;

#[cfg(feature = "http")]
mod client {
    use super::{build_url, Request, Response};
    use crate::result::{AssayError, AssayResult};
    use reqwest::blocking::Client;
    use reqwest::Method;
    use std::collections::BTreeMap;
    use std::time::{Duration, Instant};
    use tracing::debug;

    /// Default request timeout (30s)
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Blocking client rooted at a base URL
    #[derive(Debug, Clone)]
    pub struct HttpClient {
        base_url: String,
        client: Client,
        headers: BTreeMap<String, String>,
    }

    impl HttpClient {
        /// Client for `base_url` with the default timeout
        ///
        /// # Errors
        ///
        /// Returns `Http` if the TLS backend cannot be initialised
        pub fn new(base_url: impl Into<String>) -> AssayResult<Self> {
            Self::with_timeout(base_url, DEFAULT_TIMEOUT)
        }

        /// Client for `base_url` with a request timeout
        ///
        /// # Errors
        ///
        /// Returns `Http` if the TLS backend cannot be initialised
        pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> AssayResult<Self> {
            let base_url = base_url.into().trim_end_matches('/').to_string();
            let client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| AssayError::Http {
                    url: base_url.clone(),
                    message: e.to_string(),
                })?;
            Ok(Self {
                base_url,
                client,
                headers: BTreeMap::new(),
            })
        }

        /// Send `name: value` with every request
        #[must_use]
        pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
            self.headers.insert(name.into(), value.into());
            self
        }

        /// Base URL
        #[must_use]
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        /// `GET` request
        ///
        /// # Errors
        ///
        /// Returns `Http` when the request cannot be sent or read
        pub fn get(&self, path: &str, request: &Request) -> AssayResult<Response> {
            self.send(Method::GET, path, request)
        }

        /// `POST` request
        ///
        /// # Errors
        ///
        /// Returns `Http` when the request cannot be sent or read
        pub fn post(&self, path: &str, request: &Request) -> AssayResult<Response> {
            self.send(Method::POST, path, request)
        }

        /// `PUT` request
        ///
        /// # Errors
        ///
        /// Returns `Http` when the request cannot be sent or read
        pub fn put(&self, path: &str, request: &Request) -> AssayResult<Response> {
            self.send(Method::PUT, path, request)
        }

        /// `PATCH` request
        ///
        /// # Errors
        ///
        /// Returns `Http` when the request cannot be sent or read
        pub fn patch(&self, path: &str, request: &Request) -> AssayResult<Response> {
            self.send(Method::PATCH, path, request)
        }

        /// `DELETE` request
        ///
        /// # Errors
        ///
        /// Returns `Http` when the request cannot be sent or read
        pub fn delete(&self, path: &str, request: &Request) -> AssayResult<Response> {
            self.send(Method::DELETE, path, request)
        }

        fn send(&self, method: Method, path: &str, request: &Request) -> AssayResult<Response> {
            let url = build_url(&self.base_url, path);
            let failed = |e: reqwest::Error| AssayError::Http {
                url: url.clone(),
                message: e.to_string(),
            };

            let mut builder = self
                .client
                .request(method.clone(), &url)
                .query(request.params());
            for (name, value) in self.headers.iter().chain(request.headers.iter()) {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(json) = request.json() {
                builder = builder.json(json);
            }

            let started = Instant::now();
            let reply = builder.send().map_err(&failed)?;
            let code = reply.status().as_u16();
            let headers: Vec<(String, String)> = reply
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or("<binary>").to_string(),
                    )
                })
                .collect();
            let text = reply.text().map_err(&failed)?;
            debug!(
                %method,
                url = %url,
                code,
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "http request completed"
            );

            Ok(headers
                .into_iter()
                .fold(Response::from_raw(code, &text), |response, (name, value)| {
                    response.with_header(&name, value)
                }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_object() {
        let response = Response::from_raw(200, r#"{"id": 7, "name": "widget"}"#);
        assert_eq!(response.code(), 200);
        assert_eq!(response.object_data().map(Map::len), Some(2));
        assert!(response.array_data().is_none());
        assert!(response.message().is_none());
    }

    #[test]
    fn test_from_raw_array() {
        let response = Response::from_raw(200, "[1, 2, 3]");
        assert_eq!(response.array_data().map(Vec::len), Some(3));
        assert!(response.object_data().is_none());
    }

    #[test]
    fn test_from_raw_text_and_scalars() {
        let response = Response::from_raw(404, "Not Found");
        assert_eq!(response.message(), Some("Not Found"));
        assert!(response.json().is_none());

        let scalar = Response::from_raw(200, "42");
        assert_eq!(scalar.message(), Some("42"));

        let empty = Response::from_raw(204, "  ");
        assert!(empty.message().is_none());
        assert!(empty.json().is_none());
    }

    #[test]
    fn test_body_kinds_are_exclusive() {
        let response = Response::new(200)
            .with_message("text")
            .with_json(json!({"a": 1}));
        assert!(response.message().is_none());
        assert!(response.object_data().is_some());
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let response = Response::new(200).with_header("Content-Type", "application/json");
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(response.headers().len(), 1);
    }

    #[test]
    fn test_request_builder() {
        let request = Request::new()
            .with_param("page", "2")
            .with_param("page", "3")
            .with_json(json!({"q": "x"}));
        assert_eq!(request.params().len(), 2);
        assert_eq!(request.json(), Some(&json!({"q": "x"})));
    }

    #[test]
    fn test_build_url() {
        assert_eq!(build_url("https://api.test/", "/v1/items"), "https://api.test/v1/items");
        assert_eq!(build_url("https://api.test", "v1"), "https://api.test/v1");
        assert_eq!(build_url("https://api.test/", ""), "https://api.test");
        assert_eq!(
            build_url("https://api.test", "http://other.test/x"),
            "http://other.test/x"
        );
    }
}
