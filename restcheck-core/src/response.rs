//! The result context: an immutable view over one executed response.

use crate::error::{ApiError, AssertionFailure, Facet, ResponseSnapshot};
use crate::execution::TransportResponse;
use crate::reporter::Reporter;
use crate::validation;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type HeaderPredicate = Box<dyn Fn(&HashMap<String, String>) -> bool + Send + Sync>;

/// Optional expectations applied by [`ResultContext::should_return`] in
/// fixed order: status, then headers, then typed body. The first failing
/// check raises; later checks are not evaluated.
pub struct Expectations<T = serde_json::Value> {
    status: Option<u16>,
    header_check: Option<(String, HeaderPredicate)>,
    #[allow(clippy::type_complexity)]
    body_check: Option<(String, Box<dyn Fn(&T) -> bool + Send + Sync>)>,
}

impl<T> Expectations<T> {
    pub fn new() -> Self {
        Self {
            status: None,
            header_check: None,
            body_check: None,
        }
    }

    pub fn status(mut self, expected: u16) -> Self {
        self.status = Some(expected);
        self
    }

    /// Expect the response headers to satisfy `predicate`; `description`
    /// names the expectation in failure messages.
    pub fn headers(
        mut self,
        description: impl Into<String>,
        predicate: impl Fn(&HashMap<String, String>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.header_check = Some((description.into(), Box::new(predicate)));
        self
    }

    /// Expect the deserialized body to satisfy `predicate`.
    pub fn body(
        mut self,
        description: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.body_check = Some((description.into(), Box::new(predicate)));
        self
    }
}

impl<T> Default for Expectations<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable wrapper over one executed response.
///
/// Created exactly once per executed request and owned by the caller that
/// triggered execution. Exposes the raw facets plus assertion and
/// deserialization operations.
pub struct ResultContext {
    status: u16,
    headers: HashMap<String, String>,
    raw_body: String,
    duration: Duration,
    parsed: OnceCell<serde_json::Value>,
    reporters: Vec<Arc<dyn Reporter>>,
}

impl fmt::Debug for ResultContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultContext")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("raw_body", &self.raw_body)
            .field("duration", &self.duration)
            .finish()
    }
}

impl ResultContext {
    pub(crate) fn new(response: TransportResponse, reporters: Vec<Arc<dyn Reporter>>) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            raw_body: response.body,
            duration: response.elapsed,
            parsed: OnceCell::new(),
            reporters,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers with lowercased names.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Wall-clock time the exchange took.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn snapshot(&self) -> ResponseSnapshot {
        ResponseSnapshot {
            status: self.status,
            headers: self.headers.clone(),
            body: self.raw_body.clone(),
            duration: self.duration,
        }
    }

    /// Parse the raw body as JSON, lazily on first access, caching the
    /// result for subsequent calls on this context.
    fn parsed_json(&self) -> Result<&serde_json::Value, AssertionFailure> {
        self.parsed.get_or_try_init(|| {
            serde_json::from_str(&self.raw_body).map_err(|e| {
                AssertionFailure::new(
                    Facet::Body,
                    "a well-formed JSON body",
                    format!("malformed body: {e}"),
                )
            })
        })
    }

    /// Deserialize the body into `T`.
    ///
    /// A malformed body is an assertion failure, not an execution failure:
    /// the transport succeeded, interpreting the payload did not.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self.parsed_json().map_err(|f| self.fail(f))?;
        serde_json::from_value(value.clone()).map_err(|e| {
            self.fail(AssertionFailure::new(
                Facet::Body,
                format!("a body deserializable as {}", std::any::type_name::<T>()),
                format!("malformed body: {e}"),
            ))
        })
    }

    /// Assert that the status equals `expected`.
    pub fn expect_status(&self, expected: u16) -> Result<&Self, ApiError> {
        match validation::validate_status(self.status, expected) {
            Ok(()) => {
                self.note_passed(&format!("status == {expected}"));
                Ok(self)
            }
            Err(failure) => Err(self.fail(failure)),
        }
    }

    /// Apply `expectations` in fixed order: status, headers, body.
    /// Fails fast: the first mismatch raises and later checks never run.
    pub fn should_return<T: DeserializeOwned>(
        &self,
        expectations: Expectations<T>,
    ) -> Result<&Self, ApiError> {
        if let Some(expected) = expectations.status {
            validation::validate_status(self.status, expected).map_err(|f| self.fail(f))?;
            self.note_passed(&format!("status == {expected}"));
        }
        if let Some((description, predicate)) = &expectations.header_check {
            validation::validate_headers(&self.headers, description, predicate)
                .map_err(|f| self.fail(f))?;
            self.note_passed(description);
        }
        if let Some((description, predicate)) = &expectations.body_check {
            validation::validate_body::<T, _>(&self.raw_body, description, predicate)
                .map_err(|f| self.fail(f))?;
            self.note_passed(description);
        }
        Ok(self)
    }

    /// Attach the response snapshot to `failure`, notify reporters, and
    /// wrap it as an error.
    fn fail(&self, mut failure: AssertionFailure) -> ApiError {
        failure.response = Some(self.snapshot());
        for reporter in &self.reporters {
            reporter.on_assertion_failed(&failure);
        }
        ApiError::assertion(failure)
    }

    fn note_passed(&self, description: &str) {
        for reporter in &self.reporters {
            reporter.on_assertion_passed(description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct User {
        id: u64,
        name: String,
    }

    fn context(status: u16, body: &str) -> ResultContext {
        ResultContext::new(
            TransportResponse {
                status,
                headers: HashMap::from([(
                    "content-type".to_string(),
                    "application/json".to_string(),
                )]),
                body: body.to_string(),
                elapsed: Duration::from_millis(7),
            },
            Vec::new(),
        )
    }

    #[test]
    fn body_as_deserializes_the_payload() {
        let ctx = context(200, r#"{"id": 1, "name": "Ann"}"#);
        let user: User = ctx.body_as().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Ann");
        // A second access reuses the cached parse.
        let again: User = ctx.body_as().unwrap();
        assert_eq!(again.id, 1);
    }

    #[test]
    fn malformed_body_is_an_assertion_error_with_the_response_attached() {
        let ctx = context(200, "not json");
        match ctx.body_as::<User>() {
            Err(ApiError::Assertion(failure)) => {
                assert_eq!(failure.facet, Facet::Body);
                let snapshot = failure.response.as_ref().expect("response attached");
                assert_eq!(snapshot.status, 200);
                assert_eq!(snapshot.body, "not json");
            }
            other => panic!("expected Assertion error, got: {other:?}"),
        }
    }

    #[test]
    fn status_is_checked_before_the_body() {
        let ctx = context(404, "would also fail to parse");
        let expectations = Expectations::<User>::new()
            .status(200)
            .body("id == 1", |u| u.id == 1);
        match ctx.should_return(expectations) {
            Err(ApiError::Assertion(failure)) => {
                assert_eq!(failure.facet, Facet::Status, "status must fail first");
                assert_eq!(failure.expected, "200");
                assert_eq!(failure.actual, "404");
            }
            other => panic!("expected Assertion error, got: {other:?}"),
        }
    }

    #[test]
    fn headers_are_checked_before_the_body() {
        let ctx = context(200, "not json");
        let expectations = Expectations::<User>::new()
            .headers("content-type is text/plain", |h| {
                h.get("content-type").map(String::as_str) == Some("text/plain")
            })
            .body("id == 1", |u| u.id == 1);
        match ctx.should_return(expectations) {
            Err(ApiError::Assertion(failure)) => {
                assert_eq!(failure.facet, Facet::Headers);
            }
            other => panic!("expected Assertion error, got: {other:?}"),
        }
    }

    #[test]
    fn all_expectations_passing_returns_the_context() {
        let ctx = context(200, r#"{"id": 1, "name": "Ann"}"#);
        let expectations = Expectations::<User>::new()
            .status(200)
            .headers("content-type is json", |h| {
                h.get("content-type").map(String::as_str) == Some("application/json")
            })
            .body("Ann with id 1", |u| u.id == 1 && u.name == "Ann");
        ctx.should_return(expectations).unwrap();
    }

    #[test]
    fn expect_status_reports_expected_and_actual() {
        let ctx = context(201, "");
        ctx.expect_status(201).unwrap();
        match ctx.expect_status(200) {
            Err(ApiError::Assertion(failure)) => {
                assert_eq!(failure.expected, "200");
                assert_eq!(failure.actual, "201");
            }
            other => panic!("expected Assertion error, got: {other:?}"),
        }
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let ctx = context(200, "");
        assert_eq!(ctx.header("Content-Type"), Some("application/json"));
    }
}
