//! Error types for the request DSL.
//!
//! Three kinds of failures reach callers: configuration problems caught
//! before any network activity, transport-level execution failures, and
//! assertion mismatches. Execution and assertion failures carry structured
//! payloads rather than bare message strings so that callers and reporters
//! can inspect what actually happened.

use crate::spec::RequestSpec;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Read-only snapshot of an executed response.
///
/// Attached to assertion failures so the full response that failed a check
/// stays available for diagnosis, and handed to reporter hooks for display.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    pub status: u16,
    /// Response headers with lowercased names.
    pub headers: HashMap<String, String>,
    pub body: String,
    pub duration: Duration,
}

/// A transport-level failure, carrying the specification that triggered it.
#[derive(Debug, Clone)]
pub struct ExecutionFailure {
    pub spec: RequestSpec,
    pub message: String,
}

/// The response facet an assertion checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Status,
    Headers,
    Body,
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => write!(f, "status"),
            Self::Headers => write!(f, "headers"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// An expected-vs-actual mismatch raised by the validator.
///
/// `response` is filled in by the result context before the failure
/// surfaces; pure validator functions leave it empty.
#[derive(Debug, Clone)]
pub struct AssertionFailure {
    pub facet: Facet,
    pub expected: String,
    pub actual: String,
    pub response: Option<ResponseSnapshot>,
}

impl AssertionFailure {
    pub fn new(facet: Facet, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            facet,
            expected: expected.into(),
            actual: actual.into(),
            response: None,
        }
    }
}

/// Top-level error type for the DSL.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Invalid input caught at construction time, before any network use.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A token provider could not produce a credential.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Transport-level failure while executing a request.
    #[error("Execution error for {} {}: {}", .0.spec.method(), .0.spec.endpoint(), .0.message)]
    Execution(Box<ExecutionFailure>),

    /// An expected-vs-actual mismatch on status, headers, or body.
    #[error("Assertion failed on {}: expected {}, actual {}", .0.facet, .0.expected, .0.actual)]
    Assertion(Box<AssertionFailure>),
}

impl ApiError {
    /// Wrap a transport fault together with the specification that caused it.
    pub fn execution(spec: RequestSpec, message: impl Into<String>) -> Self {
        Self::Execution(Box::new(ExecutionFailure {
            spec,
            message: message.into(),
        }))
    }

    pub fn assertion(failure: AssertionFailure) -> Self {
        Self::Assertion(Box::new(failure))
    }
}
