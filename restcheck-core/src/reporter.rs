//! Reporter hooks for observing requests, responses, and assertions.
//!
//! Reporters get read-only access to what happened and can never alter
//! control flow or the values they observe. All hooks default to no-ops so
//! implementations override only what they display.

use crate::error::{AssertionFailure, ResponseSnapshot};
use crate::spec::RequestSpec;
use std::collections::HashMap;

/// Header-name substrings whose values are redacted before display.
const SENSITIVE_MARKERS: [&str; 5] = ["authorization", "token", "password", "secret", "key"];

/// Context passed to reporter hooks describing one dispatched request.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub request_id: String,
    pub url: String,
}

pub(crate) fn generate_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Observer of request/response/assertion events.
pub trait Reporter: Send + Sync {
    /// Called just before a request is handed to the transport.
    fn on_request(&self, _ctx: &ReportContext, _spec: &RequestSpec) {}

    /// Called after the transport produced a response.
    fn on_response(&self, _ctx: &ReportContext, _response: &ResponseSnapshot) {}

    fn on_assertion_passed(&self, _description: &str) {}

    fn on_assertion_failed(&self, _failure: &AssertionFailure) {}
}

fn is_sensitive(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    SENSITIVE_MARKERS.iter().any(|marker| name.contains(marker))
}

/// Copy of `headers` with credential-like values replaced by `<redacted>`.
pub fn redact_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if is_sensitive(name) {
                "<redacted>".to_string()
            } else {
                value.clone()
            };
            (name.clone(), shown)
        })
        .collect()
}

/// A reporter backed by `tracing`, with sensitive headers redacted.
#[derive(Clone, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_request(&self, ctx: &ReportContext, spec: &RequestSpec) {
        tracing::debug!(
            target: "restcheck::report",
            request_id = %ctx.request_id,
            method = %spec.method(),
            url = %ctx.url,
            headers = ?redact_headers(spec.headers()),
            "sending request"
        );
    }

    fn on_response(&self, ctx: &ReportContext, response: &ResponseSnapshot) {
        tracing::debug!(
            target: "restcheck::report",
            request_id = %ctx.request_id,
            url = %ctx.url,
            status = response.status,
            elapsed_ms = response.duration.as_millis() as u64,
            headers = ?redact_headers(&response.headers),
            "response received"
        );
    }

    fn on_assertion_passed(&self, description: &str) {
        tracing::debug!(target: "restcheck::report", %description, "assertion passed");
    }

    fn on_assertion_failed(&self, failure: &AssertionFailure) {
        tracing::debug!(
            target: "restcheck::report",
            facet = %failure.facet,
            expected = %failure.expected,
            actual = %failure.actual,
            "assertion failed"
        );
    }
}
