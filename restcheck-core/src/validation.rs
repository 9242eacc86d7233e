//! Pure comparison logic backing response assertions.
//!
//! These functions only compare and report; attaching the failing response
//! and notifying reporters happens in the result context.

use crate::error::{AssertionFailure, Facet};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub fn validate_status(actual: u16, expected: u16) -> Result<(), AssertionFailure> {
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionFailure::new(
            Facet::Status,
            expected.to_string(),
            actual.to_string(),
        ))
    }
}

/// Check the response headers against a caller-supplied predicate.
/// `description` names the expectation in the failure message.
pub fn validate_headers(
    headers: &HashMap<String, String>,
    description: &str,
    predicate: impl Fn(&HashMap<String, String>) -> bool,
) -> Result<(), AssertionFailure> {
    if predicate(headers) {
        Ok(())
    } else {
        Err(AssertionFailure::new(
            Facet::Headers,
            description.to_string(),
            format!("{headers:?}"),
        ))
    }
}

/// Deserialize the raw body as `T` and check it against a caller-supplied
/// predicate. A malformed body is itself a validation failure, not a
/// silent `None`.
pub fn validate_body<T, F>(
    raw_body: &str,
    description: &str,
    predicate: F,
) -> Result<(), AssertionFailure>
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let typed: T = serde_json::from_str(raw_body).map_err(|e| {
        AssertionFailure::new(
            Facet::Body,
            format!("a body deserializable as {}", std::any::type_name::<T>()),
            format!("malformed body: {e}"),
        )
    })?;
    if predicate(&typed) {
        Ok(())
    } else {
        Err(AssertionFailure::new(
            Facet::Body,
            description.to_string(),
            raw_body.to_string(),
        ))
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

    #[test]
    fn status_mismatch_reports_expected_and_actual() {
        let failure = validate_status(404, 200).unwrap_err();
        assert_eq!(failure.facet, Facet::Status);
        assert_eq!(failure.expected, "200");
        assert_eq!(failure.actual, "404");
        assert!(validate_status(200, 200).is_ok());
    }

    #[test]
    fn header_predicate_failure_names_the_expectation() {
        let headers = HashMap::from([("content-type".to_string(), "text/plain".to_string())]);
        let failure = validate_headers(&headers, "content-type is application/json", |h| {
            h.get("content-type").map(String::as_str) == Some("application/json")
        })
        .unwrap_err();
        assert_eq!(failure.facet, Facet::Headers);
        assert_eq!(failure.expected, "content-type is application/json");
    }

    #[test]
    fn body_predicate_runs_against_the_deserialized_value() {
        let raw = r#"{"id": 1, "name": "Ann"}"#;
        assert!(validate_body::<User, _>(raw, "id == 1", |u| u.id == 1).is_ok());
        let failure =
            validate_body::<User, _>(raw, "name == Bob", |u| u.name == "Bob").unwrap_err();
        assert_eq!(failure.facet, Facet::Body);
        assert_eq!(failure.expected, "name == Bob");
    }

    #[test]
    fn malformed_body_is_a_body_failure_not_a_panic() {
        let failure =
            validate_body::<User, _>("not json", "id == 1", |u| u.id == 1).unwrap_err();
        assert_eq!(failure.facet, Facet::Body);
        assert!(failure.actual.contains("malformed body"));
    }
}
