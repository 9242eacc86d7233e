//! The immutable request specification.
//!
//! A [`RequestSpec`] describes one HTTP call. Every `with_*` operation is
//! pure: it returns a new specification carrying the union of prior and new
//! fields, with new values winning on key collision. The originating value
//! is never touched, so a specification can be branched freely across
//! scenarios (and threads) without coordination.

use crate::error::ApiError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// HTTP verbs supported by the DSL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one HTTP call.
///
/// The body is shared behind an `Arc`, so branched specifications reuse the
/// same payload instead of deep-copying it.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    endpoint: String,
    method: HttpMethod,
    headers: HashMap<String, String>,
    query_params: HashMap<String, String>,
    path_params: HashMap<String, String>,
    body: Option<Arc<serde_json::Value>>,
    cookies: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl RequestSpec {
    /// Create a specification for `endpoint`.
    ///
    /// The endpoint may be absolute or relative. An empty endpoint, or one
    /// consisting only of `/` characters, is rejected here so the mistake
    /// surfaces before any network activity.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ApiError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(ApiError::Configuration(
                "endpoint must not be empty".to_string(),
            ));
        }
        if endpoint.trim().chars().all(|c| c == '/') {
            return Err(ApiError::Configuration(format!(
                "endpoint {endpoint:?} contains no path"
            )));
        }
        Ok(Self {
            endpoint,
            ..Self::default()
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Headers as written; names compare case-insensitively.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_deref()
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.cookies
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn with_method(&self, method: HttpMethod) -> Self {
        let mut next = self.clone();
        next.method = method;
        next
    }

    /// Add or replace a header; replacement is case-insensitive on the name.
    pub fn with_header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let mut next = self.clone();
        next.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        next.headers.insert(name, value.into());
        next
    }

    pub fn with_headers<K, V>(&self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self.clone(), |spec, (k, v)| spec.with_header(k, v))
    }

    /// Add or replace a query parameter. Values are stringified up front;
    /// the transport encodes them at dispatch.
    pub fn with_query_param(&self, name: impl Into<String>, value: impl ToString) -> Self {
        let mut next = self.clone();
        next.query_params.insert(name.into(), value.to_string());
        next
    }

    pub fn with_query_params<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let mut next = self.clone();
        for (k, v) in params {
            next.query_params.insert(k.into(), v.to_string());
        }
        next
    }

    /// Add or replace a path parameter, substituted into `{name}`
    /// placeholders in the endpoint before dispatch.
    pub fn with_path_param(&self, name: impl Into<String>, value: impl ToString) -> Self {
        let mut next = self.clone();
        next.path_params.insert(name.into(), value.to_string());
        next
    }

    pub fn with_path_params<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        let mut next = self.clone();
        for (k, v) in params {
            next.path_params.insert(k.into(), v.to_string());
        }
        next
    }

    /// Attach a JSON body. The specification does not tie the body to a
    /// verb; a transport sends it whenever present, which also covers APIs
    /// that accept a body on DELETE.
    pub fn with_body(&self, body: serde_json::Value) -> Self {
        let mut next = self.clone();
        next.body = Some(Arc::new(body));
        next
    }

    pub fn with_cookie(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.cookies.insert(name.into(), value.into());
        next
    }

    pub fn with_cookies<K, V>(&self, cookies: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut next = self.clone();
        for (k, v) in cookies {
            next.cookies.insert(k.into(), v.into());
        }
        next
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut next = self.clone();
        next.timeout = Some(timeout);
        next
    }

    /// Endpoint with every `{key}` placeholder replaced by its path
    /// parameter. Unresolved placeholders stay verbatim; if the resulting
    /// URL is invalid the transport fails downstream.
    pub fn resolved_endpoint(&self) -> String {
        let mut endpoint = self.endpoint.clone();
        for (name, value) in &self.path_params {
            endpoint = endpoint.replace(&format!("{{{name}}}"), value);
        }
        endpoint
    }

    /// Final URL for dispatch: an absolute endpoint passes through
    /// unchanged; a relative one is joined to `base` with exactly one `/`
    /// between them. Without a base the (substituted) endpoint is returned
    /// as-is.
    pub fn resolve_url(&self, base: Option<&str>) -> String {
        let endpoint = self.resolved_endpoint();
        if is_absolute(&endpoint) {
            return endpoint;
        }
        match base {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            ),
            None => endpoint,
        }
    }
}

fn is_absolute(endpoint: &str) -> bool {
    endpoint.starts_with("http://") || endpoint.starts_with("https://")
}
