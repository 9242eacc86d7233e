//! Built-in transport backed by `reqwest`.

use super::{Transport, TransportResponse};
use crate::error::ApiError;
use crate::spec::{HttpMethod, RequestSpec};
use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Instant;

/// Transport over a shared `reqwest::Client`.
///
/// Holds the configured base URL; relative endpoints are joined to it,
/// absolute endpoints pass through unchanged.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ReqwestTransport {
    pub fn new(base_url: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Use a caller-supplied client, e.g. one with custom TLS or proxy
    /// settings.
    pub fn with_client(client: reqwest::Client, base_url: Option<String>) -> Self {
        Self { client, base_url }
    }

    fn request_headers(spec: &RequestSpec) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        for (name, value) in spec.headers() {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ApiError::execution(spec.clone(), format!("invalid header name {name:?}: {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ApiError::execution(spec.clone(), format!("invalid header value for {name}: {e}"))
            })?;
            headers.insert(name, value);
        }
        if !spec.cookies().is_empty() {
            let cookie_line = spec
                .cookies()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            let value = HeaderValue::from_str(&cookie_line).map_err(|e| {
                ApiError::execution(spec.clone(), format!("invalid cookie value: {e}"))
            })?;
            headers.insert(COOKIE, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, spec: &RequestSpec) -> Result<TransportResponse, ApiError> {
        let url = spec.resolve_url(self.base_url.as_deref());
        let method = match spec.method() {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .headers(Self::request_headers(spec)?);
        if !spec.query_params().is_empty() {
            builder = builder.query(spec.query_params());
        }
        if let Some(body) = spec.body() {
            builder = builder.json(body);
        }
        if let Some(timeout) = spec.timeout() {
            builder = builder.timeout(timeout);
        }

        tracing::debug!(target: "restcheck::transport", method = %spec.method(), url = %url, "dispatching request");
        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::execution(spec.clone(), format!("request failed: {e}")))?;

        let status = response.status().as_u16();
        let headers = headermap_to_hashmap(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::execution(spec.clone(), format!("failed to read body: {e}")))?;
        let elapsed = started.elapsed();
        tracing::debug!(target: "restcheck::transport", url = %url, status, elapsed_ms = elapsed.as_millis() as u64, "response received");

        Ok(TransportResponse {
            status,
            headers,
            body,
            elapsed,
        })
    }
}

/// Convert a reqwest `HeaderMap` to a plain map with lowercased names.
/// Header values that are not valid UTF-8 are dropped.
fn headermap_to_hashmap(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(k, v)| {
            v.to_str()
                .ok()
                .map(|v_str| (k.as_str().to_string(), v_str.to_string()))
        })
        .collect()
}
