//! The execution abstraction.
//!
//! All transport-specific code lives behind [`Transport::execute`]. The core
//! depends only on this signature; concrete transports (the built-in
//! reqwest one, or an in-process fake in tests) are injected at client
//! construction.

use crate::error::ApiError;
use crate::spec::RequestSpec;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

pub mod http;

pub use http::ReqwestTransport;

/// Raw outcome of one dispatched request.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    /// Response headers with lowercased names.
    pub headers: HashMap<String, String>,
    pub body: String,
    /// Wall-clock time spent on the exchange.
    pub elapsed: Duration,
}

/// A capability that turns a request specification into a raw response.
///
/// Implementations resolve the final URL, attach headers, query parameters,
/// cookies, and body per the verb's semantics, apply the timeout if one is
/// set, and measure elapsed wall-clock time. Transport faults are wrapped
/// in [`ApiError::Execution`] carrying the originating specification. A
/// non-2xx status is NOT an error at this layer; status evaluation belongs
/// to the caller and the validator.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, spec: &RequestSpec) -> Result<TransportResponse, ApiError>;
}
