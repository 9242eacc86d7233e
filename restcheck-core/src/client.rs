//! Root client, defaults, and wiring.

use crate::auth::TokenProvider;
use crate::context::RequestContext;
use crate::error::ApiError;
use crate::execution::{ReqwestTransport, Transport};
use crate::reporter::Reporter;
use crate::spec::RequestSpec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Defaults consulted once when a root request context is constructed:
/// base URL, default headers, and default timeout. Per-call `with_*`
/// operations override them key-by-key.
#[derive(Debug, Clone, Default)]
pub struct ClientDefaults {
    pub base_url: Option<String>,
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

impl ClientDefaults {
    pub fn builder() -> ClientDefaultsBuilder {
        ClientDefaultsBuilder::default()
    }
}

/// Builder for [`ClientDefaults`].
#[derive(Debug, Clone, Default)]
pub struct ClientDefaultsBuilder {
    base_url: Option<String>,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl ClientDefaultsBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ClientDefaults {
        ClientDefaults {
            base_url: self.base_url,
            headers: self.headers,
            timeout: self.timeout,
        }
    }
}

/// Root of the DSL: one logical API target.
///
/// Holds the transport, the optional token provider, the reporters, and
/// the defaults. Branch request contexts off it with
/// [`for_endpoint`](Self::for_endpoint); the client itself never mutates,
/// so it can be shared across parallel test cases.
pub struct ApiClient {
    defaults: ClientDefaults,
    transport: Arc<dyn Transport>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    reporters: Vec<Arc<dyn Reporter>>,
}

impl ApiClient {
    /// A client over the built-in reqwest transport.
    pub fn new(defaults: ClientDefaults) -> Self {
        Self::builder().defaults(defaults).build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn defaults(&self) -> &ClientDefaults {
        &self.defaults
    }

    /// Root fluent context for `endpoint`, seeded with the defaults.
    ///
    /// Fails with a configuration error if the endpoint is empty or
    /// consists only of `/` characters.
    pub fn for_endpoint(&self, endpoint: impl Into<String>) -> Result<RequestContext, ApiError> {
        let mut spec = RequestSpec::new(endpoint)?;
        spec = spec.with_headers(self.defaults.headers.clone());
        if let Some(timeout) = self.defaults.timeout {
            spec = spec.with_timeout(timeout);
        }
        Ok(RequestContext::new(
            spec,
            self.transport.clone(),
            self.token_provider.clone(),
            self.reporters.clone(),
            self.defaults.base_url.clone(),
        ))
    }
}

/// Builder wiring defaults, transport, auth, and reporters together.
#[derive(Default)]
pub struct ApiClientBuilder {
    defaults: ClientDefaults,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn Transport>>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    reporters: Vec<Arc<dyn Reporter>>,
}

impl ApiClientBuilder {
    pub fn defaults(mut self, defaults: ClientDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.defaults.base_url = Some(base_url.into());
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.defaults.timeout = Some(timeout);
        self
    }

    /// Custom reqwest client for the built-in transport. Ignored when a
    /// custom transport is set.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Swap in a custom transport behind the execution abstraction.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn build(self) -> ApiClient {
        let transport = self.transport.unwrap_or_else(|| {
            Arc::new(ReqwestTransport::with_client(
                self.http_client.unwrap_or_default(),
                self.defaults.base_url.clone(),
            ))
        });
        ApiClient {
            defaults: self.defaults,
            transport,
            token_provider: self.token_provider,
            reporters: self.reporters,
        }
    }
}
