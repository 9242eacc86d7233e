//! The fluent request context.
//!
//! A [`RequestContext`] accumulates specification state through chained
//! calls. Every fluent call takes `&self` and returns a fresh context, so
//! two chains sharing a common prefix never observe each other's later
//! additions; parallel test cases can branch one root context without
//! coordination. Terminal verb calls finalize the specification, resolve
//! auth, and hand it to the transport.

use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::execution::Transport;
use crate::reporter::{ReportContext, Reporter, generate_request_id};
use crate::response::ResultContext;
use crate::spec::{HttpMethod, RequestSpec};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Chainable builder for one HTTP call.
///
/// Created by [`ApiClient::for_endpoint`](crate::client::ApiClient::for_endpoint);
/// discarded after the terminal verb call completes.
#[derive(Clone)]
pub struct RequestContext {
    spec: RequestSpec,
    transport: Arc<dyn Transport>,
    token_provider: Option<Arc<dyn TokenProvider>>,
    reporters: Vec<Arc<dyn Reporter>>,
    base_url: Option<String>,
}

impl RequestContext {
    pub(crate) fn new(
        spec: RequestSpec,
        transport: Arc<dyn Transport>,
        token_provider: Option<Arc<dyn TokenProvider>>,
        reporters: Vec<Arc<dyn Reporter>>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            spec,
            transport,
            token_provider,
            reporters,
            base_url,
        }
    }

    /// The specification accumulated so far.
    pub fn spec(&self) -> &RequestSpec {
        &self.spec
    }

    fn map_spec(&self, f: impl FnOnce(&RequestSpec) -> RequestSpec) -> Self {
        let mut next = self.clone();
        next.spec = f(&self.spec);
        next
    }

    pub fn with_header(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map_spec(|spec| spec.with_header(name, value))
    }

    pub fn with_headers<K, V>(&self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.map_spec(|spec| spec.with_headers(headers))
    }

    pub fn with_query_param(&self, name: impl Into<String>, value: impl ToString) -> Self {
        self.map_spec(|spec| spec.with_query_param(name, value))
    }

    pub fn with_query_params<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.map_spec(|spec| spec.with_query_params(params))
    }

    pub fn with_path_param(&self, name: impl Into<String>, value: impl ToString) -> Self {
        self.map_spec(|spec| spec.with_path_param(name, value))
    }

    pub fn with_path_params<K, V>(&self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        self.map_spec(|spec| spec.with_path_params(params))
    }

    pub fn with_cookie(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map_spec(|spec| spec.with_cookie(name, value))
    }

    pub fn with_cookies<K, V>(&self, cookies: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.map_spec(|spec| spec.with_cookies(cookies))
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.map_spec(|spec| spec.with_timeout(timeout))
    }

    /// Attach a JSON body ahead of the terminal verb call. The body passed
    /// to `post`/`put`/`patch` wins if both are given. A body set here also
    /// survives `get`/`delete`: those verbs never supply one themselves,
    /// but HTTP allows it (some APIs accept a DELETE body) and the
    /// transport sends whatever the specification carries.
    pub fn with_body<T: Serialize>(&self, body: &T) -> Result<Self, ApiError> {
        let value = to_json(body)?;
        Ok(self.map_spec(|spec| spec.with_body(value)))
    }

    pub async fn get(&self) -> Result<ResultContext, ApiError> {
        self.dispatch(HttpMethod::Get, None).await
    }

    pub async fn delete(&self) -> Result<ResultContext, ApiError> {
        self.dispatch(HttpMethod::Delete, None).await
    }

    pub async fn post<T: Serialize>(&self, body: &T) -> Result<ResultContext, ApiError> {
        self.dispatch(HttpMethod::Post, Some(to_json(body)?)).await
    }

    pub async fn put<T: Serialize>(&self, body: &T) -> Result<ResultContext, ApiError> {
        self.dispatch(HttpMethod::Put, Some(to_json(body)?)).await
    }

    pub async fn patch<T: Serialize>(&self, body: &T) -> Result<ResultContext, ApiError> {
        self.dispatch(HttpMethod::Patch, Some(to_json(body)?)).await
    }

    /// Finalize the specification, inject auth, notify reporters, and run
    /// the transport.
    async fn dispatch(
        &self,
        method: HttpMethod,
        body: Option<serde_json::Value>,
    ) -> Result<ResultContext, ApiError> {
        let mut spec = self.spec.with_method(method);
        if let Some(body) = body {
            spec = spec.with_body(body);
        }

        // An explicitly set Authorization header always wins over the
        // provider's token; the provider is consulted at most once.
        if let Some(provider) = &self.token_provider {
            if spec.header("authorization").is_none() {
                if let Some(token) = provider.bearer_token().await? {
                    spec = spec.with_header("Authorization", format!("Bearer {token}"));
                }
            }
        }

        let ctx = ReportContext {
            request_id: generate_request_id(),
            url: spec.resolve_url(self.base_url.as_deref()),
        };
        for reporter in &self.reporters {
            reporter.on_request(&ctx, &spec);
        }

        let response = self.transport.execute(&spec).await?;
        let result = ResultContext::new(response, self.reporters.clone());
        for reporter in &self.reporters {
            reporter.on_response(&ctx, &result.snapshot());
        }
        Ok(result)
    }
}

fn to_json<T: Serialize>(body: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::Configuration(format!("body serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use crate::execution::TransportResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every executed specification and answers with a canned
    /// response.
    #[derive(Default)]
    struct RecordingTransport {
        executed: Mutex<Vec<RequestSpec>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn execute(&self, spec: &RequestSpec) -> Result<TransportResponse, ApiError> {
            self.executed.lock().unwrap().push(spec.clone());
            Ok(TransportResponse {
                status: 200,
                headers: HashMap::new(),
                body: "{}".to_string(),
                elapsed: Duration::from_millis(1),
            })
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenProvider for CountingProvider {
        async fn bearer_token(&self) -> Result<Option<String>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some("counted".to_string()))
        }
    }

    fn context_with(
        transport: Arc<RecordingTransport>,
        provider: Option<Arc<dyn TokenProvider>>,
    ) -> RequestContext {
        RequestContext::new(
            RequestSpec::new("/users").unwrap(),
            transport,
            provider,
            Vec::new(),
            None,
        )
    }

    #[tokio::test]
    async fn branched_chains_do_not_observe_each_other() {
        let transport = Arc::new(RecordingTransport::default());
        let root = context_with(transport.clone(), None).with_header("Accept", "application/json");

        let chain_a = root.with_query_param("page", 1);
        let chain_b = root.with_query_param("sort", "name");

        chain_a.get().await.unwrap();
        chain_b.get().await.unwrap();

        let executed = transport.executed.lock().unwrap();
        assert_eq!(executed[0].query_params().get("page").map(String::as_str), Some("1"));
        assert!(executed[0].query_params().get("sort").is_none());
        assert_eq!(
            executed[1].query_params().get("sort").map(String::as_str),
            Some("name")
        );
        assert!(executed[1].query_params().get("page").is_none());
        // The shared prefix kept its header in both branches.
        assert_eq!(executed[0].header("accept"), Some("application/json"));
        assert_eq!(executed[1].header("accept"), Some("application/json"));
        // The root itself is unchanged.
        assert!(root.spec().query_params().is_empty());
    }

    #[tokio::test]
    async fn token_is_injected_as_a_bearer_header() {
        let transport = Arc::new(RecordingTransport::default());
        let ctx = context_with(
            transport.clone(),
            Some(Arc::new(StaticTokenProvider::new("tok-42"))),
        );
        ctx.get().await.unwrap();
        let executed = transport.executed.lock().unwrap();
        assert_eq!(executed[0].header("authorization"), Some("Bearer tok-42"));
    }

    #[tokio::test]
    async fn explicit_authorization_wins_over_the_provider() {
        let transport = Arc::new(RecordingTransport::default());
        let ctx = context_with(
            transport.clone(),
            Some(Arc::new(StaticTokenProvider::new("tok-42"))),
        )
        .with_header("Authorization", "Basic abc");
        ctx.get().await.unwrap();
        let executed = transport.executed.lock().unwrap();
        assert_eq!(executed[0].header("authorization"), Some("Basic abc"));
    }

    #[tokio::test]
    async fn provider_is_consulted_once_per_terminal_call() {
        let transport = Arc::new(RecordingTransport::default());
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let ctx = context_with(transport, Some(provider.clone()));
        ctx.get().await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        ctx.get().await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn verb_calls_fix_the_method_and_body() {
        let transport = Arc::new(RecordingTransport::default());
        let ctx = context_with(transport.clone(), None);
        ctx.post(&serde_json::json!({"name": "John"})).await.unwrap();

        let executed = transport.executed.lock().unwrap();
        assert_eq!(executed[0].method(), HttpMethod::Post);
        assert_eq!(executed[0].body(), Some(&serde_json::json!({"name": "John"})));
        // The context itself still carries no method commitment or body.
        assert_eq!(ctx.spec().method(), HttpMethod::Get);
        assert!(ctx.spec().body().is_none());
    }

    #[tokio::test]
    async fn a_fluent_body_survives_bodyless_verbs() {
        let transport = Arc::new(RecordingTransport::default());
        let ctx = context_with(transport.clone(), None)
            .with_body(&serde_json::json!({"reason": "cleanup"}))
            .unwrap();
        ctx.delete().await.unwrap();

        let executed = transport.executed.lock().unwrap();
        assert_eq!(executed[0].method(), HttpMethod::Delete);
        assert_eq!(
            executed[0].body(),
            Some(&serde_json::json!({"reason": "cleanup"}))
        );
    }
}
