//! Reference provider exchanging a username/password for a bearer token.
//!
//! Demonstrates the normative caching policy: consult the per-identity
//! cache first, authenticate against the remote endpoint only on miss or
//! expiry, and repopulate the cache with the fresh token.

use super::TokenProvider;
use super::cache::{CachedToken, TokenCache};
use crate::error::ApiError;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

/// Password-grant token provider with per-identity caching.
pub struct PasswordTokenProvider {
    token_url: String,
    username: String,
    password: String,
    http: reqwest::Client,
    cache: Arc<TokenCache>,
}

impl PasswordTokenProvider {
    pub fn new(
        token_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::with_cache(token_url, username, password, Arc::new(TokenCache::new()))
    }

    /// Share a cache across providers, or inject a pre-seeded one in tests.
    pub fn with_cache(
        token_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        cache: Arc<TokenCache>,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            username: username.into(),
            password: password.into(),
            http: reqwest::Client::new(),
            cache,
        }
    }

    async fn authenticate(&self) -> Result<CachedToken, ApiError> {
        tracing::debug!(target: "restcheck::auth", url = %self.token_url, username = %self.username, "authenticating");
        let response = self
            .http
            .post(&self.token_url)
            .json(&serde_json::json!({
                "username": self.username,
                "password": self.password,
            }))
            .send()
            .await
            .map_err(|e| {
                ApiError::Authentication(format!("token endpoint request failed: {e}"))
            })?;

        let response = response.error_for_status().map_err(|e| {
            ApiError::Authentication(format!("token endpoint returned error: {e}"))
        })?;

        let token: TokenResponse = response.json().await.map_err(|e| {
            ApiError::Authentication(format!("failed to parse token response: {e}"))
        })?;

        Ok(CachedToken {
            token: token.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for PasswordTokenProvider {
    async fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        let token = self
            .cache
            .get_or_refresh(&self.username, || self.authenticate())
            .await?;
        Ok(Some(token))
    }
}
