//! Bearer-token providers for request authentication.
//!
//! A provider is consulted at most once per terminal verb call, and only
//! when one is configured. A returned token is merged into the
//! specification as `Authorization: Bearer <token>` unless the chain
//! already set `Authorization` explicitly. Returning `None` is not an
//! error; the request goes out without credentials and the server decides
//! the outcome.

use crate::error::ApiError;
use async_trait::async_trait;

pub mod cache;
pub mod password;

pub use cache::{CachedToken, TokenCache};
pub use password::PasswordTokenProvider;

/// A bearer-token provider.
///
/// Implementations may call a remote authentication endpoint and cache
/// internally; see [`PasswordTokenProvider`] for the reference policy.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a token for the `Authorization: Bearer <token>` header, or
    /// `None` when the provider has no credential to offer.
    async fn bearer_token(&self) -> Result<Option<String>, ApiError>;
}

/// Fixed-token provider for tests and externally managed credentials.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.token.clone()))
    }
}
