//! Keyed token cache with expiry.

use crate::error::ApiError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::Mutex;

/// Safety window (seconds) to refresh before the reported expiry.
const EXPIRY_SAFETY_WINDOW: i64 = 30;

/// A token paired with its absolute expiry time.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// A token counts as fresh only while well before `expires_at`.
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.timestamp() - EXPIRY_SAFETY_WINDOW > now.timestamp()
    }
}

/// Per-identity store of `(token, expiry)` pairs.
///
/// The single `get_or_refresh` operation checks expiry, evicts stale
/// entries, and repopulates under one lock, so concurrent callers never
/// observe a torn entry and duplicate refreshes for the same identity
/// cannot race each other.
#[derive(Default)]
pub struct TokenCache {
    entries: Mutex<HashMap<String, CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token for `identity` if still fresh; otherwise run
    /// `refresh`, store its result, and return the new token.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        identity: &str,
        refresh: F,
    ) -> Result<String, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CachedToken, ApiError>>,
    {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();
        if let Some(entry) = entries.get(identity) {
            if entry.is_fresh(now) {
                return Ok(entry.token.clone());
            }
            tracing::debug!(target: "restcheck::auth", identity, "cached token expired, refreshing");
            entries.remove(identity);
        }
        let fresh = refresh().await?;
        let token = fresh.token.clone();
        entries.insert(identity.to_string(), fresh);
        Ok(token)
    }

    /// Seed an entry directly. Used by tests to set up expired tokens.
    pub async fn insert(&self, identity: impl Into<String>, entry: CachedToken) {
        self.entries.lock().await.insert(identity.into(), entry);
    }
}
