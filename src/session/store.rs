//! Token store abstraction
//!
//! The session is an access/refresh token pair. Stores hold the pair as a
//! single value so one token can never be present without the other.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::RwLock;

use super::error::SessionResult;

/// Access and refresh bearer tokens, always stored and cleared together
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived credential attached to API requests
    pub access: String,
    /// Longer-lived credential exchanged for a new access token
    pub refresh: String,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Pair produced by a refresh exchange. The refresh token is kept unless
    /// the backend rotated it.
    pub fn refreshed(&self, access: String, rotated: Option<String>) -> Self {
        Self {
            access,
            refresh: rotated.unwrap_or_else(|| self.refresh.clone()),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Persistent session storage
///
/// Each call is atomic with respect to the others on the same store.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current session, if both tokens are stored
    async fn get(&self) -> SessionResult<Option<TokenPair>>;

    /// Replace the stored session
    async fn set(&self, tokens: &TokenPair) -> SessionResult<()>;

    /// Remove both tokens
    async fn clear(&self) -> SessionResult<()>;
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a session
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> SessionResult<Option<TokenPair>> {
        Ok(self.tokens.read().await.clone())
    }

    async fn set(&self, tokens: &TokenPair) -> SessionResult<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }

    async fn clear(&self) -> SessionResult<()> {
        *self.tokens.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_tokens() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_refreshed_keeps_refresh_token() {
        let pair = TokenPair::new("old", "refresh-1");

        let kept = pair.refreshed("new".to_string(), None);
        assert_eq!(kept, TokenPair::new("new", "refresh-1"));

        let rotated = pair.refreshed("new".to_string(), Some("refresh-2".to_string()));
        assert_eq!(rotated, TokenPair::new("new", "refresh-2"));
    }

    #[tokio::test]
    async fn test_memory_store_lifecycle() {
        let store = MemoryTokenStore::new();
        assert!(store.get().await.unwrap().is_none());

        let pair = TokenPair::new("a", "r");
        store.set(&pair).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(pair));

        store.clear().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_seeded() {
        let store = MemoryTokenStore::with_tokens(TokenPair::new("a", "r"));
        let pair = store.get().await.unwrap().unwrap();
        assert_eq!(pair.access, "a");
        assert_eq!(pair.refresh, "r");
    }
}
