//! Token sources — where the bearer token for a request comes from.

use std::sync::{Arc, RwLock};

use crate::error::ApiError;

/// Pluggable token provider, asked before every authenticated request.
///
/// `Ok(None)` means the request goes out without an Authorization header.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// Anonymous requests.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// A bearer token obtained elsewhere that never changes.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

/// A token slot shared between the session and the transport.
///
/// Clones share the same slot: setting it after login makes every client
/// holding a clone send the new token; clearing it makes them anonymous.
#[derive(Clone, Default)]
pub struct SharedToken {
    slot: Arc<RwLock<Option<String>>>,
}

impl SharedToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.slot.write().unwrap() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.slot.write().unwrap() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.slot.read().unwrap().clone()
    }

    pub fn is_set(&self) -> bool {
        self.slot.read().unwrap().is_some()
    }
}

#[async_trait::async_trait]
impl TokenSource for SharedToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.get().filter(|t| !t.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_auth_returns_none() {
        assert!(NoAuth.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_token_returns_value() {
        let ts = StaticToken::new("abc.def.ghi");
        assert_eq!(ts.token().await.unwrap().as_deref(), Some("abc.def.ghi"));
    }

    #[tokio::test]
    async fn shared_token_follows_set_and_clear_across_clones() {
        let session_side = SharedToken::new();
        let transport_side = session_side.clone();
        assert!(transport_side.token().await.unwrap().is_none());

        session_side.set("tok-1");
        assert_eq!(transport_side.token().await.unwrap().as_deref(), Some("tok-1"));
        assert!(transport_side.is_set());

        session_side.clear();
        assert!(transport_side.token().await.unwrap().is_none());
        assert!(!transport_side.is_set());
    }

    #[tokio::test]
    async fn empty_shared_token_is_anonymous() {
        let ts = SharedToken::new();
        ts.set("");
        assert!(ts.token().await.unwrap().is_none());
    }
}
