//! Session persistence and the route guard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dpav_client::{SharedToken, UserProfile};
use serde::{Deserialize, Serialize};

use crate::state::ROUTE_LOGIN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: UserProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: token.into(),
            user,
            created_at: Some(Utc::now()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage: {0}")]
    Storage(String),
}

/// Durable key-value home of the session (`token` and `user`).
pub trait SessionVault: Send + Sync + 'static {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local vault, for tests and embedding.
#[derive(Default)]
pub struct MemoryVault {
    slot: Mutex<Option<Session>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self { slot: Mutex::new(Some(session)) }
    }
}

impl SessionVault for MemoryVault {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.slot.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.slot.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

/// Outcome of the route guard.
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    Proceed(Session),
    Redirect(&'static str),
}

/// Owns the vault and the token slot the API client reads from.
pub struct SessionManager {
    vault: Arc<dyn SessionVault>,
    token: SharedToken,
    /// Bumped on every teardown.
    generation: AtomicU64,
}

impl SessionManager {
    pub fn new(vault: Arc<dyn SessionVault>, token: SharedToken) -> Self {
        Self { vault, token, generation: AtomicU64::new(0) }
    }

    /// Changes whenever the session is torn down; requests started under an
    /// older generation belong to a session that no longer exists.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn token(&self) -> &SharedToken {
        &self.token
    }

    /// Persist a fresh session and start sending its token.
    pub fn init(&self, session: &Session) -> Result<(), SessionError> {
        self.vault.save(session)?;
        self.token.set(session.token.clone());
        tracing::info!(user = %session.user.display_name(), "session started");
        Ok(())
    }

    /// Forget the session everywhere. Storage failures are logged; the
    /// in-memory token is cleared regardless.
    pub fn teardown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.token.clear();
        if let Err(e) = self.vault.clear() {
            tracing::warn!(error = %e, "failed to clear stored session");
        }
    }

    pub fn current(&self) -> Option<Session> {
        match self.vault.load() {
            Ok(session) => session.filter(|s| !s.token.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored session");
                None
            }
        }
    }

    /// Protected views require a stored token; the token is not checked
    /// with the server here.
    pub fn guard(&self) -> Guard {
        match self.current() {
            Some(session) => {
                self.token.set(session.token.clone());
                Guard::Proceed(session)
            }
            None => {
                self.token.clear();
                Guard::Redirect(ROUTE_LOGIN)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenVault;

    impl SessionVault for BrokenVault {
        fn load(&self) -> Result<Option<Session>, SessionError> {
            Err(SessionError::Storage("disk on fire".into()))
        }
        fn save(&self, _: &Session) -> Result<(), SessionError> {
            Err(SessionError::Storage("read-only".into()))
        }
        fn clear(&self) -> Result<(), SessionError> {
            Err(SessionError::Storage("read-only".into()))
        }
    }

    #[test]
    fn guard_redirects_without_token() {
        let mgr = SessionManager::new(Arc::new(MemoryVault::new()), SharedToken::new());
        assert_eq!(mgr.guard(), Guard::Redirect("/login"));

        let empty = Session::new("", UserProfile::default());
        let mgr = SessionManager::new(Arc::new(MemoryVault::with_session(empty)), SharedToken::new());
        assert_eq!(mgr.guard(), Guard::Redirect("/login"));
    }

    #[test]
    fn guard_restores_stored_token() {
        let token = SharedToken::new();
        let session = Session::new("tok-1", UserProfile::default());
        let mgr = SessionManager::new(Arc::new(MemoryVault::with_session(session.clone())), token.clone());

        assert_eq!(mgr.guard(), Guard::Proceed(session));
        assert_eq!(token.get().as_deref(), Some("tok-1"));
    }

    #[test]
    fn init_then_teardown() {
        let vault = Arc::new(MemoryVault::new());
        let token = SharedToken::new();
        let mgr = SessionManager::new(vault.clone(), token.clone());

        mgr.init(&Session::new("abc", UserProfile::default())).unwrap();
        assert!(token.is_set());
        assert_eq!(vault.load().unwrap().map(|s| s.token), Some("abc".into()));

        let before = mgr.generation();
        mgr.teardown();
        assert!(!token.is_set());
        assert!(vault.load().unwrap().is_none());
        assert!(mgr.current().is_none());
        assert_ne!(mgr.generation(), before);
    }

    #[test]
    fn storage_failures_do_not_leave_a_live_token() {
        let token = SharedToken::new();
        token.set("stale");
        let mgr = SessionManager::new(Arc::new(BrokenVault), token.clone());

        assert!(mgr.init(&Session::new("new", UserProfile::default())).is_err());
        assert_eq!(token.get().as_deref(), Some("stale"));

        mgr.teardown();
        assert!(!token.is_set());
        assert_eq!(mgr.guard(), Guard::Redirect("/login"));
    }
}
