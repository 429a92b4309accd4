//! Client-side context management.
//!
//! Reads/writes `~/.dpav/config.toml`. The current context also stores the
//! login session, so it survives between invocations.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dpav_admin::{Session, SessionError, SessionVault};
use dpav_client::UserProfile;
use serde::{Deserialize, Serialize};

/// A single context — one DPAV API plus the session held against it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    pub name: String,

    /// API base URL (e.g. "http://127.0.0.1:8000/api").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Bearer token (set by `dpav login`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_in_at: Option<DateTime<Utc>>,

    /// Profile returned at login. Kept last: TOML tables follow plain keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ClientConfig {
    /// Default config file path: ~/.dpav/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add a context, or replace the one with the same name.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }
}

fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".dpav")
}

/// Session storage backed by one context of the config file.
pub struct ContextVault {
    path: PathBuf,
    context: String,
}

impl ContextVault {
    pub fn new(path: impl Into<PathBuf>, context: impl Into<String>) -> Self {
        Self { path: path.into(), context: context.into() }
    }

    fn edit(&self, f: impl FnOnce(&mut Context)) -> Result<(), SessionError> {
        let mut config = ClientConfig::load(&self.path).map_err(storage)?;
        let ctx = config
            .get_mut(&self.context)
            .ok_or_else(|| SessionError::Storage(format!("context \"{}\" not found", self.context)))?;
        f(ctx);
        config.save(&self.path).map_err(storage)
    }
}

fn storage(e: anyhow::Error) -> SessionError {
    SessionError::Storage(format!("{:#}", e))
}

impl SessionVault for ContextVault {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let config = ClientConfig::load(&self.path).map_err(storage)?;
        let Some(ctx) = config.contexts.into_iter().find(|c| c.name == self.context) else {
            return Ok(None);
        };
        if ctx.token.is_empty() {
            return Ok(None);
        }
        Ok(Some(Session {
            token: ctx.token,
            user: ctx.user.unwrap_or_default(),
            created_at: ctx.logged_in_at,
        }))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        self.edit(|ctx| {
            ctx.token = session.token.clone();
            let mut user = session.user.clone();
            // TOML has no null.
            user.extra.retain(|_, v| !v.is_null());
            ctx.user = Some(user);
            ctx.logged_in_at = session.created_at;
        })
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.edit(|ctx| {
            ctx.token.clear();
            ctx.user = None;
            ctx.logged_in_at = None;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.current_context.is_empty());
        assert!(config.contexts.is_empty());
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ClientConfig::default();
        config.current_context = "local".to_string();
        config.upsert_context(Context {
            name: "local".to_string(),
            server: "http://127.0.0.1:8000/api".to_string(),
            ..Default::default()
        });
        config.save(&path).unwrap();

        let back = ClientConfig::load(&path).unwrap();
        assert_eq!(back.current().map(|c| c.server.as_str()), Some("http://127.0.0.1:8000/api"));
        assert!(back.current().unwrap().token.is_empty());
    }

    #[test]
    fn test_remove_current_context_unsets_it() {
        let mut config = ClientConfig::default();
        config.current_context = "a".into();
        config.upsert_context(Context { name: "a".into(), ..Default::default() });
        assert!(config.remove_context("a"));
        assert!(config.current_context.is_empty());
        assert!(!config.remove_context("a"));
    }

    #[test]
    fn test_context_vault_persists_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = ClientConfig::default();
        config.upsert_context(Context { name: "local".into(), ..Default::default() });
        config.upsert_context(Context { name: "other".into(), ..Default::default() });
        config.save(&path).unwrap();

        let vault = ContextVault::new(&path, "local");
        assert!(vault.load().unwrap().is_none());

        let user = UserProfile { nombre: Some("Ana".into()), ..Default::default() };
        vault.save(&Session::new("tok-1", user)).unwrap();

        let loaded = vault.load().unwrap().unwrap();
        assert_eq!(loaded.token, "tok-1");
        assert_eq!(loaded.user.display_name(), "Ana");
        assert!(loaded.created_at.is_some());
        assert!(ContextVault::new(&path, "other").load().unwrap().is_none());

        vault.clear().unwrap();
        assert!(vault.load().unwrap().is_none());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("tok-1"));
    }

    #[test]
    fn test_context_vault_unknown_context() {
        let dir = tempfile::tempdir().unwrap();
        let vault = ContextVault::new(dir.path().join("config.toml"), "missing");
        assert!(vault.load().unwrap().is_none());
        assert!(vault.save(&Session::new("t", UserProfile::default())).is_err());
    }
}
