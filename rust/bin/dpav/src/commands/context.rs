//! Context management commands.

use std::path::Path;

use anyhow::Result;
use dpav_admin::DEFAULT_BASE_URL;

use crate::config::{ClientConfig, Context};

/// Register a context. The first one created becomes current.
pub fn create(name: &str, server: Option<&str>, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;
    if config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!("Context \"{}\" already exists. Use `dpav context set`.", name);
    }

    let server = server.unwrap_or(DEFAULT_BASE_URL);
    config.upsert_context(Context {
        name: name.to_string(),
        server: server.to_string(),
        ..Default::default()
    });
    if config.current_context.is_empty() {
        config.current_context = name.to_string();
    }
    config.save(client_config_path)?;

    println!("Context \"{}\" created.", name);
    println!("  Server: {}", server);
    Ok(())
}

pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: dpav context create <name>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:24}", "", "NAME", "SERVER", "USER");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context { "*" } else { " " };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        let user = match (&ctx.user, ctx.token.is_empty()) {
            (_, true) => "-".to_string(),
            (Some(u), false) => u.display_name(),
            (None, false) => "(token)".to_string(),
        };
        println!("{:2} {:20} {:40} {:24}", marker, ctx.name, server, user);
    }

    Ok(())
}

pub fn use_context(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{}\" not found. Run `dpav context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

/// Change a context's server. Moving to another server drops the session.
pub fn set(name: &str, server: Option<&str>, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let ctx = config
        .get_mut(name)
        .ok_or_else(|| anyhow::anyhow!("Context \"{}\" not found.", name))?;

    if let Some(s) = server {
        if ctx.server != s {
            ctx.token.clear();
            ctx.user = None;
            ctx.logged_in_at = None;
        }
        ctx.server = s.to_string();
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" updated.", name);
    Ok(())
}

pub fn delete(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_use_set_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        create("local", None, &path).unwrap();
        create("prod", Some("https://dpav.example/api"), &path).unwrap();
        assert!(create("local", None, &path).is_err());

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current_context, "local");
        assert_eq!(config.current().unwrap().server, DEFAULT_BASE_URL);

        use_context("prod", &path).unwrap();
        assert!(use_context("nope", &path).is_err());
        assert_eq!(ClientConfig::load(&path).unwrap().current_context, "prod");

        set("prod", Some("https://other.example/api"), &path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.current().unwrap().server, "https://other.example/api");

        delete("prod", &path).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert!(config.current_context.is_empty());
        assert_eq!(config.contexts.len(), 1);
    }

    #[test]
    fn changing_server_drops_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        create("local", None, &path).unwrap();

        let mut config = ClientConfig::load(&path).unwrap();
        config.get_mut("local").unwrap().token = "tok".into();
        config.save(&path).unwrap();

        set("local", Some(DEFAULT_BASE_URL), &path).unwrap();
        assert_eq!(ClientConfig::load(&path).unwrap().current().unwrap().token, "tok");

        set("local", Some("http://10.0.0.2:8000/api"), &path).unwrap();
        assert!(ClientConfig::load(&path).unwrap().current().unwrap().token.is_empty());
    }
}
