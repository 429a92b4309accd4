pub mod auth;
pub mod context;
pub mod resource;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use dpav_admin::{Admin, AdminConfig, FormState};
use dpav_admin::request::InitializeReq;

use crate::config::{ClientConfig, Context, ContextVault};

/// Build the admin engine for the current context. The session is read from
/// and written back to that context.
pub(crate) fn open(client_config_path: &Path) -> Result<(Admin, Context)> {
    let config = ClientConfig::load(client_config_path)?;
    let ctx = config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `dpav context create <name>`."))?
        .clone();

    if ctx.server.is_empty() {
        anyhow::bail!(
            "No server URL set for context \"{}\". Run `dpav context set {} --server <url>`.",
            ctx.name,
            ctx.name
        );
    }

    tracing::debug!(context = %ctx.name, server = %ctx.server, "using context");
    let admin = Admin::new(
        AdminConfig { base_url: ctx.server.clone(), notice_ttl: None },
        Arc::new(ContextVault::new(client_config_path, &ctx.name)),
    );
    Ok((admin, ctx))
}

/// `open`, then require a stored session.
pub(crate) async fn open_session(client_config_path: &Path) -> Result<(Admin, Context)> {
    let (admin, ctx) = open(client_config_path)?;
    admin.flux.emit(InitializeReq::PATH, InitializeReq).await;
    if !admin.auth.state().authenticated {
        anyhow::bail!("Not logged in to context \"{}\". Run `dpav login`.", ctx.name);
    }
    Ok((admin, ctx))
}

/// Print the notice left by the last request; an error notice fails the
/// command, listing field errors from `form` when there are any.
pub(crate) fn finish(admin: &Admin, form: Option<&FormState>) -> Result<()> {
    let Some(notice) = admin.notifier.current() else {
        return Ok(());
    };
    if !notice.is_error() {
        println!("{}", notice.message);
        return Ok(());
    }
    if let Some(form) = form {
        for spec in form.schema.fields {
            if let Some(err) = form.error(spec.name) {
                eprintln!("  {}: {}", spec.label, err);
            }
        }
    }
    anyhow::bail!("{}", notice.message)
}
