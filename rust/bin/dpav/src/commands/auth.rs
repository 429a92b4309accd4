//! Login / logout / register / status.

use std::path::Path;

use anyhow::Result;
use dpav_admin::request::{
    InitializeReq, LoadReq, LoginReq, LogoutReq, RegisterReq, entity_request,
};
use dpav_admin::state::{LOGIN_FORM, REGISTER_FORM};
use dpav_admin::{FormState, Guard};
use dpav_client::Registration;

use super::{finish, open};

pub async fn login(email: &str, password: &str, client_config_path: &Path) -> Result<()> {
    let (admin, ctx) = open(client_config_path)?;
    admin.flux.emit(InitializeReq::PATH, InitializeReq).await;
    admin
        .flux
        .emit(
            LoginReq::PATH,
            LoginReq { email: email.to_string(), password: password.to_string() },
        )
        .await;

    let form: Option<FormState> = admin.flux.get_as(LOGIN_FORM);
    finish(&admin, form.as_ref())?;

    if let Some(user) = admin.auth.state().user {
        println!("Logged in as {}.", user.display_name());
    }
    println!("Session saved to context \"{}\".", ctx.name);
    Ok(())
}

pub async fn logout(client_config_path: &Path) -> Result<()> {
    let (admin, ctx) = open(client_config_path)?;
    admin.flux.emit(LogoutReq::PATH, LogoutReq).await;
    println!("Logged out from context \"{}\".", ctx.name);
    Ok(())
}

pub async fn register(registration: Registration, client_config_path: &Path) -> Result<()> {
    let (admin, _) = open(client_config_path)?;
    admin.flux.emit(InitializeReq::PATH, InitializeReq).await;
    admin.flux.emit(RegisterReq::PATH, RegisterReq(registration)).await;

    let form: Option<FormState> = admin.flux.get_as(REGISTER_FORM);
    finish(&admin, form.as_ref())?;
    println!("Run `dpav login` to start a session.");
    Ok(())
}

pub async fn status(client_config_path: &Path) -> Result<()> {
    let (admin, ctx) = open(client_config_path)?;
    println!("Context:   {}", ctx.name);
    println!("Server:    {}", ctx.server);

    let session = match admin.auth.initialize() {
        Guard::Proceed(session) => session,
        Guard::Redirect(_) => {
            println!("Session:   not logged in");
            return Ok(());
        }
    };
    println!("User:      {}", session.user.display_name());
    if let Some(at) = session.created_at {
        println!("Since:     {}", at.format("%Y-%m-%d %H:%M UTC"));
    }

    // Any authenticated read tells us whether the token is still accepted.
    admin
        .flux
        .emit(&entity_request("razas", LoadReq::ACTION), LoadReq)
        .await;
    if !admin.auth.state().authenticated {
        println!("Status:    session expired");
        return Ok(());
    }
    match admin.breeds.list().error {
        Some(err) => println!("Status:    error ({})", err),
        None => println!("Status:    connected"),
    }
    Ok(())
}
