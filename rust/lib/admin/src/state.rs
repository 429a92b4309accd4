//! Application state types and the paths they live at.

use dpav_client::UserProfile;

pub const ROUTE_LOGIN: &str = "/login";
pub const ROUTE_REGISTER: &str = "/register";
pub const ROUTE_DOGS: &str = "/perros";
pub const ROUTE_BREEDS: &str = "/razas";

/// Current route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route(pub String);

impl Route {
    pub const PATH: &'static str = "app/route";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub authenticated: bool,
    pub user: Option<UserProfile>,
    pub busy: bool,
}

impl AuthState {
    pub const PATH: &'static str = "auth/state";
}

pub const LOGIN_FORM: &str = "auth/login-form";
pub const REGISTER_FORM: &str = "auth/register-form";

/// `{entity}/list`, holding a `ListState` of rows.
pub fn list_path(entity: &str) -> String {
    format!("{}/list", entity)
}

/// `{entity}/form`, holding a `FormState`.
pub fn form_path(entity: &str) -> String {
    format!("{}/form", entity)
}

/// `{entity}/breeds`, holding the `Vec<Breed>` offered by the breed picker.
pub fn breeds_path(entity: &str) -> String {
    format!("{}/breeds", entity)
}
