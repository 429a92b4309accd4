//! Request payloads.
//!
//! Application-wide and auth requests carry their own path. Entity
//! requests are sent to `{entity}/{ACTION}`, e.g. `perros/load`.

use dpav_client::{Id, Registration};

pub struct InitializeReq;

impl InitializeReq {
    pub const PATH: &'static str = "app/initialize";
}

pub struct DismissNoticeReq;

impl DismissNoticeReq {
    pub const PATH: &'static str = "app/dismiss-notice";
}

pub struct LoginReq {
    pub email: String,
    pub password: String,
}

impl LoginReq {
    pub const PATH: &'static str = "auth/login";
}

pub struct RegisterReq(pub Registration);

impl RegisterReq {
    pub const PATH: &'static str = "auth/register";
}

/// Keystroke in the login or register form; carries a `FieldReq`.
pub const LOGIN_FIELD: &str = "auth/login-field";
pub const REGISTER_FIELD: &str = "auth/register-field";

pub struct LogoutReq;

impl LogoutReq {
    pub const PATH: &'static str = "auth/logout";
}

pub struct LoadReq;

impl LoadReq {
    pub const ACTION: &'static str = "load";
}

pub struct SearchReq {
    pub term: String,
}

impl SearchReq {
    pub const ACTION: &'static str = "search";
}

pub struct OpenCreateReq;

impl OpenCreateReq {
    pub const ACTION: &'static str = "open-create";
}

pub struct OpenEditReq {
    pub id: Id,
}

impl OpenEditReq {
    pub const ACTION: &'static str = "open-edit";
}

pub struct FieldReq {
    pub name: String,
    pub value: String,
}

impl FieldReq {
    pub const ACTION: &'static str = "field";
}

pub struct SubmitReq;

impl SubmitReq {
    pub const ACTION: &'static str = "submit";
}

pub struct CloseFormReq;

impl CloseFormReq {
    pub const ACTION: &'static str = "close-form";
}

pub struct DeleteReq {
    pub id: Id,
}

impl DeleteReq {
    pub const ACTION: &'static str = "delete";
}

pub struct UnmountReq;

impl UnmountReq {
    pub const ACTION: &'static str = "unmount";
}

pub fn entity_request(entity: &str, action: &str) -> String {
    format!("{}/{}", entity, action)
}
