//! Login, registration, logout and session bootstrap.

use std::sync::Arc;

use dpav_client::{ApiClient, Credentials, Registration};
use dpav_flux::StateStore;
use tracing::{debug, warn};

use crate::form::FormState;
use crate::notice::{Notice, Notifier};
use crate::orchestrator::FIX_ERRORS;
use crate::schema::{LOGIN, REGISTER};
use crate::session::{Guard, Session, SessionManager};
use crate::state::{
    AuthState, LOGIN_FORM, REGISTER_FORM, ROUTE_DOGS, ROUTE_LOGIN, Route,
};

pub const LOGIN_OK: &str = "Inicio de sesión exitoso.";
pub const LOGIN_FAILED: &str = "Usuario o contraseña incorrectos.";
pub const REGISTER_OK: &str = "Usuario registrado correctamente.";
pub const REGISTER_FAILED: &str = "Error al registrar el usuario.";
pub const SESSION_EXPIRED: &str = "Tu sesión ha expirado. Inicia sesión nuevamente.";
pub const SESSION_SAVE_FAILED: &str = "No se pudo guardar la sesión.";

/// Entity state cleared on logout and expiry.
const ENTITY_PREFIXES: &[&str] = &["perros", "razas"];

/// The server rejected our token: forget it and send the user to login.
pub(crate) fn expire_session(store: &StateStore, session: &SessionManager, notifier: &Notifier) {
    sign_out(store, session);
    notifier.error(SESSION_EXPIRED);
}

fn sign_out(store: &StateStore, session: &SessionManager) {
    session.teardown();
    for prefix in ENTITY_PREFIXES {
        for (path, _) in store.scan(prefix) {
            store.remove(&path);
        }
    }
    store.set(AuthState::PATH, AuthState::default());
    store.set(Route::PATH, Route(ROUTE_LOGIN.to_string()));
}

pub struct AuthFlow {
    api: ApiClient,
    store: Arc<StateStore>,
    notifier: Arc<Notifier>,
    session: Arc<SessionManager>,
}

impl AuthFlow {
    pub fn new(
        api: ApiClient,
        store: Arc<StateStore>,
        notifier: Arc<Notifier>,
        session: Arc<SessionManager>,
    ) -> Self {
        Self { api, store, notifier, session }
    }

    pub fn state(&self) -> AuthState {
        self.store.get_as(AuthState::PATH).unwrap_or_default()
    }

    pub fn route(&self) -> Option<String> {
        self.store.get_as::<Route>(Route::PATH).map(|r| r.0)
    }

    fn navigate(&self, route: &str) {
        debug!(route, "navigate");
        self.store.set(Route::PATH, Route(route.to_string()));
    }

    /// Run the route guard and publish auth state, forms and route.
    pub fn initialize(&self) -> Guard {
        self.store.set(LOGIN_FORM, FormState::create(&LOGIN));
        self.store.set(REGISTER_FORM, FormState::create(&REGISTER));
        if !self.store.contains(Notice::PATH) {
            self.store.set(Notice::PATH, None::<Notice>);
        }

        let guard = self.session.guard();
        match &guard {
            Guard::Proceed(session) => {
                self.store.set(
                    AuthState::PATH,
                    AuthState {
                        authenticated: true,
                        user: Some(session.user.clone()),
                        busy: false,
                    },
                );
                if self.route().is_none_or(|r| r == ROUTE_LOGIN) {
                    self.navigate(ROUTE_DOGS);
                }
            }
            Guard::Redirect(to) => {
                self.store.set(AuthState::PATH, AuthState::default());
                self.navigate(to);
            }
        }
        guard
    }

    pub fn edit_login(&self, name: &str, value: &str) {
        self.edit(LOGIN_FORM, name, value);
    }

    pub fn edit_register(&self, name: &str, value: &str) {
        self.edit(REGISTER_FORM, name, value);
    }

    fn edit(&self, path: &str, name: &str, value: &str) {
        if !self.store.update::<FormState, _>(path, |f| f.set_field(name, value)) {
            debug!(path, "form not initialized");
        }
    }

    /// Validate the form at `path` and mark it busy. `None` when the form is
    /// invalid (a notice is shown) or a request is already in flight.
    fn begin_submit(&self, path: &str, schema: &'static crate::schema::Schema) -> Option<FormState> {
        if !self.store.contains(path) {
            self.store.set(path, FormState::create(schema));
        }
        let mut valid = false;
        let mut busy = false;
        self.store.update::<FormState, _>(path, |f| {
            busy = f.busy;
            if busy {
                return;
            }
            valid = f.revalidate();
            f.busy = valid;
        });
        if busy {
            debug!(path, "submit ignored, request in flight");
            return None;
        }
        if !valid {
            self.notifier.error(FIX_ERRORS);
            return None;
        }
        self.store.update::<AuthState, _>(AuthState::PATH, |s| s.busy = true);
        self.store.get_as(path)
    }

    fn end_submit(&self, path: &str, reset: Option<&'static crate::schema::Schema>) {
        match reset {
            Some(schema) => self.store.set(path, FormState::create(schema)),
            None => {
                self.store.update::<FormState, _>(path, |f| f.busy = false);
            }
        }
        self.store.update::<AuthState, _>(AuthState::PATH, |s| s.busy = false);
    }

    pub async fn login(&self) {
        let Some(form) = self.begin_submit(LOGIN_FORM, &LOGIN) else {
            return;
        };
        let credentials = Credentials::new(form.value("email").trim(), form.value("password"));

        match self.api.login(&credentials).await {
            Ok(resp) => {
                let session = Session::new(resp.token, resp.user);
                if let Err(e) = self.session.init(&session) {
                    warn!(error = %e, "login succeeded but session was not stored");
                    self.end_submit(LOGIN_FORM, None);
                    self.notifier.error(SESSION_SAVE_FAILED);
                    return;
                }
                self.end_submit(LOGIN_FORM, Some(&LOGIN));
                self.store.set(
                    AuthState::PATH,
                    AuthState {
                        authenticated: true,
                        user: Some(session.user),
                        busy: false,
                    },
                );
                self.notifier.success(LOGIN_OK);
                self.navigate(ROUTE_DOGS);
            }
            Err(e) => {
                warn!(error = %e, "login failed");
                self.end_submit(LOGIN_FORM, None);
                self.notifier.error(LOGIN_FAILED);
            }
        }
    }

    pub async fn register(&self) {
        let Some(form) = self.begin_submit(REGISTER_FORM, &REGISTER) else {
            return;
        };
        let registration = Registration {
            nombre: form.value("nombre").trim().to_string(),
            apellido_paterno: form.value("apellido_paterno").trim().to_string(),
            telefono: form.value("telefono").to_string(),
            email: form.value("email").trim().to_string(),
            password: form.value("password").to_string(),
        };

        match self.api.register(&registration).await {
            Ok(()) => {
                self.end_submit(REGISTER_FORM, Some(&REGISTER));
                self.notifier.success(REGISTER_OK);
                self.navigate(ROUTE_LOGIN);
            }
            Err(e) => {
                warn!(error = %e, "registration failed");
                self.end_submit(REGISTER_FORM, None);
                self.notifier.error(e.user_message(REGISTER_FAILED));
            }
        }
    }

    pub fn logout(&self) {
        sign_out(&self.store, &self.session);
        self.store.set(LOGIN_FORM, FormState::create(&LOGIN));
    }
}
