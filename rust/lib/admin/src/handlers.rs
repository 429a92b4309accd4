//! Request handler wiring and the assembled admin application.

use std::sync::Arc;
use std::time::Duration;

use dpav_client::{ApiClient, Breed, Dog};
use dpav_flux::Flux;

use crate::auth::AuthFlow;
use crate::entity::Entity;
use crate::notice::{NOTICE_TTL, Notifier};
use crate::orchestrator::Orchestrator;
use crate::request::*;
use crate::session::{SessionManager, SessionVault};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub base_url: String,
    /// Auto-dismiss delay for notices; `None` keeps them until dismissed.
    pub notice_ttl: Option<Duration>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            notice_ttl: Some(NOTICE_TTL),
        }
    }
}

/// The admin panel: one state store, one request router, and the flows
/// behind each request.
pub struct Admin {
    pub flux: Flux,
    pub auth: Arc<AuthFlow>,
    pub dogs: Arc<Orchestrator<Dog>>,
    pub breeds: Arc<Orchestrator<Breed>>,
    pub session: Arc<SessionManager>,
    pub notifier: Arc<Notifier>,
}

impl Admin {
    pub fn new(config: AdminConfig, vault: Arc<dyn SessionVault>) -> Self {
        let flux = Flux::new();
        let store = flux.store().clone();
        let session = Arc::new(SessionManager::new(vault, Default::default()));
        let api = ApiClient::new(&config.base_url, Arc::new(session.token().clone()));
        let notifier = Arc::new(Notifier::new(store.clone(), config.notice_ttl));

        let auth = Arc::new(AuthFlow::new(
            api.clone(),
            store.clone(),
            notifier.clone(),
            session.clone(),
        ));
        let dogs = Arc::new(Orchestrator::new(
            api.clone(),
            store.clone(),
            notifier.clone(),
            session.clone(),
        ));
        let breeds = Arc::new(Orchestrator::new(
            api,
            store,
            notifier.clone(),
            session.clone(),
        ));

        register_handlers(&flux, &auth, &notifier);
        register_entity(&flux, &dogs);
        register_entity(&flux, &breeds);

        Self { flux, auth, dogs, breeds, session, notifier }
    }
}

/// Register the application and auth request handlers.
pub fn register_handlers(flux: &Flux, auth: &Arc<AuthFlow>, notifier: &Arc<Notifier>) {
    let a = auth.clone();
    flux.on_typed(InitializeReq::PATH, move |_: Arc<InitializeReq>, _| {
        let a = a.clone();
        async move {
            a.initialize();
        }
    });

    let n = notifier.clone();
    flux.on_typed(DismissNoticeReq::PATH, move |_: Arc<DismissNoticeReq>, _| {
        let n = n.clone();
        async move { n.dismiss() }
    });

    let a = auth.clone();
    flux.on_typed(LoginReq::PATH, move |req: Arc<LoginReq>, _| {
        let a = a.clone();
        async move {
            a.edit_login("email", &req.email);
            a.edit_login("password", &req.password);
            a.login().await;
        }
    });

    let a = auth.clone();
    flux.on_typed(LOGIN_FIELD, move |req: Arc<FieldReq>, _| {
        let a = a.clone();
        async move { a.edit_login(&req.name, &req.value) }
    });

    let a = auth.clone();
    flux.on_typed(RegisterReq::PATH, move |req: Arc<RegisterReq>, _| {
        let a = a.clone();
        async move {
            let r = &req.0;
            for (name, value) in [
                ("nombre", &r.nombre),
                ("apellido_paterno", &r.apellido_paterno),
                ("telefono", &r.telefono),
                ("email", &r.email),
                ("password", &r.password),
            ] {
                a.edit_register(name, value);
            }
            a.register().await;
        }
    });

    let a = auth.clone();
    flux.on_typed(REGISTER_FIELD, move |req: Arc<FieldReq>, _| {
        let a = a.clone();
        async move { a.edit_register(&req.name, &req.value) }
    });

    let a = auth.clone();
    flux.on_typed(LogoutReq::PATH, move |_: Arc<LogoutReq>, _| {
        let a = a.clone();
        async move { a.logout() }
    });
}

/// Register `{entity}/*` handlers for one orchestrator.
pub fn register_entity<E: Entity>(flux: &Flux, orch: &Arc<Orchestrator<E>>) {
    let path = |action: &str| entity_request(E::NAME, action);

    let o = orch.clone();
    flux.on_typed(&path(LoadReq::ACTION), move |_: Arc<LoadReq>, _| {
        let o = o.clone();
        async move { o.load().await }
    });

    let o = orch.clone();
    flux.on_typed(&path(SearchReq::ACTION), move |req: Arc<SearchReq>, _| {
        let o = o.clone();
        async move { o.search(&req.term) }
    });

    let o = orch.clone();
    flux.on_typed(&path(OpenCreateReq::ACTION), move |_: Arc<OpenCreateReq>, _| {
        let o = o.clone();
        async move { o.open_create() }
    });

    let o = orch.clone();
    flux.on_typed(&path(OpenEditReq::ACTION), move |req: Arc<OpenEditReq>, _| {
        let o = o.clone();
        async move {
            o.open_edit(&req.id);
        }
    });

    let o = orch.clone();
    flux.on_typed(&path(FieldReq::ACTION), move |req: Arc<FieldReq>, _| {
        let o = o.clone();
        async move { o.edit_field(&req.name, &req.value) }
    });

    let o = orch.clone();
    flux.on_typed(&path(SubmitReq::ACTION), move |_: Arc<SubmitReq>, _| {
        let o = o.clone();
        async move { o.submit().await }
    });

    let o = orch.clone();
    flux.on_typed(&path(CloseFormReq::ACTION), move |_: Arc<CloseFormReq>, _| {
        let o = o.clone();
        async move { o.close_form() }
    });

    let o = orch.clone();
    flux.on_typed(&path(DeleteReq::ACTION), move |req: Arc<DeleteReq>, _| {
        let o = o.clone();
        async move { o.delete(&req.id).await }
    });

    let o = orch.clone();
    flux.on_typed(&path(UnmountReq::ACTION), move |_: Arc<UnmountReq>, _| {
        let o = o.clone();
        async move { o.unmount() }
    });
}
