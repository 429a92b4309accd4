//! CRUD orchestration for one entity: load, search, the create/edit form,
//! submit and delete, with notices and session-expiry handling.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dpav_client::{ApiClient, ApiError, Id};
use dpav_flux::StateStore;
use tracing::{debug, warn};

use crate::auth::expire_session;
use crate::entity::Entity;
use crate::filter::ListState;
use crate::form::{FormMode, FormState};
use crate::notice::Notifier;
use crate::session::SessionManager;
use crate::state::{breeds_path, form_path, list_path};

pub const FIX_ERRORS: &str = "Por favor corrige los errores antes de continuar.";

/// Resets a flag in the store when dropped, so early returns and errors
/// never leave a view stuck in its busy state.
struct ResetOnDrop<'a, T: Any + Clone + Send + Sync> {
    store: &'a StateStore,
    path: &'a str,
    reset: fn(&mut T),
}

impl<T: Any + Clone + Send + Sync> Drop for ResetOnDrop<'_, T> {
    fn drop(&mut self) {
        self.store.update::<T, _>(self.path, self.reset);
    }
}

pub struct Orchestrator<E: Entity> {
    api: ApiClient,
    store: Arc<StateStore>,
    notifier: Arc<Notifier>,
    session: Arc<SessionManager>,
    list_path: String,
    form_path: String,
    /// Bumped on unmount; results started under an older epoch are dropped.
    epoch: AtomicU64,
    _entity: std::marker::PhantomData<fn() -> E>,
}

impl<E: Entity> Orchestrator<E> {
    pub fn new(
        api: ApiClient,
        store: Arc<StateStore>,
        notifier: Arc<Notifier>,
        session: Arc<SessionManager>,
    ) -> Self {
        let orch = Self {
            api,
            store,
            notifier,
            session,
            list_path: list_path(E::NAME),
            form_path: form_path(E::NAME),
            epoch: AtomicU64::new(0),
            _entity: std::marker::PhantomData,
        };
        orch.mount();
        orch
    }

    pub fn list_path(&self) -> &str {
        &self.list_path
    }

    pub fn form_path(&self) -> &str {
        &self.form_path
    }

    pub fn list(&self) -> ListState<E::Row> {
        self.store.get_as(&self.list_path).unwrap_or_default()
    }

    pub fn form(&self) -> FormState {
        self.store
            .get_as(&self.form_path)
            .unwrap_or_else(|| FormState::new(E::SCHEMA))
    }

    /// Put an empty list and a closed form in place if missing.
    pub fn mount(&self) {
        if !self.store.contains(&self.list_path) {
            self.store.set(&self.list_path, ListState::<E::Row>::default());
        }
        if !self.store.contains(&self.form_path) {
            self.store.set(&self.form_path, FormState::new(E::SCHEMA));
        }
    }

    /// The view went away: in-flight results are discarded on arrival.
    pub fn unmount(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(entity = E::NAME, epoch, "unmount");
        self.store.update::<ListState<E::Row>, _>(&self.list_path, |l| l.loading = false);
    }

    /// Mount epoch and session generation at the start of a request. A
    /// result is applied only if both are unchanged when it arrives, so
    /// neither an unmount nor a sign-out lets it write state back.
    fn ticket(&self) -> (u64, u64) {
        (self.epoch.load(Ordering::SeqCst), self.session.generation())
    }

    fn is_current(&self, ticket: (u64, u64)) -> bool {
        self.ticket() == ticket
    }

    pub async fn load(&self) {
        self.mount();
        let ticket = self.ticket();
        self.store.update::<ListState<E::Row>, _>(&self.list_path, |l| {
            l.loading = true;
            l.error = None;
        });
        let loading = ResetOnDrop::<ListState<E::Row>> {
            store: &self.store,
            path: &self.list_path,
            reset: |l| l.loading = false,
        };

        let result = E::fetch(&self.api).await;
        if !self.is_current(ticket) {
            debug!(entity = E::NAME, "discarding stale list result");
            return;
        }
        match result {
            Ok(fetched) => {
                debug!(entity = E::NAME, count = fetched.rows.len(), "loaded");
                if let Some(breeds) = fetched.breeds {
                    self.store.set(&breeds_path(E::NAME), breeds);
                }
                self.store
                    .update::<ListState<E::Row>, _>(&self.list_path, |l| l.replace(fetched.rows));
            }
            Err(e) if e.is_auth() => {
                drop(loading);
                self.expire(&e);
            }
            Err(e) => {
                warn!(entity = E::NAME, error = %e, "load failed");
                let message = e.user_message(E::MESSAGES.load_failed);
                self.store
                    .update::<ListState<E::Row>, _>(&self.list_path, |l| l.error = Some(message));
            }
        }
    }

    pub fn search(&self, term: &str) {
        self.store
            .update::<ListState<E::Row>, _>(&self.list_path, |l| l.set_filter(term));
    }

    pub fn open_create(&self) {
        self.store.set(&self.form_path, FormState::create(E::SCHEMA));
    }

    /// Open the edit form prefilled from the listed record with `id`.
    /// Returns false when no such record is listed.
    pub fn open_edit(&self, id: &Id) -> bool {
        let list = self.list();
        let Some(row) = list.all.iter().find(|r| E::row_id(r) == id) else {
            debug!(entity = E::NAME, %id, "open-edit: not listed");
            return false;
        };
        let form = FormState::edit(E::SCHEMA, id.clone(), E::form_values(row));
        self.store.set(&self.form_path, form);
        true
    }

    pub fn edit_field(&self, name: &str, value: &str) {
        self.store
            .update::<FormState, _>(&self.form_path, |f| f.set_field(name, value));
    }

    pub fn close_form(&self) {
        self.store.update::<FormState, _>(&self.form_path, |f| f.open = false);
    }

    /// Validate and send the form. A submit while one is in flight is
    /// ignored.
    pub async fn submit(&self) {
        let mut valid = false;
        let mut already_busy = false;
        let found = self.store.update::<FormState, _>(&self.form_path, |f| {
            if f.busy {
                already_busy = true;
                return;
            }
            valid = f.revalidate();
            if valid {
                f.busy = true;
            }
        });
        if !found || already_busy {
            debug!(entity = E::NAME, found, already_busy, "submit ignored");
            return;
        }
        if !valid {
            self.notifier.error(FIX_ERRORS);
            return;
        }
        let busy = ResetOnDrop::<FormState> {
            store: &self.store,
            path: &self.form_path,
            reset: |f| f.busy = false,
        };

        let form = self.form();
        let Some(input) = E::input(&form) else {
            self.notifier.error(FIX_ERRORS);
            return;
        };
        let ticket = self.ticket();
        let client = self.api.resource::<E>();
        let (result, ok, failed) = match &form.mode {
            FormMode::Create => (
                client.create(&input).await,
                E::MESSAGES.created,
                E::MESSAGES.create_failed,
            ),
            FormMode::Edit(id) => (
                client.update(id, &input).await,
                E::MESSAGES.updated,
                E::MESSAGES.update_failed,
            ),
        };
        if !self.is_current(ticket) {
            debug!(entity = E::NAME, "discarding stale submit result");
            return;
        }

        match result {
            Ok(()) => {
                self.notifier.success(ok);
                self.store.set(&self.form_path, FormState::new(E::SCHEMA));
                drop(busy);
                self.load().await;
            }
            Err(e) => {
                drop(busy);
                self.fail(&e, failed);
            }
        }
    }

    pub async fn delete(&self, id: &Id) {
        let ticket = self.ticket();
        let result = self.api.resource::<E>().delete(id).await;
        if !self.is_current(ticket) {
            debug!(entity = E::NAME, "discarding stale delete result");
            return;
        }
        match result {
            Ok(()) => {
                self.notifier.success(E::MESSAGES.deleted);
                self.load().await;
            }
            Err(e) => self.fail(&e, E::MESSAGES.delete_failed),
        }
    }

    fn fail(&self, err: &ApiError, fallback: &str) {
        if err.is_auth() {
            self.expire(err);
            return;
        }
        warn!(entity = E::NAME, error = %err, "request failed");
        self.notifier.error(err.user_message(fallback));
    }

    fn expire(&self, err: &ApiError) {
        warn!(entity = E::NAME, error = %err, "session rejected by server");
        expire_session(&self.store, &self.session, &self.notifier);
    }
}
