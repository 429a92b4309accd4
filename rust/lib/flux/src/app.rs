use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use crate::router::{Payload, Router};
use crate::store::StateStore;
use crate::value::{StateValue, SubscriptionId};

/// Flux — state store plus request router behind one handle.
///
/// ```ignore
/// let flux = Flux::new();
/// flux.on_typed::<SearchReq, _, _>("perros/search", |req, store| async move {
///     store.set("perros/term", req.term.clone());
/// });
/// flux.emit("perros/search", SearchReq { term: "lab".into() }).await;
/// let term = flux.get_as::<String>("perros/term");
/// ```
pub struct Flux {
    store: Arc<StateStore>,
    router: Router,
}

impl Flux {
    pub fn new() -> Self {
        Self {
            store: Arc::new(StateStore::new()),
            router: Router::new(),
        }
    }

    // ====================================================================
    // State
    // ====================================================================

    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.store.get(path)
    }

    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.store.get_as(path)
    }

    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        self.store.scan(prefix)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.store.contains(path)
    }

    // ====================================================================
    // Requests
    // ====================================================================

    /// Emit a request and wait until every matching handler has finished.
    pub async fn emit<T: Any + Send + Sync>(&self, path: &str, payload: T) {
        self.emit_arc(path, Arc::new(payload)).await;
    }

    pub async fn emit_arc(&self, path: &str, payload: Payload) {
        tracing::debug!(path, "emit");
        self.router
            .dispatch(path, payload, Arc::clone(&self.store))
            .await;
    }

    /// Register a raw handler: path, type-erased payload, store.
    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Payload, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.router.on(pattern, handler);
    }

    /// Register a handler for requests carrying a `Req` payload.
    ///
    /// Payloads of any other type are logged and dropped.
    pub fn on_typed<Req, F, Fut>(&self, pattern: &str, handler: F)
    where
        Req: Any + Send + Sync,
        F: Fn(Arc<Req>, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.router.on(pattern, move |path, payload, store| {
            let handler = Arc::clone(&handler);
            async move {
                match payload.downcast::<Req>() {
                    Ok(req) => handler(req, store).await,
                    Err(_) => tracing::warn!(
                        path = %path,
                        expected = std::any::type_name::<Req>(),
                        "request payload type mismatch"
                    ),
                }
            }
        });
    }

    pub fn has_handler(&self, path: &str) -> bool {
        self.router.matches(path)
    }

    // ====================================================================
    // Subscriptions
    // ====================================================================

    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        self.store.subscribe(pattern, handler)
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) {
        self.store.unsubscribe(pattern, id);
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }
}

impl Default for Flux {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct SearchReq {
        term: String,
    }

    #[tokio::test]
    async fn typed_handler_receives_payload() {
        let flux = Flux::new();
        flux.on_typed::<SearchReq, _, _>("perros/search", |req, store| async move {
            store.set("perros/term", req.term.to_lowercase());
        });

        flux.emit("perros/search", SearchReq { term: "Lab".into() }).await;
        assert_eq!(flux.get_as::<String>("perros/term").as_deref(), Some("lab"));
    }

    #[tokio::test]
    async fn typed_handler_ignores_wrong_payload() {
        let flux = Flux::new();
        flux.on_typed::<SearchReq, _, _>("perros/search", |_, store| async move {
            store.set("perros/term", String::new());
        });

        flux.emit("perros/search", 42u32).await;
        assert!(!flux.contains("perros/term"));
    }

    #[tokio::test]
    async fn emit_updates_are_seen_by_subscribers() {
        let flux = Flux::new();
        let routes = Arc::new(Mutex::new(Vec::new()));
        let sink = routes.clone();
        flux.subscribe("app/route", move |_, v| {
            if let Some(r) = v.downcast_ref::<String>() {
                sink.lock().unwrap().push(r.clone());
            }
        });
        flux.on("auth/logout", |_, _, store| async move {
            store.set("app/route", "/login".to_string());
        });

        assert!(flux.has_handler("auth/logout"));
        flux.emit("auth/logout", ()).await;
        assert_eq!(*routes.lock().unwrap(), vec!["/login"]);
    }

    #[tokio::test]
    async fn unsubscribed_handler_stays_quiet() {
        let flux = Flux::default();
        let hits = Arc::new(Mutex::new(0));
        let h = hits.clone();
        let id = flux.subscribe("#", move |_, _| *h.lock().unwrap() += 1);

        flux.store().set("a", 1u8);
        flux.unsubscribe("#", id);
        flux.store().set("b", 1u8);
        assert_eq!(*hits.lock().unwrap(), 1);
    }
}
