use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::store::StateStore;
use crate::topic::TopicTable;

/// A boxed, `Send`-able future returned by request handlers.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Payload shared with every handler a request is routed to.
pub type Payload = Arc<dyn Any + Send + Sync>;

type ErasedHandler = Arc<dyn Fn(String, Payload, Arc<StateStore>) -> BoxFuture + Send + Sync>;

/// Request router — maps path patterns to async handlers.
///
/// Every matching handler runs, one after another, in registration order.
/// A path nobody handles is a silent no-op.
pub struct Router {
    table: TopicTable<ErasedHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            table: TopicTable::new(),
        }
    }

    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Payload, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: ErasedHandler = Arc::new(
            move |path: String, payload: Payload, store: Arc<StateStore>| -> BoxFuture {
                Box::pin(handler(path, payload, store))
            },
        );
        self.table.insert(pattern, handler);
    }

    pub async fn dispatch(&self, path: &str, payload: Payload, store: Arc<StateStore>) {
        let handlers = self.table.match_topic(path);
        if handlers.is_empty() {
            tracing::debug!(path, "no handler for request");
        }
        for handler in handlers {
            handler(path.to_string(), Arc::clone(&payload), Arc::clone(&store)).await;
        }
    }

    pub fn has_handler(&self, pattern: &str) -> bool {
        self.table.has_pattern(pattern)
    }

    pub fn matches(&self, path: &str) -> bool {
        !self.table.match_topic(path).is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
