use std::any::Any;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::topic::TopicTable;
use crate::value::{StateValue, SubscriptionId};

/// Callback type for state change notifications.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Per-path state store with pattern-routed change notifications.
///
/// Values are keyed by exact path in a `BTreeMap`, so `scan` walks children
/// in path order. Handlers run synchronously on the thread that writes, after
/// the write lock has been released.
pub struct StateStore {
    values: RwLock<BTreeMap<String, StateValue>>,
    handlers: TopicTable<HandlerEntry>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(BTreeMap::new()),
            handlers: TopicTable::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Store `value` at `path` and notify matching subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        self.set_value(path, StateValue::new(value));
    }

    pub fn set_value(&self, path: &str, value: StateValue) {
        self.values
            .write()
            .unwrap()
            .insert(path.to_string(), value.clone());
        self.notify(path, &value);
    }

    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values.read().unwrap().get(path).cloned()
    }

    /// Read the value at `path` as an owned `T`.
    ///
    /// Returns `None` when nothing is stored there or it holds another type.
    pub fn get_as<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.cloned::<T>())
    }

    /// Read-modify-write the `T` at `path` under the write lock, then notify.
    ///
    /// Returns false (and notifies nobody) when no `T` is stored there.
    pub fn update<T, F>(&self, path: &str, f: F) -> bool
    where
        T: Any + Clone + Send + Sync,
        F: FnOnce(&mut T),
    {
        let updated = {
            let mut values = self.values.write().unwrap();
            let Some(mut current) = values.get(path).and_then(|v| v.cloned::<T>()) else {
                return false;
            };
            f(&mut current);
            let value = StateValue::new(current);
            values.insert(path.to_string(), value.clone());
            value
        };
        self.notify(path, &updated);
        true
    }

    /// Remove the value at `path`. Subscribers are not notified.
    pub fn remove(&self, path: &str) -> Option<StateValue> {
        self.values.write().unwrap().remove(path)
    }

    /// Entries strictly under `{prefix}/`, ordered by path.
    pub fn scan(&self, prefix: &str) -> Vec<(String, StateValue)> {
        let scan_prefix = format!("{}/", prefix);
        self.values
            .read()
            .unwrap()
            .range(scan_prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&scan_prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.read().unwrap().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paths(&self) -> Vec<String> {
        self.values.read().unwrap().keys().cloned().collect()
    }

    /// Register `handler` for writes to paths matching `pattern`.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.insert(
            pattern,
            HandlerEntry {
                id,
                handler: Arc::new(handler),
            },
        );
        id
    }

    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) {
        self.handlers.remove(pattern, |entry| entry.id == id);
    }

    fn notify(&self, path: &str, value: &StateValue) {
        for entry in self.handlers.match_topic(path) {
            (entry.handler)(path, value);
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
