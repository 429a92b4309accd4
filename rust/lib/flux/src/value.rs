use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased, reference-counted state value.
///
/// Readers share one allocation; cloning only bumps the reference count.
#[derive(Clone)]
pub struct StateValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl StateValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Borrow the value as `T`, or `None` if it holds another type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Clone the value out as `T`.
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValue")
            .field("type_id", &(*self.inner).type_id())
            .finish()
    }
}

/// Handle returned by `StateStore::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Notice {
        message: String,
    }

    #[test]
    fn downcast_matches_stored_type_only() {
        let v = StateValue::new(Notice { message: "Perro creado correctamente".into() });
        assert!(v.is::<Notice>());
        assert_eq!(
            v.downcast_ref::<Notice>().map(|n| n.message.as_str()),
            Some("Perro creado correctamente")
        );
        assert!(v.downcast_ref::<String>().is_none());
        assert_eq!(v.type_id(), TypeId::of::<Notice>());
    }

    #[test]
    fn cloned_returns_owned_copy() {
        let v = StateValue::new(vec!["Labrador".to_string(), "Beagle".to_string()]);
        let names: Vec<String> = v.cloned().unwrap();
        assert_eq!(names, vec!["Labrador", "Beagle"]);
        assert!(v.cloned::<u32>().is_none());
    }

    #[test]
    fn clone_shares_allocation() {
        let big = vec![0u8; 100_000];
        let a = StateValue::new(big);
        let b = a.clone();
        assert_eq!(a.ref_count(), 2);

        let pa = a.downcast_ref::<Vec<u8>>().unwrap().as_ptr();
        let pb = b.downcast_ref::<Vec<u8>>().unwrap().as_ptr();
        assert_eq!(pa, pb);

        drop(b);
        assert_eq!(a.ref_count(), 1);
    }

    #[test]
    fn option_payloads_round_trip() {
        let v = StateValue::new(None::<Notice>);
        assert_eq!(v.downcast_ref::<Option<Notice>>(), Some(&None));
    }

    #[test]
    fn debug_mentions_type_id() {
        let debug = format!("{:?}", StateValue::new(1u8));
        assert!(debug.contains("StateValue"));
        assert!(debug.contains("type_id"));
    }

    fn _assert_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<StateValue>();
        assert_sync::<StateValue>();
    }
}
