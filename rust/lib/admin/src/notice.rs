//! Transient success/error notices.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dpav_flux::StateStore;

/// How long a notice stays up before it hides itself.
pub const NOTICE_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Distinguishes two notices with the same text.
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// State path holding the `Option<Notice>` currently on screen.
    pub const PATH: &'static str = "app/notice";

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Posts notices into the store. At most one notice is shown; a new one
/// replaces the previous.
pub struct Notifier {
    store: Arc<StateStore>,
    next_id: AtomicU64,
    ttl: Option<Duration>,
}

impl Notifier {
    /// `ttl` of `None` keeps notices until dismissed.
    pub fn new(store: Arc<StateStore>, ttl: Option<Duration>) -> Self {
        Self { store, next_id: AtomicU64::new(1), ttl }
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.show(NoticeKind::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.show(NoticeKind::Error, message.into())
    }

    pub fn current(&self) -> Option<Notice> {
        self.store.get_as::<Option<Notice>>(Notice::PATH).flatten()
    }

    pub fn dismiss(&self) {
        self.store.set(Notice::PATH, None::<Notice>);
    }

    fn show(&self, kind: NoticeKind, message: String) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match kind {
            NoticeKind::Success => tracing::info!(%message, "notice"),
            NoticeKind::Error => tracing::warn!(%message, "notice"),
        }
        self.store.set(Notice::PATH, Some(Notice { id, kind, message }));
        self.schedule_hide(id);
        id
    }

    fn schedule_hide(&self, id: u64) {
        let Some(ttl) = self.ttl else { return };
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no runtime, notice {} stays until dismissed", id);
            return;
        };
        let store = self.store.clone();
        rt.spawn(async move {
            tokio::time::sleep(ttl).await;
            // Only hide the notice this timer was started for.
            let still_showing = store
                .get_as::<Option<Notice>>(Notice::PATH)
                .flatten()
                .is_some_and(|n| n.id == id);
            if still_showing {
                store.set(Notice::PATH, None::<Notice>);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn notice_hides_itself_after_ttl() {
        let store = Arc::new(StateStore::new());
        let notifier = Notifier::new(store.clone(), Some(NOTICE_TTL));

        notifier.success("Raza creada correctamente");
        assert_eq!(notifier.current().map(|n| n.kind), Some(NoticeKind::Success));

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(notifier.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn older_timer_does_not_hide_newer_notice() {
        let store = Arc::new(StateStore::new());
        let notifier = Notifier::new(store.clone(), Some(NOTICE_TTL));

        notifier.error("Error al crear la raza");
        tokio::time::sleep(Duration::from_millis(3000)).await;
        notifier.success("Raza creada correctamente");

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let shown = notifier.current().unwrap();
        assert_eq!(shown.message, "Raza creada correctamente");

        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert!(notifier.current().is_none());
    }

    #[test]
    fn without_ttl_notice_waits_for_dismiss() {
        let store = Arc::new(StateStore::new());
        let notifier = Notifier::new(store, None);
        notifier.error("x");
        assert!(notifier.current().unwrap().is_error());
        notifier.dismiss();
        assert!(notifier.current().is_none());
    }
}
