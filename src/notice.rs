use log::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Success,
    Error,
}

#[derive(Default)]
struct Inner {
    error: Option<String>,
    success: Option<String>,
    next_id: u64,
    timer: Option<CancellationToken>,
}

/// Pending success and error messages. Showing either one (re)arms a single
/// timer that clears both once it fires.
#[derive(Clone)]
pub struct Notices {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
}

impl Default for Notices {
    fn default() -> Self {
        Notices::new(NOTICE_TTL)
    }
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Notices { inner: Arc::new(Mutex::new(Inner::default())), ttl }
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(NoticeKind::Error, text.into())
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(NoticeKind::Success, text.into())
    }

    pub fn current_error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    pub fn current_success(&self) -> Option<String> {
        self.inner.lock().success.clone()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        if let Some(timer) = inner.timer.take() {
            timer.cancel();
        }
        inner.error = None;
        inner.success = None;
    }

    fn show(&self, kind: NoticeKind, text: String) {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        match kind {
            NoticeKind::Error => {
                warn!("{}", text);
                inner.error = Some(text);
            }
            NoticeKind::Success => {
                info!("{}", text);
                inner.success = Some(text);
            }
        }
        if let Some(previous) = inner.timer.take() {
            previous.cancel();
        }
        let cancel = CancellationToken::new();
        inner.timer = Some(cancel.clone());
        drop(inner);

        let shared = Arc::clone(&self.inner);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    let mut inner = shared.lock();
                    // A newer notice owns the timer now.
                    if inner.next_id == id {
                        inner.error = None;
                        inner.success = None;
                        inner.timer = None;
                    }
                }
            }
        });
    }

    /// Stop the pending timer without touching what is shown.
    pub fn shutdown(&self) {
        if let Some(timer) = self.inner.lock().timer.take() {
            timer.cancel();
        }
    }
}
