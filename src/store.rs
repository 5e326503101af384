use log::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::api::ApiError;
use crate::error::Error;
use crate::model::{Record, RecordDraft, RecordId, Screen, ViewState};
use crate::notice::Notices;
use crate::session::{Credential, SessionManager, Validation};

pub const DELETE_QUESTION: &str = "Are you sure you want to delete this document?";

/// Set while an operator-triggered request is in flight.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, Error> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| BusyGuard(Arc::clone(flag)))
            .map_err(|_| Error::Busy)
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Record operations on top of a session. Every failure is turned into a
/// notice here; the returned `Result` only tells the caller how it went.
#[derive(Clone)]
pub struct RecordStore {
    session: SessionManager,
    view: Arc<Mutex<ViewState>>,
    notices: Notices,
    busy: Arc<AtomicBool>,
}

impl RecordStore {
    pub fn new(session: SessionManager, notices: Notices) -> Self {
        RecordStore {
            session,
            view: Arc::new(Mutex::new(ViewState::default())),
            notices,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn view(&self) -> ViewState {
        self.view.lock().clone()
    }

    pub fn records(&self) -> Vec<Record> {
        self.view.lock().records.clone()
    }

    pub fn visible(&self) -> Vec<Record> {
        self.view.lock().visible().into_iter().cloned().collect()
    }

    pub fn set_search(&self, term: &str) {
        self.view.lock().set_search(term)
    }

    pub fn set_owner_filter(&self, term: &str) {
        self.view.lock().set_owner_filter(term)
    }

    pub fn begin_create(&self) {
        self.view.lock().begin_create()
    }

    pub fn begin_edit(&self, record: &Record) {
        self.view.lock().begin_edit(record)
    }

    pub fn cancel(&self) {
        self.view.lock().cancel()
    }

    pub async fn login(&self, secret: &str) -> Result<(), Error> {
        let _busy = self.start()?;
        let credential = self.session.acquire(secret).await.map_err(|e| self.fail(e))?;
        self.notices.clear();
        self.fetch(&credential).await?;
        Ok(())
    }

    pub fn logout(&self) {
        self.session.release();
        self.view.lock().reset();
    }

    /// Pick up a saved credential, if any, and check it in the background. The
    /// check is dropped when the session it belongs to is released first.
    pub fn restore(&self) -> Option<JoinHandle<()>> {
        let credential = self.session.restore()?;
        info!("Restored saved session, verifying in the background");
        let scope = self.session.scope();
        let store = self.clone();
        Some(tokio::spawn(async move {
            tokio::select! {
                _ = scope.cancelled() => debug!("Session released before verification finished"),
                outcome = store.session.revalidate(&credential) => store.apply_validation(&credential, outcome),
            }
        }))
    }

    fn apply_validation(&self, credential: &Credential, outcome: Validation) {
        match outcome {
            Validation::Valid(records) => {
                let applied = self.session.while_current(credential, || self.view.lock().records = records);
                if applied.is_none() {
                    debug!("Discarding verification result for stale {:?}", credential);
                }
            }
            Validation::Rejected => {
                self.session.release_if_current(credential, || self.view.lock().reset());
            }
            Validation::Inconclusive => {}
        }
    }

    pub async fn refresh(&self) -> Result<Vec<Record>, Error> {
        let _busy = self.start()?;
        let credential = self.credential()?;
        self.fetch(&credential).await
    }

    pub async fn create(&self, draft: RecordDraft) -> Result<Option<Record>, Error> {
        let _busy = self.start()?;
        self.view.lock().draft = draft.clone();
        let fields = draft.validate().map_err(|e| self.fail(e))?;
        let credential = self.credential()?;

        let created = match self.session.api().create(credential.as_str(), &fields).await {
            Ok(created) => created,
            Err(ApiError::Unauthorized) => return Err(self.expire(&credential)),
            Err(e) => return Err(self.fail(Error::CreateFailed(e.detail_or("create document")))),
        };

        self.notices.success("Document created successfully!");
        {
            let mut view = self.view.lock();
            view.draft = RecordDraft::default();
            view.screen = Screen::List;
        }
        let _ = self.fetch(&credential).await;
        Ok(created)
    }

    pub async fn update(&self, sno: &RecordId, draft: RecordDraft) -> Result<Option<Record>, Error> {
        let _busy = self.start()?;
        self.view.lock().draft = draft.clone();
        let fields = draft.validate().map_err(|e| self.fail(e))?;
        let credential = self.credential()?;

        let updated = match self.session.api().update(credential.as_str(), sno, &fields).await {
            Ok(updated) => updated,
            Err(ApiError::Unauthorized) => return Err(self.expire(&credential)),
            Err(e) => return Err(self.fail(Error::UpdateFailed(e.detail_or("update document")))),
        };

        self.notices.success("Document updated successfully!");
        {
            let mut view = self.view.lock();
            view.screen = Screen::List;
            view.selected = None;
        }
        let _ = self.fetch(&credential).await;
        Ok(updated)
    }

    /// `confirm` is asked before anything else; declining is `Ok(false)`.
    pub async fn delete<F>(&self, sno: &RecordId, confirm: F) -> Result<bool, Error>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_QUESTION) {
            debug!("Delete of {} not confirmed", sno);
            return Ok(false);
        }
        let _busy = self.start()?;
        let credential = self.credential()?;

        match self.session.api().delete(credential.as_str(), sno).await {
            Ok(()) => {}
            Err(ApiError::Unauthorized) => return Err(self.expire(&credential)),
            Err(e) => {
                error!("Delete document error: {}", e);
                return Err(self.fail(Error::DeleteFailed(e.detail_or("delete document"))));
            }
        }

        self.notices.success("Document deleted successfully!");
        let _ = self.fetch(&credential).await;
        Ok(true)
    }

    // Caller holds the busy flag.
    async fn fetch(&self, credential: &Credential) -> Result<Vec<Record>, Error> {
        match self.session.api().list(credential.as_str()).await {
            Ok(records) => {
                self.view.lock().records = records.clone();
                Ok(records)
            }
            Err(ApiError::Unauthorized) => Err(self.expire(credential)),
            Err(e) => {
                error!("Fetch documents error: {}", e);
                Err(self.fail(Error::FetchFailed))
            }
        }
    }

    fn start(&self) -> Result<BusyGuard, Error> {
        BusyGuard::acquire(&self.busy).map_err(|e| {
            debug!("Ignoring request while another one is in flight");
            e
        })
    }

    fn credential(&self) -> Result<Credential, Error> {
        self.session.current().ok_or_else(|| self.fail(Error::NotAuthenticated))
    }

    fn fail(&self, error: Error) -> Error {
        self.notices.error(error.to_string());
        error
    }

    /// A 401 on `credential`. Only the session that owned it is torn down and
    /// told about it; a newer session sees neither the reset nor the notice.
    fn expire(&self, credential: &Credential) -> Error {
        let released = self.session.release_if_current(credential, || self.view.lock().reset());
        if released {
            self.notices.error(Error::SessionExpired.to_string());
        }
        Error::SessionExpired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ServiceClient;
    use crate::slot::{CredentialSlot, MemorySlot};

    fn store(slot: Arc<MemorySlot>) -> RecordStore {
        let api = ServiceClient::new("http://127.0.0.1:9", "testuser").unwrap();
        RecordStore::new(SessionManager::new(api, slot, "admin123"), Notices::default())
    }

    fn record(sno: &str) -> Record {
        serde_json::from_value(serde_json::json!({
            "sno": sno,
            "document_type": "Passport",
            "document_owner": "Alice",
            "document_number": "P-1",
            "expiry_date": "2030-01-01",
            "action_due_date": "2029-12-01",
        }))
        .unwrap()
    }

    // Logged out and back in with another saved token.
    fn switched(store: &RecordStore, slot: &MemorySlot) -> (Credential, Credential) {
        let old = store.session.restore().unwrap();
        store.logout();
        slot.store("new").unwrap();
        let new = store.session.restore().unwrap();
        (old, new)
    }

    #[tokio::test]
    async fn accepted_check_for_a_released_session_is_dropped() {
        let slot = Arc::new(MemorySlot::with("old"));
        let store = store(slot.clone());
        let credential = store.session.restore().unwrap();
        store.logout();

        store.apply_validation(&credential, Validation::Valid(vec![record("1")]));
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn accepted_check_fills_the_live_session() {
        let store = store(Arc::new(MemorySlot::with("tok")));
        let credential = store.session.restore().unwrap();

        store.apply_validation(&credential, Validation::Valid(vec![record("1")]));
        assert_eq!(store.records(), vec![record("1")]);
    }

    #[tokio::test]
    async fn rejected_check_for_an_old_session_leaves_the_new_one_alone() {
        let slot = Arc::new(MemorySlot::with("old"));
        let store = store(slot.clone());
        let (old, new) = switched(&store, &slot);
        store.view.lock().records = vec![record("7")];

        store.apply_validation(&old, Validation::Rejected);
        assert_eq!(store.session.current(), Some(new));
        assert_eq!(store.records(), vec![record("7")]);
        assert_eq!(slot.load().unwrap(), Some("new".to_owned()));
    }

    #[tokio::test]
    async fn expiry_of_an_old_session_posts_no_notice() {
        let slot = Arc::new(MemorySlot::with("old"));
        let store = store(slot.clone());
        let (old, new) = switched(&store, &slot);
        store.view.lock().records = vec![record("7")];

        assert_eq!(store.expire(&old), Error::SessionExpired);
        assert_eq!(store.notices.current_error(), None);
        assert_eq!(store.session.current(), Some(new));
        assert_eq!(store.records(), vec![record("7")]);
    }

    #[tokio::test]
    async fn expiry_of_the_live_session_resets_and_tells_the_operator() {
        let slot = Arc::new(MemorySlot::with("tok"));
        let store = store(slot.clone());
        let credential = store.session.restore().unwrap();
        store.view.lock().records = vec![record("7")];

        assert_eq!(store.expire(&credential), Error::SessionExpired);
        assert_eq!(
            store.notices.current_error(),
            Some("Authentication expired. Please login again.".to_owned())
        );
        assert!(!store.session.is_authenticated());
        assert!(store.records().is_empty());
        assert_eq!(slot.load().unwrap(), None);
    }
}
