use log::*;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::api::{redact, ApiError, ServiceClient};
use crate::error::Error;
use crate::model::Record;
use crate::slot::CredentialSlot;

/// Opaque bearer credential issued by the service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leftovers from earlier clients that wrote the literal strings.
    fn is_usable(token: &str) -> bool {
        let token = token.trim();
        !token.is_empty() && token != "undefined" && token != "null"
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", redact(&self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Credential),
}

/// Outcome of checking a restored credential against the service.
#[derive(Debug)]
pub enum Validation {
    Valid(Vec<Record>),
    Rejected,
    /// Network trouble or a status other than 401. The credential is kept.
    Inconclusive,
}

struct Inner {
    state: SessionState,
    scope: CancellationToken,
}

impl Inner {
    fn holds(&self, credential: &Credential) -> bool {
        matches!(&self.state, SessionState::Authenticated(c) if c == credential)
    }

    fn reset(&mut self, state: SessionState) {
        self.scope.cancel();
        self.scope = CancellationToken::new();
        self.state = state;
    }
}

/// Owns the credential. Every transition opens a new cancellation scope and
/// cancels the previous one.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Mutex<Inner>>,
    slot: Arc<dyn CredentialSlot>,
    api: ServiceClient,
    secret: String,
}

impl SessionManager {
    pub fn new(api: ServiceClient, slot: Arc<dyn CredentialSlot>, secret: &str) -> Self {
        SessionManager {
            inner: Arc::new(Mutex::new(Inner {
                state: SessionState::Unauthenticated,
                scope: CancellationToken::new(),
            })),
            slot,
            api,
            secret: secret.to_owned(),
        }
    }

    pub fn api(&self) -> &ServiceClient {
        &self.api
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    pub fn current(&self) -> Option<Credential> {
        match &self.inner.lock().state {
            SessionState::Authenticated(c) => Some(c.clone()),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Cancellation scope of the current session. Cancelled on release.
    pub fn scope(&self) -> CancellationToken {
        self.inner.lock().scope.clone()
    }

    pub async fn acquire(&self, secret: &str) -> Result<Credential, Error> {
        if secret.trim().is_empty() {
            return Err(Error::ValidationError("Please enter a password".to_owned()));
        }
        if secret != self.secret {
            return Err(Error::InvalidCredential);
        }
        let token = self.api.authenticate().await.map_err(|e| {
            error!("Authentication error: {}", e);
            Error::AuthenticationUnavailable
        })?;
        let credential = Credential::new(token);
        info!("New token received: {:?}", credential);
        let mut inner = self.inner.lock();
        if let Err(e) = self.slot.store(credential.as_str()) {
            warn!("Token kept in memory only: {:#}", e);
        }
        inner.reset(SessionState::Authenticated(credential.clone()));
        Ok(credential)
    }

    /// Optimistically re-enter the session saved by an earlier run. The caller
    /// is expected to follow up with `revalidate`.
    pub fn restore(&self) -> Option<Credential> {
        let saved = match self.slot.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Could not read saved token: {:#}", e);
                None
            }
        };
        debug!("Loading saved token: {}", if saved.is_some() { "Token found" } else { "No token found" });
        let token = saved.filter(|t| Credential::is_usable(t))?;
        let credential = Credential::new(token.trim());
        self.inner.lock().reset(SessionState::Authenticated(credential.clone()));
        Some(credential)
    }

    /// Harmless read with the given credential. Only a 401 counts as rejection.
    pub async fn revalidate(&self, credential: &Credential) -> Validation {
        match self.api.list(credential.as_str()).await {
            Ok(records) => Validation::Valid(records),
            Err(ApiError::Unauthorized) => {
                info!("Token verification failed - 401");
                Validation::Rejected
            }
            Err(e) => {
                error!("Token verification failed: {}", e);
                Validation::Inconclusive
            }
        }
    }

    pub fn release(&self) {
        info!("Logging out");
        let mut inner = self.inner.lock();
        self.sign_out(&mut inner);
    }

    /// Release only if `credential` is still the live one. Late answers about
    /// a credential that is already gone must not touch a newer session. The
    /// check, the reset, the slot clear and `on_release` all run under one
    /// lock, so no new session can start in between.
    pub fn release_if_current(&self, credential: &Credential, on_release: impl FnOnce()) -> bool {
        let mut inner = self.inner.lock();
        if !inner.holds(credential) {
            debug!("Ignoring rejection of stale {:?}", credential);
            return false;
        }
        info!("Logging out, {:?} was rejected", credential);
        self.sign_out(&mut inner);
        on_release();
        true
    }

    /// Run `f` only while `credential` is still live. The session cannot
    /// change until `f` returns.
    pub fn while_current<T>(&self, credential: &Credential, f: impl FnOnce() -> T) -> Option<T> {
        let inner = self.inner.lock();
        if inner.holds(credential) {
            Some(f())
        } else {
            None
        }
    }

    fn sign_out(&self, inner: &mut Inner) {
        inner.reset(SessionState::Unauthenticated);
        if let Err(e) = self.slot.clear() {
            warn!("Could not clear saved token: {:#}", e);
        }
    }
}
