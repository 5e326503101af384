pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod notice;
pub mod prompt;
pub mod session;
pub mod slot;
pub mod store;

use std::sync::Arc;

pub use api::{ApiError, ServiceClient};
pub use config::Config;
pub use error::Error;
pub use model::{ExpiryStatus, Record, RecordDraft, RecordFields, RecordId, Screen, ViewState};
pub use notice::Notices;
pub use session::{Credential, SessionManager, SessionState, Validation};
pub use slot::{CredentialSlot, FileSlot, MemorySlot};
pub use store::RecordStore;

/// Wire a store up from configuration, persisting the credential to the
/// configured token file.
pub fn open(config: &Config) -> anyhow::Result<RecordStore> {
    let slot = Arc::new(FileSlot::new(config.token_path.clone()));
    open_with_slot(config, slot)
}

pub fn open_with_slot(config: &Config, slot: Arc<dyn CredentialSlot>) -> anyhow::Result<RecordStore> {
    let api = ServiceClient::new(&config.api_url, &config.username)?;
    let session = SessionManager::new(api, slot, &config.password);
    Ok(RecordStore::new(session, Notices::default()))
}
