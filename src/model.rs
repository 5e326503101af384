pub mod expiry;
pub mod record;
pub mod view;

pub use expiry::{days_until_expiry, expiry_label, format_date, ExpiryStatus, Summary};
pub use record::{Record, RecordDraft, RecordFields, RecordId};
pub use view::{filter, Screen, ViewState};
