use super::record::{Record, RecordDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Create,
    Edit,
}

impl Default for Screen {
    fn default() -> Self {
        Screen::List
    }
}

/// Client-only view bookkeeping. Never persisted, wiped on logout.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub screen: Screen,
    pub selected: Option<Record>,
    pub draft: RecordDraft,
    pub search: String,
    pub owner_filter: String,
    pub records: Vec<Record>,
}

impl ViewState {
    pub fn begin_create(&mut self) {
        self.selected = None;
        self.draft = RecordDraft::default();
        self.screen = Screen::Create;
    }

    pub fn begin_edit(&mut self, record: &Record) {
        self.draft = RecordDraft::from(record);
        self.selected = Some(record.clone());
        self.screen = Screen::Edit;
    }

    pub fn cancel(&mut self) {
        self.screen = Screen::List;
        self.selected = None;
        self.draft = RecordDraft::default();
    }

    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_owned();
    }

    pub fn set_owner_filter(&mut self, term: &str) {
        self.owner_filter = term.to_owned();
    }

    pub fn find(&self, sno: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.sno.as_str() == sno)
    }

    /// Records that pass the current search and owner filter, in service order.
    pub fn visible(&self) -> Vec<&Record> {
        filter(&self.records, &self.search, &self.owner_filter)
    }

    pub fn reset(&mut self) {
        *self = ViewState::default();
    }
}

pub fn matches(record: &Record, search: &str, owner: &str) -> bool {
    let search = search.to_lowercase();
    let owner = owner.to_lowercase();
    let matches_search = record.document_type.to_lowercase().contains(&search)
        || record.document_number.to_lowercase().contains(&search);
    let matches_owner = owner.is_empty() || record.document_owner.to_lowercase().contains(&owner);
    matches_search && matches_owner
}

pub fn filter<'a, I>(records: I, search: &str, owner: &str) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| matches(r, search, owner))
        .collect()
}
