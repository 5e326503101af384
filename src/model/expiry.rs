use chrono::{Local, NaiveDate};

use super::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryStatus {
    Expired,
    Critical,
    Warning,
    Normal,
}

impl ExpiryStatus {
    /// Boundaries are inclusive: 7 days out is still critical, 30 still a warning.
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d < 0 => ExpiryStatus::Expired,
            0..=7 => ExpiryStatus::Critical,
            8..=30 => ExpiryStatus::Warning,
            _ => ExpiryStatus::Normal,
        }
    }

    pub fn for_date(expiry: NaiveDate, today: NaiveDate) -> Self {
        ExpiryStatus::from_days(days_until_expiry(expiry, today))
    }
}

/// Whole calendar days from `today` until `expiry`. Negative once it has passed.
pub fn days_until_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    expiry.signed_duration_since(today).num_days()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn expiry_label(expiry: NaiveDate, today: NaiveDate) -> String {
    let days = days_until_expiry(expiry, today);
    match ExpiryStatus::from_days(days) {
        ExpiryStatus::Expired => "Expired".to_owned(),
        _ if days == 0 => "Expires today".to_owned(),
        _ if days == 1 => "Expires tomorrow".to_owned(),
        _ => format!("{} days left", days),
    }
}

/// `Oct 19, 2026`. chrono's month names are always English.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Per-status counts for the list header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub expired: usize,
    pub critical: usize,
    pub warning: usize,
    pub normal: usize,
}

impl Summary {
    pub fn of<'a, I>(records: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records.into_iter().fold(Summary::default(), |mut s, r| {
            match ExpiryStatus::for_date(r.expiry_date, today) {
                ExpiryStatus::Expired => s.expired += 1,
                ExpiryStatus::Critical => s.critical += 1,
                ExpiryStatus::Warning => s.warning += 1,
                ExpiryStatus::Normal => s.normal += 1,
            }
            s
        })
    }

    pub fn total(&self) -> usize {
        self.expired + self.critical + self.warning + self.normal
    }
}
