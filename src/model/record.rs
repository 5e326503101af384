use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Service-assigned identifier. The service may hand it out as a number or a
/// string; either way it ends up as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::new(id)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => RecordId(n.to_string()),
            Raw::Text(s) => RecordId(s),
        })
    }
}

/// A tracked document as the service stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub sno: RecordId,
    pub document_type: String,
    pub document_owner: String,
    pub document_number: String,
    pub expiry_date: NaiveDate,
    pub action_due_date: NaiveDate,
}

/// Validated request body for create and full-replacement update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub document_type: String,
    pub document_owner: String,
    pub document_number: String,
    pub expiry_date: NaiveDate,
    pub action_due_date: NaiveDate,
}

/// What the operator is typing into the form. Nothing here has been checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub document_type: String,
    pub document_owner: String,
    pub document_number: String,
    pub expiry_date: String,
    pub action_due_date: String,
}

impl RecordDraft {
    pub fn is_complete(&self) -> bool {
        [
            &self.document_type,
            &self.document_owner,
            &self.document_number,
            &self.expiry_date,
            &self.action_due_date,
        ]
        .iter()
        .all(|f| !f.trim().is_empty())
    }

    /// The only place a draft becomes a submittable record.
    pub fn validate(&self) -> Result<RecordFields, Error> {
        if !self.is_complete() {
            return Err(Error::ValidationError("Please fill in all fields".to_owned()));
        }
        Ok(RecordFields {
            document_type: self.document_type.trim().to_owned(),
            document_owner: self.document_owner.trim().to_owned(),
            document_number: self.document_number.trim().to_owned(),
            expiry_date: parse_date("Expiry date", &self.expiry_date)?,
            action_due_date: parse_date("Action due date", &self.action_due_date)?,
        })
    }
}

impl From<&Record> for RecordDraft {
    fn from(record: &Record) -> Self {
        RecordDraft {
            document_type: record.document_type.clone(),
            document_owner: record.document_owner.clone(),
            document_number: record.document_number.clone(),
            expiry_date: record.expiry_date.format(DATE_FORMAT).to_string(),
            action_due_date: record.action_due_date.format(DATE_FORMAT).to_string(),
        }
    }
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        Error::ValidationError(format!("{} must be a date like 2024-12-31, got '{}'", name, value.trim()))
    })
}
